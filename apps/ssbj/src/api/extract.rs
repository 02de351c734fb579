//! # Request Extractors
//!
//! `ApiJson` and `ApiPath` wrap axum's `Json` and `Path` so that malformed
//! bodies and path segments are reported as an `ErrorResponse` with kind
//! `invalid_input` and status 400, like every other client error.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, request::Parts},
    response::Response,
};
use serde::de::DeserializeOwned;

use super::types::ErrorResponse;

fn invalid_input(source: &'static str, detail: String) -> Response {
    tracing::debug!(source, detail = %detail, "Request rejected");
    ErrorResponse::new("invalid_input", format!("Invalid {}: {}", source, detail))
        .into_response_with(StatusCode::BAD_REQUEST)
}

/// JSON request body.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid_input("request body", rejection.body_text())),
        }
    }
}

/// Typed path parameters.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid_input("path", rejection.body_text())),
        }
    }
}
