//! # Authentication Module
//!
//! Two layers sit in front of every handler except `/health`:
//!
//! 1. **API key** (`api_key_auth_middleware`): when `ServerConfig::api_key`
//!    is set, requests must carry `Authorization: Bearer <key>`.
//! 2. **Identity** (`CurrentActor`): the `X-SSBJ-User` header names a
//!    registered user; the extractor resolves it to the `Actor` passed to
//!    the core. Unknown or missing users get 401.
//!
//! The core trusts the resolved role as given, so the key guards who may
//! assert an identity at all.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderName, Request, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use ssbj_core::Actor;
use subtle::ConstantTimeEq;

use super::AppState;
use super::types::{ApiError, ErrorResponse};

/// Header naming the calling user.
pub const USER_HEADER: HeaderName = HeaderName::from_static("x-ssbj-user");

// =============================================================================
// API KEY AUTHENTICATION
// =============================================================================

/// Compare two keys in constant time.
///
/// Both sides are padded to the same length so `ct_eq` always runs over the
/// same number of bytes.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();

    let max_len = provided_bytes.len().max(expected_bytes.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);
    padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided_bytes.len() == expected_bytes.len()
}

fn unauthorized(message: &str) -> Response {
    ErrorResponse::new("unauthorized", message).into_response_with(StatusCode::UNAUTHORIZED)
}

/// API key authentication middleware.
///
/// Accepts both `Bearer <key>` and a raw `<key>` in the Authorization header.
/// Passes everything through when no key is configured.
pub async fn api_key_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_key.as_deref() else {
        return next.run(request).await;
    };

    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) => {
            let provided_key = header_value.strip_prefix("Bearer ").unwrap_or(header_value);
            if keys_match(provided_key, expected) {
                next.run(request).await
            } else {
                tracing::warn!(
                    event = "auth_failure",
                    reason = "invalid_api_key",
                    "Authentication failed: invalid API key"
                );
                unauthorized("Invalid API key")
            }
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                "Missing Authorization header"
            );
            unauthorized("Missing Authorization header")
        }
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// The actor making the request, resolved from `X-SSBJ-User`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(username) = parts
            .headers
            .get(&USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_user_header",
                "Missing X-SSBJ-User header"
            );
            return Err(unauthorized("Missing X-SSBJ-User header"));
        };

        let workspace = state.workspace.read().await;
        match workspace.actor_for(username) {
            Ok(actor) => Ok(Self(actor)),
            Err(ssbj_core::SsbjError::UserNotFound(_)) => {
                tracing::warn!(
                    event = "auth_failure",
                    reason = "unknown_user",
                    user = %username,
                    "Unknown user"
                );
                Err(unauthorized("Unknown user"))
            }
            Err(e) => Err(ApiError::from(e).into_response()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
