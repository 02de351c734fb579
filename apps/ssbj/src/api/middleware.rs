//! # Middleware Module
//!
//! Rate limiting for the SSBJ HTTP API.
//!
//! The budget comes from `ServerConfig::rate_limit` (file or
//! `SSBJ_RATE_LIMIT`); 0 disables the limiter entirely.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::types::ErrorResponse;

/// Default rate limit: 100 requests per second.
const DEFAULT_RPS: NonZeroU32 = match NonZeroU32::new(crate::config::DEFAULT_RATE_LIMIT) {
    Some(rps) => rps,
    None => NonZeroU32::MIN,
};

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Global rate limiter type alias.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a new global rate limiter allowing `requests_per_second`.
///
/// A zero budget falls back to the default.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(DEFAULT_RPS);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Rejects requests with 429 once the global budget is spent.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match limiter.check() {
        Ok(()) => next.run(request).await,
        Err(_) => {
            tracing::warn!(
                event = "rate_limited",
                path = %request.uri().path(),
                "Rate limit exceeded"
            );
            ErrorResponse::new("rate_limited", "Too many requests")
                .into_response_with(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
