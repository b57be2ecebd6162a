//! Authentication extractor.
//!
//! Cart and catalog-write handlers take a [`RequireAuth`] argument; axum runs
//! it before the handler body, so a request with a bad credential never
//! reaches a service or store.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::Identity;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with 401 and `{"message": ...}` when the `Authorization` header
/// is missing, malformed, expired, or names a user that no longer exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(identity): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Identity);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let identity = state.verifier().verify(credential).await?;

        Span::current().record("user_id", identity.id.as_i32());
        set_sentry_user(&identity.id, Some(identity.email.as_str()));

        Ok(Self(identity))
    }
}
