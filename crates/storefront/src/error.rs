//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error body is JSON of the form `{"message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::catalog::CatalogError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication or credential verification failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation was rejected or failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog operation was rejected or failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const INTERNAL_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable, please retry";

/// Status and client-safe message for a storage failure.
fn repository_response(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::Database(_) | RepositoryError::VersionConflict => (
            StatusCode::SERVICE_UNAVAILABLE,
            UNAVAILABLE_MESSAGE.to_string(),
        ),
        RepositoryError::DataCorruption(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_MESSAGE.to_string(),
        ),
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "Conflict".to_string()),
    }
}

impl AppError {
    /// Status code and the message shown to the client.
    ///
    /// Internal details never reach the client.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_response(err),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_MESSAGE.to_string(),
            ),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Auth(err) => match err {
                AuthError::MissingCredential
                | AuthError::InvalidCredential
                | AuthError::UnknownSubject
                | AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
                AuthError::UserAlreadyExists => (
                    StatusCode::CONFLICT,
                    "An account with this email already exists".to_string(),
                ),
                AuthError::WeakPassword(msg) | AuthError::MissingField(msg) => {
                    (StatusCode::BAD_REQUEST, msg.clone())
                }
                AuthError::InvalidEmail(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid email address".to_string())
                }
                AuthError::Repository(err) => repository_response(err),
                AuthError::PasswordHash | AuthError::TokenSigning(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                ),
            },
            Self::Cart(err) => match err {
                CartError::InvalidQuantity(_)
                | CartError::InvalidRequest(_)
                | CartError::InvalidId
                | CartError::InsufficientStock { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                CartError::ProductNotFound(_)
                | CartError::CartNotFound
                | CartError::ItemNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                CartError::Store(err) => repository_response(err),
            },
            Self::Catalog(err) => match err {
                CatalogError::Validation(_) | CatalogError::InvalidId => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                CatalogError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                CatalogError::Repository(err) => repository_response(err),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use http_body_util::BodyExt;
    use shoppy_globe_core::{CartItemId, ProductId, QuantityError};

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_credential_rejections_are_unauthorized() {
        for err in [
            AuthError::MissingCredential,
            AuthError::InvalidCredential,
            AuthError::UnknownSubject,
            AuthError::InvalidCredentials,
        ] {
            assert_eq!(get_status(err.into()), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_cart_error_status_codes() {
        assert_eq!(
            get_status(CartError::InvalidQuantity(QuantityError::NotPositive).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                CartError::InsufficientStock {
                    product_id: ProductId::new(1),
                    requested: 6,
                    available: 5,
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CartError::ProductNotFound(ProductId::new(1)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CartError::CartNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CartError::ItemNotFound(CartItemId::generate()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CartError::Store(RepositoryError::VersionConflict).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_catalog_and_auth_status_codes() {
        assert_eq!(
            get_status(CatalogError::InvalidId.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CatalogError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::WeakPassword("too short".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_body_is_json_message() {
        let response = AppError::Cart(CartError::CartNotFound).into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "message": "Cart not found" }));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let response = AppError::Internal("secret detail".to_string()).into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], INTERNAL_MESSAGE);
    }
}
