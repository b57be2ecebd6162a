//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                     - Banner
//! GET    /health               - Liveness
//! GET    /health/ready         - Readiness (database reachable)
//!
//! # Accounts (rate limited)
//! POST   /register             - Create an account
//! POST   /login                - Exchange email/password for a bearer token
//!
//! # Products
//! GET    /products             - Product listing
//! GET    /products/{id}        - Product detail
//! POST   /products             - Create (requires auth)
//! PUT    /products/{id}        - Partial update (requires auth)
//! DELETE /products/{id}        - Delete (requires auth)
//!
//! # Cart (requires auth)
//! GET    /cart                 - Current cart
//! POST   /cart                 - Add {productId, quantity}
//! PUT    /cart/{itemId}        - Set {quantity}
//! DELETE /cart/{itemId}        - Remove a line
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod products;

use axum::{
    Json, Router,
    extract::{Request, rejection::JsonRejection},
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn,
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Unwrap a JSON body, turning any rejection into a 400 with a JSON message.
///
/// Clients get a fixed message per rejection kind; the parser detail is
/// only logged.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(detail = %rejection.body_text(), "Rejected JSON body");
        let message = match rejection {
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::JsonDataError(_) => "Request body has fields of the wrong type",
            JsonRejection::MissingJsonContentType(_) => {
                "Expected request with `Content-Type: application/json`"
            }
            _ => "Invalid request body",
        };
        AppError::BadRequest(message.to_string())
    })
}

/// Create the account routes router.
pub fn account_routes(config: &StorefrontConfig) -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    if config.rate_limit {
        router.layer(auth_rate_limiter())
    } else {
        router
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/{item_id}", put(cart::update).delete(cart::remove))
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(health::banner))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(account_routes(config))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route".to_string())
}

fn cors_layer(config: &StorefrontConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    match config
        .cors_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
    {
        Ok(Some(origin)) => layer.allow_origin(origin),
        Ok(None) => layer.allow_origin(Any),
        Err(_) => {
            tracing::warn!(
                "STOREFRONT_CORS_ORIGIN is not a valid header value, cross-origin requests disabled"
            );
            layer
        }
    }
}

/// Build the complete application: routes, state and middleware stack.
///
/// Used by the binary and by the integration tests.
pub fn router(state: AppState) -> Router {
    let config = state.config().clone();

    Router::new()
        .merge(routes(&config))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&config))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::db::Storage;

    fn app() -> Router {
        let config =
            StorefrontConfig::in_memory(SecretString::from("k3J9vQ2mX7pL4wR8tY1zN6bH5cF0dG2s"));
        router(AppState::new(config, Storage::memory(), None))
    }

    #[tokio::test]
    async fn test_banner_and_health() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ShoppyGlobe Backend API is running");

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_body_rejections_use_fixed_messages() {
        let cases = [
            (
                "application/json",
                r#"{"email": 42, "password": "x"}"#,
                "Request body has fields of the wrong type",
            ),
            (
                "application/json",
                r#"{"email": "#,
                "Request body is not valid JSON",
            ),
            (
                "text/plain",
                r#"{"email": "a@b.co", "password": "x"}"#,
                "Expected request with `Content-Type: application/json`",
            ),
        ];

        for (content_type, body, message) in cases {
            let response = app()
                .oneshot(
                    Request::builder()
                        .method(Method::POST)
                        .uri("/login")
                        .header(CONTENT_TYPE, content_type)
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["message"], message);
        }
    }

    #[tokio::test]
    async fn test_request_id_and_security_headers() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers["x-request-id"], "abc-123");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["cache-control"], "no-store, max-age=0");
    }
}
