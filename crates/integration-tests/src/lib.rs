//! Integration tests for ShoppyGlobe.
//!
//! The full storefront router (middleware stack included) runs in-process,
//! by default against the in-memory store so no database or running server
//! is needed. Tests marked `#[ignore = "Requires PostgreSQL"]` use
//! [`TestContext::postgres`] instead.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shoppy-globe-integration-tests
//!
//! # Including the PostgreSQL-backed tests
//! STOREFRONT_DATABASE_URL=postgres://... cargo test -p shoppy-globe-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `accounts` - Registration, login and bearer token rejection
//! - `cart_api` - Cart endpoints end to end
//! - `cart_concurrency` - Concurrent writes to one cart
//! - `products` - Catalog CRUD

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

use shoppy_globe_core::{Price, ProductId};
use shoppy_globe_storefront::config::StorefrontConfig;
use shoppy_globe_storefront::db::{self, MemoryStore, ProductCatalog, Storage};
use shoppy_globe_storefront::models::NewProduct;
use shoppy_globe_storefront::routes;
use shoppy_globe_storefront::services::auth::Claims;
use shoppy_globe_storefront::state::AppState;

/// Signing secret shared by the test server and [`TestContext::token_with_claims`].
pub const TEST_SECRET: &str = "q8Vt2LmZ5xR1cW9pK4sN7dJ3hB6yF0gA";

/// Password used by [`TestContext::signed_in_user`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// A response reduced to what the tests assert on.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// A registered user and their bearer token.
#[derive(Debug, Clone)]
pub struct SignedInUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// In-process storefront with direct access to its catalog.
#[derive(Clone)]
pub struct TestContext {
    pub app: Router,
    pub products: Arc<dyn ProductCatalog>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Storefront on a fresh in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(Storage::from_memory(&Arc::new(MemoryStore::default())), None)
    }

    /// Storefront on the database named by `STOREFRONT_DATABASE_URL`
    /// (or `DATABASE_URL`), with migrations applied.
    ///
    /// Data from earlier runs is left in place; use [`unique_email`] for accounts.
    ///
    /// # Panics
    ///
    /// Panics if the URL is unset, the database is unreachable, or a migration fails.
    pub async fn postgres() -> Self {
        dotenvy::dotenv().ok();
        let url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("STOREFRONT_DATABASE_URL must be set for PostgreSQL tests");
        let pool = db::create_pool(&SecretString::from(url))
            .await
            .expect("database reachable");
        sqlx::migrate!("../storefront/migrations")
            .run(&pool)
            .await
            .expect("migrations apply");

        Self::with_storage(Storage::postgres(&pool), Some(pool))
    }

    fn with_storage(storage: Storage, pool: Option<PgPool>) -> Self {
        let products = storage.products.clone();
        let config = StorefrontConfig::in_memory(SecretString::from(TEST_SECRET));
        let state = AppState::new(config, storage, pool);

        Self {
            app: routes::router(state),
            products,
        }
    }

    /// Send a request and collect the JSON body (`Value::Null` if empty or not JSON).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send_raw(request).await
    }

    /// Send a prebuilt request.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    pub async fn send_raw(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("readable body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Register `email` and log in, returning the bearer token.
    ///
    /// # Panics
    ///
    /// Panics if registration or login does not succeed.
    pub async fn signed_in_user(&self, email: &str) -> SignedInUser {
        let registered = self
            .send(
                Method::POST,
                "/register",
                None,
                Some(&json!({ "name": "Test User", "email": email, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);

        let login = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(&json!({ "email": email, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);

        SignedInUser {
            id: login.body["user"]["id"].as_i64().expect("numeric user id"),
            email: email.to_string(),
            token: login.body["token"]
                .as_str()
                .expect("token string")
                .to_string(),
        }
    }

    /// Insert a product directly into the catalog.
    ///
    /// # Panics
    ///
    /// Panics if `price` is not a valid non-negative decimal.
    pub async fn seed_product(&self, name: &str, price: &str, stock: u32) -> ProductId {
        let amount: Decimal = price.parse().expect("decimal price");
        let product = ProductCatalog::create(
            self.products.as_ref(),
            &NewProduct {
                name: name.to_string(),
                description: format!("{name} for testing"),
                price: Price::new(amount).expect("non-negative price"),
                stock,
            },
        )
        .await
        .expect("catalog accepts products");
        product.id
    }

    /// Sign arbitrary claims with `secret` (HS256).
    ///
    /// # Panics
    ///
    /// Panics if encoding fails.
    #[must_use]
    pub fn token_with_claims(claims: &Claims, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encodable claims")
    }
}

/// An email address no earlier test run has registered.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4())
}

/// The cart line for `product_id` in a cart response body.
#[must_use]
pub fn line_for(cart: &Value, product_id: ProductId) -> Option<&Value> {
    cart["items"]
        .as_array()?
        .iter()
        .find(|line| line["productId"].as_i64() == Some(i64::from(product_id.as_i32())))
}
