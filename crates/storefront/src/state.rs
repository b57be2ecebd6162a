//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::Storage;
use crate::services::{AuthService, CartService, CatalogService, IdentityVerifier, TokenIssuer};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like storage and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: Option<PgPool>,
    verifier: IdentityVerifier,
    auth: AuthService,
    carts: CartService,
    catalog: CatalogService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `storage` - Stores for users, products and carts
    /// * `pool` - `PostgreSQL` pool, when the stores use one (for readiness checks)
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: Storage, pool: Option<PgPool>) -> Self {
        let secret = config.auth.jwt_secret.expose_secret().as_bytes();
        let tokens = TokenIssuer::new(secret, config.auth.token_ttl);
        let verifier = IdentityVerifier::new(secret, storage.users.clone());

        Self {
            inner: Arc::new(AppStateInner {
                verifier,
                auth: AuthService::new(storage.users, tokens),
                carts: CartService::new(storage.carts, storage.stock),
                catalog: CatalogService::new(storage.products),
                config,
                pool,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The database pool, `None` on the memory backend.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn verifier(&self) -> &IdentityVerifier {
        &self.inner.verifier
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }
}
