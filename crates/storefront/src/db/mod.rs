//! Storage for the storefront.
//!
//! # Backends
//!
//! - `PostgreSQL` (default): schema `shop` with tables
//!   - `users` - accounts with Argon2 password hashes
//!   - `products` - the catalog (price, stock)
//!   - `carts` - one JSONB cart document per user, with a `version` column
//! - In-process memory (`STOREFRONT_STORAGE=memory`), for local runs and tests.
//!
//! Both backends implement the same traits, so services never know which one
//! they are talking to.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shoppy-globe-cli -- migrate
//! ```

pub mod carts;
pub mod memory;
pub mod products;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shoppy_globe_core::{Email, ProductId, UserId};

pub use carts::CartRepository;
pub use memory::MemoryStore;
pub use products::ProductRepository;
pub use users::UserRepository;

use crate::models::{Cart, NewProduct, NewUser, Product, ProductUpdate, StoredCart, User};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A conditional write lost a race: the document changed since it was loaded.
    #[error("document was modified concurrently")]
    VersionConflict,
}

/// Account lookups and creation.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Get a user and their password hash by email.
    async fn find_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Create a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;
}

/// Read-only view of product price and stock.
///
/// This is all the cart needs from the catalog; every call reads the
/// current value, nothing is cached or reserved.
#[async_trait]
pub trait StockOracle: Send + Sync {
    /// Look up one product.
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Look up several products. Missing IDs are simply absent from the result.
    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;
}

/// Full catalog access.
#[async_trait]
pub trait ProductCatalog: StockOracle {
    /// All products, oldest first.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// Apply a partial update. `None` if the product does not exist.
    async fn update(
        &self,
        id: ProductId,
        changes: &ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Delete a product. `false` if it did not exist.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Keyed container of cart documents, one per user.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load a user's cart, `None` if they never had one.
    async fn load(&self, user_id: UserId) -> Result<Option<StoredCart>, RepositoryError>;

    /// Write `cart` if its stored version still equals `expected_version`
    /// (`None` meaning "no cart stored yet"). Returns the new version.
    ///
    /// Returns `RepositoryError::VersionConflict` if another write got there first.
    async fn save(&self, cart: &Cart, expected_version: Option<i64>)
    -> Result<i64, RepositoryError>;
}

/// The set of stores a running storefront uses.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductCatalog>,
    pub stock: Arc<dyn StockOracle>,
    pub carts: Arc<dyn CartStore>,
}

impl Storage {
    /// Stores backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            products: Arc::new(ProductRepository::new(pool.clone())),
            stock: Arc::new(ProductRepository::new(pool.clone())),
            carts: Arc::new(CartRepository::new(pool.clone())),
        }
    }

    /// Stores backed by a single shared in-process [`MemoryStore`].
    #[must_use]
    pub fn memory() -> Self {
        Self::from_memory(&Arc::new(MemoryStore::default()))
    }

    /// Stores backed by an existing [`MemoryStore`], so callers can keep a handle on it.
    #[must_use]
    pub fn from_memory(store: &Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            products: store.clone(),
            stock: store.clone(),
            carts: store.clone(),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-violation into `RepositoryError::Conflict`, anything else into `Database`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
