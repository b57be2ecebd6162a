//! Cart document repository for `PostgreSQL`.
//!
//! Each user has at most one row in `shop.carts`; its `items` column holds
//! the ordered line array as JSONB. Writes are compare-and-swap on the
//! `version` column, so two requests that loaded the same cart cannot both
//! commit.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use shoppy_globe_core::UserId;

use super::{CartStore, RepositoryError};
use crate::models::{Cart, CartItem, StoredCart};

#[derive(FromRow)]
struct CartRow {
    user_id: i32,
    items: Json<Vec<CartItem>>,
    version: i64,
}

/// Repository for cart documents.
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for CartRepository {
    async fn load(&self, user_id: UserId) -> Result<Option<StoredCart>, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(
            r"
            SELECT user_id, items, version
            FROM shop.carts
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::ColumnDecode { source, .. } => {
                RepositoryError::DataCorruption(format!("invalid cart document: {source}"))
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(row.map(|r| StoredCart {
            cart: Cart::from_items(UserId::new(r.user_id), r.items.0),
            version: r.version,
        }))
    }

    async fn save(
        &self,
        cart: &Cart,
        expected_version: Option<i64>,
    ) -> Result<i64, RepositoryError> {
        let items = Json(cart.items());

        let new_version: Option<i64> = match expected_version {
            None => {
                sqlx::query_scalar(
                    r"
                    INSERT INTO shop.carts (user_id, items, version)
                    VALUES ($1, $2, 1)
                    ON CONFLICT (user_id) DO NOTHING
                    RETURNING version
                    ",
                )
                .bind(cart.user_id())
                .bind(items)
                .fetch_optional(&self.pool)
                .await?
            }
            Some(version) => {
                sqlx::query_scalar(
                    r"
                    UPDATE shop.carts
                    SET items = $2, version = version + 1, updated_at = now()
                    WHERE user_id = $1 AND version = $3
                    RETURNING version
                    ",
                )
                .bind(cart.user_id())
                .bind(items)
                .bind(version)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        new_version.ok_or(RepositoryError::VersionConflict)
    }
}
