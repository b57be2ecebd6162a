//! Product repository for `PostgreSQL`.
//!
//! Implements both the full [`ProductCatalog`] and the read-only
//! [`StockOracle`] the cart consults.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use shoppy_globe_core::{Price, ProductId};

use super::{ProductCatalog, RepositoryError, StockOracle};
use crate::models::{NewProduct, Product, ProductUpdate};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, created_at, updated_at";

#[derive(FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;
        let stock = u32::try_from(row.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!("product {}: negative stock", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price,
            stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn stock_to_db(stock: u32) -> Result<i32, RepositoryError> {
    i32::try_from(stock)
        .map_err(|_| RepositoryError::Conflict(format!("stock {stock} exceeds column range")))
}

/// Repository for catalog database operations.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert several products in one transaction: either all are created or none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is committed.
    pub async fn create_all(
        &self,
        products: &[NewProduct],
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(products.len());

        for product in products {
            let row: ProductRow = sqlx::query_as(&format!(
                r"
                INSERT INTO shop.products (name, description, price, stock)
                VALUES ($1, $2, $3, $4)
                RETURNING {PRODUCT_COLUMNS}
                "
            ))
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.amount())
            .bind(stock_to_db(product.stock)?)
            .fetch_one(&mut *tx)
            .await?;

            created.push(Product::try_from(row)?);
        }

        tx.commit().await?;
        Ok(created)
    }
}

#[async_trait]
impl StockOracle for ProductRepository {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = ANY($1)"
        ))
        .bind(&raw)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }
}

#[async_trait]
impl ProductCatalog for ProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r"
            INSERT INTO shop.products (name, description, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(stock_to_db(product.stock)?)
        .fetch_one(&self.pool)
        .await?;

        Product::try_from(row)
    }

    async fn update(
        &self,
        id: ProductId,
        changes: &ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        let stock = changes.stock.map(stock_to_db).transpose()?;

        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE shop.products
            SET name        = COALESCE($2, name),
                description = COALESCE($3, description),
                price       = COALESCE($4, price),
                stock       = COALESCE($5, stock),
                updated_at  = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price.map(|p| p.amount()))
        .bind(stock)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::db::create_pool;

    async fn pool() -> PgPool {
        dotenvy::dotenv().ok();
        let url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("STOREFRONT_DATABASE_URL must be set");
        let pool = create_pool(&SecretString::from(url)).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn product(name: &str, stock: u32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "Batch insert".to_string(),
            price: Price::new(Decimal::new(250, 2)).unwrap(),
            stock,
        }
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_create_all_is_all_or_nothing() {
        let repo = ProductRepository::new(pool().await);
        let name = format!("batch-{}", uuid::Uuid::new_v4());

        // Second row cannot be stored, so the first must not be either.
        let result = repo
            .create_all(&[product(&name, 1), product(&name, u32::MAX)])
            .await;
        assert!(result.is_err());
        assert!(!repo.list().await.unwrap().iter().any(|p| p.name == name));

        let created = repo
            .create_all(&[product(&name, 1), product(&name, 2)])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        let stored = repo.list().await.unwrap();
        assert_eq!(stored.iter().filter(|p| p.name == name).count(), 2);
    }
}
