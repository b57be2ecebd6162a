//! Product catalog service.
//!
//! Validates product writes before they reach the [`ProductCatalog`]. The
//! cart never goes through here; it only reads stock via
//! [`StockOracle`](crate::db::StockOracle).

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use shoppy_globe_core::{Price, ProductId, Quantity};

use crate::db::{ProductCatalog, RepositoryError};
use crate::models::{NewProduct, Product, ProductUpdate};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A field failed validation.
    #[error("{0}")]
    Validation(String),

    /// Path segment is not a positive integer.
    #[error("Invalid product ID format")]
    InvalidId,

    #[error("Product not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Body of `POST /products`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
}

impl CreateProductRequest {
    /// Check every field, producing the product to insert.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for a missing or invalid field.
    pub fn validate(&self) -> Result<NewProduct, CatalogError> {
        let (Some(name), Some(description), Some(price), Some(stock)) =
            (&self.name, &self.description, self.price, self.stock)
        else {
            return Err(CatalogError::Validation(
                "name, price, description and stock are required".to_string(),
            ));
        };

        Ok(NewProduct {
            name: non_blank("name", name)?,
            description: non_blank("description", description)?,
            price: validate_price(price)?,
            stock: validate_stock(stock)?,
        })
    }
}

/// Body of `PUT /products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
}

impl UpdateProductRequest {
    fn validate(&self) -> Result<ProductUpdate, CatalogError> {
        Ok(ProductUpdate {
            name: self
                .name
                .as_deref()
                .map(|n| non_blank("name", n))
                .transpose()?,
            description: self
                .description
                .as_deref()
                .map(|d| non_blank("description", d))
                .transpose()?,
            price: self.price.map(validate_price).transpose()?,
            stock: self.stock.map(validate_stock).transpose()?,
        })
    }
}

fn non_blank(field: &str, value: &str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_owned())
}

fn validate_price(amount: Decimal) -> Result<Price, CatalogError> {
    Price::new(amount).map_err(|e| CatalogError::Validation(e.to_string()))
}

fn validate_stock(stock: i64) -> Result<u32, CatalogError> {
    if stock < 0 {
        return Err(CatalogError::Validation(
            "Stock cannot be negative".to_string(),
        ));
    }
    u32::try_from(stock)
        .ok()
        .filter(|s| *s <= Quantity::MAX)
        .ok_or_else(|| {
            CatalogError::Validation(format!("Stock must be at most {}", Quantity::MAX))
        })
}

/// Parse a product ID path segment.
///
/// # Errors
///
/// Returns `CatalogError::InvalidId` unless `raw` is a positive integer.
pub fn parse_product_id(raw: &str) -> Result<ProductId, CatalogError> {
    raw.parse().map_err(|_| CatalogError::InvalidId)
}

/// Product CRUD.
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductCatalog>,
}

impl CatalogService {
    #[must_use]
    pub fn new(products: Arc<dyn ProductCatalog>) -> Self {
        Self { products }
    }

    /// All products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` on storage failure.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no such product exists.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products.find(id).await?.ok_or(CatalogError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for a missing or invalid field.
    pub async fn create(&self, request: &CreateProductRequest) -> Result<Product, CatalogError> {
        let new = request.validate()?;
        let product = self.products.create(&new).await?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for an invalid field or
    /// `CatalogError::NotFound` if no such product exists.
    pub async fn update(
        &self,
        id: ProductId,
        request: &UpdateProductRequest,
    ) -> Result<Product, CatalogError> {
        let changes = request.validate()?;
        let product = self
            .products
            .update(id, &changes)
            .await?
            .ok_or(CatalogError::NotFound)?;
        info!(product_id = %id, "Product updated");
        Ok(product)
    }

    /// Delete a product. Cart lines referencing it stay in place.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no such product exists.
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        if !self.products.delete(id).await? {
            return Err(CatalogError::NotFound);
        }
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
