//! Seed the catalog with products from a YAML file.
//!
//! Every entry goes through the same validation as `POST /products`, and the
//! whole file is checked before anything is written to `PostgreSQL`. The
//! inserts share one transaction, so a run adds every product or none.
//!
//! ```yaml
//! products:
//!   - name: Desk Lamp
//!     description: Adjustable LED lamp
//!     price: "24.99"
//!     stock: 12
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use shoppy_globe_storefront::db::{self, ProductRepository};
use shoppy_globe_storefront::models::NewProduct;
use shoppy_globe_storefront::services::catalog::CreateProductRequest;

use super::migrate;

#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<CreateProductRequest>,
}

/// Validate every entry, or return one message per rejected product.
fn validate(products: &[CreateProductRequest]) -> Result<Vec<NewProduct>, Vec<String>> {
    let mut valid = Vec::with_capacity(products.len());
    let mut errors = Vec::new();

    for (index, product) in products.iter().enumerate() {
        match product.validate() {
            Ok(new) => valid.push(new),
            Err(e) => {
                let name = product.name.as_deref().unwrap_or("<unnamed>");
                errors.push(format!("products[{index}] ({name}): {e}"));
            }
        }
    }

    if errors.is_empty() { Ok(valid) } else { Err(errors) }
}

/// Seed products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML file
/// * `dry_run` - If true, validate only
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry fails
/// validation, or database operations fail.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(products = seed.products.len(), "Parsed seed file");

    let products = match validate(&seed.products) {
        Ok(products) => products,
        Err(errors) => {
            error!("Seed file validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    if dry_run {
        info!("Dry run: seed file is valid, nothing written");
        return Ok(());
    }

    let pool = db::create_pool(&migrate::database_url()?).await?;
    info!("Connected to database");

    let inserted = ProductRepository::new(pool).create_all(&products).await?;

    info!(inserted = inserted.len(), "Seeding complete");
    Ok(())
}
