//! Cart error types.

use thiserror::Error;

use shoppy_globe_core::{CartItemId, ProductId, QuantityError};

use crate::db::RepositoryError;

/// Errors from cart operations.
///
/// Every variant except `Store` is a rejection of the request itself; the
/// stored cart is left untouched when one is returned.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is zero, negative or out of range.
    #[error("{0}")]
    InvalidQuantity(#[from] QuantityError),

    /// Request body is missing a field or is not valid JSON.
    #[error("{0}")]
    InvalidRequest(String),

    /// A path segment is not a valid cart item ID.
    #[error("Invalid cart item ID format")]
    InvalidId,

    #[error("Product not found")]
    ProductNotFound(ProductId),

    /// The user has no cart yet.
    #[error("Cart not found")]
    CartNotFound,

    #[error("Cart item not found")]
    ItemNotFound(CartItemId),

    /// The resulting line quantity would exceed current stock.
    #[error("Not enough stock available")]
    InsufficientStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// The cart store failed, or kept losing a concurrent write.
    #[error("cart store error: {0}")]
    Store(#[from] RepositoryError),
}
