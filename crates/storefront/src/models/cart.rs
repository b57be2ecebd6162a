//! Cart domain types.
//!
//! A [`Cart`] is an ordered list of [`CartItem`] lines owned by one user,
//! with at most one line per product. Carts are values: the reconciliation
//! engine never edits one in place, it returns the next cart.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use shoppy_globe_core::{CartItemId, Price, ProductId, Quantity, UserId};

use super::product::Product;

/// One product-quantity pairing inside a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Stable line identifier, distinct from the product ID.
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl CartItem {
    /// Start a new line for `product_id`.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            id: CartItemId::generate(),
            product_id,
            quantity,
        }
    }
}

/// A user's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    user_id: UserId,
    items: Vec<CartItem>,
}

impl Cart {
    /// The cart of a user who has never added anything.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    /// Rebuild a cart from persisted lines.
    ///
    /// Lines are taken as stored; the store never writes a cart the engine
    /// did not produce.
    #[must_use]
    pub const fn from_items(user_id: UserId, items: Vec<CartItem>) -> Self {
        Self { user_id, items }
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by its line ID.
    #[must_use]
    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Find the line holding `product_id`, if any.
    #[must_use]
    pub fn item_for_product(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Product IDs referenced by this cart, in line order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|item| item.product_id).collect()
    }
}

/// A cart as loaded from a store, with the version observed at load time.
///
/// The version is handed back on save so the store can refuse a write that
/// raced with another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCart {
    pub cart: Cart,
    pub version: i64,
}

/// A cart line with its product resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub id: CartItemId,
    pub product_id: ProductId,
    /// `None` when the product has since been removed from the catalog.
    pub product: Option<Product>,
    pub quantity: Quantity,
    pub line_total: Option<Price>,
}

/// Cart projection returned by every cart endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user_id: UserId,
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    pub subtotal: Price,
}

impl CartView {
    /// Project `cart`, attaching whichever of its products are in `products`.
    #[must_use]
    pub fn project(cart: &Cart, products: Vec<Product>) -> Self {
        let mut by_id: HashMap<ProductId, Product> =
            products.into_iter().map(|p| (p.id, p)).collect();

        let items: Vec<CartLineView> = cart
            .items()
            .iter()
            .map(|item| {
                let product = by_id.remove(&item.product_id);
                let line_total = product
                    .as_ref()
                    .map(|p| p.price.times(item.quantity.get()));
                CartLineView {
                    id: item.id,
                    product_id: item.product_id,
                    product,
                    quantity: item.quantity,
                    line_total,
                }
            })
            .collect();

        let subtotal = items
            .iter()
            .filter_map(|line| line.line_total)
            .fold(Price::ZERO, |acc, total| acc.plus(total));

        Self {
            user_id: cart.user_id(),
            item_count: cart.total_quantity(),
            items,
            subtotal,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: "test".to_string(),
            price: Price::new(Decimal::new(cents, 2)).unwrap(),
            stock: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_cart_projects_to_empty_view() {
        let view = CartView::project(&Cart::empty(UserId::new(1)), Vec::new());
        assert!(view.items.is_empty());
        assert_eq!(view.item_count, 0);
        assert_eq!(view.subtotal, Price::ZERO);
    }

    #[test]
    fn test_projection_totals_and_missing_products() {
        let cart = Cart::from_items(
            UserId::new(1),
            vec![
                CartItem::new(ProductId::new(1), Quantity::new(2).unwrap()),
                CartItem::new(ProductId::new(2), Quantity::new(1).unwrap()),
            ],
        );

        // Product 2 was deleted from the catalog.
        let view = CartView::project(&cart, vec![product(1, 250)]);

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal.amount(), Decimal::new(500, 2));
        assert!(view.items[1].product.is_none());
        assert!(view.items[1].line_total.is_none());
    }

    #[test]
    fn test_line_json_shape() {
        let item = CartItem::new(ProductId::new(9), Quantity::new(4).unwrap());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productId"], 9);
        assert_eq!(json["quantity"], 4);
        assert!(json["id"].is_string());
    }
}
