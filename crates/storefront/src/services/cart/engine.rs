//! Cart reconciliation.
//!
//! Pure transitions from one cart to the next. Nothing here does I/O: the
//! caller supplies the current stock of the product involved (`None` when the
//! product does not exist) and persists whatever cart comes back.
//!
//! A rejected transition returns an error and no cart, so the caller has
//! nothing to save.

use shoppy_globe_core::{CartItemId, ProductId, Quantity};

use super::CartError;
use crate::models::{Cart, CartItem};

/// Add `requested` units of `product_id`, merging into an existing line.
///
/// Checks, in order: quantity is positive, product exists, resulting line
/// quantity is at most `stock`.
///
/// # Errors
///
/// `InvalidQuantity`, `ProductNotFound` or `InsufficientStock`.
pub fn add_item(
    cart: &Cart,
    product_id: ProductId,
    requested: i64,
    stock: Option<u32>,
) -> Result<Cart, CartError> {
    let requested = Quantity::new(requested)?;
    let available = stock.ok_or(CartError::ProductNotFound(product_id))?;

    let existing = cart.item_for_product(product_id);
    let total = match existing {
        Some(item) => item.quantity.checked_add(requested),
        None => Some(requested),
    };

    let Some(total) = total.filter(|total| total.get() <= available) else {
        let already = existing.map_or(0, |item| u64::from(item.quantity.get()));
        return Err(CartError::InsufficientStock {
            product_id,
            requested: already + u64::from(requested.get()),
            available,
        });
    };

    let mut items = cart.items().to_vec();
    match items.iter_mut().find(|item| item.product_id == product_id) {
        Some(item) => item.quantity = total,
        None => items.push(CartItem::new(product_id, total)),
    }

    Ok(Cart::from_items(cart.user_id(), items))
}

/// Replace the quantity of line `item_id`. Zero is rejected, not treated as removal.
///
/// `stock` is the current stock of the line's product.
///
/// # Errors
///
/// `InvalidQuantity`, `CartNotFound`, `ItemNotFound`, `ProductNotFound` or
/// `InsufficientStock`, checked in that order.
pub fn set_item_quantity(
    cart: Option<&Cart>,
    item_id: CartItemId,
    new_quantity: i64,
    stock: Option<u32>,
) -> Result<Cart, CartError> {
    let quantity = Quantity::new(new_quantity)?;
    let cart = cart.ok_or(CartError::CartNotFound)?;
    let item = cart.item(item_id).ok_or(CartError::ItemNotFound(item_id))?;
    let available = stock.ok_or(CartError::ProductNotFound(item.product_id))?;

    if quantity.get() > available {
        return Err(CartError::InsufficientStock {
            product_id: item.product_id,
            requested: u64::from(quantity.get()),
            available,
        });
    }

    let items = cart
        .items()
        .iter()
        .map(|line| {
            if line.id == item_id {
                CartItem {
                    quantity,
                    ..line.clone()
                }
            } else {
                line.clone()
            }
        })
        .collect();

    Ok(Cart::from_items(cart.user_id(), items))
}

/// Drop line `item_id`, keeping the others in order.
///
/// # Errors
///
/// `CartNotFound` or `ItemNotFound`.
pub fn remove_item(cart: Option<&Cart>, item_id: CartItemId) -> Result<Cart, CartError> {
    let cart = cart.ok_or(CartError::CartNotFound)?;
    if cart.item(item_id).is_none() {
        return Err(CartError::ItemNotFound(item_id));
    }

    let items = cart
        .items()
        .iter()
        .filter(|line| line.id != item_id)
        .cloned()
        .collect();

    Ok(Cart::from_items(cart.user_id(), items))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shoppy_globe_core::{QuantityError, UserId};

    use super::*;

    fn pid(id: i32) -> ProductId {
        ProductId::new(id)
    }

    fn empty() -> Cart {
        Cart::empty(UserId::new(1))
    }

    #[test]
    fn test_add_merges_same_product() {
        let cart = add_item(&empty(), pid(1), 2, Some(10)).unwrap();
        let cart = add_item(&cart, pid(1), 3, Some(10)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity.get(), 5);
    }

    #[test]
    fn test_add_keeps_first_occurrence_order() {
        let cart = add_item(&empty(), pid(1), 1, Some(10)).unwrap();
        let cart = add_item(&cart, pid(2), 1, Some(10)).unwrap();
        let first_line = cart.items()[0].id;
        let cart = add_item(&cart, pid(1), 1, Some(10)).unwrap();

        assert_eq!(cart.product_ids(), vec![pid(1), pid(2)]);
        assert_eq!(cart.items()[0].id, first_line);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        for qty in [0, -1] {
            assert!(matches!(
                add_item(&empty(), pid(1), qty, Some(10)),
                Err(CartError::InvalidQuantity(QuantityError::NotPositive))
            ));
        }
    }

    #[test]
    fn test_add_checks_quantity_before_product() {
        assert!(matches!(
            add_item(&empty(), pid(1), 0, None),
            Err(CartError::InvalidQuantity(_))
        ));
        assert!(matches!(
            add_item(&empty(), pid(1), 1, None),
            Err(CartError::ProductNotFound(id)) if id == pid(1)
        ));
    }

    #[test]
    fn test_add_exact_stock_boundary() {
        let cart = add_item(&empty(), pid(1), 5, Some(5)).unwrap();
        assert_eq!(cart.total_quantity(), 5);

        let err = add_item(&cart, pid(1), 1, Some(5)).unwrap_err();
        assert!(matches!(
            err,
            CartError::InsufficientStock {
                requested: 6,
                available: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_add_overflow_is_insufficient_stock() {
        let cart = add_item(&empty(), pid(1), i64::from(Quantity::MAX), Some(u32::MAX)).unwrap();
        assert!(matches!(
            add_item(&cart, pid(1), 1, Some(u32::MAX)),
            Err(CartError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_set_quantity_order_of_checks() {
        let missing = CartItemId::generate();
        // Quantity is checked before the cart is looked at.
        assert!(matches!(
            set_item_quantity(None, missing, 0, None),
            Err(CartError::InvalidQuantity(_))
        ));
        assert!(matches!(
            set_item_quantity(None, missing, 1, None),
            Err(CartError::CartNotFound)
        ));

        let cart = add_item(&empty(), pid(1), 1, Some(5)).unwrap();
        assert!(matches!(
            set_item_quantity(Some(&cart), missing, -2, None),
            Err(CartError::InvalidQuantity(_))
        ));
        assert!(matches!(
            set_item_quantity(Some(&cart), missing, 1, None),
            Err(CartError::ItemNotFound(id)) if id == missing
        ));

        let line = cart.items()[0].id;
        assert!(matches!(
            set_item_quantity(Some(&cart), line, 0, Some(5)),
            Err(CartError::InvalidQuantity(_))
        ));
        assert!(matches!(
            set_item_quantity(Some(&cart), line, 2, None),
            Err(CartError::ProductNotFound(_))
        ));
        assert!(matches!(
            set_item_quantity(Some(&cart), line, 6, Some(5)),
            Err(CartError::InsufficientStock { requested: 6, .. })
        ));
    }

    #[test]
    fn test_set_quantity_replaces_in_place() {
        let cart = add_item(&empty(), pid(1), 1, Some(9)).unwrap();
        let cart = add_item(&cart, pid(2), 1, Some(9)).unwrap();
        let line = cart.items()[0].id;

        let cart = set_item_quantity(Some(&cart), line, 9, Some(9)).unwrap();
        assert_eq!(cart.items()[0].id, line);
        assert_eq!(cart.items()[0].quantity.get(), 9);
        assert_eq!(cart.items()[1].quantity.get(), 1);
    }

    #[test]
    fn test_remove_preserves_order_and_input() {
        let cart = add_item(&empty(), pid(1), 1, Some(9)).unwrap();
        let cart = add_item(&cart, pid(2), 1, Some(9)).unwrap();
        let cart = add_item(&cart, pid(3), 1, Some(9)).unwrap();
        let middle = cart.items()[1].id;

        let next = remove_item(Some(&cart), middle).unwrap();
        assert_eq!(next.product_ids(), vec![pid(1), pid(3)]);
        assert_eq!(cart.items().len(), 3);
    }

    #[test]
    fn test_remove_missing() {
        let id = CartItemId::generate();
        assert!(matches!(
            remove_item(None, id),
            Err(CartError::CartNotFound)
        ));
        let cart = add_item(&empty(), pid(1), 1, Some(9)).unwrap();
        assert!(matches!(
            remove_item(Some(&cart), id),
            Err(CartError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_stock_five_walkthrough() {
        let cart = add_item(&empty(), pid(7), 3, Some(5)).unwrap();
        assert_eq!(cart.total_quantity(), 3);

        assert!(add_item(&cart, pid(7), 3, Some(5)).is_err());

        let line = cart.items()[0].id;
        let cart = set_item_quantity(Some(&cart), line, 5, Some(5)).unwrap();
        assert_eq!(cart.total_quantity(), 5);

        assert!(set_item_quantity(Some(&cart), line, 6, Some(5)).is_err());

        let cart = remove_item(Some(&cart), line).unwrap();
        assert!(cart.is_empty());
    }
}
