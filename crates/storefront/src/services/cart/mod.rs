//! Cart service.
//!
//! Every mutation is load, reconcile, save: the stored cart is loaded with
//! its version, [`engine`] computes the next cart against the product's
//! current stock, and the result is written back only if nobody else wrote
//! in between. A lost race reruns the whole cycle once; a second loss is
//! reported as a store error.
//!
//! Stock is read, never reserved or decremented.

pub mod engine;
mod error;

pub use error::CartError;

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use shoppy_globe_core::{CartItemId, ProductId, UserId};

use crate::db::{CartStore, RepositoryError, StockOracle};
use crate::models::{Cart, CartView, Identity, StoredCart};

/// How many times a conflicting write is retried before giving up.
const MAX_CONFLICT_RETRIES: u32 = 1;

/// Body of `POST /cart`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i64>,
}

impl AddItemRequest {
    fn validate(&self) -> Result<(ProductId, i64), CartError> {
        match (self.product_id, self.quantity) {
            (Some(product_id), Some(quantity)) => Ok((product_id, quantity)),
            _ => Err(CartError::InvalidRequest(
                "productId and quantity are required".to_string(),
            )),
        }
    }
}

/// Body of `PUT /cart/{itemId}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: Option<i64>,
}

impl SetQuantityRequest {
    fn validate(&self) -> Result<i64, CartError> {
        self.quantity.ok_or_else(|| {
            CartError::InvalidRequest("Quantity is required to update cart item".to_string())
        })
    }
}

/// Cart operations for authenticated users.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    stock: Arc<dyn StockOracle>,
}

impl CartService {
    #[must_use]
    pub fn new(carts: Arc<dyn CartStore>, stock: Arc<dyn StockOracle>) -> Self {
        Self { carts, stock }
    }

    /// The user's cart; empty if they never added anything.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the cart or catalog lookup fails.
    pub async fn view(&self, identity: &Identity) -> Result<CartView, CartError> {
        let cart = self
            .carts
            .load(identity.id)
            .await?
            .map_or_else(|| Cart::empty(identity.id), |stored| stored.cart);

        self.project(&cart).await
    }

    /// Add units of a product, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns a rejection from [`engine::add_item`], `InvalidRequest` for a
    /// missing field, or `Store` on storage failure.
    pub async fn add_item(
        &self,
        identity: &Identity,
        request: &AddItemRequest,
    ) -> Result<CartView, CartError> {
        let (product_id, quantity) = request.validate()?;
        let user_id = identity.id;

        let cart = self
            .commit(user_id, |stored| async move {
                let stock = self.current_stock(product_id).await?;
                let current = stored.map_or_else(|| Cart::empty(user_id), |s| s.cart);
                engine::add_item(&current, product_id, quantity, stock)
            })
            .await?;

        info!(%user_id, %product_id, quantity, "Added item to cart");
        self.project(&cart).await
    }

    /// Set the quantity of one line.
    ///
    /// # Errors
    ///
    /// Returns a rejection from [`engine::set_item_quantity`],
    /// `InvalidRequest` for a missing quantity, or `Store` on storage failure.
    pub async fn set_quantity(
        &self,
        identity: &Identity,
        item_id: CartItemId,
        request: &SetQuantityRequest,
    ) -> Result<CartView, CartError> {
        let quantity = request.validate()?;
        let user_id = identity.id;

        let cart = self
            .commit(user_id, |stored| async move {
                let cart = stored.map(|s| s.cart);
                let product_id = cart
                    .as_ref()
                    .and_then(|c| c.item(item_id))
                    .map(|item| item.product_id);
                let stock = match product_id {
                    Some(id) => self.current_stock(id).await?,
                    None => None,
                };
                engine::set_item_quantity(cart.as_ref(), item_id, quantity, stock)
            })
            .await?;

        info!(%user_id, %item_id, quantity, "Updated cart item quantity");
        self.project(&cart).await
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns `CartNotFound`, `ItemNotFound`, or `Store` on storage failure.
    pub async fn remove_item(
        &self,
        identity: &Identity,
        item_id: CartItemId,
    ) -> Result<CartView, CartError> {
        let user_id = identity.id;

        let cart = self
            .commit(user_id, |stored| async move {
                let cart = stored.map(|s| s.cart);
                engine::remove_item(cart.as_ref(), item_id)
            })
            .await?;

        info!(%user_id, %item_id, "Removed item from cart");
        self.project(&cart).await
    }

    /// Run load, `reconcile`, save, retrying on a version conflict.
    async fn commit<F, Fut>(&self, user_id: UserId, mut reconcile: F) -> Result<Cart, CartError>
    where
        F: FnMut(Option<StoredCart>) -> Fut,
        Fut: Future<Output = Result<Cart, CartError>>,
    {
        let mut retries = 0;
        loop {
            let stored = self.carts.load(user_id).await?;
            let version = stored.as_ref().map(|s| s.version);

            let next = reconcile(stored).await?;

            match self.carts.save(&next, version).await {
                Ok(_) => return Ok(next),
                Err(RepositoryError::VersionConflict) if retries < MAX_CONFLICT_RETRIES => {
                    retries += 1;
                    debug!(%user_id, retries, "Cart write conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn current_stock(&self, product_id: ProductId) -> Result<Option<u32>, CartError> {
        Ok(self.stock.find(product_id).await?.map(|p| p.stock))
    }

    async fn project(&self, cart: &Cart) -> Result<CartView, CartError> {
        let products = self.stock.find_many(&cart.product_ids()).await?;
        Ok(CartView::project(cart, products))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shoppy_globe_core::{Email, Price};

    use super::*;
    use crate::db::{MemoryStore, ProductCatalog};
    use crate::models::NewProduct;

    fn identity() -> Identity {
        Identity {
            id: UserId::new(1),
            email: Email::parse("u@example.com").unwrap(),
            name: "U".to_string(),
        }
    }

    async fn seeded(stock: u32) -> (Arc<MemoryStore>, ProductId) {
        let store = Arc::new(MemoryStore::default());
        let product = ProductCatalog::create(
            store.as_ref(),
            &NewProduct {
                name: "Lamp".to_string(),
                description: "Desk lamp".to_string(),
                price: Price::new(Decimal::new(1999, 2)).unwrap(),
                stock,
            },
        )
        .await
        .unwrap();
        (store, product.id)
    }

    fn add(product_id: ProductId, quantity: i64) -> AddItemRequest {
        AddItemRequest {
            product_id: Some(product_id),
            quantity: Some(quantity),
        }
    }

    #[tokio::test]
    async fn test_view_without_cart_is_empty() {
        let (store, _) = seeded(1).await;
        let service = CartService::new(store.clone(), store);

        let view = service.view(&identity()).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.item_count, 0);
    }

    #[tokio::test]
    async fn test_add_persists_and_projects() {
        let (store, product_id) = seeded(5).await;
        let service = CartService::new(store.clone(), store.clone());

        let view = service
            .add_item(&identity(), &add(product_id, 2))
            .await
            .unwrap();
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal.amount(), Decimal::new(3998, 2));
        assert_eq!(
            view.items[0].product.as_ref().map(|p| p.name.as_str()),
            Some("Lamp")
        );

        let stored = store.load(UserId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.cart.total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_rejection_does_not_write() {
        let (store, product_id) = seeded(5).await;
        let service = CartService::new(store.clone(), store.clone());

        let err = service
            .add_item(&identity(), &add(product_id, 6))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { .. }));
        assert!(store.load(UserId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let (store, product_id) = seeded(5).await;
        let service = CartService::new(store.clone(), store);

        let request = AddItemRequest {
            product_id: Some(product_id),
            quantity: None,
        };
        assert!(matches!(
            service.add_item(&identity(), &request).await,
            Err(CartError::InvalidRequest(_))
        ));
        assert!(matches!(
            service
                .set_quantity(
                    &identity(),
                    CartItemId::generate(),
                    &SetQuantityRequest { quantity: None }
                )
                .await,
            Err(CartError::InvalidRequest(_))
        ));
    }

    /// Loses the first `failures` writes, then delegates.
    struct FlakyStore {
        inner: MemoryStore,
        failures: AtomicUsize,
    }

    #[async_trait]
    impl CartStore for FlakyStore {
        async fn load(&self, user_id: UserId) -> Result<Option<StoredCart>, RepositoryError> {
            self.inner.load(user_id).await
        }

        async fn save(
            &self,
            cart: &Cart,
            expected_version: Option<i64>,
        ) -> Result<i64, RepositoryError> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(RepositoryError::VersionConflict);
            }
            self.inner.save(cart, expected_version).await
        }
    }

    #[tokio::test]
    async fn test_single_conflict_is_retried() {
        let (products, product_id) = seeded(5).await;
        let carts = Arc::new(FlakyStore {
            inner: MemoryStore::default(),
            failures: AtomicUsize::new(1),
        });
        let service = CartService::new(carts, products);

        let view = service
            .add_item(&identity(), &add(product_id, 1))
            .await
            .unwrap();
        assert_eq!(view.item_count, 1);
    }

    #[tokio::test]
    async fn test_repeated_conflict_surfaces() {
        let (products, product_id) = seeded(5).await;
        let carts = Arc::new(FlakyStore {
            inner: MemoryStore::default(),
            failures: AtomicUsize::new(2),
        });
        let service = CartService::new(carts, products);

        assert!(matches!(
            service.add_item(&identity(), &add(product_id, 1)).await,
            Err(CartError::Store(RepositoryError::VersionConflict))
        ));
    }
}
