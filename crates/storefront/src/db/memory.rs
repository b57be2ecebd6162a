//! In-process storage backend.
//!
//! Keeps users, products and carts in concurrent maps. Selected with
//! `STOREFRONT_STORAGE=memory`; everything is lost on restart.
//!
//! Cart writes follow the same compare-and-swap contract as the `PostgreSQL`
//! backend. The check and the write happen under a single map shard lock and
//! no lock is ever held across an `.await`.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use shoppy_globe_core::{Email, ProductId, UserId};

use super::{CartStore, ProductCatalog, RepositoryError, StockOracle, UserStore};
use crate::models::{Cart, NewProduct, NewUser, Product, ProductUpdate, StoredCart, User};

struct UserRecord {
    user: User,
    password_hash: String,
}

/// Shared in-memory store implementing every storage trait.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<UserId, UserRecord>,
    users_by_email: DashMap<Email, UserId>,
    user_seq: AtomicI32,
    products: DashMap<ProductId, Product>,
    product_seq: AtomicI32,
    carts: DashMap<UserId, StoredCart>,
}

impl MemoryStore {
    fn next_id(seq: &AtomicI32) -> i32 {
        seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.get(&id).map(|record| record.user.clone()))
    }

    async fn find_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let Some(id) = self.users_by_email.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self
            .users
            .get(&id)
            .map(|record| (record.user.clone(), record.password_hash.clone())))
    }

    async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let Entry::Vacant(slot) = self.users_by_email.entry(new.email.clone()) else {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        };

        let now = Utc::now();
        let user = User {
            id: UserId::new(Self::next_id(&self.user_seq)),
            name: new.name.clone(),
            email: new.email.clone(),
            created_at: now,
            updated_at: now,
        };

        self.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash: new.password_hash.clone(),
            },
        );
        slot.insert(user.id);

        Ok(user)
    }
}

#[async_trait]
impl StockOracle for MemoryStore {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.get(&id).map(|p| p.clone()))
    }

    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.get(id).map(|p| p.clone()))
            .collect())
    }
}

#[async_trait]
impl ProductCatalog for MemoryStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self.products.iter().map(|p| p.clone()).collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(Self::next_id(&self.product_seq)),
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price,
            stock: new.stock,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        changes: &ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.get_mut(&id).map(|mut product| {
            changes.apply_to(&mut product);
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.products.remove(&id).is_some())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn load(&self, user_id: UserId) -> Result<Option<StoredCart>, RepositoryError> {
        Ok(self.carts.get(&user_id).map(|stored| stored.clone()))
    }

    async fn save(
        &self,
        cart: &Cart,
        expected_version: Option<i64>,
    ) -> Result<i64, RepositoryError> {
        match (self.carts.entry(cart.user_id()), expected_version) {
            (Entry::Vacant(slot), None) => {
                slot.insert(StoredCart {
                    cart: cart.clone(),
                    version: 1,
                });
                Ok(1)
            }
            (Entry::Occupied(mut slot), Some(expected)) if slot.get().version == expected => {
                let version = expected + 1;
                slot.insert(StoredCart {
                    cart: cart.clone(),
                    version,
                });
                Ok(version)
            }
            _ => Err(RepositoryError::VersionConflict),
        }
    }
}
