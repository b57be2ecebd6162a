//! Domain models for the storefront.
//!
//! These types are separate from database row types; repositories convert
//! rows into them and reject rows that violate a domain constraint.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem, CartLineView, CartView, StoredCart};
pub use product::{NewProduct, Product, ProductUpdate};
pub use user::{Identity, NewUser, User};
