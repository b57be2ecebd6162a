//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, password login, bearer token issuance and verification
//! - `cart` - Per-user cart reconciliation against live stock
//! - `catalog` - Product CRUD with input validation

pub mod auth;
pub mod cart;
pub mod catalog;

pub use auth::{AuthError, AuthService, IdentityVerifier, TokenIssuer};
pub use cart::{CartError, CartService};
pub use catalog::{CatalogError, CatalogService};
