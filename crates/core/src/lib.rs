//! ShoppyGlobe Core - Shared domain types.
//!
//! This crate provides the value types used across the ShoppyGlobe components:
//! - `storefront` - HTTP API (accounts, catalog, cart)
//! - `cli` - Command-line tools for migrations, seeding and dev tokens
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Every constructor validates, so a value of one of these types
//! is always well-formed.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, prices and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
