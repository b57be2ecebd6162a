//! ShoppyGlobe storefront library.
//!
//! Accounts, the product catalog and per-user carts behind a JSON API.
//! Built as a library so the binary, the CLI and the integration tests share
//! one router and one set of stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
