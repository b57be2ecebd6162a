//! Concurrent writes to one cart.
//!
//! A write that loses a race is retried once; if it loses again it is
//! reported as 503 and nothing of it is kept. Every 200 must be reflected in
//! the final cart and no add may exceed stock.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;
use tokio::task::JoinSet;

use shoppy_globe_core::ProductId;
use shoppy_globe_integration_tests::{TestContext, line_for, unique_email};

const WRITERS: u64 = 16;

/// Fire `WRITERS` single-unit adds at once; returns how many got 200.
async fn race_adds(ctx: &TestContext, token: &str, product_id: ProductId) -> u64 {
    let mut writers = JoinSet::new();
    for _ in 0..WRITERS {
        let ctx = ctx.clone();
        let token = token.to_string();
        writers.spawn(async move {
            ctx.send(
                Method::POST,
                "/cart",
                Some(&token),
                Some(&json!({ "productId": product_id, "quantity": 1 })),
            )
            .await
            .status
        });
    }

    let mut succeeded = 0_u64;
    while let Some(status) = writers.join_next().await {
        match status.unwrap() {
            StatusCode::OK => succeeded += 1,
            StatusCode::BAD_REQUEST | StatusCode::SERVICE_UNAVAILABLE => {}
            other => panic!("unexpected status {other}"),
        }
    }
    succeeded
}

async fn cart_quantity(ctx: &TestContext, token: &str, product_id: ProductId) -> u64 {
    let cart = ctx.send(Method::GET, "/cart", Some(token), None).await;
    assert_eq!(cart.status, StatusCode::OK);
    line_for(&cart.body, product_id).map_or(0, |line| line["quantity"].as_u64().unwrap())
}

async fn assert_no_lost_adds(ctx: &TestContext) {
    let user = ctx.signed_in_user(&unique_email("race")).await;
    let product_id = ctx.seed_product("Sticker", "0.50", 1_000).await;

    let succeeded = race_adds(ctx, &user.token, product_id).await;

    assert!(succeeded > 0);
    assert_eq!(cart_quantity(ctx, &user.token, product_id).await, succeeded);
}

async fn assert_adds_respect_stock(ctx: &TestContext) {
    let user = ctx.signed_in_user(&unique_email("scarce")).await;
    let product_id = ctx.seed_product("Last Few", "9.99", 3).await;

    let succeeded = race_adds(ctx, &user.token, product_id).await;

    assert!(succeeded <= 3);
    assert_eq!(cart_quantity(ctx, &user.token, product_id).await, succeeded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_are_never_lost() {
    assert_no_lost_adds(&TestContext::new()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_respect_stock() {
    assert_adds_respect_stock(&TestContext::new()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires PostgreSQL"]
async fn test_concurrent_adds_are_never_lost_on_postgres() {
    assert_no_lost_adds(&TestContext::postgres().await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires PostgreSQL"]
async fn test_concurrent_adds_respect_stock_on_postgres() {
    assert_adds_respect_stock(&TestContext::postgres().await).await;
}
