//! Registration, login and bearer token handling.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use chrono::Utc;
use serde_json::json;

use shoppy_globe_integration_tests::{TEST_PASSWORD, TEST_SECRET, TestContext};
use shoppy_globe_storefront::services::auth::Claims;

#[tokio::test]
async fn test_register_returns_user_without_password() {
    let ctx = TestContext::new();

    let response = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(&json!({ "name": "Asha", "email": "asha@example.com", "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let user = &response.body["user"];
    assert_eq!(user["name"], "Asha");
    assert_eq!(user["email"], "asha@example.com");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let ctx = TestContext::new();
    ctx.signed_in_user("dup@example.com").await;

    let duplicate = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(&json!({ "name": "Again", "email": "DUP@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let missing = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(&json!({ "email": "x@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let weak = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(&json!({ "name": "W", "email": "w@example.com", "password": "short" })),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);

    let bad_email = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(&json!({ "name": "B", "email": "not-an-email", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.signed_in_user("login@example.com").await;

    let wrong_password = ctx
        .send(
            Method::POST,
            "/login",
            None,
            Some(&json!({ "email": "login@example.com", "password": "wrong-password" })),
        )
        .await;
    let unknown_user = ctx
        .send(
            Method::POST,
            "/login",
            None,
            Some(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(wrong_password.body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_token_opens_the_cart() {
    let ctx = TestContext::new();
    let user = ctx.signed_in_user("cart-owner@example.com").await;

    let response = ctx
        .send(Method::GET, "/cart", Some(&user.token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["userId"].as_i64(), Some(user.id));
}

#[tokio::test]
async fn test_missing_token() {
    let ctx = TestContext::new();

    let response = ctx.send(Method::GET, "/cart", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "No token provided");
}

#[tokio::test]
async fn test_rejected_tokens() {
    let ctx = TestContext::new();
    let user = ctx.signed_in_user("tokens@example.com").await;
    let now = Utc::now().timestamp();

    let expired = TestContext::token_with_claims(
        &Claims {
            sub: user.id.to_string(),
            iat: now - 7200,
            exp: now - 3600,
        },
        TEST_SECRET,
    );
    let forged = TestContext::token_with_claims(
        &Claims {
            sub: user.id.to_string(),
            iat: now,
            exp: now + 3600,
        },
        "some-other-secret-that-is-long-enough",
    );

    for token in [expired.as_str(), forged.as_str(), "not.a.jwt", "garbage"] {
        let response = ctx.send(Method::GET, "/cart", Some(token), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{token}");
        assert_eq!(response.body["message"], "Invalid or expired token");
    }
}

#[tokio::test]
async fn test_token_for_unknown_user() {
    let ctx = TestContext::new();
    let now = Utc::now().timestamp();
    let token = TestContext::token_with_claims(
        &Claims {
            sub: "4242".to_string(),
            iat: now,
            exp: now + 3600,
        },
        TEST_SECRET,
    );

    let response = ctx.send(Method::GET, "/cart", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "User not found");
}

#[tokio::test]
async fn test_auth_is_checked_before_path_and_body() {
    let ctx = TestContext::new();
    let product_id = ctx.seed_product("Pen", "1.50", 10).await;

    let requests = [
        (Method::GET, "/cart".to_string(), None),
        (
            Method::POST,
            "/cart".to_string(),
            Some(json!({ "productId": product_id, "quantity": 1 })),
        ),
        (Method::POST, "/cart".to_string(), Some(json!({}))),
        (
            Method::PUT,
            "/cart/not-a-uuid".to_string(),
            Some(json!({ "quantity": -4 })),
        ),
        (Method::DELETE, "/cart/not-a-uuid".to_string(), None),
        (Method::POST, "/products".to_string(), Some(json!({}))),
        (
            Method::PUT,
            format!("/products/{product_id}"),
            Some(json!({ "stock": 1 })),
        ),
        (Method::DELETE, "/products/abc".to_string(), None),
    ];

    for (method, uri, body) in requests {
        let response = ctx.send(method.clone(), &uri, None, body.as_ref()).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(response.body["message"], "No token provided");
    }
}
