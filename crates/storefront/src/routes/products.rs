//! Product catalog route handlers.
//!
//! Reads are public. Writes need a bearer token, same as the cart.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::instrument;

use super::json_body;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::services::catalog::{CreateProductRequest, UpdateProductRequest, parse_product_id};
use crate::state::AppState;

/// `GET /products`
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().list().await?))
}

/// `GET /products/{id}`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id = parse_product_id(&id)?;
    Ok(Json(state.catalog().get(id).await?))
}

/// `POST /products`
#[instrument(skip_all, fields(user_id = %identity.id))]
pub async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let request = json_body(body)?;
    let product = state.catalog().create(&request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}` - partial update.
#[instrument(skip_all, fields(user_id = %identity.id, product_id = %id))]
pub async fn update(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<Product>> {
    let id = parse_product_id(&id)?;
    let request = json_body(body)?;
    Ok(Json(state.catalog().update(id, &request).await?))
}

/// `DELETE /products/{id}`
#[instrument(skip_all, fields(user_id = %identity.id, product_id = %id))]
pub async fn delete(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_product_id(&id)?;
    state.catalog().delete(id).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
