//! Cart route handlers.
//!
//! Every handler takes [`RequireAuth`] first, so an unauthenticated request
//! is rejected before its path or body is looked at.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use tracing::instrument;

use shoppy_globe_core::CartItemId;

use super::json_body;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::CartView;
use crate::services::CartError;
use crate::services::cart::{AddItemRequest, SetQuantityRequest};
use crate::state::AppState;

/// Response body for `DELETE /cart/{itemId}`.
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub message: &'static str,
    pub cart: CartView,
}

fn parse_item_id(raw: &str) -> std::result::Result<CartItemId, CartError> {
    raw.parse().map_err(|_| CartError::InvalidId)
}

/// `GET /cart` - the caller's cart, empty if they have none yet.
#[instrument(skip_all, fields(user_id = %identity.id))]
pub async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<CartView>> {
    Ok(Json(state.carts().view(&identity).await?))
}

/// `POST /cart` - add `{productId, quantity}`.
#[instrument(skip_all, fields(user_id = %identity.id))]
pub async fn add(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    body: std::result::Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let request = json_body(body)?;
    Ok(Json(state.carts().add_item(&identity, &request).await?))
}

/// `PUT /cart/{itemId}` - set `{quantity}` on one line.
#[instrument(skip_all, fields(user_id = %identity.id, item_id = %item_id))]
pub async fn update(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    body: std::result::Result<Json<SetQuantityRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let item_id = parse_item_id(&item_id)?;
    let request = json_body(body)?;
    Ok(Json(
        state
            .carts()
            .set_quantity(&identity, item_id, &request)
            .await?,
    ))
}

/// `DELETE /cart/{itemId}`.
#[instrument(skip_all, fields(user_id = %identity.id, item_id = %item_id))]
pub async fn remove(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<RemovedResponse>> {
    let item_id = parse_item_id(&item_id)?;
    let cart = state.carts().remove_item(&identity, item_id).await?;
    Ok(Json(RemovedResponse {
        message: "Item removed from cart successfully",
        cart,
    }))
}
