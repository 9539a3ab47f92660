use axum::{
    Json,
    extract::{Path, State},
};
use shared::{
    error::{ApiResponse, AppError, AppResult},
    models::{CartItem, CartView},
    request::{AddCartItemPayload, UpdateCartItemPayload},
};
use validator::Validate;

use crate::{auth::Principal, core::ServerState};

/// GET /api/cart
pub async fn view(
    State(state): State<ServerState>,
    principal: Principal,
) -> AppResult<Json<CartView>> {
    principal.require_customer()?;
    let view = state.carts.get_cart(&principal.user_id)?;
    Ok(Json(view))
}

/// POST /api/cart
pub async fn add_item(
    State(state): State<ServerState>,
    principal: Principal,
    Json(payload): Json<AddCartItemPayload>,
) -> AppResult<Json<CartItem>> {
    principal.require_customer()?;
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let item = state.carts.add_item(&principal.user_id, &payload)?;
    Ok(Json(item))
}

/// PATCH /api/cart/items/{id}
pub async fn update_item(
    State(state): State<ServerState>,
    principal: Principal,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateCartItemPayload>,
) -> AppResult<Json<CartItem>> {
    principal.require_customer()?;
    let item = state
        .carts
        .update_item_quantity(&principal.user_id, &item_id, payload.quantity)?;
    Ok(Json(item))
}

/// DELETE /api/cart/items/{id}
pub async fn remove_item(
    State(state): State<ServerState>,
    principal: Principal,
    Path(item_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    principal.require_customer()?;
    state.carts.remove_item(&principal.user_id, &item_id)?;
    Ok(Json(ApiResponse::ok()))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<ServerState>,
    principal: Principal,
) -> AppResult<Json<ApiResponse<()>>> {
    principal.require_customer()?;
    state.carts.clear(&principal.user_id)?;
    Ok(Json(ApiResponse::ok()))
}
