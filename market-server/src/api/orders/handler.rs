use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::{
    error::{AppError, AppResult},
    models::Order,
    request::{CreateOrderPayload, PaginationQuery},
    response::Paginated,
};
use validator::Validate;

use crate::{auth::Principal, core::ServerState};

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    principal: Principal,
    Json(payload): Json<CreateOrderPayload>,
) -> AppResult<Json<Order>> {
    principal.require_customer()?;
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let order = state.orders.create_order(&principal.user_id, &payload)?;
    Ok(Json(order))
}

/// GET /api/orders
pub async fn list(
    State(state): State<ServerState>,
    principal: Principal,
    Query(page): Query<PaginationQuery>,
) -> AppResult<Json<Paginated<Order>>> {
    principal.require_customer()?;
    let orders = state.orders.list_for_user(&principal.user_id, &page)?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn detail(
    State(state): State<ServerState>,
    principal: Principal,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    principal.require_customer()?;
    let order = state.orders.get_for_user(&principal.user_id, &order_id)?;
    Ok(Json(order))
}

/// PATCH /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    principal: Principal,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    principal.require_customer()?;
    let order = state.orders.cancel_order(&principal.user_id, &order_id)?;
    Ok(Json(order))
}
