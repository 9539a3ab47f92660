use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::{
    error::{AppError, AppResult, ErrorCode},
    models::{Order, ProviderProfile},
    request::{PaginationQuery, UpdateOrderStatusPayload},
    response::Paginated,
};

use crate::{auth::Principal, core::ServerState};

/// Resolve the provider profile owned by the authenticated user.
fn resolve_profile(state: &ServerState, principal: &Principal) -> AppResult<ProviderProfile> {
    state
        .store
        .get_provider_by_user(&principal.user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProviderNotFound))
}

/// GET /api/provider/orders
pub async fn list(
    State(state): State<ServerState>,
    principal: Principal,
    Query(page): Query<PaginationQuery>,
) -> AppResult<Json<Paginated<Order>>> {
    principal.require_provider()?;
    let profile = resolve_profile(&state, &principal)?;
    let orders = state.orders.list_for_provider(&profile.id, &page)?;
    Ok(Json(orders))
}

/// PATCH /api/provider/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    principal: Principal,
    Path(order_id): Path<String>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> AppResult<Json<Order>> {
    principal.require_provider()?;
    let profile = resolve_profile(&state, &principal)?;
    let order = state
        .orders
        .update_status(&profile.id, &order_id, payload.status)?;
    Ok(Json(order))
}
