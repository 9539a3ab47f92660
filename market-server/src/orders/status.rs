//! Order Status State Machine
//!
//! Forward path `placed -> preparing -> ready -> delivered`; cancellation
//! only from `placed`. Terminal states never reopen. Providers drive the
//! forward path and each transition stamps exactly its own timestamp.

use crate::db::{MarketStore, StoreError};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderStatus};
use shared::util::now_millis;

/// Statuses a provider may request
const PROVIDER_TARGETS: [OrderStatus; 3] = [
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Delivered,
];

/// Advance one of the provider's orders along the lifecycle
pub fn update_order_status(
    store: &MarketStore,
    provider_id: &str,
    order_id: &str,
    target: OrderStatus,
) -> AppResult<Order> {
    let txn = store.begin_write()?;
    let mut order = store
        .get_order_txn(&txn, order_id)?
        .filter(|o| o.provider_id == provider_id)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    // Targets outside the provider's reach (placed, cancelled) are illegal
    // transitions like any other, reported with the attempted pair
    if !PROVIDER_TARGETS.contains(&target) || !order.status.can_transition_to(target) {
        return Err(AppError::invalid_transition(
            order.status.to_string(),
            target.to_string(),
        ));
    }

    let now = now_millis();
    order.status = target;
    match target {
        OrderStatus::Preparing => order.prepared_at = Some(now),
        OrderStatus::Ready => order.ready_at = Some(now),
        OrderStatus::Delivered => order.delivered_at = Some(now),
        // Guarded by PROVIDER_TARGETS above
        OrderStatus::Placed | OrderStatus::Cancelled => {}
    }

    store.put_order(&txn, &order)?;
    txn.commit().map_err(StoreError::from)?;

    tracing::info!(order_id, provider_id, status = %order.status, "order status updated");
    Ok(order)
}
