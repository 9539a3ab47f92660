//! HTTP API modules
//!
//! - `health` - liveness probe
//! - `cart` - customer cart management
//! - `orders` - customer order checkout and history
//! - `provider_orders` - provider-side order fulfilment

pub mod cart;
pub mod health;
pub mod orders;
pub mod provider_orders;

use axum::Router;

use crate::core::ServerState;

/// Build the full API router.
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(provider_orders::router())
}
