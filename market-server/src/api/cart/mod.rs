//! Cart API module

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/",
            get(handler::view)
                .post(handler::add_item)
                .delete(handler::clear),
        )
        .route(
            "/items/{id}",
            patch(handler::update_item).delete(handler::remove_item),
        )
}
