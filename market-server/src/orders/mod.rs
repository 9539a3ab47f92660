//! Order core: draft building, transactional execution, lifecycle

pub mod builder;
pub mod executor;
pub mod status;

pub use builder::OrderDraft;
pub use executor::OrderExecutor;

use crate::db::MarketStore;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderStatus};
use shared::request::{CreateOrderPayload, PaginationQuery};
use shared::response::Paginated;
use std::time::Duration;

/// Facade over the order core used by the API layer
#[derive(Clone)]
pub struct OrderService {
    store: MarketStore,
    executor: OrderExecutor,
}

impl OrderService {
    pub fn new(store: MarketStore, retry_limit: u32, checkout_deadline: Duration) -> Self {
        let executor = OrderExecutor::new(store.clone(), retry_limit, checkout_deadline);
        Self { store, executor }
    }

    pub fn create_order(&self, user_id: &str, payload: &CreateOrderPayload) -> AppResult<Order> {
        self.executor.create_order(user_id, payload)
    }

    pub fn cancel_order(&self, user_id: &str, order_id: &str) -> AppResult<Order> {
        self.executor.cancel_order(user_id, order_id)
    }

    pub fn update_status(
        &self,
        provider_id: &str,
        order_id: &str,
        target: OrderStatus,
    ) -> AppResult<Order> {
        status::update_order_status(&self.store, provider_id, order_id, target)
    }

    /// A customer's order; someone else's order is indistinguishable from a
    /// missing one
    pub fn get_for_user(&self, user_id: &str, order_id: &str) -> AppResult<Order> {
        self.store
            .get_order(order_id)?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))
    }

    pub fn list_for_user(
        &self,
        user_id: &str,
        page: &PaginationQuery,
    ) -> AppResult<Paginated<Order>> {
        Ok(paginate(self.store.orders_for_user(user_id)?, page))
    }

    pub fn list_for_provider(
        &self,
        provider_id: &str,
        page: &PaginationQuery,
    ) -> AppResult<Paginated<Order>> {
        Ok(paginate(self.store.orders_for_provider(provider_id)?, page))
    }
}

fn paginate(orders: Vec<Order>, page: &PaginationQuery) -> Paginated<Order> {
    let total = orders.len() as u64;
    let data: Vec<Order> = orders
        .into_iter()
        .skip(page.offset())
        .take(page.limit() as usize)
        .collect();
    Paginated::new(data, page.page, page.limit(), total)
}
