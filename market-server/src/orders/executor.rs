//! Order Transaction Executor
//!
//! Runs checkout and cancellation as single redb write transactions: stock
//! decrement, order insert, and cart clearing either all commit or none do.
//! Commit failures surface as retryable conflicts and are retried a bounded
//! number of times.

use crate::catalog::CatalogReader;
use crate::db::{MarketStore, StoreError};
use crate::orders::builder::{self, OrderDraft};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderStatus, PaymentMethod};
use shared::request::CreateOrderPayload;
use shared::util::{new_id, now_millis, snowflake_id};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct OrderExecutor {
    store: MarketStore,
    catalog: CatalogReader,
    /// Attempts per checkout before a conflict is surfaced
    retry_limit: u32,
    /// Deadline for one checkout transaction; exceeding it aborts the
    /// transaction before commit, never after
    checkout_deadline: Duration,
}

impl OrderExecutor {
    pub fn new(store: MarketStore, retry_limit: u32, checkout_deadline: Duration) -> Self {
        let catalog = CatalogReader::new(store.clone());
        Self {
            store,
            catalog,
            retry_limit: retry_limit.max(1),
            checkout_deadline,
        }
    }

    /// Place an order for the caller, from their cart or from explicit items
    pub fn create_order(&self, user_id: &str, payload: &CreateOrderPayload) -> AppResult<Order> {
        let payment_method = parse_payment_method(payload.payment_method.as_deref())?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_create(user_id, payload, payment_method) {
                Err(err) if err.code == ErrorCode::TransactionConflict && attempt < self.retry_limit => {
                    tracing::warn!(user_id, attempt, "checkout conflict, retrying");
                }
                result => return result,
            }
        }
    }

    fn try_create(
        &self,
        user_id: &str,
        payload: &CreateOrderPayload,
        payment_method: PaymentMethod,
    ) -> AppResult<Order> {
        let started = Instant::now();
        let txn = self.store.begin_write()?;

        let provider = self
            .store
            .get_provider_txn(&txn, &payload.provider_id)?
            .ok_or_else(|| AppError::new(ErrorCode::ProviderNotFound))?;

        // The address must exist and belong to the caller
        self.store
            .get_address_txn(&txn, &payload.delivery_address_id)?
            .filter(|addr| addr.user_id == user_id)
            .ok_or_else(|| AppError::new(ErrorCode::AddressNotFound))?;

        let draft = match payload.items.as_deref() {
            Some(items) if !items.is_empty() => {
                builder::build_from_items(&self.catalog, &txn, &provider.id, items)?
            }
            _ => builder::build_from_cart(&self.store, &self.catalog, &txn, user_id, &provider.id)?,
        };

        let order = self.apply_draft(&txn, user_id, payload, payment_method, draft)?;

        // Abort before commit rather than report a timeout after a
        // successful commit
        if started.elapsed() > self.checkout_deadline {
            drop(txn);
            return Err(AppError::transaction_timeout());
        }

        txn.commit().map_err(StoreError::from)?;
        tracing::info!(
            order_id = %order.id,
            user_id,
            provider_id = %order.provider_id,
            total = %order.total_amount,
            "order placed"
        );
        Ok(order)
    }

    /// Materialize a draft inside the transaction: decrement stock, insert
    /// the order, clear the source cart
    fn apply_draft(
        &self,
        txn: &redb::WriteTransaction,
        user_id: &str,
        payload: &CreateOrderPayload,
        payment_method: PaymentMethod,
        draft: OrderDraft,
    ) -> AppResult<Order> {
        let now = now_millis();

        for (meal_id, quantity) in &draft.meals_to_decrement {
            // The builder verified existence and stock under this same txn
            let mut meal = self
                .store
                .get_meal_txn(txn, meal_id)?
                .ok_or_else(|| AppError::meal_unavailable(meal_id.clone()))?;
            let stock = meal.stock.unwrap_or(0);
            meal.stock = Some(stock - quantity);
            meal.updated_at = now;
            self.store.put_meal(txn, &meal)?;
        }

        let order = Order {
            id: new_id(),
            order_number: snowflake_id(),
            user_id: user_id.to_string(),
            provider_id: payload.provider_id.clone(),
            delivery_address_id: payload.delivery_address_id.clone(),
            status: OrderStatus::Placed,
            total_amount: draft.total_amount,
            currency: draft.currency,
            payment_method,
            notes: payload.notes.clone(),
            items: draft.items,
            placed_at: now,
            prepared_at: None,
            ready_at: None,
            delivered_at: None,
            cancelled_at: None,
        };
        self.store.put_order(txn, &order)?;

        if let Some(cart_id) = &draft.source_cart_id {
            self.store.clear_cart_items(txn, cart_id)?;
        }
        Ok(order)
    }

    /// Cancel one of the caller's orders while it is still `placed`,
    /// restoring finite stock
    pub fn cancel_order(&self, user_id: &str, order_id: &str) -> AppResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        if order.status != OrderStatus::Placed {
            return Err(AppError::invalid_transition(
                order.status.to_string(),
                OrderStatus::Cancelled.to_string(),
            ));
        }

        let now = now_millis();
        let mut restore = std::collections::BTreeMap::new();
        for item in &order.items {
            *restore.entry(item.meal_id.clone()).or_insert(0i64) += item.quantity as i64;
        }
        for (meal_id, quantity) in restore {
            if let Some(mut meal) = self.store.get_meal_txn(&txn, &meal_id)? {
                if let Some(stock) = meal.stock {
                    meal.stock = Some(stock + quantity);
                    meal.updated_at = now;
                    self.store.put_meal(&txn, &meal)?;
                }
            }
        }

        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(now);
        self.store.put_order(&txn, &order)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::info!(order_id = %order.id, user_id, "order cancelled");
        Ok(order)
    }
}

fn parse_payment_method(raw: Option<&str>) -> AppResult<PaymentMethod> {
    match raw {
        None => Ok(PaymentMethod::CashOnDelivery),
        Some(s) if s == PaymentMethod::CASH_ON_DELIVERY => Ok(PaymentMethod::CashOnDelivery),
        Some(other) => Err(AppError::unsupported_payment_method(other)),
    }
}
