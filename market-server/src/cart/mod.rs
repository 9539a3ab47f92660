//! Cart Aggregate
//!
//! One cart per customer, created lazily on the first add. Lines carrying
//! the same meal and the same normalized option set merge by incrementing
//! quantity, so adding twice equals adding once with the summed quantity.

use crate::catalog::CatalogReader;
use crate::db::{MarketStore, StoreError};
use crate::pricing;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Cart, CartItem, CartSummary, CartView, PricedCartItem, normalize_option_ids,
};
use shared::request::AddCartItemPayload;
use shared::util::{new_id, now_millis};

#[derive(Clone)]
pub struct CartService {
    store: MarketStore,
    catalog: CatalogReader,
}

impl CartService {
    pub fn new(store: MarketStore) -> Self {
        let catalog = CatalogReader::new(store.clone());
        Self { store, catalog }
    }

    fn ensure_quantity(quantity: u32) -> AppResult<()> {
        if quantity == 0 {
            return Err(AppError::invalid_quantity());
        }
        Ok(())
    }

    /// Add a meal selection to the caller's cart, merging with an existing
    /// line when the selection matches
    pub fn add_item(&self, user_id: &str, payload: &AddCartItemPayload) -> AppResult<CartItem> {
        let quantity = payload.quantity();
        Self::ensure_quantity(quantity)?;
        let option_ids = payload.option_ids();

        // Public path: hidden meals are indistinguishable from missing ones
        let meal = self.catalog.visible_meal(&payload.meal_id)?;
        // Validate the selection before touching the cart
        pricing::price_selection(&meal, &option_ids)?;

        let txn = self.store.begin_write()?;
        let now = now_millis();

        let cart = match self.store.get_cart_by_user_txn(&txn, user_id)? {
            Some(cart) => cart,
            None => {
                let cart = Cart {
                    id: new_id(),
                    user_id: user_id.to_string(),
                    created_at: now,
                };
                self.store.put_cart(&txn, &cart)?;
                cart
            }
        };

        let existing = self
            .store
            .get_cart_items_txn(&txn, &cart.id)?
            .into_iter()
            .find(|item| item.same_selection(&meal.id, &option_ids));

        let item = match existing {
            Some(mut item) => {
                item.quantity = item.quantity.saturating_add(quantity);
                item.updated_at = now;
                item
            }
            None => CartItem {
                id: new_id(),
                cart_id: cart.id.clone(),
                meal_id: meal.id.clone(),
                option_ids,
                quantity,
                created_at: now,
                updated_at: now,
            },
        };
        self.store.put_cart_item(&txn, &item)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::debug!(user_id, meal_id = %meal.id, quantity, "cart item added");
        Ok(item)
    }

    /// Replace the quantity of one of the caller's cart lines
    pub fn update_item_quantity(
        &self,
        user_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> AppResult<CartItem> {
        Self::ensure_quantity(quantity)?;

        let txn = self.store.begin_write()?;
        let cart = self
            .store
            .get_cart_by_user_txn(&txn, user_id)?
            .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;
        let mut item = self
            .store
            .get_cart_item_txn(&txn, &cart.id, item_id)?
            .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;

        item.quantity = quantity;
        item.updated_at = now_millis();
        self.store.put_cart_item(&txn, &item)?;
        txn.commit().map_err(StoreError::from)?;
        Ok(item)
    }

    /// Remove one of the caller's cart lines
    pub fn remove_item(&self, user_id: &str, item_id: &str) -> AppResult<()> {
        let txn = self.store.begin_write()?;
        let cart = self
            .store
            .get_cart_by_user_txn(&txn, user_id)?
            .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;
        if !self.store.remove_cart_item(&txn, &cart.id, item_id)? {
            return Err(AppError::new(ErrorCode::CartItemNotFound));
        }
        txn.commit().map_err(StoreError::from)?;
        Ok(())
    }

    /// Empty the caller's cart; a missing cart is a successful no-op
    pub fn clear(&self, user_id: &str) -> AppResult<()> {
        let txn = self.store.begin_write()?;
        if let Some(cart) = self.store.get_cart_by_user_txn(&txn, user_id)? {
            self.store.clear_cart_items(&txn, &cart.id)?;
        }
        txn.commit().map_err(StoreError::from)?;
        Ok(())
    }

    /// Priced view of the caller's cart
    ///
    /// Lines whose meal or options no longer resolve in the catalog are
    /// returned under `unavailable` so the caller can see and remove them;
    /// checkout reports them explicitly either way.
    pub fn get_cart(&self, user_id: &str) -> AppResult<CartView> {
        let cart = self.store.get_cart_by_user(user_id)?;
        let raw_items = match &cart {
            Some(cart) => self.store.get_cart_items(&cart.id)?,
            None => Vec::new(),
        };

        let mut items = Vec::with_capacity(raw_items.len());
        let mut unavailable = Vec::new();
        for item in raw_items {
            let Some(meal) = self.store.get_meal(&item.meal_id)? else {
                unavailable.push(item);
                continue;
            };
            if !meal.is_available() {
                unavailable.push(item);
                continue;
            }
            let option_ids = normalize_option_ids(item.option_ids.clone());
            let Ok(priced) = pricing::price_selection(&meal, &option_ids) else {
                unavailable.push(item);
                continue;
            };
            let line_total = pricing::line_total(priced.unit_price, item.quantity);
            items.push(PricedCartItem {
                meal_title: meal.title.clone(),
                provider_id: meal.provider_id.clone(),
                currency: meal.currency.clone(),
                base_price: priced.base_price,
                options_delta: priced.options_delta,
                unit_price: priced.unit_price,
                line_total,
                item,
            });
        }

        Ok(CartView {
            summary: summarize(&items),
            cart,
            items,
            unavailable,
        })
    }
}

fn summarize(items: &[PricedCartItem]) -> CartSummary {
    let mut item_count = 0u32;
    let mut base_total = Decimal::ZERO;
    let mut delta_total = Decimal::ZERO;
    let mut subtotal = Decimal::ZERO;
    let mut currency: Option<String> = None;
    let mut mixed = false;

    for line in items {
        let qty = Decimal::from(line.item.quantity);
        item_count += line.item.quantity;
        base_total += line.base_price * qty;
        delta_total += line.options_delta * qty;
        subtotal += line.line_total;
        match &currency {
            None => currency = Some(line.currency.clone()),
            Some(c) if c != &line.currency => mixed = true,
            Some(_) => {}
        }
    }

    CartSummary {
        item_count,
        base_total,
        delta_total,
        subtotal,
        currency: if mixed { None } else { currency },
    }
}
