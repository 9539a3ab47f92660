//! Order Builder
//!
//! Turns either a cart or an explicit item list into an [`OrderDraft`]:
//! snapshot-priced order items, the order total, and the per-meal stock
//! decrements the executor must apply. Builders only read through the write
//! transaction; they never mutate persisted state themselves.

use crate::catalog::CatalogReader;
use crate::db::MarketStore;
use crate::pricing;
use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};
use shared::models::{Meal, OrderItem, OrderItemOption};
use shared::request::OrderItemInput;
use shared::util::new_id;
use std::collections::BTreeMap;

/// Everything the executor needs to materialize an order
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub currency: String,
    /// meal_id -> quantity, only for meals with finite stock
    pub meals_to_decrement: BTreeMap<String, i64>,
    /// Set when the draft came from a cart, so checkout can clear it
    pub source_cart_id: Option<String>,
}

/// Build a draft from the caller's cart
pub fn build_from_cart(
    store: &MarketStore,
    catalog: &CatalogReader,
    txn: &WriteTransaction,
    user_id: &str,
    provider_id: &str,
) -> AppResult<OrderDraft> {
    let cart = store
        .get_cart_by_user_txn(txn, user_id)?
        .ok_or_else(AppError::empty_cart)?;
    let cart_items = store.get_cart_items_txn(txn, &cart.id)?;
    if cart_items.is_empty() {
        return Err(AppError::empty_cart());
    }

    let mut acc = DraftAccumulator::new(provider_id, true);
    for item in &cart_items {
        let meal = catalog.available_meal_txn(txn, &item.meal_id)?;
        acc.push(meal, &item.option_ids, item.quantity, None)?;
    }
    acc.finish(Some(cart.id))
}

/// Build a draft from an explicit item list, bypassing the cart
pub fn build_from_items(
    catalog: &CatalogReader,
    txn: &WriteTransaction,
    provider_id: &str,
    inputs: &[OrderItemInput],
) -> AppResult<OrderDraft> {
    if inputs.is_empty() {
        return Err(AppError::empty_cart());
    }

    let mut acc = DraftAccumulator::new(provider_id, false);
    for input in inputs {
        if input.quantity() == 0 {
            return Err(AppError::invalid_quantity());
        }
        let meal = catalog.available_meal_txn(txn, &input.meal_id)?;
        acc.push(meal, &input.option_ids(), input.quantity(), input.notes.clone())?;
    }
    acc.finish(None)
}

/// Shared accumulation for both build paths
struct DraftAccumulator<'a> {
    provider_id: &'a str,
    from_cart: bool,
    currency: Option<String>,
    items: Vec<OrderItem>,
    total: Decimal,
    /// meal_id -> (meal, accumulated quantity)
    needed: BTreeMap<String, (Meal, i64)>,
}

impl<'a> DraftAccumulator<'a> {
    fn new(provider_id: &'a str, from_cart: bool) -> Self {
        Self {
            provider_id,
            from_cart,
            currency: None,
            items: Vec::new(),
            total: Decimal::ZERO,
            needed: BTreeMap::new(),
        }
    }

    fn push(
        &mut self,
        meal: Meal,
        option_ids: &[String],
        quantity: u32,
        notes: Option<String>,
    ) -> AppResult<()> {
        if meal.provider_id != self.provider_id {
            // Cart checkouts report the mixed cart; the explicit path
            // reports the offending reference
            return Err(if self.from_cart {
                AppError::cross_provider_cart()
            } else {
                AppError::invalid_selection(format!(
                    "Meal {} does not belong to provider {}",
                    meal.id, self.provider_id
                ))
            });
        }

        match &self.currency {
            None => self.currency = Some(meal.currency.clone()),
            Some(c) if c != &meal.currency => return Err(AppError::currency_mismatch()),
            Some(_) => {}
        }

        let priced = pricing::price_selection(&meal, option_ids)?;
        let subtotal = pricing::line_total(priced.unit_price, quantity);
        self.total += subtotal;
        self.items.push(OrderItem {
            id: new_id(),
            meal_id: meal.id.clone(),
            meal_title: meal.title.clone(),
            quantity,
            unit_price: priced.unit_price,
            subtotal,
            notes,
            options: priced
                .options
                .into_iter()
                .map(|opt| OrderItemOption {
                    variant_option_id: opt.option_id,
                    variant_name: opt.variant_name,
                    option_title: opt.option_title,
                    price_delta: opt.price_delta,
                })
                .collect(),
        });

        self.needed
            .entry(meal.id.clone())
            .and_modify(|(_, qty)| *qty += quantity as i64)
            .or_insert((meal, quantity as i64));
        Ok(())
    }

    /// Stock check runs after accumulation, so several lines of the same
    /// meal are judged against their combined quantity
    fn finish(self, source_cart_id: Option<String>) -> AppResult<OrderDraft> {
        let mut meals_to_decrement = BTreeMap::new();
        for (meal_id, (meal, quantity)) in &self.needed {
            if let Some(stock) = meal.stock {
                if stock < *quantity {
                    return Err(AppError::insufficient_stock(meal_id.clone())
                        .with_detail("requested", *quantity)
                        .with_detail("available", stock));
                }
                meals_to_decrement.insert(meal_id.clone(), *quantity);
            }
        }

        // push() has run at least once on every successful path
        let currency = self
            .currency
            .ok_or_else(AppError::empty_cart)?;

        Ok(OrderDraft {
            items: self.items,
            total_amount: self.total,
            currency,
            meals_to_decrement,
            source_cart_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;
    use shared::models::{Cart, CartItem, MealVariant, MealVariantOption, ProviderProfile};
    use shared::util::now_millis;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn meal(id: &str, provider_id: &str, price: &str, currency: &str, stock: Option<i64>) -> Meal {
        Meal {
            id: id.to_string(),
            provider_id: provider_id.to_string(),
            title: format!("Meal {}", id),
            description: None,
            price: dec(price),
            currency: currency.to_string(),
            stock,
            is_active: true,
            deleted_at: None,
            variants: vec![MealVariant {
                id: format!("{}-var", id),
                name: "Size".into(),
                is_required: false,
                options: vec![MealVariantOption {
                    id: format!("{}-opt", id),
                    title: "Small".into(),
                    price_delta: dec("-2.00"),
                    is_default: false,
                }],
            }],
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    fn seed(store: &MarketStore, meals: &[Meal]) {
        let txn = store.begin_write().unwrap();
        store
            .put_provider(
                &txn,
                &ProviderProfile {
                    id: "prov-1".into(),
                    user_id: "user-p".into(),
                    name: "Bistro".into(),
                    is_verified: true,
                    created_at: now_millis(),
                },
            )
            .unwrap();
        for m in meals {
            store.put_meal(&txn, m).unwrap();
        }
        txn.commit().unwrap();
    }

    fn seed_cart(store: &MarketStore, user_id: &str, lines: &[(&str, &[&str], u32)]) -> String {
        let txn = store.begin_write().unwrap();
        let cart = Cart {
            id: format!("cart-{}", user_id),
            user_id: user_id.to_string(),
            created_at: now_millis(),
        };
        store.put_cart(&txn, &cart).unwrap();
        for (idx, (meal_id, option_ids, quantity)) in lines.iter().enumerate() {
            store
                .put_cart_item(
                    &txn,
                    &CartItem {
                        id: format!("item-{}", idx),
                        cart_id: cart.id.clone(),
                        meal_id: meal_id.to_string(),
                        option_ids: option_ids.iter().map(|s| s.to_string()).collect(),
                        quantity: *quantity,
                        created_at: now_millis(),
                        updated_at: now_millis(),
                    },
                )
                .unwrap();
        }
        txn.commit().unwrap();
        cart.id
    }

    #[test]
    fn test_cart_draft_prices_and_totals() {
        let store = MarketStore::open_in_memory().unwrap();
        seed(&store, &[meal("m1", "prov-1", "10.00", "EUR", Some(10))]);
        // base 10.00 with -2.00 option, quantity 3 => unit 8.00, total 24.00
        let cart_id = seed_cart(&store, "u1", &[("m1", &["m1-opt"], 3)]);

        let catalog = CatalogReader::new(store.clone());
        let txn = store.begin_write().unwrap();
        let draft = build_from_cart(&store, &catalog, &txn, "u1", "prov-1").unwrap();

        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].unit_price, dec("8.00"));
        assert_eq!(draft.items[0].subtotal, dec("24.00"));
        assert_eq!(draft.total_amount, dec("24.00"));
        assert_eq!(draft.currency, "EUR");
        assert_eq!(draft.meals_to_decrement.get("m1"), Some(&3));
        assert_eq!(draft.source_cart_id.as_deref(), Some(cart_id.as_str()));
    }

    #[test]
    fn test_empty_and_missing_cart() {
        let store = MarketStore::open_in_memory().unwrap();
        seed(&store, &[meal("m1", "prov-1", "10.00", "EUR", None)]);
        seed_cart(&store, "u2", &[]);
        let catalog = CatalogReader::new(store.clone());
        let txn = store.begin_write().unwrap();

        let err = build_from_cart(&store, &catalog, &txn, "u1", "prov-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
        let err = build_from_cart(&store, &catalog, &txn, "u2", "prov-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[test]
    fn test_cross_provider_and_currency_guards() {
        let store = MarketStore::open_in_memory().unwrap();
        seed(
            &store,
            &[
                meal("m1", "prov-1", "10.00", "EUR", None),
                meal("m2", "prov-2", "5.00", "EUR", None),
                meal("m3", "prov-1", "5.00", "USD", None),
            ],
        );
        let catalog = CatalogReader::new(store.clone());

        seed_cart(&store, "u1", &[("m1", &[], 1), ("m2", &[], 1)]);
        let txn = store.begin_write().unwrap();
        let err = build_from_cart(&store, &catalog, &txn, "u1", "prov-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::CrossProviderCart);
        drop(txn);

        seed_cart(&store, "u2", &[("m1", &[], 1), ("m3", &[], 1)]);
        let txn = store.begin_write().unwrap();
        let err = build_from_cart(&store, &catalog, &txn, "u2", "prov-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::CurrencyMismatch);
    }

    #[test]
    fn test_stock_checked_after_accumulation() {
        let store = MarketStore::open_in_memory().unwrap();
        // stock 2, two cart lines totalling 3 => short
        seed(&store, &[meal("m1", "prov-1", "10.00", "EUR", Some(2))]);
        seed_cart(&store, "u1", &[("m1", &["m1-opt"], 2), ("m1", &[], 1)]);

        let catalog = CatalogReader::new(store.clone());
        let txn = store.begin_write().unwrap();
        let err = build_from_cart(&store, &catalog, &txn, "u1", "prov-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let details = err.details.unwrap();
        assert_eq!(details.get("requested").unwrap(), 3);
        assert_eq!(details.get("available").unwrap(), 2);
    }

    #[test]
    fn test_unlimited_stock_not_decremented() {
        let store = MarketStore::open_in_memory().unwrap();
        seed(&store, &[meal("m1", "prov-1", "10.00", "EUR", None)]);
        seed_cart(&store, "u1", &[("m1", &[], 50)]);

        let catalog = CatalogReader::new(store.clone());
        let txn = store.begin_write().unwrap();
        let draft = build_from_cart(&store, &catalog, &txn, "u1", "prov-1").unwrap();
        assert!(draft.meals_to_decrement.is_empty());
    }

    #[test]
    fn test_explicit_items_path() {
        let store = MarketStore::open_in_memory().unwrap();
        seed(
            &store,
            &[
                meal("m1", "prov-1", "10.00", "EUR", Some(5)),
                meal("m2", "prov-2", "5.00", "EUR", None),
            ],
        );
        let catalog = CatalogReader::new(store.clone());
        let txn = store.begin_write().unwrap();

        let inputs: Vec<OrderItemInput> = serde_json::from_value(serde_json::json!([
            {"meal_id": "m1", "variant_option_ids": ["m1-opt"], "quantity": 2}
        ]))
        .unwrap();
        let draft = build_from_items(&catalog, &txn, "prov-1", &inputs).unwrap();
        assert_eq!(draft.total_amount, dec("16.00"));
        assert!(draft.source_cart_id.is_none());

        // Wrong-provider reference is an invalid selection here
        let inputs: Vec<OrderItemInput> =
            serde_json::from_value(serde_json::json!([{"meal_id": "m2"}])).unwrap();
        let err = build_from_items(&catalog, &txn, "prov-1", &inputs).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSelection);

        // Unknown meal surfaces as unavailable
        let inputs: Vec<OrderItemInput> =
            serde_json::from_value(serde_json::json!([{"meal_id": "nope"}])).unwrap();
        let err = build_from_items(&catalog, &txn, "prov-1", &inputs).unwrap_err();
        assert_eq!(err.code, ErrorCode::MealUnavailable);

        let err = build_from_items(&catalog, &txn, "prov-1", &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }
}
