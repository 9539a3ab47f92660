//! Catalog Reader
//!
//! Read-only resolution of meals and their variant options. The public path
//! (browsing, cart adds) hides anything a customer should not see; the
//! checkout path reads through the write transaction so availability and
//! stock are judged against the state the transaction will modify.

use crate::db::MarketStore;
use redb::WriteTransaction;
use shared::error::{AppError, AppResult};
use shared::models::Meal;

#[derive(Clone)]
pub struct CatalogReader {
    store: MarketStore,
}

impl CatalogReader {
    pub fn new(store: MarketStore) -> Self {
        Self { store }
    }

    /// Resolve a meal for the public path.
    ///
    /// Inactive, soft-deleted, or unverified-provider meals are
    /// indistinguishable from missing ones here: all surface as `NotFound`.
    pub fn visible_meal(&self, meal_id: &str) -> AppResult<Meal> {
        let meal = self
            .store
            .get_meal(meal_id)?
            .filter(|m| m.is_available())
            .ok_or_else(|| AppError::not_found("Meal"))?;

        let verified = self
            .store
            .get_provider(&meal.provider_id)?
            .map(|p| p.is_verified)
            .unwrap_or(false);
        if !verified {
            return Err(AppError::not_found("Meal"));
        }
        Ok(meal)
    }

    /// Resolve a meal for checkout, inside the write transaction.
    ///
    /// A meal that vanished or went unavailable since it was carted
    /// surfaces as `MealUnavailable`.
    pub fn available_meal_txn(
        &self,
        txn: &WriteTransaction,
        meal_id: &str,
    ) -> AppResult<Meal> {
        self.store
            .get_meal_txn(txn, meal_id)?
            .filter(|m| m.is_available())
            .ok_or_else(|| AppError::meal_unavailable(meal_id))
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;
    use shared::models::{MealVariant, MealVariantOption, ProviderProfile};
    use shared::util::now_millis;

    fn store_with_catalog(verified: bool, active: bool, deleted: bool) -> MarketStore {
        let store = MarketStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store
            .put_provider(
                &txn,
                &ProviderProfile {
                    id: "prov-1".into(),
                    user_id: "user-p".into(),
                    name: "Bistro".into(),
                    is_verified: verified,
                    created_at: now_millis(),
                },
            )
            .unwrap();
        store
            .put_meal(
                &txn,
                &Meal {
                    id: "meal-1".into(),
                    provider_id: "prov-1".into(),
                    title: "Soup".into(),
                    description: None,
                    price: "4.00".parse().unwrap(),
                    currency: "EUR".into(),
                    stock: None,
                    is_active: active,
                    deleted_at: deleted.then(now_millis),
                    variants: vec![MealVariant {
                        id: "var-1".into(),
                        name: "Size".into(),
                        is_required: false,
                        options: vec![MealVariantOption {
                            id: "opt-1".into(),
                            title: "Large".into(),
                            price_delta: "1.00".parse().unwrap(),
                            is_default: false,
                        }],
                    }],
                    created_at: now_millis(),
                    updated_at: now_millis(),
                },
            )
            .unwrap();
        txn.commit().unwrap();
        store
    }

    #[test]
    fn test_visible_meal_happy_path() {
        let store = store_with_catalog(true, true, false);
        let catalog = CatalogReader::new(store);
        let meal = catalog.visible_meal("meal-1").unwrap();
        assert_eq!(meal.title, "Soup");
    }

    #[test]
    fn test_visible_meal_hides_inactive_deleted_unverified() {
        for (verified, active, deleted) in [(true, false, false), (true, true, true), (false, true, false)] {
            let store = store_with_catalog(verified, active, deleted);
            let catalog = CatalogReader::new(store);
            let err = catalog.visible_meal("meal-1").unwrap_err();
            assert_eq!(err.code, ErrorCode::NotFound);
        }
    }

    #[test]
    fn test_available_meal_txn_unavailable() {
        let store = store_with_catalog(true, false, false);
        let catalog = CatalogReader::new(store.clone());
        let txn = store.begin_write().unwrap();
        let err = catalog.available_meal_txn(&txn, "meal-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::MealUnavailable);
        let err = catalog.available_meal_txn(&txn, "missing").unwrap_err();
        assert_eq!(err.code, ErrorCode::MealUnavailable);
    }
}
