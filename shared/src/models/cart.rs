//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cart entity, created lazily on the first add
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub created_at: i64,
}

/// A line in a cart
///
/// `option_ids` is stored sorted and deduplicated; together with `meal_id`
/// it forms the merge identity of the line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub meal_id: String,
    pub option_ids: Vec<String>,
    pub quantity: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CartItem {
    /// Two lines merge when they reference the same meal with the same
    /// normalized option set
    pub fn same_selection(&self, meal_id: &str, option_ids: &[String]) -> bool {
        self.meal_id == meal_id && self.option_ids == option_ids
    }
}

/// Normalize a raw option id selection into the canonical stored form
pub fn normalize_option_ids(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = ids.into_iter().collect();
    out.sort();
    out.dedup();
    out
}

/// A cart line enriched with computed pricing for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedCartItem {
    #[serde(flatten)]
    pub item: CartItem,
    pub meal_title: String,
    pub provider_id: String,
    pub currency: String,
    pub base_price: Decimal,
    pub options_delta: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Aggregated totals over a priced cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSummary {
    pub item_count: u32,
    pub base_total: Decimal,
    pub delta_total: Decimal,
    pub subtotal: Decimal,
    /// None when items span more than one currency
    pub currency: Option<String>,
}

/// Full cart view returned by the cart API
///
/// Lines whose meal can no longer be priced (vanished, deactivated, or with
/// an option that no longer exists) are reported under `unavailable` rather
/// than dropped; they carry no pricing and do not count into the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub cart: Option<Cart>,
    pub items: Vec<PricedCartItem>,
    pub unavailable: Vec<CartItem>,
    pub summary: CartSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let ids = normalize_option_ids(vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_normalize_empty() {
        let ids = normalize_option_ids(Vec::new());
        assert!(ids.is_empty());
    }

    #[test]
    fn test_same_selection_is_order_insensitive_after_normalize() {
        let item = CartItem {
            id: "i1".into(),
            cart_id: "c1".into(),
            meal_id: "m1".into(),
            option_ids: normalize_option_ids(vec!["y".to_string(), "x".to_string()]),
            quantity: 1,
            created_at: 0,
            updated_at: 0,
        };
        let probe = normalize_option_ids(vec!["x".to_string(), "y".to_string()]);
        assert!(item.same_selection("m1", &probe));
        assert!(!item.same_selection("m2", &probe));
    }
}
