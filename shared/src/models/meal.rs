//! Meal Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A priced option inside a variant group (e.g. "Large" in "Size")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealVariantOption {
    pub id: String,
    pub title: String,
    /// Signed price adjustment applied on top of the meal base price
    pub price_delta: Decimal,
    pub is_default: bool,
}

/// A variant group embedded in a meal (e.g. "Size", "Spice level")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealVariant {
    pub id: String,
    pub name: String,
    pub is_required: bool,
    pub options: Vec<MealVariantOption>,
}

/// Meal entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    /// Owning provider reference
    pub provider_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Base price before variant option deltas
    pub price: Decimal,
    /// ISO currency code, e.g. "EUR"
    pub currency: String,
    /// Remaining stock; None means unlimited
    pub stock: Option<i64>,
    pub is_active: bool,
    /// Soft-delete marker (UTC millis)
    pub deleted_at: Option<i64>,
    pub variants: Vec<MealVariant>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Meal {
    /// A meal can be ordered only while active and not soft-deleted
    pub fn is_available(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }

    /// Find a variant option by id together with its owning variant group
    pub fn find_option(&self, option_id: &str) -> Option<(&MealVariant, &MealVariantOption)> {
        self.variants.iter().find_map(|variant| {
            variant
                .options
                .iter()
                .find(|opt| opt.id == option_id)
                .map(|opt| (variant, opt))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn meal() -> Meal {
        Meal {
            id: "meal-1".into(),
            provider_id: "prov-1".into(),
            title: "Ramen".into(),
            description: None,
            price: dec("10.00"),
            currency: "EUR".into(),
            stock: Some(5),
            is_active: true,
            deleted_at: None,
            variants: vec![MealVariant {
                id: "var-size".into(),
                name: "Size".into(),
                is_required: false,
                options: vec![MealVariantOption {
                    id: "opt-large".into(),
                    title: "Large".into(),
                    price_delta: dec("1.50"),
                    is_default: false,
                }],
            }],
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_availability() {
        let mut m = meal();
        assert!(m.is_available());
        m.is_active = false;
        assert!(!m.is_available());
        m.is_active = true;
        m.deleted_at = Some(1);
        assert!(!m.is_available());
    }

    #[test]
    fn test_find_option() {
        let m = meal();
        let (variant, option) = m.find_option("opt-large").unwrap();
        assert_eq!(variant.id, "var-size");
        assert_eq!(option.title, "Large");
        assert!(m.find_option("opt-missing").is_none());
    }
}
