//! Pricing Engine
//!
//! Computes unit prices from a meal's base price plus the signed deltas of
//! the selected variant options, and validates the selection against the
//! meal's variant groups. Pure arithmetic over `Decimal`; negative results
//! are returned as-is, not clamped.

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};
use shared::models::Meal;
use std::collections::HashSet;

/// A validated option selection with its pricing context
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedOption {
    pub variant_id: String,
    pub variant_name: String,
    pub option_id: String,
    pub option_title: String,
    pub price_delta: Decimal,
}

/// Result of pricing one meal selection
#[derive(Debug, Clone)]
pub struct PricedSelection {
    pub base_price: Decimal,
    pub options_delta: Decimal,
    /// base_price + options_delta
    pub unit_price: Decimal,
    pub options: Vec<SelectedOption>,
}

/// Validate a normalized option id set against a meal and price it.
///
/// Fails with `InvalidSelection` when an id does not belong to any variant
/// of the meal, or when two ids land in the same variant group.
pub fn price_selection(meal: &Meal, option_ids: &[String]) -> AppResult<PricedSelection> {
    let mut seen_variants: HashSet<&str> = HashSet::new();
    let mut options = Vec::with_capacity(option_ids.len());
    let mut options_delta = Decimal::ZERO;

    for option_id in option_ids {
        let (variant, option) = meal.find_option(option_id).ok_or_else(|| {
            AppError::invalid_selection(format!(
                "Option {} does not belong to meal {}",
                option_id, meal.id
            ))
            .with_detail("meal_id", meal.id.clone())
            .with_detail("variant_option_id", option_id.clone())
        })?;

        if !seen_variants.insert(variant.id.as_str()) {
            return Err(AppError::invalid_selection(format!(
                "Multiple options selected for variant {}",
                variant.name
            ))
            .with_detail("variant_id", variant.id.clone()));
        }

        options_delta += option.price_delta;
        options.push(SelectedOption {
            variant_id: variant.id.clone(),
            variant_name: variant.name.clone(),
            option_id: option.id.clone(),
            option_title: option.title.clone(),
            price_delta: option.price_delta,
        });
    }

    Ok(PricedSelection {
        base_price: meal.price,
        options_delta,
        unit_price: meal.price + options_delta,
        options,
    })
}

/// Line total for a priced unit
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}
