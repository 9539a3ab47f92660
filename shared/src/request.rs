//! Request payloads for the marketplace API
//!
//! Selection payloads accept either a single `variant_option_id` or a list
//! `variant_option_ids`; both are normalized into one sorted, deduplicated
//! set before any business logic runs.

use crate::models::cart::normalize_option_ids;
use serde::Deserialize;
use validator::Validate;

/// Merge the single-id and list forms of an option selection
pub fn normalize_selection(single: Option<&String>, many: Option<&Vec<String>>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    if let Some(id) = single {
        ids.push(id.clone());
    }
    if let Some(list) = many {
        ids.extend(list.iter().cloned());
    }
    normalize_option_ids(ids)
}

/// Add an item to the caller's cart
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCartItemPayload {
    #[validate(length(min = 1))]
    pub meal_id: String,
    #[serde(default)]
    pub variant_option_id: Option<String>,
    #[serde(default)]
    pub variant_option_ids: Option<Vec<String>>,
    /// Defaults to 1 when omitted
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl AddCartItemPayload {
    pub fn option_ids(&self) -> Vec<String> {
        normalize_selection(
            self.variant_option_id.as_ref(),
            self.variant_option_ids.as_ref(),
        )
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

/// Replace the quantity of a cart item
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCartItemPayload {
    pub quantity: u32,
}

/// One explicit order line for the direct (cart-less) order path
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderItemInput {
    #[validate(length(min = 1))]
    pub meal_id: String,
    #[serde(default)]
    pub variant_option_id: Option<String>,
    #[serde(default)]
    pub variant_option_ids: Option<Vec<String>>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderItemInput {
    pub fn option_ids(&self) -> Vec<String> {
        normalize_selection(
            self.variant_option_id.as_ref(),
            self.variant_option_ids.as_ref(),
        )
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

/// Place an order, either from the caller's cart or from explicit items
///
/// `payment_method` stays a raw string so unknown methods surface as a
/// domain error instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderPayload {
    #[validate(length(min = 1))]
    pub provider_id: String,
    #[validate(length(min = 1))]
    pub delivery_address_id: String,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// When present and non-empty, bypasses the cart
    #[serde(default)]
    pub items: Option<Vec<OrderItemInput>>,
}

/// Provider-side status update
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusPayload {
    pub status: crate::models::OrderStatus,
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-based, default: 1)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page (default: 20, max: 100)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationQuery {
    /// Offset of the first returned row
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit() as usize
    }

    /// Page size clamped to max 100
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, 100)
    }
}
