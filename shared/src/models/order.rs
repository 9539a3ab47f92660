//! Order Model
//!
//! Orders snapshot meal titles and prices at creation time; they never
//! re-read the catalog afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status
///
/// `placed -> preparing -> ready -> delivered`, plus `placed -> cancelled`.
/// `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Statuses reachable from this one
    pub fn allowed_targets(&self) -> &'static [OrderStatus] {
        match self {
            Self::Placed => &[Self::Preparing, Self::Cancelled],
            Self::Preparing => &[Self::Ready],
            Self::Ready => &[Self::Delivered],
            Self::Delivered => &[],
            Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method; only cash on delivery is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
}

impl PaymentMethod {
    pub const CASH_ON_DELIVERY: &'static str = "cash_on_delivery";
}

/// Variant option snapshot attached to an order item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemOption {
    pub variant_option_id: String,
    pub variant_name: String,
    pub option_title: String,
    pub price_delta: Decimal,
}

/// Order line with prices frozen at creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub meal_id: String,
    pub meal_title: String,
    pub quantity: u32,
    /// base price + option deltas at order time
    pub unit_price: Decimal,
    /// unit_price * quantity
    pub subtotal: Decimal,
    pub notes: Option<String>,
    pub options: Vec<OrderItemOption>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Human-facing order number
    pub order_number: i64,
    pub user_id: String,
    pub provider_id: String,
    pub delivery_address_id: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub placed_at: i64,
    pub prepared_at: Option<i64>,
    pub ready_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub cancelled_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;
        assert!(Placed.can_transition_to(Preparing));
        assert!(Placed.can_transition_to(Cancelled));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Delivered));

        // Every other pair is illegal
        let all = [Placed, Preparing, Ready, Delivered, Cancelled];
        let legal = [
            (Placed, Preparing),
            (Placed, Cancelled),
            (Preparing, Ready),
            (Ready, Delivered),
        ];
        for from in all {
            for to in all {
                let expect = legal.contains(&(from, to));
                assert_eq!(from.can_transition_to(to), expect, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Placed.is_terminal());
        assert!(!OrderStatus::Preparing.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"preparing\""
        );
        let s: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(s, OrderStatus::Cancelled);
    }

    #[test]
    fn test_payment_method_serde() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            format!("\"{}\"", PaymentMethod::CASH_ON_DELIVERY)
        );
    }
}
