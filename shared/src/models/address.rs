//! Address Model

use serde::{Deserialize, Serialize};

/// Delivery address entity, owned by a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub user_id: String,
    pub label: Option<String>,
    pub street: String,
    pub city: String,
    pub created_at: i64,
}
