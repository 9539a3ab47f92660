//! Provider Model

use serde::{Deserialize, Serialize};

/// Provider profile entity
///
/// Only verified providers are visible on the public catalog path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub id: String,
    /// Backing user account
    pub user_id: String,
    pub name: String,
    pub is_verified: bool,
    pub created_at: i64,
}
