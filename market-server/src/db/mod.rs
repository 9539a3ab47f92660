//! Database layer

pub mod store;

pub use store::{MarketStore, StoreError, StoreResult};

use shared::error::AppError;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // A failed commit rolled everything back; the caller may retry
            StoreError::Commit(_) => AppError::transaction_conflict(err.to_string()),
            _ => AppError::database(err.to_string()),
        }
    }
}
