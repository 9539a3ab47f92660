//! Utility module
//!
//! Re-exports the unified error types from `shared` alongside logging
//! helpers, so handlers only import from one place.

pub mod logger;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
