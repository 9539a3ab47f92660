//! Shared types for the marketplace order core
//!
//! Common types used across crates: domain models, request payloads,
//! error types, response structures, and small utilities.

pub mod error;
pub mod models;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
