//! Data models
//!
//! Shared between market-server and clients (via API).
//! All IDs are UUID v4 strings; timestamps are UTC milliseconds.

pub mod address;
pub mod cart;
pub mod meal;
pub mod order;
pub mod provider;

// Re-exports
pub use address::*;
pub use cart::*;
pub use meal::*;
pub use order::*;
pub use provider::*;
