//! Unified error codes for the marketplace order core
//!
//! This module defines all error codes used across the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Cart and order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Customer role required
    CustomerRequired = 2002,
    /// Provider role required
    ProviderRequired = 2003,

    // ==================== 4xxx: Cart / Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Cart item not found
    CartItemNotFound = 4002,
    /// Cart is empty
    EmptyCart = 4003,
    /// Quantity must be a positive integer
    InvalidQuantity = 4004,
    /// Variant option selection is invalid for the target meal
    InvalidSelection = 4005,
    /// Cart items span more than one provider
    CrossProviderCart = 4006,
    /// Cart items span more than one currency
    CurrencyMismatch = 4007,
    /// Order status transition is not allowed
    InvalidTransition = 4008,

    // ==================== 5xxx: Payment ====================
    /// Payment method is not supported
    UnsupportedPaymentMethod = 5001,

    // ==================== 6xxx: Catalog ====================
    /// Meal not found
    MealNotFound = 6001,
    /// Meal is not available for ordering
    MealUnavailable = 6002,
    /// Not enough stock to satisfy the requested quantity
    InsufficientStock = 6003,
    /// Provider not found
    ProviderNotFound = 6101,
    /// Delivery address not found
    AddressNotFound = 6201,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Write transaction conflict, retryable
    TransactionConflict = 9003,
    /// Write transaction exceeded its deadline, retryable
    TransactionTimeout = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Check if the operation that produced this code may be retried
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::TransactionConflict | ErrorCode::TransactionTimeout
        )
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "Caller is not authenticated",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::CustomerRequired => "Customer role is required",
            ErrorCode::ProviderRequired => "Provider role is required",

            // Cart / Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::EmptyCart => "Cart is empty",
            ErrorCode::InvalidQuantity => "Quantity must be a positive integer",
            ErrorCode::InvalidSelection => "Invalid variant option selection",
            ErrorCode::CrossProviderCart => "Cart items belong to different providers",
            ErrorCode::CurrencyMismatch => "Cart items are priced in different currencies",
            ErrorCode::InvalidTransition => "Order status transition is not allowed",

            // Payment
            ErrorCode::UnsupportedPaymentMethod => "Payment method is not supported",

            // Catalog
            ErrorCode::MealNotFound => "Meal not found",
            ErrorCode::MealUnavailable => "Meal is not available",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ProviderNotFound => "Provider not found",
            ErrorCode::AddressNotFound => "Delivery address not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TransactionConflict => "Write transaction conflict, please retry",
            ErrorCode::TransactionTimeout => "Write transaction timed out, please retry",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::CustomerRequired),
            2003 => Ok(ErrorCode::ProviderRequired),

            // Cart / Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::CartItemNotFound),
            4003 => Ok(ErrorCode::EmptyCart),
            4004 => Ok(ErrorCode::InvalidQuantity),
            4005 => Ok(ErrorCode::InvalidSelection),
            4006 => Ok(ErrorCode::CrossProviderCart),
            4007 => Ok(ErrorCode::CurrencyMismatch),
            4008 => Ok(ErrorCode::InvalidTransition),

            // Payment
            5001 => Ok(ErrorCode::UnsupportedPaymentMethod),

            // Catalog
            6001 => Ok(ErrorCode::MealNotFound),
            6002 => Ok(ErrorCode::MealUnavailable),
            6003 => Ok(ErrorCode::InsufficientStock),
            6101 => Ok(ErrorCode::ProviderNotFound),
            6201 => Ok(ErrorCode::AddressNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::TransactionConflict),
            9004 => Ok(ErrorCode::TransactionTimeout),
            9005 => Ok(ErrorCode::ConfigError),

            other => Err(InvalidErrorCode(other)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::EmptyCart.code(), 4003);
        assert_eq!(ErrorCode::UnsupportedPaymentMethod.code(), 5001);
        assert_eq!(ErrorCode::MealNotFound.code(), 6001);
        assert_eq!(ErrorCode::TransactionConflict.code(), 9003);
    }

    #[test]
    fn test_roundtrip_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::NotAuthenticated,
            ErrorCode::PermissionDenied,
            ErrorCode::OrderNotFound,
            ErrorCode::CartItemNotFound,
            ErrorCode::InvalidQuantity,
            ErrorCode::InvalidSelection,
            ErrorCode::CrossProviderCart,
            ErrorCode::CurrencyMismatch,
            ErrorCode::InvalidTransition,
            ErrorCode::UnsupportedPaymentMethod,
            ErrorCode::MealNotFound,
            ErrorCode::MealUnavailable,
            ErrorCode::InsufficientStock,
            ErrorCode::ProviderNotFound,
            ErrorCode::AddressNotFound,
            ErrorCode::TransactionConflict,
            ErrorCode::TransactionTimeout,
        ] {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw).unwrap(), code);
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(ErrorCode::try_from(12345), Err(InvalidErrorCode(12345)));
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::TransactionConflict.is_retryable());
        assert!(ErrorCode::TransactionTimeout.is_retryable());
        assert!(!ErrorCode::InsufficientStock.is_retryable());
        assert!(!ErrorCode::DatabaseError.is_retryable());
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "6003");
        let code: ErrorCode = serde_json::from_str("4008").unwrap();
        assert_eq!(code, ErrorCode::InvalidTransition);
    }
}
