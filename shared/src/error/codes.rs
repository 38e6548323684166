//! Unified error codes for the Pourta storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Pricing errors
//! - 2xxx: Allocation and cart errors
//! - 3xxx: Checkout and payment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the storefront client
/// can match on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Pricing ====================
    /// Coffee quantity is below the lowest price tier
    QuantityBelowMinimum = 1001,
    /// Box quantity outside the priced range
    BoxQuantityOutOfRange = 1002,
    /// Pack size outside the supported range
    PackSizeOutOfRange = 1003,

    // ==================== 2xxx: Allocation / Cart ====================
    /// Design not found
    DesignNotFound = 2001,
    /// Not enough coffee units for the requested boxes
    InsufficientCoffeeUnits = 2002,
    /// Per-box allocation does not fill the pack
    AllocationIncomplete = 2003,
    /// No designs configured
    NoDesigns = 2004,
    /// Cart item not found
    CartItemNotFound = 2005,
    /// Asset not found
    AssetNotFound = 2006,

    // ==================== 3xxx: Checkout / Payment ====================
    /// No items provided for checkout
    CheckoutItemsEmpty = 3001,
    /// Unit amount below the processor minimum
    InvalidUnitAmount = 3002,
    /// Payment processor returned an error
    PaymentProviderError = 3003,
    /// Session id missing from request
    SessionIdMissing = 3004,
    /// Webhook signature could not be verified
    WebhookSignatureInvalid = 3005,
    /// Webhook payload could not be parsed
    WebhookPayloadInvalid = 3006,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Pricing
            ErrorCode::QuantityBelowMinimum => "Quantity is below the 500 unit minimum",
            ErrorCode::BoxQuantityOutOfRange => "Box quantity must be between 100 and 1000",
            ErrorCode::PackSizeOutOfRange => "Pack size must be between 3 and 8",

            // Allocation / Cart
            ErrorCode::DesignNotFound => "Design not found",
            ErrorCode::InsufficientCoffeeUnits => {
                "Insufficient coffee units for the requested boxes. Please increase your coffee order."
            }
            ErrorCode::AllocationIncomplete => "Per-box allocation does not fill the pack",
            ErrorCode::NoDesigns => "At least one design is required",
            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::AssetNotFound => "Asset not found",

            // Checkout / Payment
            ErrorCode::CheckoutItemsEmpty => "No items provided",
            ErrorCode::InvalidUnitAmount => "Invalid unit_amount (must be cents >= 50)",
            ErrorCode::PaymentProviderError => "Payment processor error",
            ErrorCode::SessionIdMissing => "Missing session_id",
            ErrorCode::WebhookSignatureInvalid => "Webhook signature verification failed",
            ErrorCode::WebhookPayloadInvalid => "Webhook payload is invalid",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
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
            2 => Ok(ErrorCode::ValidationFailed),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Pricing
            1001 => Ok(ErrorCode::QuantityBelowMinimum),
            1002 => Ok(ErrorCode::BoxQuantityOutOfRange),
            1003 => Ok(ErrorCode::PackSizeOutOfRange),

            // Allocation / Cart
            2001 => Ok(ErrorCode::DesignNotFound),
            2002 => Ok(ErrorCode::InsufficientCoffeeUnits),
            2003 => Ok(ErrorCode::AllocationIncomplete),
            2004 => Ok(ErrorCode::NoDesigns),
            2005 => Ok(ErrorCode::CartItemNotFound),
            2006 => Ok(ErrorCode::AssetNotFound),

            // Checkout / Payment
            3001 => Ok(ErrorCode::CheckoutItemsEmpty),
            3002 => Ok(ErrorCode::InvalidUnitAmount),
            3003 => Ok(ErrorCode::PaymentProviderError),
            3004 => Ok(ErrorCode::SessionIdMissing),
            3005 => Ok(ErrorCode::WebhookSignatureInvalid),
            3006 => Ok(ErrorCode::WebhookPayloadInvalid),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
