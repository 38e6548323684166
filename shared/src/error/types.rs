//! Error types and the error response body

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the primary error type for the storefront, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages (shown inline to the user)
/// - Optional structured details for debugging
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create a payment processor error carrying the processor's message
    pub fn payment_provider(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PaymentProviderError, msg)
    }
}

/// Error body returned by every failing endpoint
///
/// `{ "error": "...", "code": 3002, "details": { ... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message, shown to the user as-is
    pub error: String,
    /// Numeric error code
    pub code: u16,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.message.clone(),
            code: err.code.code(),
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ErrorBody::from(&self);

        // Log system errors
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::CheckoutItemsEmpty);
        assert_eq!(err.code, ErrorCode::CheckoutItemsEmpty);
        assert_eq!(err.message, "No items provided");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::new(ErrorCode::InvalidUnitAmount)
            .with_detail("index", 2)
            .with_detail("unit_amount", 49);

        let details = err.details.unwrap();
        assert_eq!(details.get("index").unwrap(), 2);
        assert_eq!(details.get("unit_amount").unwrap(), 49);
    }

    #[test]
    fn test_app_error_convenience_constructors() {
        let err = AppError::invalid_request("Malformed session id");
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.message, "Malformed session id");

        let err = AppError::validation("Bad input");
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = AppError::payment_provider("Your card was declined");
        assert_eq!(err.code, ErrorCode::PaymentProviderError);
        assert_eq!(err.http_status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_body_serialize() {
        let err = AppError::new(ErrorCode::SessionIdMissing);
        let json = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(json["error"], "Missing session_id");
        assert_eq!(json["code"], 3004);
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::with_message(ErrorCode::DesignNotFound, "Design 7 not found");
        assert_eq!(format!("{}", err), "Design 7 not found");
    }
}
