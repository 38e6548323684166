//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::DesignNotFound | Self::CartItemNotFound | Self::AssetNotFound => {
                StatusCode::NOT_FOUND
            }

            // 422 Unprocessable (request is well-formed but the order cannot be built)
            Self::InsufficientCoffeeUnits | Self::AllocationIncomplete | Self::NoDesigns => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 502 Bad Gateway (processor rejected or failed the call)
            Self::PaymentProviderError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient errors)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
