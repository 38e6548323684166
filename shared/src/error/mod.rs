//! Unified error system for the Pourta storefront
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ErrorBody`]: The `{ error, code }` body every failing endpoint returns
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Pricing errors
//! - 2xxx: Allocation and cart errors
//! - 3xxx: Checkout and payment errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::InvalidUnitAmount).with_detail("index", 0);
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, 3002);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
