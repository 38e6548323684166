//! Shared types for the Pourta storefront
//!
//! Domain types and pure calculations used by both the storefront client
//! and the cloud checkout service: pricing, per-box allocation, cart
//! assembly, checkout payloads and the unified error system.

pub mod allocation;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod models;
pub mod pricing;
pub mod storefront;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use allocation::{Allocation, AllocationSummary, DesignAllocation, max_units_per_box};
pub use cart::Cart;
pub use checkout::{CheckoutItem, CreateSessionRequest, CreateSessionResponse};
pub use error::{AppError, AppResult, ErrorCode};
pub use storefront::{Action, StorefrontState};
