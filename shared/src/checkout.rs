//! Checkout hand-off payloads
//!
//! Shared by the storefront (which builds the request from its cart) and the
//! cloud service (which validates it before calling the payment processor).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cart::Cart;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::AssetRef;
use crate::pricing::to_minor_units;
use crate::util::non_blank;

/// Processor minimum charge per unit, in cents
pub const MIN_UNIT_AMOUNT: i64 = 50;

pub const ORDER_TYPE: &str = "realtor-coffee-order";

/// Processor limit on a single metadata value, in characters
pub const MAX_METADATA_VALUE_CHARS: usize = 500;

fn default_quantity() -> u32 {
    1
}

/// One line sent to the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Price per unit in cents
    pub unit_amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub items: Vec<CheckoutItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub id: String,
}

impl CreateSessionRequest {
    /// Build the request for everything in `cart`
    pub fn from_cart(
        cart: &Cart,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|item| CheckoutItem {
                name: item.name.clone(),
                quantity: item.quantity.max(1),
                unit_amount: to_minor_units(item.price),
                description: Some(match &item.customization {
                    Some(c) => format!("{} custom design(s)", c.design_count().max(1)),
                    None => "Custom coffee product".to_string(),
                }),
            })
            .collect();

        let metadata = BTreeMap::from([
            ("orderType".to_string(), ORDER_TYPE.to_string()),
            (
                "total_cents".to_string(),
                to_minor_units(cart.total()).to_string(),
            ),
            (
                "ts".to_string(),
                now.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ]);

        Self {
            items,
            metadata: Some(metadata),
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// Attach order notes and the names of order-level assets to the metadata
    ///
    /// Client contact details stay out; the processor collects its own.
    pub fn with_order_details(mut self, notes: &str, assets: &[AssetRef]) -> Self {
        let metadata = self.metadata.get_or_insert_with(BTreeMap::new);
        if let Some(notes) = non_blank(notes) {
            metadata.insert("notes".to_string(), truncate_chars(notes));
        }
        if !assets.is_empty() {
            let names = assets
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            metadata.insert("assets".to_string(), truncate_chars(&names));
        }
        self
    }

    /// Reject the request before any external call is made
    pub fn validate(&self) -> AppResult<()> {
        if self.items.is_empty() {
            return Err(AppError::new(ErrorCode::CheckoutItemsEmpty));
        }

        for (index, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(AppError::with_message(
                    ErrorCode::RequiredField,
                    "Item name is required",
                )
                .with_detail("index", index));
            }
            if item.unit_amount < MIN_UNIT_AMOUNT {
                return Err(AppError::new(ErrorCode::InvalidUnitAmount)
                    .with_detail("index", index)
                    .with_detail("unit_amount", item.unit_amount));
            }
            if item.quantity == 0 {
                return Err(AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    "Item quantity must be at least 1",
                )
                .with_detail("index", index));
            }
        }

        if self.success_url.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "successUrl is required",
            ));
        }
        if self.cancel_url.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "cancelUrl is required",
            ));
        }

        Ok(())
    }

    /// Success URL with the processor's session placeholder appended
    pub fn success_url_with_session(&self) -> String {
        let separator = if self.success_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}session_id={{CHECKOUT_SESSION_ID}}",
            self.success_url
        )
    }
}

fn truncate_chars(value: &str) -> String {
    value.chars().take(MAX_METADATA_VALUE_CHARS).collect()
}
