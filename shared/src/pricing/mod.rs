//! Pricing engine
//!
//! Pure functions, no state. All arithmetic uses `rust_decimal`; unit prices
//! are kept exact and only line totals are rounded to cents.

pub mod boxes;
pub mod coffee;

pub use boxes::{box_line_total, box_unit_price};
pub use coffee::{
    COFFEE_TIERS, PriceTier, VANITY_DISCOUNT, coffee_line_total, unit_price,
    unit_price_with_discount,
};

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Round a dollar amount to cents
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a dollar amount to integer cents (rounded half-up)
#[inline]
pub fn to_minor_units(value: Decimal) -> i64 {
    (round_money(value) * Decimal::ONE_HUNDRED)
        .to_i64()
        .unwrap_or_default()
}
