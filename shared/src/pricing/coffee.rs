//! Tiered per-unit pricing for single-serve coffee

use rust_decimal::Decimal;

use crate::error::{AppError, AppResult, ErrorCode};

use super::round_money;

/// A volume tier: quantities at or above `min_quantity` pay `unit_price`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTier {
    pub min_quantity: u32,
    pub unit_price: Decimal,
}

const fn dollars(cents: u32) -> Decimal {
    Decimal::from_parts(cents, 0, 0, false, 2)
}

/// Volume tiers, ascending by `min_quantity`; highest matching tier wins
pub const COFFEE_TIERS: [PriceTier; 6] = [
    PriceTier {
        min_quantity: 500,
        unit_price: dollars(150),
    },
    PriceTier {
        min_quantity: 1000,
        unit_price: dollars(145),
    },
    PriceTier {
        min_quantity: 2000,
        unit_price: dollars(140),
    },
    PriceTier {
        min_quantity: 3000,
        unit_price: dollars(135),
    },
    PriceTier {
        min_quantity: 4000,
        unit_price: dollars(130),
    },
    PriceTier {
        min_quantity: 5000,
        unit_price: dollars(125),
    },
];

/// Flat per-unit discount for vanity coffee
pub const VANITY_DISCOUNT: Decimal = dollars(10);

/// Price of the highest tier whose lower bound `quantity` reaches
pub fn tier_price(tiers: &[PriceTier], quantity: u32) -> Option<Decimal> {
    tiers
        .iter()
        .rev()
        .find(|tier| quantity >= tier.min_quantity)
        .map(|tier| tier.unit_price)
}

/// Check that a tier table is usable: non-empty, strictly ascending bounds,
/// and a unit price that never rises with quantity
pub fn check_tiers(tiers: &[PriceTier]) -> AppResult<()> {
    if tiers.is_empty() {
        return Err(AppError::validation("Tier table is empty"));
    }
    for pair in tiers.windows(2) {
        if pair[1].min_quantity <= pair[0].min_quantity {
            return Err(AppError::validation("Tier bounds must be strictly ascending")
                .with_detail("min_quantity", pair[1].min_quantity));
        }
        if pair[1].unit_price > pair[0].unit_price {
            return Err(AppError::validation("Tier prices must not increase with quantity")
                .with_detail("min_quantity", pair[1].min_quantity));
        }
    }
    Ok(())
}

/// Unit price for `quantity` coffees
///
/// Quantities below the first tier are rejected rather than clamped.
pub fn unit_price(quantity: u32) -> AppResult<Decimal> {
    tier_price(&COFFEE_TIERS, quantity).ok_or_else(|| {
        AppError::new(ErrorCode::QuantityBelowMinimum).with_detail("quantity", quantity)
    })
}

/// Unit price with the vanity coffee discount applied when `use_vanity` is set
pub fn unit_price_with_discount(quantity: u32, use_vanity: bool) -> AppResult<Decimal> {
    let base = unit_price(quantity)?;
    if use_vanity {
        Ok((base - VANITY_DISCOUNT).max(Decimal::ZERO))
    } else {
        Ok(base)
    }
}

/// Extended price for one design, rounded to cents
pub fn coffee_line_total(quantity: u32, use_vanity: bool) -> AppResult<Decimal> {
    let unit = unit_price_with_discount(quantity, use_vanity)?;
    Ok(round_money(unit * Decimal::from(quantity)))
}
