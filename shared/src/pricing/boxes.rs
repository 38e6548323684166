//! Variety box pricing
//!
//! Linear interpolation from $4.50/box at 100 boxes down to $2.35/box at
//! 1000 boxes, then $0.04 off per unit below a full 8-pack, floored at $0.50.

use rust_decimal::Decimal;

use crate::error::AppResult;
use crate::models::box_config::{
    MAX_BOX_QUANTITY, MAX_PACK_SIZE, MIN_BOX_QUANTITY, validate_box_quantity, validate_pack_size,
};

use super::round_money;

const PRICE_AT_MAX_QUANTITY: Decimal = Decimal::from_parts(235, 0, 0, false, 2);
const PRICE_AT_MIN_QUANTITY: Decimal = Decimal::from_parts(450, 0, 0, false, 2);
const PACK_SIZE_STEP: Decimal = Decimal::from_parts(4, 0, 0, false, 2);
const PRICE_FLOOR: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// Per-box price for `quantity` boxes of `pack_size` units
///
/// Both arguments must be inside the orderable ranges (100..=1000 boxes,
/// 3..=8 units); anything else is rejected.
pub fn box_unit_price(quantity: u32, pack_size: u32) -> AppResult<Decimal> {
    validate_box_quantity(quantity)?;
    validate_pack_size(pack_size)?;

    let ratio = Decimal::from(MAX_BOX_QUANTITY - quantity)
        / Decimal::from(MAX_BOX_QUANTITY - MIN_BOX_QUANTITY);
    let base = PRICE_AT_MAX_QUANTITY + (PRICE_AT_MIN_QUANTITY - PRICE_AT_MAX_QUANTITY) * ratio;
    let adjustment = PACK_SIZE_STEP * Decimal::from(MAX_PACK_SIZE - pack_size);

    Ok((base - adjustment).max(PRICE_FLOOR))
}

/// Extended price for the whole box order, rounded to cents
pub fn box_line_total(quantity: u32, pack_size: u32) -> AppResult<Decimal> {
    let unit = box_unit_price(quantity, pack_size)?;
    Ok(round_money(unit * Decimal::from(quantity)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_endpoints_full_pack() {
        assert_eq!(box_unit_price(100, 8).unwrap(), Decimal::new(450, 2));
        assert_eq!(box_unit_price(1000, 8).unwrap(), Decimal::new(235, 2));
    }

    #[test]
    fn test_midpoint() {
        // Halfway: 2.35 + 2.15 / 2 = 3.425
        assert_eq!(box_unit_price(550, 8).unwrap(), Decimal::new(3425, 3));
    }

    #[test]
    fn test_pack_size_adjustment() {
        assert_eq!(box_unit_price(100, 4).unwrap(), Decimal::new(434, 2));
        assert_eq!(box_unit_price(100, 3).unwrap(), Decimal::new(430, 2));
        assert_eq!(box_unit_price(1000, 7).unwrap(), Decimal::new(231, 2));
    }

    #[test]
    fn test_strictly_decreasing_in_quantity() {
        for pack_size in 3..=8 {
            let mut previous = box_unit_price(100, pack_size).unwrap();
            for quantity in (150..=1000).step_by(50) {
                let price = box_unit_price(quantity, pack_size).unwrap();
                assert!(price < previous, "pack {pack_size} quantity {quantity}");
                previous = price;
            }
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(box_line_total(100, 4).unwrap(), Decimal::new(43_400, 2));
        assert_eq!(box_line_total(1000, 8).unwrap(), Decimal::new(235_000, 2));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            box_unit_price(99, 4).unwrap_err().code,
            ErrorCode::BoxQuantityOutOfRange
        );
        assert_eq!(
            box_unit_price(1001, 4).unwrap_err().code,
            ErrorCode::BoxQuantityOutOfRange
        );
        assert_eq!(
            box_unit_price(500, 9).unwrap_err().code,
            ErrorCode::PackSizeOutOfRange
        );
        assert_eq!(
            box_unit_price(500, 2).unwrap_err().code,
            ErrorCode::PackSizeOutOfRange
        );
    }
}
