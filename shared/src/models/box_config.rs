//! Variety box configuration

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, AppResult, ErrorCode};

pub const MIN_PACK_SIZE: u32 = 3;
pub const MAX_PACK_SIZE: u32 = 8;
pub const MIN_BOX_QUANTITY: u32 = 100;
pub const MAX_BOX_QUANTITY: u32 = 1000;

/// Who the boxes are packed for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxType {
    #[default]
    Individual,
    Brokerage,
}

impl BoxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Brokerage => "brokerage",
        }
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variety box order: `quantity` boxes of `pack_size` units each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxConfig {
    /// Units per box
    pub pack_size: u32,
    /// Boxes ordered
    pub quantity: u32,
    #[serde(rename = "type")]
    pub box_type: BoxType,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            pack_size: 4,
            quantity: 100,
            box_type: BoxType::Individual,
        }
    }
}

impl BoxConfig {
    /// Total coffee units the box order draws from the design pool
    pub fn units_needed(&self) -> u64 {
        u64::from(self.pack_size) * u64::from(self.quantity)
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_pack_size(self.pack_size)?;
        validate_box_quantity(self.quantity)
    }
}

pub fn validate_pack_size(pack_size: u32) -> AppResult<()> {
    if !(MIN_PACK_SIZE..=MAX_PACK_SIZE).contains(&pack_size) {
        return Err(
            AppError::new(ErrorCode::PackSizeOutOfRange).with_detail("pack_size", pack_size)
        );
    }
    Ok(())
}

pub fn validate_box_quantity(quantity: u32) -> AppResult<()> {
    if !(MIN_BOX_QUANTITY..=MAX_BOX_QUANTITY).contains(&quantity) {
        return Err(
            AppError::new(ErrorCode::BoxQuantityOutOfRange).with_detail("quantity", quantity)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_box_config() {
        let config = BoxConfig::default();
        assert_eq!(config.pack_size, 4);
        assert_eq!(config.quantity, 100);
        assert_eq!(config.box_type, BoxType::Individual);
        assert_eq!(config.units_needed(), 400);
    }

    #[test]
    fn test_validate_ranges() {
        assert!(BoxConfig::default().validate().is_ok());

        let too_small = BoxConfig {
            pack_size: 2,
            ..BoxConfig::default()
        };
        assert_eq!(
            too_small.validate().unwrap_err().code,
            ErrorCode::PackSizeOutOfRange
        );

        let too_many = BoxConfig {
            quantity: 1001,
            ..BoxConfig::default()
        };
        assert_eq!(
            too_many.validate().unwrap_err().code,
            ErrorCode::BoxQuantityOutOfRange
        );
    }

    #[test]
    fn test_box_type_serde() {
        let config: BoxConfig =
            serde_json::from_str(r#"{"pack_size":6,"quantity":250,"type":"brokerage"}"#).unwrap();
        assert_eq!(config.box_type, BoxType::Brokerage);
        assert_eq!(config.box_type.to_string(), "brokerage");
    }
}
