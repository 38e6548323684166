//! Cart line item model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::box_config::BoxType;
use super::design::DesignConfig;

/// Roaster snapshot per design, carried on the box line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoasterSelection {
    pub design_number: u32,
    pub roaster: String,
    pub coffee_selection: String,
}

/// Snapshot of the configuration a composite line was priced from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Customization {
    CustomCoffee {
        designs: u32,
        design_configs: Vec<DesignConfig>,
    },
    VarietyBoxes {
        designs: u32,
        pack_size: u32,
        box_type: BoxType,
        /// Boxes ordered
        quantity_per_design: u32,
        roaster_selections: Vec<RoasterSelection>,
    },
}

impl Customization {
    pub fn design_count(&self) -> u32 {
        match self {
            Self::CustomCoffee { designs, .. } | Self::VarietyBoxes { designs, .. } => *designs,
        }
    }
}

/// Which slot a line occupies in the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    CustomCoffee,
    VarietyBoxes,
    Other,
}

/// A cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    /// Extended total for the line (composite lines carry quantity 1)
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization: Option<Customization>,
}

impl OrderItem {
    pub fn kind(&self) -> LineKind {
        match self.customization {
            Some(Customization::CustomCoffee { .. }) => LineKind::CustomCoffee,
            Some(Customization::VarietyBoxes { .. }) => LineKind::VarietyBoxes,
            None => LineKind::Other,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
