//! Cart assembly
//!
//! The cart holds at most one custom coffee line and one variety box line;
//! adding either replaces the existing line of the same kind in place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::Allocation;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{
    BoxConfig, Customization, DesignConfig, LineKind, OrderItem, RoasterSelection,
};
use crate::pricing;

pub const CUSTOM_COFFEE_ITEM_ID: &str = "custom-single-serve-coffee";
pub const CUSTOM_COFFEE_ITEM_NAME: &str = "Fully Customized Single Serve Coffees";
pub const VARIETY_BOX_ID_PREFIX: &str = "variety-boxes-";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<OrderItem>,
}

impl Cart {
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn find(&self, id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of all line totals
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Add a line, replacing any existing line of the same kind
    ///
    /// Lines without a customization are matched by id instead.
    pub fn upsert(&mut self, item: OrderItem) {
        let kind = item.kind();
        let existing = self.items.iter_mut().find(|current| match kind {
            LineKind::Other => current.id == item.id,
            _ => current.kind() == kind,
        });

        match existing {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, id: &str) -> AppResult<OrderItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::CartItemNotFound).with_detail("id", id.to_string())
            })?;
        Ok(self.items.remove(index))
    }

    /// Change a line's quantity; zero or negative removes the line
    ///
    /// Custom coffee and variety box lines are priced as a whole and only
    /// ever hold quantity 1.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> AppResult<()> {
        if quantity <= 0 {
            self.remove(id)?;
            return Ok(());
        }

        let quantity = u32::try_from(quantity).map_err(|_| {
            AppError::new(ErrorCode::ValueOutOfRange).with_detail("quantity", quantity)
        })?;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::CartItemNotFound).with_detail("id", id.to_string())
            })?;
        if item.kind() != LineKind::Other && quantity != 1 {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "This item is priced as a whole and cannot change quantity",
            )
            .with_detail("id", id.to_string())
            .with_detail("quantity", quantity));
        }
        item.quantity = quantity;
        Ok(())
    }
}

/// Total coffee units across all designs
pub fn total_coffee_units(designs: &[DesignConfig]) -> u64 {
    designs.iter().map(|d| u64::from(d.quantity)).sum()
}

/// Build the aggregate custom coffee line
///
/// Price is the sum over designs of `quantity * unit_price_with_discount`.
pub fn custom_coffee_item(designs: &[DesignConfig]) -> AppResult<OrderItem> {
    if designs.is_empty() {
        return Err(AppError::new(ErrorCode::NoDesigns));
    }

    let mut price = Decimal::ZERO;
    for design in designs {
        let line = pricing::coffee_line_total(design.quantity, design.uses_vanity_coffee())
            .map_err(|e| e.with_detail("design_number", design.design_number))?;
        price += line;
    }

    Ok(OrderItem {
        id: CUSTOM_COFFEE_ITEM_ID.to_string(),
        name: CUSTOM_COFFEE_ITEM_NAME.to_string(),
        price,
        quantity: 1,
        customization: Some(Customization::CustomCoffee {
            designs: designs.len() as u32,
            design_configs: designs.to_vec(),
        }),
    })
}

/// Build the aggregate variety box line
///
/// Rejected when the designs hold fewer units than the boxes need, or when
/// the per-box allocation does not fill the pack.
pub fn variety_box_item(
    designs: &[DesignConfig],
    box_config: &BoxConfig,
    allocation: &Allocation,
) -> AppResult<OrderItem> {
    box_config.validate()?;

    let available = total_coffee_units(designs);
    let needed = box_config.units_needed();
    if available < needed {
        return Err(AppError::new(ErrorCode::InsufficientCoffeeUnits)
            .with_detail("available", available)
            .with_detail("needed", needed));
    }

    if !allocation.can_fulfill(box_config) {
        return Err(AppError::with_message(
            ErrorCode::AllocationIncomplete,
            format!(
                "You need {} units per box but only allocated {}",
                box_config.pack_size,
                allocation.total_per_box()
            ),
        ));
    }

    let price = pricing::box_line_total(box_config.quantity, box_config.pack_size)?;

    Ok(OrderItem {
        id: format!(
            "{VARIETY_BOX_ID_PREFIX}{}pack-{}",
            box_config.pack_size, box_config.box_type
        ),
        name: format!(
            "{}-Pack Variety Boxes ({})",
            box_config.pack_size, box_config.box_type
        ),
        price,
        quantity: 1,
        customization: Some(Customization::VarietyBoxes {
            designs: designs.len() as u32,
            pack_size: box_config.pack_size,
            box_type: box_config.box_type,
            quantity_per_design: box_config.quantity,
            roaster_selections: designs
                .iter()
                .map(|d| RoasterSelection {
                    design_number: d.design_number,
                    roaster: d.coffee.roaster().to_string(),
                    coffee_selection: d.coffee.selection().to_string(),
                })
                .collect(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoxType, CoffeeChoice};

    fn two_designs() -> Vec<DesignConfig> {
        vec![
            DesignConfig::new(1).with_quantity(2000),
            DesignConfig::new(2).with_quantity(2000),
        ]
    }

    #[test]
    fn test_custom_coffee_price() {
        let mut designs = two_designs();
        designs[1].coffee = CoffeeChoice::Vanity {
            name: "Sold Blend".into(),
        };
        let item = custom_coffee_item(&designs).unwrap();

        // 2000 * 1.40 + 2000 * 1.30
        assert_eq!(item.price, Decimal::new(540_000, 2));
        assert_eq!(item.id, CUSTOM_COFFEE_ITEM_ID);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.kind(), LineKind::CustomCoffee);
    }

    #[test]
    fn test_custom_coffee_requires_designs() {
        assert_eq!(
            custom_coffee_item(&[]).unwrap_err().code,
            ErrorCode::NoDesigns
        );
    }

    #[test]
    fn test_custom_coffee_rejects_below_minimum() {
        let designs = vec![DesignConfig::new(1).with_quantity(200)];
        let err = custom_coffee_item(&designs).unwrap_err();
        assert_eq!(err.code, ErrorCode::QuantityBelowMinimum);
        assert_eq!(err.details.unwrap().get("design_number").unwrap(), 1);
    }

    #[test]
    fn test_variety_box_example() {
        let designs = two_designs();
        let config = BoxConfig::default();
        let allocation = Allocation::even_split(&designs, &config);
        let item = variety_box_item(&designs, &config, &allocation).unwrap();

        assert_eq!(item.price, Decimal::new(43_400, 2));
        assert_eq!(item.id, "variety-boxes-4pack-individual");
        assert_eq!(item.name, "4-Pack Variety Boxes (individual)");
        assert_eq!(item.kind(), LineKind::VarietyBoxes);
        match item.customization.unwrap() {
            Customization::VarietyBoxes {
                roaster_selections,
                quantity_per_design,
                ..
            } => {
                assert_eq!(roaster_selections.len(), 2);
                assert_eq!(quantity_per_design, 100);
            }
            other => panic!("unexpected customization {other:?}"),
        }
    }

    #[test]
    fn test_variety_box_insufficient_units() {
        let designs = vec![DesignConfig::new(1).with_quantity(500)];
        let config = BoxConfig {
            pack_size: 8,
            quantity: 100,
            box_type: BoxType::Brokerage,
        };
        let allocation = Allocation::even_split(&designs, &config);
        let err = variety_box_item(&designs, &config, &allocation).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientCoffeeUnits);
    }

    #[test]
    fn test_variety_box_incomplete_allocation() {
        let designs = two_designs();
        let config = BoxConfig::default();
        let allocation = Allocation::empty_for(&designs);
        let err = variety_box_item(&designs, &config, &allocation).unwrap_err();
        assert_eq!(err.code, ErrorCode::AllocationIncomplete);
    }

    #[test]
    fn test_upsert_replaces_same_kind() {
        let designs = two_designs();
        let mut cart = Cart::default();
        cart.upsert(custom_coffee_item(&designs).unwrap());

        let config = BoxConfig::default();
        let allocation = Allocation::even_split(&designs, &config);
        cart.upsert(variety_box_item(&designs, &config, &allocation).unwrap());
        assert_eq!(cart.len(), 2);

        // Different pack size produces a different id but the same slot
        let bigger = BoxConfig {
            pack_size: 6,
            ..config
        };
        let allocation = Allocation::even_split(&designs, &bigger);
        cart.upsert(variety_box_item(&designs, &bigger, &allocation).unwrap());
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[1].id, "variety-boxes-6pack-individual");

        let more = vec![DesignConfig::new(1).with_quantity(5000)];
        cart.upsert(custom_coffee_item(&more).unwrap());
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].price, Decimal::new(625_000, 2));
    }

    #[test]
    fn test_total_and_quantity_updates() {
        let mut cart = Cart::default();
        cart.upsert(OrderItem {
            id: "sample".into(),
            name: "Sample pack".into(),
            price: Decimal::new(1250, 2),
            quantity: 1,
            customization: None,
        });
        cart.upsert(custom_coffee_item(&[DesignConfig::new(1)]).unwrap());
        assert_eq!(cart.total(), Decimal::new(76_250, 2));

        cart.update_quantity("sample", 3).unwrap();
        assert_eq!(cart.total(), Decimal::new(78_750, 2));

        cart.update_quantity("sample", 0).unwrap();
        assert_eq!(cart.len(), 1);

        assert_eq!(
            cart.update_quantity("missing", 2).unwrap_err().code,
            ErrorCode::CartItemNotFound
        );
        assert_eq!(
            cart.remove("missing").unwrap_err().code,
            ErrorCode::CartItemNotFound
        );
    }

    #[test]
    fn test_composite_lines_keep_quantity_one() {
        let designs = two_designs();
        let config = BoxConfig::default();
        let allocation = Allocation::even_split(&designs, &config);
        let mut cart = Cart::default();
        cart.upsert(custom_coffee_item(&designs).unwrap());
        cart.upsert(variety_box_item(&designs, &config, &allocation).unwrap());
        let total = cart.total();

        let err = cart.update_quantity(CUSTOM_COFFEE_ITEM_ID, 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        let err = cart
            .update_quantity("variety-boxes-4pack-individual", 2)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(cart.total(), total);

        cart.update_quantity(CUSTOM_COFFEE_ITEM_ID, 1).unwrap();
        assert_eq!(cart.find(CUSTOM_COFFEE_ITEM_ID).unwrap().quantity, 1);

        cart.update_quantity(CUSTOM_COFFEE_ITEM_ID, 0).unwrap();
        assert!(cart.find(CUSTOM_COFFEE_ITEM_ID).is_none());
        assert_eq!(cart.len(), 1);
    }
}
