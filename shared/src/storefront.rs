//! Storefront state and its reducer
//!
//! One checkout session's worth of state. Every change goes through
//! [`StorefrontState::reduce`], which returns a new state and leaves the
//! current state untouched, so a rejected action needs no rollback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::allocation::{Allocation, AllocationSummary};
use crate::cart::{self, Cart};
use crate::checkout::CreateSessionRequest;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::box_config::{validate_box_quantity, validate_pack_size};
use crate::models::design::{MAX_DESIGNS, validate_design_quantity};
use crate::models::{
    AssetRef, BoxConfig, BoxType, ClientField, ClientInfo, CoffeeChoice, DesignConfig,
    DesignTextField,
};

/// A user action against the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SetDesignCount {
        count: u32,
    },
    SetDesignQuantity {
        design_number: u32,
        quantity: u32,
    },
    SetCoffeeChoice {
        design_number: u32,
        coffee: CoffeeChoice,
    },
    SetDesignText {
        design_number: u32,
        field: DesignTextField,
        value: String,
    },
    AddAsset {
        design_number: u32,
        asset: AssetRef,
    },
    RemoveAsset {
        design_number: u32,
        asset_id: String,
    },
    SetPackSize {
        pack_size: u32,
    },
    SetBoxQuantity {
        quantity: u32,
    },
    SetBoxType {
        box_type: BoxType,
    },
    SetAllocation {
        design_number: u32,
        units_per_box: u32,
    },
    EvenSplit,
    AddCustomCoffeeToCart,
    AddBoxesToCart,
    RemoveFromCart {
        id: String,
    },
    UpdateCartQuantity {
        id: String,
        quantity: i64,
    },
    SetClientField {
        field: ClientField,
        value: String,
    },
    SetOrderNotes {
        notes: String,
    },
    AddOrderAsset {
        asset: AssetRef,
    },
    RemoveOrderAsset {
        asset_id: String,
    },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontState {
    pub designs: Vec<DesignConfig>,
    pub box_config: BoxConfig,
    pub allocation: Allocation,
    pub cart: Cart,
    #[serde(default)]
    pub client: ClientInfo,
    #[serde(default)]
    pub order_notes: String,
    /// Files attached to the order as a whole rather than to one design
    #[serde(default)]
    pub order_assets: Vec<AssetRef>,
}

impl Default for StorefrontState {
    fn default() -> Self {
        let designs = vec![DesignConfig::new(1)];
        Self {
            allocation: Allocation::empty_for(&designs),
            designs,
            box_config: BoxConfig::default(),
            cart: Cart::default(),
            client: ClientInfo::default(),
            order_notes: String::new(),
            order_assets: Vec::new(),
        }
    }
}

impl StorefrontState {
    /// Apply `action`, returning the next state
    pub fn reduce(&self, action: Action) -> AppResult<Self> {
        let mut next = self.clone();

        match action {
            Action::SetDesignCount { count } => {
                if !(1..=MAX_DESIGNS).contains(&count) {
                    return Err(AppError::with_message(
                        ErrorCode::ValueOutOfRange,
                        format!("Design count must be between 1 and {MAX_DESIGNS}"),
                    )
                    .with_detail("count", count));
                }
                next.designs = (1..=count)
                    .map(|n| {
                        self.design(n)
                            .cloned()
                            .unwrap_or_else(|| DesignConfig::new(n))
                    })
                    .collect();
                next.reconcile_allocation();
            }
            Action::SetDesignQuantity {
                design_number,
                quantity,
            } => {
                validate_design_quantity(quantity)?;
                next.design_mut(design_number)?.quantity = quantity;
                next.reconcile_allocation();
            }
            Action::SetCoffeeChoice {
                design_number,
                coffee,
            } => {
                next.design_mut(design_number)?.coffee = coffee;
            }
            Action::SetDesignText {
                design_number,
                field,
                value,
            } => {
                next.design_mut(design_number)?.text.set(field, value);
            }
            Action::AddAsset {
                design_number,
                asset,
            } => {
                next.design_mut(design_number)?.assets.push(asset);
            }
            Action::RemoveAsset {
                design_number,
                asset_id,
            } => {
                let design = next.design_mut(design_number)?;
                remove_asset(&mut design.assets, asset_id)?;
            }
            Action::SetPackSize { pack_size } => {
                validate_pack_size(pack_size)?;
                next.box_config.pack_size = pack_size;
                next.reconcile_allocation();
            }
            Action::SetBoxQuantity { quantity } => {
                validate_box_quantity(quantity)?;
                next.box_config.quantity = quantity;
                next.reconcile_allocation();
            }
            Action::SetBoxType { box_type } => {
                next.box_config.box_type = box_type;
            }
            Action::SetAllocation {
                design_number,
                units_per_box,
            } => {
                self.design(design_number).ok_or_else(|| design_not_found(design_number))?;
                next.allocation = self.allocation.set_units(
                    &self.designs,
                    &self.box_config,
                    design_number,
                    units_per_box,
                );
            }
            Action::EvenSplit => {
                next.allocation = Allocation::even_split(&self.designs, &self.box_config);
            }
            Action::AddCustomCoffeeToCart => {
                let item = cart::custom_coffee_item(&self.designs)?;
                next.cart.upsert(item);
            }
            Action::AddBoxesToCart => {
                let item =
                    cart::variety_box_item(&self.designs, &self.box_config, &self.allocation)?;
                next.cart.upsert(item);
            }
            Action::RemoveFromCart { id } => {
                next.cart.remove(&id)?;
            }
            Action::UpdateCartQuantity { id, quantity } => {
                next.cart.update_quantity(&id, quantity)?;
            }
            Action::SetClientField { field, value } => {
                next.client.set(field, value);
            }
            Action::SetOrderNotes { notes } => {
                next.order_notes = notes;
            }
            Action::AddOrderAsset { asset } => {
                next.order_assets.push(asset);
            }
            Action::RemoveOrderAsset { asset_id } => {
                remove_asset(&mut next.order_assets, asset_id)?;
            }
            Action::Reset => {
                next = Self::default();
            }
        }

        Ok(next)
    }

    pub fn design(&self, design_number: u32) -> Option<&DesignConfig> {
        self.designs.iter().find(|d| d.design_number == design_number)
    }

    fn design_mut(&mut self, design_number: u32) -> AppResult<&mut DesignConfig> {
        self.designs
            .iter_mut()
            .find(|d| d.design_number == design_number)
            .ok_or_else(|| design_not_found(design_number))
    }

    fn reconcile_allocation(&mut self) {
        self.allocation = self.allocation.reconcile(&self.designs, &self.box_config);
    }

    pub fn total_coffee_units(&self) -> u64 {
        cart::total_coffee_units(&self.designs)
    }

    pub fn allocation_summary(&self) -> AllocationSummary {
        self.allocation.summary(&self.designs, &self.box_config)
    }

    /// Checkout request for the current cart, validated
    pub fn checkout_request(
        &self,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AppResult<CreateSessionRequest> {
        let request = CreateSessionRequest::from_cart(&self.cart, success_url, cancel_url, now)
            .with_order_details(&self.order_notes, &self.order_assets);
        request.validate()?;
        Ok(request)
    }
}

fn design_not_found(design_number: u32) -> AppError {
    AppError::with_message(
        ErrorCode::DesignNotFound,
        format!("Design {design_number} not found"),
    )
    .with_detail("design_number", design_number)
}

fn remove_asset(assets: &mut Vec<AssetRef>, asset_id: String) -> AppResult<()> {
    let before = assets.len();
    assets.retain(|a| a.id != asset_id);
    if assets.len() == before {
        return Err(AppError::new(ErrorCode::AssetNotFound).with_detail("asset_id", asset_id));
    }
    Ok(())
}
