//! Storefront data models

pub mod box_config;
pub mod client_info;
pub mod design;
pub mod order_item;

pub use box_config::{BoxConfig, BoxType};
pub use client_info::{ClientField, ClientInfo};
pub use design::{AssetRef, CoffeeChoice, DesignConfig, DesignText, DesignTextField};
pub use order_item::{Customization, LineKind, OrderItem, RoasterSelection};
