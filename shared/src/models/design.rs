//! Custom coffee design model

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};

/// Lowest orderable quantity per design (first price tier)
pub const MIN_DESIGN_QUANTITY: u32 = 500;
/// Highest orderable quantity per design
pub const MAX_DESIGN_QUANTITY: u32 = 5000;
/// Maximum number of designs in one order
pub const MAX_DESIGNS: u32 = 20;

/// Where the coffee inside a design comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoffeeChoice {
    /// Coffee sourced from a named external roaster
    Roaster { roaster: String, selection: String },
    /// House-branded vanity coffee (discounted per unit)
    Vanity { name: String },
}

impl Default for CoffeeChoice {
    fn default() -> Self {
        Self::Roaster {
            roaster: String::new(),
            selection: String::new(),
        }
    }
}

impl CoffeeChoice {
    pub fn is_vanity(&self) -> bool {
        matches!(self, Self::Vanity { .. })
    }

    /// Roaster name, empty for vanity coffee
    pub fn roaster(&self) -> &str {
        match self {
            Self::Roaster { roaster, .. } => roaster,
            Self::Vanity { .. } => "",
        }
    }

    /// Coffee selection (or vanity coffee name)
    pub fn selection(&self) -> &str {
        match self {
            Self::Roaster { selection, .. } => selection,
            Self::Vanity { name } => name,
        }
    }

    /// Short label used in allocation breakdowns
    pub fn label(&self) -> String {
        match self {
            Self::Vanity { name } if name.is_empty() => "Vanity Coffee".to_string(),
            Self::Vanity { name } => format!("Vanity Coffee: {name}"),
            Self::Roaster { roaster, .. } if roaster.is_empty() => "Not selected".to_string(),
            Self::Roaster { roaster, selection } if selection.is_empty() => roaster.clone(),
            Self::Roaster { roaster, selection } => format!("{roaster} - {selection}"),
        }
    }
}

/// Editable text field on a design's packaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignTextField {
    RealtorName,
    PhoneNumber,
    Email,
    Website,
    BrokerageName,
    Tagline,
    AdditionalInfo,
}

/// Branding text printed on a design
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignText {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brokerage_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl DesignText {
    fn slot(&mut self, field: DesignTextField) -> &mut Option<String> {
        match field {
            DesignTextField::RealtorName => &mut self.realtor_name,
            DesignTextField::PhoneNumber => &mut self.phone_number,
            DesignTextField::Email => &mut self.email,
            DesignTextField::Website => &mut self.website,
            DesignTextField::BrokerageName => &mut self.brokerage_name,
            DesignTextField::Tagline => &mut self.tagline,
            DesignTextField::AdditionalInfo => &mut self.additional_info,
        }
    }

    /// Set a field; blank values clear it
    pub fn set(&mut self, field: DesignTextField, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        *self.slot(field) = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn get(&self, field: DesignTextField) -> Option<&str> {
        let value = match field {
            DesignTextField::RealtorName => &self.realtor_name,
            DesignTextField::PhoneNumber => &self.phone_number,
            DesignTextField::Email => &self.email,
            DesignTextField::Website => &self.website,
            DesignTextField::BrokerageName => &self.brokerage_name,
            DesignTextField::Tagline => &self.tagline,
            DesignTextField::AdditionalInfo => &self.additional_info,
        };
        value.as_deref()
    }
}

/// Reference to an uploaded branding asset (the file itself lives elsewhere)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: String,
    pub name: String,
    pub content_type: String,
    /// Data URL preview, images only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl AssetRef {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            content_type: content_type.into(),
            preview: None,
        }
    }
}

/// One custom coffee packaging variant within an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignConfig {
    /// Unique within an order, 1-based
    pub design_number: u32,
    /// Units ordered
    pub quantity: u32,
    #[serde(default)]
    pub coffee: CoffeeChoice,
    #[serde(default)]
    pub text: DesignText,
    #[serde(default)]
    pub assets: Vec<AssetRef>,
}

impl DesignConfig {
    pub fn new(design_number: u32) -> Self {
        Self {
            design_number,
            quantity: MIN_DESIGN_QUANTITY,
            coffee: CoffeeChoice::default(),
            text: DesignText::default(),
            assets: Vec::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn uses_vanity_coffee(&self) -> bool {
        self.coffee.is_vanity()
    }

    /// "Jane Doe Design" when a realtor name is set, otherwise "Design #n"
    pub fn display_name(&self) -> String {
        match self.text.get(DesignTextField::RealtorName) {
            Some(name) => format!("{name} Design"),
            None => format!("Design #{}", self.design_number),
        }
    }
}

/// Validate a per-design quantity against the orderable range
pub fn validate_design_quantity(quantity: u32) -> AppResult<()> {
    if quantity < MIN_DESIGN_QUANTITY {
        return Err(AppError::new(ErrorCode::QuantityBelowMinimum)
            .with_detail("quantity", quantity));
    }
    if quantity > MAX_DESIGN_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Quantity must not exceed {MAX_DESIGN_QUANTITY} units"),
        )
        .with_detail("quantity", quantity));
    }
    Ok(())
}
