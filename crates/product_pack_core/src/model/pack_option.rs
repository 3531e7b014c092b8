//! Pack option domain model.
//!
//! # Responsibility
//! - Define the canonical record for one purchasable pack of a product.
//! - Provide field-level validation used by the resource layer before writes.
//!
//! # Invariants
//! - `packoption_id` is `None` until the record has been persisted.
//! - `pack_size` is strictly positive.
//! - `discount_value` is finite, non-negative and at most 100 for percentage
//!   discounts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage identifier assigned by the `pack_options` table.
pub type PackOptionId = i64;

/// Extension attribute codes mapped to their stored values.
pub type ExtensionAttributes = BTreeMap<String, String>;

/// Upper bound for percentage discounts.
pub const MAX_PERCENTAGE_DISCOUNT: f64 = 100.0;

/// How `discount_value` is applied to the pack price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Absolute amount subtracted from the pack price.
    Fixed,
    /// Percentage of the pack price.
    Percentage,
}

impl DiscountType {
    /// Stable string used in storage and search filters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Percentage => "percentage",
        }
    }

    /// Parses the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fixed" => Some(Self::Fixed),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// Validation failures for [`PackOption::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum PackOptionValidationError {
    NonPositivePackSize,
    InvalidDiscountValue(f64),
    PercentageOutOfRange(f64),
    EmptyExtensionAttributeCode,
}

impl Display for PackOptionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositivePackSize => write!(f, "pack_size must be greater than zero"),
            Self::InvalidDiscountValue(value) => {
                write!(f, "discount_value must be a non-negative number, got {value}")
            }
            Self::PercentageOutOfRange(value) => write!(
                f,
                "percentage discount_value must not exceed {MAX_PERCENTAGE_DISCOUNT}, got {value}"
            ),
            Self::EmptyExtensionAttributeCode => {
                write!(f, "extension attribute code cannot be empty")
            }
        }
    }
}

impl Error for PackOptionValidationError {}

/// One pack option offered for a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackOption {
    /// `None` for records that were never persisted.
    #[serde(default)]
    pub packoption_id: Option<PackOptionId>,
    pub product_id: i64,
    /// Units sold together in this pack.
    pub pack_size: u32,
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: f64,
    #[serde(default)]
    pub sort_order: i64,
    /// Additional fields stored outside the base table.
    #[serde(default)]
    pub extension_attributes: ExtensionAttributes,
}

impl Default for PackOption {
    fn default() -> Self {
        Self {
            packoption_id: None,
            product_id: 0,
            pack_size: 0,
            discount_type: DiscountType::Fixed,
            discount_value: 0.0,
            sort_order: 0,
            extension_attributes: ExtensionAttributes::new(),
        }
    }
}

impl PackOption {
    /// Creates an unsaved pack option without a discount.
    pub fn new(product_id: i64, pack_size: u32) -> Self {
        Self {
            product_id,
            pack_size,
            ..Self::default()
        }
    }

    /// Returns the storage identifier when the record exists.
    pub fn id(&self) -> Option<PackOptionId> {
        self.packoption_id
    }

    /// Sets a discount of the given kind.
    pub fn with_discount(mut self, discount_type: DiscountType, discount_value: f64) -> Self {
        self.discount_type = discount_type;
        self.discount_value = discount_value;
        self
    }

    /// Checks field-level invariants.
    pub fn validate(&self) -> Result<(), PackOptionValidationError> {
        if self.pack_size == 0 {
            return Err(PackOptionValidationError::NonPositivePackSize);
        }

        if !self.discount_value.is_finite() || self.discount_value < 0.0 {
            return Err(PackOptionValidationError::InvalidDiscountValue(
                self.discount_value,
            ));
        }

        if self.discount_type == DiscountType::Percentage
            && self.discount_value > MAX_PERCENTAGE_DISCOUNT
        {
            return Err(PackOptionValidationError::PercentageOutOfRange(
                self.discount_value,
            ));
        }

        if self
            .extension_attributes
            .keys()
            .any(|code| code.trim().is_empty())
        {
            return Err(PackOptionValidationError::EmptyExtensionAttributeCode);
        }

        Ok(())
    }
}
