//! Data-object to attribute-map conversion.
//!
//! # Responsibility
//! - Flatten a `PackOption` into a string-keyed attribute map.
//! - Rebuild a fresh record from such a map.
//!
//! # Invariants
//! - Base fields become top-level keys; extension attributes stay nested under
//!   `extension_attributes`.
//! - Converting a record to a map and back yields an equal record.

use crate::model::pack_option::PackOption;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Attribute code to value mapping for one record.
pub type AttributeMap = Map<String, Value>;

#[derive(Debug)]
pub enum ConversionError {
    /// The serialized form was not a key/value object.
    NotAnObject,
    Serde(serde_json::Error),
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "pack option did not serialize to an attribute map"),
            Self::Serde(err) => write!(f, "invalid pack option attributes: {err}"),
        }
    }
}

impl Error for ConversionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotAnObject => None,
            Self::Serde(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConversionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Flattens a data object into its attribute map.
pub fn to_attribute_map(pack_option: &PackOption) -> Result<AttributeMap, ConversionError> {
    match serde_json::to_value(pack_option)? {
        Value::Object(map) => Ok(map),
        _ => Err(ConversionError::NotAnObject),
    }
}

impl PackOption {
    /// Builds a new record instance from an attribute map.
    ///
    /// Missing optional attributes fall back to their defaults.
    pub fn from_attribute_map(attributes: AttributeMap) -> Result<Self, ConversionError> {
        Ok(serde_json::from_value(Value::Object(attributes))?)
    }
}
