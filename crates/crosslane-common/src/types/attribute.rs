//! Self-describing message attributes
//!
//! Attributes ride along with a message as key/value pairs. The relay core
//! recognizes a single well-known key, the impact classifier, which scales
//! the signature threshold; every other attribute is opaque pass-through data
//! for the destination handler.

use serde::{Deserialize, Serialize};

/// Well-known key of the impact classifier attribute
pub const IMPACT_ATTRIBUTE_KEY: &str = "impact";

/// Impact value (ASCII, case-insensitive) that signals an elevated threshold
const ELEVATED_IMPACT_VALUE: &[u8] = b"high";

/// A self-describing key/value attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: Vec<u8>,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Canonical byte encoding used by the identity hash
    ///
    /// Key and value are each length-prefixed (little-endian u64), so
    /// distinct pairs never share an encoding.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.key.len() + self.value.len());
        out.extend_from_slice(&(self.key.len() as u64).to_le_bytes());
        out.extend_from_slice(self.key.as_bytes());
        out.extend_from_slice(&(self.value.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.value);
        out
    }
}

/// Impact classification derived from message attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactClass {
    Standard,
    Elevated,
}

impl ImpactClass {
    /// Classify a raw impact attribute value
    pub fn from_value(value: &[u8]) -> Self {
        if value.eq_ignore_ascii_case(ELEVATED_IMPACT_VALUE) {
            ImpactClass::Elevated
        } else {
            ImpactClass::Standard
        }
    }
}

/// Scan attributes in order for the impact key; first match wins
pub fn classify_impact(attributes: &[Attribute]) -> ImpactClass {
    attributes
        .iter()
        .find(|attribute| attribute.key == IMPACT_ATTRIBUTE_KEY)
        .map(|attribute| ImpactClass::from_value(&attribute.value))
        .unwrap_or(ImpactClass::Standard)
}
