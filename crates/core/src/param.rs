use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// A numeric value paired with its unit string, as stored in data files.
///
/// Keys other than `value` and `units` are kept in `extra` so a document
/// survives a load and save unchanged.
///
/// # Example
///
/// ```
/// use aquifer_core::Param;
///
/// let mw: Param = serde_yaml::from_str("{value: 18.0153, units: g/mol, source: CRC}").unwrap();
/// assert_eq!(mw.value, 18.0153);
/// assert_eq!(mw.units, "g/mol");
/// assert!(mw.extra.contains_key("source"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub value: f64,
    pub units: String,

    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Param {
    /// Creates a parameter from a value and a unit string.
    pub fn new(value: f64, units: impl Into<String>) -> Self {
        Self {
            value,
            units: units.into(),
            extra: BTreeMap::new(),
        }
    }
}
