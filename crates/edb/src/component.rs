use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{EdbError, ParameterValue, PhaseType, RecordKind};

/// The role a species plays in an electrolyte system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Solvent,
    Solute,
    Cation,
    Anion,
    /// A salt or other species that dissociates into ions.
    Apparent,
}

/// A chemical species document.
///
/// The component `kind` and `charge` may be omitted from documents, in which
/// case they are inferred from the name: `H2O` is the solvent, a trailing
/// `_+`/`_2+` marks a cation and `_-`/`_2-` an anion, anything else is a
/// neutral solute.
///
/// ```
/// use aquifer_edb::{ComponentKind, ComponentRecord};
///
/// let calcium = ComponentRecord::new("Ca_2+");
/// assert_eq!(calcium.kind(), ComponentKind::Cation);
/// assert_eq!(calcium.charge(), Some(2));
///
/// let carbonate = ComponentRecord::new("CO3_2-");
/// assert_eq!(carbonate.charge(), Some(-2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ComponentKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<i32>,

    #[serde(default)]
    pub valid_phase_types: BTreeSet<PhaseType>,

    /// Property name to calculation method, e.g. `dens_mol_liq_comp: Perrys`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub methods: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameter_data: BTreeMap<String, ParameterValue>,
}

impl ComponentRecord {
    /// Creates a record with only a name; everything else is empty or inferred.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            kind: None,
            charge: None,
            valid_phase_types: BTreeSet::new(),
            methods: BTreeMap::new(),
            parameter_data: BTreeMap::new(),
        }
    }

    /// Returns the declared kind, or the kind inferred from the name.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.kind.unwrap_or_else(|| match charge_from_name(&self.name) {
            Some(z) if z > 0 => ComponentKind::Cation,
            Some(_) => ComponentKind::Anion,
            None if self.name == "H2O" => ComponentKind::Solvent,
            None => ComponentKind::Solute,
        })
    }

    /// Returns the declared charge, or the charge inferred from the name.
    ///
    /// Neutral species have no charge.
    #[must_use]
    pub fn charge(&self) -> Option<i32> {
        self.charge.or_else(|| charge_from_name(&self.name))
    }

    pub(crate) fn validate(&self) -> Result<(), EdbError> {
        if self.name.trim().is_empty() {
            return Err(EdbError::invalid(
                RecordKind::Component,
                &self.name,
                "name is empty",
            ));
        }

        let is_ion = matches!(self.kind(), ComponentKind::Cation | ComponentKind::Anion);
        match (self.kind(), self.charge()) {
            (ComponentKind::Cation, Some(z)) if z <= 0 => Err(EdbError::invalid(
                RecordKind::Component,
                &self.name,
                format!("cation has non-positive charge {z}"),
            )),
            (ComponentKind::Anion, Some(z)) if z >= 0 => Err(EdbError::invalid(
                RecordKind::Component,
                &self.name,
                format!("anion has non-negative charge {z}"),
            )),
            (_, None) if is_ion => Err(EdbError::invalid(
                RecordKind::Component,
                &self.name,
                "ion has no charge",
            )),
            _ => Ok(()),
        }
    }
}

/// Parses an ionic charge suffix such as `_+`, `_2+`, `_-` or `_3-`.
fn charge_from_name(name: &str) -> Option<i32> {
    let (_, suffix) = name.rsplit_once('_')?;
    let sign = match suffix.chars().last()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let magnitude = &suffix[..suffix.len() - 1];
    let magnitude = if magnitude.is_empty() {
        1
    } else {
        magnitude.parse::<i32>().ok()?
    };
    Some(sign * magnitude)
}
