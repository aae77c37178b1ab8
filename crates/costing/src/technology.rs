use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::{CostingError, TechnoEconomicTable};

/// Name of the subtype used when none is requested.
pub const DEFAULT_SUBTYPE: &str = "default";

/// All parameter tables for one technology, keyed by subtype.
///
/// A technology file holds either a single flat table, which becomes the
/// `default` subtype, or a map from subtype name to table that must include
/// `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct Technology {
    name: String,
    subtypes: BTreeMap<String, TechnoEconomicTable>,
    flat: bool,
}

impl Technology {
    /// Parses a technology file.
    ///
    /// # Errors
    ///
    /// Returns [`CostingError::Yaml`] if the text is malformed,
    /// [`CostingError::MissingKey`] if a subtype map has no `default` entry,
    /// or any error from validating a table.
    pub fn from_yaml_str(name: &str, text: &str) -> Result<Self, CostingError> {
        let value: Value = serde_yaml::from_str(text).map_err(|source| CostingError::Yaml {
            technology: name.to_owned(),
            source,
        })?;

        match value.as_mapping() {
            Some(mapping) if is_subtype_map(mapping) => {
                let subtypes = mapping
                    .iter()
                    .map(|(subtype, table)| {
                        let subtype = subtype.as_str().unwrap_or_default().to_owned();
                        let table = TechnoEconomicTable::from_value(name, table.clone())?;
                        Ok::<_, CostingError>((subtype, table))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()?;

                if !subtypes.contains_key(DEFAULT_SUBTYPE) {
                    return Err(CostingError::MissingKey {
                        key: DEFAULT_SUBTYPE.to_owned(),
                    });
                }
                Ok(Self {
                    name: name.to_owned(),
                    subtypes,
                    flat: false,
                })
            }
            _ => Ok(Self {
                name: name.to_owned(),
                subtypes: BTreeMap::from([(
                    DEFAULT_SUBTYPE.to_owned(),
                    TechnoEconomicTable::from_value(name, value)?,
                )]),
                flat: true,
            }),
        }
    }

    /// Returns the technology name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the subtype names, in order.
    pub fn subtypes(&self) -> impl Iterator<Item = &str> {
        self.subtypes.keys().map(String::as_str)
    }

    /// Returns the table for `subtype`, or the default table when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CostingError::UnknownSubtype`] if the subtype is not defined.
    pub fn table(&self, subtype: Option<&str>) -> Result<&TechnoEconomicTable, CostingError> {
        let subtype = subtype.unwrap_or(DEFAULT_SUBTYPE);
        self.subtypes
            .get(subtype)
            .ok_or_else(|| CostingError::UnknownSubtype {
                technology: self.name.clone(),
                subtype: subtype.to_owned(),
            })
    }

    /// Serializes the technology back to YAML in the shape it was read from.
    ///
    /// # Errors
    ///
    /// Returns [`CostingError::Yaml`] if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, CostingError> {
        let text = match self.subtypes.get(DEFAULT_SUBTYPE) {
            Some(table) if self.flat => serde_yaml::to_string(table),
            _ => serde_yaml::to_string(&self.subtypes),
        };
        text.map_err(|source| CostingError::Yaml {
            technology: self.name.clone(),
            source,
        })
    }
}

/// A mapping is a subtype map when it defines none of the table keys and
/// every entry is itself a mapping.
fn is_subtype_map(mapping: &Mapping) -> bool {
    !mapping.is_empty()
        && !TechnoEconomicTable::REQUIRED_KEYS
            .iter()
            .any(|key| mapping.contains_key(*key))
        && mapping
            .iter()
            .all(|(key, value)| key.is_string() && value.is_mapping())
}
