use std::collections::BTreeMap;

use aquifer_core::{
    Fraction, NonNegative, Param, StrictlyPositive,
    units::{self, EnergyIntensity, UnitError},
};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::{CapitalCostFunction, CostingError};

const ENERGY_KEY: &str = "energy_electric_flow_vol_inlet";
const CAPITAL_COST_KEY: &str = "specific_capital_cost_flow_vol_inlet";
const RECOVERY_KEY: &str = "recovery_frac_mass_H2O";
const DEFAULT_REMOVAL_KEY: &str = "default_removal_frac_mass_solute";
const REMOVAL_KEY: &str = "removal_frac_mass_solute";

const CAPITAL_COST_KEYS: [&str; 4] = [
    "cap_basis_par",
    "flow_basis_par",
    "cap_exp_par",
    "reference_year",
];

/// A removal fraction for one solute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalParameter {
    pub value: f64,
    pub units: String,

    /// Human-readable solute name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Parameters of the power-law capital cost curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificCapitalCost {
    /// Descriptive text only; the curve is always the power law.
    #[serde(default)]
    pub cost_function_form: String,
    pub cap_basis_par: Param,
    pub flow_basis_par: Param,
    pub cap_exp_par: Param,
    pub reference_year: u16,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The techno-economic parameters of one unit process, as stored on disk.
///
/// Every numeric field carries a unit string. Keys not modeled here are kept
/// in `extra` so a table survives a load and save unchanged.
///
/// # Example
///
/// ```
/// use aquifer_costing::TechnoEconomicTable;
///
/// let table = TechnoEconomicTable::from_yaml_str(
///     "bioreactor",
///     "
/// energy_electric_flow_vol_inlet: {value: 0, units: kWh/m^3}
/// specific_capital_cost_flow_vol_inlet:
///   cost_function_form: cap_basis_par * (flow_vol_inlet / flow_basis_par) ** cap_exp_par
///   cap_basis_par: {value: 18.87, units: MUSD_2018}
///   flow_basis_par: {value: 4732, units: m^3/hr}
///   cap_exp_par: {value: 0.7, units: dimensionless}
///   reference_year: 2018
/// recovery_frac_mass_H2O: {value: 0.97, units: dimensionless}
/// default_removal_frac_mass_solute: {value: 0, units: dimensionless}
/// removal_frac_mass_solute:
///   boron: {value: 0.8, units: dimensionless, name: Boron}
/// ",
/// )
/// .unwrap();
///
/// let parameters = table.parameters().unwrap();
/// assert_eq!(parameters.removal_fraction("boron").get(), 0.8);
/// assert_eq!(parameters.removal_fraction("arsenic").get(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnoEconomicTable {
    pub energy_electric_flow_vol_inlet: Param,

    pub specific_capital_cost_flow_vol_inlet: SpecificCapitalCost,

    #[serde(rename = "recovery_frac_mass_H2O")]
    pub recovery_frac_mass_h2o: Param,

    pub default_removal_frac_mass_solute: Param,

    #[serde(default)]
    pub removal_frac_mass_solute: BTreeMap<String, RemovalParameter>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TechnoEconomicTable {
    /// Top-level keys every table must define.
    pub const REQUIRED_KEYS: [&'static str; 5] = [
        ENERGY_KEY,
        CAPITAL_COST_KEY,
        RECOVERY_KEY,
        DEFAULT_REMOVAL_KEY,
        REMOVAL_KEY,
    ];

    /// Parses and validates a table from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`CostingError::Yaml`] if the text is malformed, or any
    /// validation error from [`TechnoEconomicTable::from_value`].
    pub fn from_yaml_str(technology: &str, text: &str) -> Result<Self, CostingError> {
        let value = serde_yaml::from_str(text).map_err(|source| CostingError::Yaml {
            technology: technology.to_owned(),
            source,
        })?;
        Self::from_value(technology, value)
    }

    /// Builds and validates a table from a parsed YAML value.
    ///
    /// # Errors
    ///
    /// - [`CostingError::MissingKey`] if a required key is absent.
    /// - [`CostingError::Yaml`] if a field has the wrong shape.
    /// - Any error from [`TechnoEconomicTable::parameters`].
    pub fn from_value(technology: &str, value: Value) -> Result<Self, CostingError> {
        if let Some(mapping) = value.as_mapping() {
            require_keys(mapping, &Self::REQUIRED_KEYS, "")?;
            if let Some(cost) = mapping.get(CAPITAL_COST_KEY).and_then(Value::as_mapping) {
                require_keys(cost, &CAPITAL_COST_KEYS, CAPITAL_COST_KEY)?;
            }
        }

        let table: Self = serde_yaml::from_value(value).map_err(|source| CostingError::Yaml {
            technology: technology.to_owned(),
            source,
        })?;
        table.parameters()?;
        Ok(table)
    }

    /// Converts the table into typed, validated parameters.
    ///
    /// # Errors
    ///
    /// - [`CostingError::UnitMismatch`] if a unit is unknown or of the wrong dimension.
    /// - [`CostingError::OutOfRange`] if the recovery or a removal fraction is outside `[0, 1]`.
    /// - [`CostingError::NotPositive`] if `cap_basis_par` or `flow_basis_par` is
    ///   not strictly positive and finite.
    /// - [`CostingError::NotFinite`] if `cap_exp_par` is infinite or `NaN`.
    /// - [`CostingError::Negative`] if the electricity intensity is negative.
    pub fn parameters(&self) -> Result<UnitParameters, CostingError> {
        let energy = &self.energy_electric_flow_vol_inlet;
        let energy_intensity = units::energy_intensity(energy.value, &energy.units)
            .map_err(unit_mismatch(ENERGY_KEY))?;
        let energy_intensity = NonNegative::new(energy_intensity)
            .map_err(|source| CostingError::Negative {
                key: ENERGY_KEY.to_owned(),
                source,
            })?
            .into_inner();

        let recovery = &self.recovery_frac_mass_h2o;
        let recovery_frac_mass_h2o = fraction(RECOVERY_KEY, recovery.value, &recovery.units)?;
        let default_removal = &self.default_removal_frac_mass_solute;
        let default_removal_frac_mass_solute =
            fraction(DEFAULT_REMOVAL_KEY, default_removal.value, &default_removal.units)?;

        let removal_frac_mass_solute = self
            .removal_frac_mass_solute
            .iter()
            .map(|(solute, removal)| {
                let key = format!("{REMOVAL_KEY}.{solute}");
                let value = fraction(&key, removal.value, &removal.units)?;
                Ok::<_, CostingError>((solute.clone(), value))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(UnitParameters {
            energy_intensity,
            capital_cost: self.capital_cost_function()?,
            recovery_frac_mass_h2o,
            default_removal_frac_mass_solute,
            removal_frac_mass_solute,
        })
    }

    fn capital_cost_function(&self) -> Result<CapitalCostFunction, CostingError> {
        let cost = &self.specific_capital_cost_flow_vol_inlet;
        let key = |field: &str| format!("{CAPITAL_COST_KEY}.{field}");

        let currency = units::currency(&cost.cap_basis_par.units)
            .map_err(unit_mismatch(&key("cap_basis_par")))?;
        let cap_basis = StrictlyPositive::new(cost.cap_basis_par.value).map_err(|source| {
            CostingError::NotPositive {
                key: key("cap_basis_par"),
                source,
            }
        })?;

        let flow = units::volume_rate(cost.flow_basis_par.value, &cost.flow_basis_par.units)
            .map_err(unit_mismatch(&key("flow_basis_par")))?;
        let flow_basis = StrictlyPositive::new(flow).map_err(|source| CostingError::NotPositive {
            key: key("flow_basis_par"),
            source,
        })?;

        units::dimensionless(&cost.cap_exp_par.units).map_err(unit_mismatch(&key("cap_exp_par")))?;
        if !cost.cap_exp_par.value.is_finite() {
            return Err(CostingError::NotFinite {
                key: key("cap_exp_par"),
                value: cost.cap_exp_par.value,
            });
        }

        if currency.year != cost.reference_year {
            warn!(
                currency = %currency,
                reference_year = cost.reference_year,
                "capital cost currency year differs from reference year"
            );
        }

        Ok(CapitalCostFunction::new(
            cap_basis,
            currency,
            flow_basis,
            cost.cap_exp_par.value,
        ))
    }
}

/// Typed parameters of one unit process.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitParameters {
    /// Electricity used per volume of inlet flow.
    pub energy_intensity: EnergyIntensity,
    pub capital_cost: CapitalCostFunction,
    pub recovery_frac_mass_h2o: Fraction,
    pub default_removal_frac_mass_solute: Fraction,
    pub removal_frac_mass_solute: BTreeMap<String, Fraction>,
}

impl UnitParameters {
    /// Returns the removal fraction listed for `solute`, if any.
    #[must_use]
    pub fn listed_removal(&self, solute: &str) -> Option<Fraction> {
        self.removal_frac_mass_solute.get(solute).copied()
    }

    /// Returns the removal fraction for `solute`, falling back to the default.
    #[must_use]
    pub fn removal_fraction(&self, solute: &str) -> Fraction {
        self.listed_removal(solute)
            .unwrap_or(self.default_removal_frac_mass_solute)
    }
}

fn require_keys(mapping: &Mapping, keys: &[&str], parent: &str) -> Result<(), CostingError> {
    match keys.iter().find(|key| !mapping.contains_key(**key)) {
        Some(key) if parent.is_empty() => Err(CostingError::MissingKey {
            key: (*key).to_owned(),
        }),
        Some(key) => Err(CostingError::MissingKey {
            key: format!("{parent}.{key}"),
        }),
        None => Ok(()),
    }
}

fn unit_mismatch(key: &str) -> impl FnOnce(UnitError) -> CostingError + '_ {
    move |source| CostingError::UnitMismatch {
        key: key.to_owned(),
        source,
    }
}

fn fraction(key: &str, value: f64, unit: &str) -> Result<Fraction, CostingError> {
    units::dimensionless(unit).map_err(unit_mismatch(key))?;
    Fraction::new(value).map_err(|_| CostingError::OutOfRange {
        key: key.to_owned(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use aquifer_core::ConstraintError;
    use uom::si::{pressure::pascal, volume_rate::cubic_meter_per_hour};

    const BIOREACTOR: &str = include_str!("../data/bioreactor.yaml");

    fn bioreactor_value() -> Value {
        serde_yaml::from_str(BIOREACTOR).unwrap()
    }

    #[test]
    fn loads_bioreactor_table() {
        let table = TechnoEconomicTable::from_yaml_str("bioreactor", BIOREACTOR).unwrap();
        assert_eq!(table.removal_frac_mass_solute["boron"].name.as_deref(), Some("Boron"));
        assert!(table.extra.is_empty());

        let parameters = table.parameters().unwrap();
        assert_eq!(parameters.recovery_frac_mass_h2o.get(), 0.97);
        assert_eq!(parameters.removal_fraction("selenium").get(), 0.965);
        assert_eq!(parameters.removal_fraction("foo"), Fraction::ZERO);
        assert_eq!(parameters.listed_removal("foo"), None);
        assert_relative_eq!(parameters.energy_intensity.get::<pascal>(), 0.0);
        assert_relative_eq!(
            parameters.capital_cost.flow_basis().get::<cubic_meter_per_hour>(),
            4732.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn missing_top_level_key() {
        let mut value = bioreactor_value();
        value.as_mapping_mut().unwrap().remove(RECOVERY_KEY);

        let err = TechnoEconomicTable::from_value("bioreactor", value).unwrap_err();
        assert!(matches!(err, CostingError::MissingKey { ref key } if key == RECOVERY_KEY));
    }

    #[test]
    fn missing_nested_key() {
        let mut value = bioreactor_value();
        value[CAPITAL_COST_KEY]
            .as_mapping_mut()
            .unwrap()
            .remove("flow_basis_par");

        let err = TechnoEconomicTable::from_value("bioreactor", value).unwrap_err();
        assert!(matches!(
            err,
            CostingError::MissingKey { ref key }
                if key == "specific_capital_cost_flow_vol_inlet.flow_basis_par"
        ));
    }

    #[test]
    fn wrong_units_are_rejected() {
        let mut value = bioreactor_value();
        value[ENERGY_KEY]["units"] = Value::from("m^3/hr");

        let err = TechnoEconomicTable::from_value("bioreactor", value).unwrap_err();
        assert!(matches!(
            err,
            CostingError::UnitMismatch {
                source: UnitError::Mismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn fractions_must_lie_in_unit_interval() {
        let mut value = bioreactor_value();
        value[REMOVAL_KEY]["boron"]["value"] = Value::from(1.2);

        let err = TechnoEconomicTable::from_value("bioreactor", value).unwrap_err();
        assert!(matches!(
            err,
            CostingError::OutOfRange { ref key, value }
                if key == "removal_frac_mass_solute.boron" && value == 1.2
        ));

        let mut value = bioreactor_value();
        value[RECOVERY_KEY]["value"] = Value::from(-0.1);
        assert!(matches!(
            TechnoEconomicTable::from_value("bioreactor", value),
            Err(CostingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn cost_bases_must_be_positive() {
        for field in ["cap_basis_par", "flow_basis_par"] {
            let mut value = bioreactor_value();
            value[CAPITAL_COST_KEY][field]["value"] = Value::from(0.0);

            let err = TechnoEconomicTable::from_value("bioreactor", value).unwrap_err();
            assert!(
                matches!(err, CostingError::NotPositive { ref key, .. } if key.ends_with(field)),
                "{field}"
            );
        }
    }

    #[test]
    fn cost_bases_must_be_finite() {
        let mut value = bioreactor_value();
        value[CAPITAL_COST_KEY]["cap_basis_par"]["value"] = Value::from(f64::INFINITY);

        let err = TechnoEconomicTable::from_value("bioreactor", value).unwrap_err();
        assert!(matches!(
            err,
            CostingError::NotPositive {
                source: ConstraintError::Infinite,
                ..
            }
        ));
    }

    #[test]
    fn cost_exponent_must_be_finite() {
        let mut value = bioreactor_value();
        value[CAPITAL_COST_KEY]["cap_exp_par"]["value"] = Value::from(f64::NAN);

        let err = TechnoEconomicTable::from_value("bioreactor", value).unwrap_err();
        assert!(matches!(
            err,
            CostingError::NotFinite { ref key, .. }
                if key == "specific_capital_cost_flow_vol_inlet.cap_exp_par"
        ));
    }

    #[test]
    fn energy_intensity_must_not_be_negative() {
        let mut value = bioreactor_value();
        value[ENERGY_KEY]["value"] = Value::from(-0.5);

        let err = TechnoEconomicTable::from_value("bioreactor", value).unwrap_err();
        assert!(matches!(
            err,
            CostingError::Negative {
                ref key,
                source: ConstraintError::Negative,
            } if key == ENERGY_KEY
        ));
    }

    #[test]
    fn nested_unknown_keys_are_kept() {
        let mut value = bioreactor_value();
        value[CAPITAL_COST_KEY]
            .as_mapping_mut()
            .unwrap()
            .insert("notes".into(), "2018 vendor quote".into());
        value[REMOVAL_KEY]["boron"]
            .as_mapping_mut()
            .unwrap()
            .insert("cas".into(), "7440-42-8".into());
        value[RECOVERY_KEY]
            .as_mapping_mut()
            .unwrap()
            .insert("source".into(), "pilot".into());

        let table = TechnoEconomicTable::from_value("bioreactor", value).unwrap();
        let cost = &table.specific_capital_cost_flow_vol_inlet;
        assert_eq!(cost.extra["notes"], Value::from("2018 vendor quote"));
        assert_eq!(
            table.removal_frac_mass_solute["boron"].extra["cas"],
            Value::from("7440-42-8")
        );
        assert_eq!(table.recovery_frac_mass_h2o.extra["source"], Value::from("pilot"));

        let text = serde_yaml::to_string(&table).unwrap();
        let reloaded = TechnoEconomicTable::from_yaml_str("bioreactor", &text).unwrap();
        assert_eq!(table, reloaded);
    }

    #[test]
    fn unknown_keys_are_kept() {
        let mut value = bioreactor_value();
        value
            .as_mapping_mut()
            .unwrap()
            .insert("notes".into(), "pilot-scale data".into());

        let table = TechnoEconomicTable::from_value("bioreactor", value).unwrap();
        assert_eq!(table.extra["notes"], Value::from("pilot-scale data"));

        let text = serde_yaml::to_string(&table).unwrap();
        assert!(text.contains("notes: pilot-scale data"));
    }
}
