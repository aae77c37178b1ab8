use std::collections::{BTreeMap, BTreeSet};

use aquifer_core::units;
use serde::{Deserialize, Serialize};
use uom::si::{
    f64::ThermodynamicTemperature, molar_energy::joule_per_mole,
    molar_heat_capacity::joule_per_kelvin_mole, thermodynamic_temperature::kelvin,
};

use crate::{EdbError, Param, ParameterValue, Phase, RecordKind};

/// Molar gas constant in J/(mol·K).
const GAS_CONSTANT: f64 = 8.314_462_618;

fn default_equilibrium_constant() -> String {
    "van_t_hoff".into()
}

fn default_equilibrium_form() -> String {
    "log_power_law_equil".into()
}

/// Reference data for an equilibrium reaction.
///
/// `k_eq_ref` may be omitted when `ds_rxn_ref` is given; the reference
/// constant is then derived from the Gibbs energy of reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionParameters {
    pub dh_rxn_ref: Param,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds_rxn_ref: Option<Param>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k_eq_ref: Option<Param>,

    #[serde(rename = "T_eq_ref")]
    pub t_eq_ref: Param,

    /// Any further reaction-specific parameters.
    #[serde(flatten)]
    pub extra: BTreeMap<String, ParameterValue>,
}

/// An equilibrium reaction document.
///
/// Stoichiometric coefficients are negative for reactants and positive for
/// products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub name: String,

    pub stoichiometry: BTreeMap<Phase, BTreeMap<String, f64>>,

    #[serde(default = "default_equilibrium_constant")]
    pub equilibrium_constant: String,

    #[serde(default = "default_equilibrium_form")]
    pub equilibrium_form: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration_form: Option<String>,

    pub parameter_data: ReactionParameters,
}

impl ReactionRecord {
    /// Returns every species named in the stoichiometry, across all phases.
    #[must_use]
    pub fn species(&self) -> BTreeSet<&str> {
        self.stoichiometry
            .values()
            .flat_map(|coefficients| coefficients.keys().map(String::as_str))
            .collect()
    }

    /// Returns every phase used by the stoichiometry.
    #[must_use]
    pub fn phases(&self) -> BTreeSet<Phase> {
        self.stoichiometry
            .iter()
            .filter(|(_, coefficients)| !coefficients.is_empty())
            .map(|(phase, _)| *phase)
            .collect()
    }

    /// Returns `true` if the stoichiometry mentions `species` in any phase.
    #[must_use]
    pub fn involves(&self, species: &str) -> bool {
        self.stoichiometry
            .values()
            .any(|coefficients| coefficients.contains_key(species))
    }

    /// Evaluates the equilibrium constant at `temperature` with the van 't Hoff
    /// equation, `ln K = ln K_ref − ΔH/R·(1/T − 1/T_ref)`.
    ///
    /// When `k_eq_ref` is absent, `ln K_ref = −(ΔH − T_ref·ΔS)/(R·T_ref)`.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::Unit`] if a reference parameter has the wrong unit,
    /// or [`EdbError::InvalidRecord`] if neither `k_eq_ref` nor `ds_rxn_ref`
    /// is available or the reference constant is not positive.
    pub fn equilibrium_constant(
        &self,
        temperature: ThermodynamicTemperature,
    ) -> Result<f64, EdbError> {
        let data = &self.parameter_data;
        let dh = units::molar_energy(data.dh_rxn_ref.value, &data.dh_rxn_ref.units)?
            .get::<joule_per_mole>();
        let t_ref = units::temperature(data.t_eq_ref.value, &data.t_eq_ref.units)?.get::<kelvin>();

        let ln_k_ref = match (&data.k_eq_ref, &data.ds_rxn_ref) {
            (Some(k), _) if k.value > 0.0 => k.value.ln(),
            (Some(k), _) => {
                return Err(EdbError::invalid(
                    RecordKind::Reaction,
                    &self.name,
                    format!("k_eq_ref must be positive, got {}", k.value),
                ));
            }
            (None, Some(ds)) => {
                let ds = units::molar_entropy(ds.value, &ds.units)?.get::<joule_per_kelvin_mole>();
                -(dh - t_ref * ds) / (GAS_CONSTANT * t_ref)
            }
            (None, None) => {
                return Err(EdbError::invalid(
                    RecordKind::Reaction,
                    &self.name,
                    "needs k_eq_ref or ds_rxn_ref",
                ));
            }
        };

        let t = temperature.get::<kelvin>();
        Ok((ln_k_ref - dh / GAS_CONSTANT * (1.0 / t - 1.0 / t_ref)).exp())
    }

    pub(crate) fn validate(&self) -> Result<(), EdbError> {
        let invalid = |reason: String| EdbError::invalid(RecordKind::Reaction, &self.name, reason);

        if self.species().is_empty() {
            return Err(invalid("stoichiometry is empty".into()));
        }
        for (phase, coefficients) in &self.stoichiometry {
            for (species, nu) in coefficients {
                if !nu.is_finite() || *nu == 0.0 {
                    return Err(invalid(format!(
                        "coefficient of `{species}` in {phase} must be finite and non-zero"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Selects reactions by the components and phases of a system.
///
/// By default a reaction matches only if every species in its stoichiometry
/// is one of the query's components and every phase it uses is one of the
/// allowed phases (all phases when none are given).
///
/// # Example
///
/// ```
/// use aquifer_edb::{Phase, ReactionQuery};
///
/// let query = ReactionQuery::new(["H2O", "H_+", "OH_-"]).phases([Phase::Liq]);
/// assert!(query.allows_phase(Phase::Liq));
/// assert!(!query.allows_phase(Phase::Sol));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReactionQuery {
    components: BTreeSet<String>,
    phases: Option<BTreeSet<Phase>>,
    any_components: bool,
    names: Option<BTreeSet<String>>,
}

impl ReactionQuery {
    /// Creates a query over the given component names, allowing all phases.
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Restricts matching reactions to those using only these phases.
    #[must_use]
    pub fn phases(self, phases: impl IntoIterator<Item = Phase>) -> Self {
        Self {
            phases: Some(phases.into_iter().collect()),
            ..self
        }
    }

    /// When `true`, a reaction matches if it involves at least one of the
    /// components, instead of requiring all its species to be listed.
    #[must_use]
    pub fn any_components(self, any_components: bool) -> Self {
        Self {
            any_components,
            ..self
        }
    }

    /// Restricts matching reactions to the given names.
    #[must_use]
    pub fn names<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Some(names.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    /// Returns the component names of this query.
    #[must_use]
    pub fn components(&self) -> &BTreeSet<String> {
        &self.components
    }

    /// Returns `true` if reactions in `phase` may match.
    #[must_use]
    pub fn allows_phase(&self, phase: Phase) -> bool {
        self.phases.as_ref().is_none_or(|phases| phases.contains(&phase))
    }

    /// Returns `true` if `reaction` satisfies this query.
    #[must_use]
    pub fn matches(&self, reaction: &ReactionRecord) -> bool {
        if let Some(names) = &self.names {
            if !names.contains(&reaction.name) {
                return false;
            }
        }

        if !reaction.phases().into_iter().all(|phase| self.allows_phase(phase)) {
            return false;
        }

        let species = reaction.species();
        if self.any_components {
            species.iter().any(|s| self.components.contains(*s))
        } else {
            species.iter().all(|s| self.components.contains(*s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn water_dissociation() -> ReactionRecord {
        serde_yaml::from_str(
            "
name: H2O_Kw
stoichiometry:
  Liq: {H2O: -1, H_+: 1, OH_-: 1}
concentration_form: moleFraction
parameter_data:
  dh_rxn_ref: {value: 55.83, units: kJ/mol}
  ds_rxn_ref: {value: -80.7, units: J/mol/K}
  k_eq_ref: {value: 3.28e-18, units: dimensionless}
  T_eq_ref: {value: 298, units: K}
",
        )
        .unwrap()
    }

    fn calcium_hydroxide_solubility() -> ReactionRecord {
        serde_yaml::from_str(
            "
name: CaOH2_Ksp
stoichiometry:
  Liq: {Ca_2+: 1, OH_-: 2}
  Sol: {'Ca[OH]2': -1}
equilibrium_form: log_solubility_product
parameter_data:
  dh_rxn_ref: {value: -16.73, units: kJ/mol}
  k_eq_ref: {value: 5.5e-6, units: dimensionless}
  T_eq_ref: {value: 298, units: K}
",
        )
        .unwrap()
    }

    #[test]
    fn defaults_fill_model_choices() {
        let kw = water_dissociation();
        assert_eq!(kw.equilibrium_constant, "van_t_hoff");
        assert_eq!(kw.equilibrium_form, "log_power_law_equil");
        assert!(kw.parameter_data.extra.is_empty());
        assert!(kw.validate().is_ok());
    }

    #[test]
    fn species_and_phases_span_all_phases() {
        let ksp = calcium_hydroxide_solubility();
        assert_eq!(
            ksp.species().into_iter().collect::<Vec<_>>(),
            ["Ca[OH]2", "Ca_2+", "OH_-"]
        );
        assert_eq!(
            ksp.phases().into_iter().collect::<Vec<_>>(),
            [Phase::Liq, Phase::Sol]
        );
        assert!(ksp.involves("Ca[OH]2"));
        assert!(!ksp.involves("H2O"));
    }

    #[test]
    fn query_requires_both_subsets() {
        let ksp = calcium_hydroxide_solubility();
        let components = ["H2O", "Ca[OH]2", "H_+", "OH_-", "Ca_2+"];

        let liq_sol = ReactionQuery::new(components).phases([Phase::Liq, Phase::Sol]);
        assert!(liq_sol.matches(&ksp));

        let liq = ReactionQuery::new(components).phases([Phase::Liq]);
        assert!(!liq.matches(&ksp));

        let missing_solid = ReactionQuery::new(["Ca_2+", "OH_-"]);
        assert!(!missing_solid.matches(&ksp));
        assert!(missing_solid.clone().any_components(true).matches(&ksp));
    }

    #[test]
    fn query_name_filter() {
        let kw = water_dissociation();
        let query = ReactionQuery::new(["H2O", "H_+", "OH_-"]);
        assert!(query.clone().names(["H2O_Kw"]).matches(&kw));
        assert!(!query.names(["CaOH2_Ksp"]).matches(&kw));
    }

    #[test]
    fn equilibrium_constant_at_reference_temperature() {
        let kw = water_dissociation();
        let t_ref = ThermodynamicTemperature::new::<kelvin>(298.0);
        assert_relative_eq!(
            kw.equilibrium_constant(t_ref).unwrap(),
            3.28e-18,
            max_relative = 1e-12
        );
    }

    #[test]
    fn endothermic_constant_grows_with_temperature() {
        let kw = water_dissociation();
        let k_25 = kw
            .equilibrium_constant(ThermodynamicTemperature::new::<kelvin>(298.0))
            .unwrap();
        let k_50 = kw
            .equilibrium_constant(ThermodynamicTemperature::new::<kelvin>(323.0))
            .unwrap();

        let expected = (-55_830.0 / GAS_CONSTANT * (1.0 / 323.0 - 1.0 / 298.0)).exp();
        assert_relative_eq!(k_50 / k_25, expected, max_relative = 1e-10);
        assert!(k_50 > k_25);
    }

    #[test]
    fn reference_constant_from_gibbs_energy() {
        let mut kw = water_dissociation();
        kw.parameter_data.k_eq_ref = None;

        let k = kw
            .equilibrium_constant(ThermodynamicTemperature::new::<kelvin>(298.0))
            .unwrap();
        let expected = (-(55_830.0 - 298.0 * -80.7) / (GAS_CONSTANT * 298.0)).exp();
        assert_relative_eq!(k, expected, max_relative = 1e-12);

        kw.parameter_data.ds_rxn_ref = None;
        assert!(matches!(
            kw.equilibrium_constant(ThermodynamicTemperature::new::<kelvin>(298.0)),
            Err(EdbError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn rejects_empty_or_zero_stoichiometry() {
        let mut kw = water_dissociation();
        kw.stoichiometry
            .get_mut(&Phase::Liq)
            .unwrap()
            .insert("H2O".into(), 0.0);
        assert!(kw.validate().is_err());

        kw.stoichiometry.clear();
        assert!(kw.validate().is_err());
    }
}
