use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    ComponentKind, ComponentRecord, EdbError, Param, ParameterValue, Phase, PhasePair, PhaseType,
    ReactionParameters, ReactionRecord, RecordKind,
};

/// Phase-equilibrium formulation assigned to each component of a base that
/// declares phases in equilibrium.
const PHASE_EQUILIBRIUM_FORM: &str = "fugacity";

/// Units of the base dimensions used by a property package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUnits {
    pub time: String,
    pub length: String,
    pub mass: String,
    pub amount: String,
    pub temperature: String,
}

impl Default for BaseUnits {
    fn default() -> Self {
        Self {
            time: "s".into(),
            length: "m".into(),
            mass: "kg".into(),
            amount: "mol".into(),
            temperature: "K".into(),
        }
    }
}

/// The type and equation of state of one phase in a thermo base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    #[serde(rename = "type")]
    pub phase_type: PhaseType,
    pub equation_of_state: String,
}

/// Lower, nominal, and upper values of a state variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateBound {
    pub lower: f64,
    pub nominal: f64,
    pub upper: f64,
    pub units: String,
}

/// A component as it appears in a thermo configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    #[serde(rename = "type")]
    pub kind: ComponentKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<i32>,

    #[serde(default)]
    pub valid_phase_types: BTreeSet<PhaseType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub methods: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameter_data: BTreeMap<String, ParameterValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub phase_equilibrium_form: BTreeMap<PhasePair, String>,
}

/// A reaction as it appears in a thermo or reaction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionEntry {
    pub stoichiometry: BTreeMap<Phase, BTreeMap<String, f64>>,
    pub equilibrium_constant: String,
    pub equilibrium_form: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration_form: Option<String>,

    pub parameter_data: ReactionParameters,
}

impl From<ReactionRecord> for ReactionEntry {
    fn from(record: ReactionRecord) -> Self {
        Self {
            stoichiometry: record.stoichiometry,
            equilibrium_constant: record.equilibrium_constant,
            equilibrium_form: record.equilibrium_form,
            concentration_form: record.concentration_form,
            parameter_data: record.parameter_data,
        }
    }
}

/// Configuration of a thermodynamic property package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermoConfig {
    #[serde(default)]
    pub base_units: BaseUnits,

    pub phases: BTreeMap<Phase, PhaseConfig>,

    pub state_definition: String,

    #[serde(default)]
    pub state_bounds: BTreeMap<String, StateBound>,

    pub pressure_ref: Param,

    pub temperature_ref: Param,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases_in_equilibrium: Vec<PhasePair>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub phase_equilibrium_state: BTreeMap<PhasePair, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bubble_dew_method: Option<String>,

    #[serde(default)]
    pub components: BTreeMap<String, ComponentConfig>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inherent_reactions: BTreeMap<String, ReactionEntry>,
}

/// Configuration of a reaction package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionConfig {
    #[serde(default)]
    pub base_units: BaseUnits,

    #[serde(default)]
    pub equilibrium_reactions: BTreeMap<String, ReactionEntry>,
}

/// The configuration held by a [`Base`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseConfig {
    Thermo(ThermoConfig),
    Reaction(ReactionConfig),
}

/// A record that can be merged into a [`Base`].
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Component(ComponentRecord),
    Reaction(ReactionRecord),
}

impl From<ComponentRecord> for Record {
    fn from(record: ComponentRecord) -> Self {
        Self::Component(record)
    }
}

impl From<ReactionRecord> for Record {
    fn from(record: ReactionRecord) -> Self {
        Self::Reaction(record)
    }
}

/// A named configuration template that components and reactions merge into.
///
/// Merging is keyed by record name: adding a record whose name is already
/// present replaces the earlier entry, so repeated adds never duplicate keys
/// and the final configuration does not depend on the order of adds.
///
/// # Example
///
/// ```
/// use aquifer_edb::{ComponentRecord, MemoryStore, Phase, PhasePair, Repository};
///
/// let store = MemoryStore::bootstrap().unwrap();
/// let mut base = store.find_base("thermo_Liq_Vap_FpcTP").unwrap().unwrap();
///
/// base.add(ComponentRecord::new("H2O")).unwrap();
/// base.add(ComponentRecord::new("H2O")).unwrap();
///
/// let thermo = base.thermo().unwrap();
/// assert_eq!(thermo.components.len(), 1);
///
/// let forms = &thermo.components["H2O"].phase_equilibrium_form;
/// assert_eq!(forms[&PhasePair::new(Phase::Vap, Phase::Liq)], "fugacity");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub name: String,
    pub config: BaseConfig,
}

impl Base {
    /// Creates a base from a name and configuration.
    pub fn new(name: impl Into<String>, config: BaseConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Returns the thermo configuration, if this is a thermo base.
    #[must_use]
    pub fn thermo(&self) -> Option<&ThermoConfig> {
        match &self.config {
            BaseConfig::Thermo(thermo) => Some(thermo),
            BaseConfig::Reaction(_) => None,
        }
    }

    /// Returns the reaction configuration, if this is a reaction base.
    #[must_use]
    pub fn reaction(&self) -> Option<&ReactionConfig> {
        match &self.config {
            BaseConfig::Reaction(reaction) => Some(reaction),
            BaseConfig::Thermo(_) => None,
        }
    }

    /// Merges a component or reaction record into this base.
    ///
    /// - Components go into a thermo base's `components`, gaining a
    ///   `phase_equilibrium_form` entry for every declared phase pair.
    /// - Reactions go into a thermo base's `inherent_reactions` or a reaction
    ///   base's `equilibrium_reactions`.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::IncompatibleRecord`] when adding a component to a
    /// reaction base.
    pub fn add(&mut self, record: impl Into<Record>) -> Result<(), EdbError> {
        match (&mut self.config, record.into()) {
            (BaseConfig::Thermo(thermo), Record::Component(component)) => {
                debug!(base = %self.name, component = %component.name, "adding component");
                thermo.add_component(component);
            }
            (BaseConfig::Thermo(thermo), Record::Reaction(reaction)) => {
                debug!(base = %self.name, reaction = %reaction.name, "adding inherent reaction");
                thermo
                    .inherent_reactions
                    .insert(reaction.name.clone(), reaction.into());
            }
            (BaseConfig::Reaction(config), Record::Reaction(reaction)) => {
                debug!(base = %self.name, reaction = %reaction.name, "adding equilibrium reaction");
                config
                    .equilibrium_reactions
                    .insert(reaction.name.clone(), reaction.into());
            }
            (BaseConfig::Reaction(_), Record::Component(component)) => {
                return Err(EdbError::IncompatibleRecord {
                    kind: RecordKind::Component,
                    name: component.name,
                    base: self.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Merges every record from `records`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Base::add`].
    pub fn add_all<I>(&mut self, records: I) -> Result<(), EdbError>
    where
        I: IntoIterator,
        I::Item: Into<Record>,
    {
        records.into_iter().try_for_each(|record| self.add(record))
    }

    pub(crate) fn validate(&self) -> Result<(), EdbError> {
        let invalid = |reason: String| EdbError::invalid(RecordKind::Base, &self.name, reason);

        let BaseConfig::Thermo(thermo) = &self.config else {
            return Ok(());
        };

        if thermo.phases.is_empty() {
            return Err(invalid("declares no phases".into()));
        }
        for pair in thermo
            .phases_in_equilibrium
            .iter()
            .chain(thermo.phase_equilibrium_state.keys())
        {
            if !thermo.phases.contains_key(&pair.0) || !thermo.phases.contains_key(&pair.1) {
                return Err(invalid(format!(
                    "phase pair {pair} uses a phase the base does not declare"
                )));
            }
        }
        for (variable, bound) in &thermo.state_bounds {
            if !(bound.lower <= bound.nominal && bound.nominal <= bound.upper) {
                return Err(invalid(format!(
                    "state bound `{variable}` is not ordered lower <= nominal <= upper"
                )));
            }
        }
        Ok(())
    }
}

impl ThermoConfig {
    fn add_component(&mut self, component: ComponentRecord) {
        let declared: BTreeSet<PhaseType> = self
            .phases
            .values()
            .map(|phase| phase.phase_type)
            .collect();
        if !component.valid_phase_types.is_empty()
            && component.valid_phase_types.is_disjoint(&declared)
        {
            warn!(
                component = %component.name,
                "component has no phase type declared by the base"
            );
        }

        let phase_equilibrium_form = self
            .phases_in_equilibrium
            .iter()
            .map(|pair| (*pair, PHASE_EQUILIBRIUM_FORM.to_owned()))
            .collect();

        let config = ComponentConfig {
            kind: component.kind(),
            charge: component.charge(),
            valid_phase_types: component.valid_phase_types,
            elements: component.elements,
            methods: component.methods,
            parameter_data: component.parameter_data,
            phase_equilibrium_form,
        };
        self.components.insert(component.name, config);
    }
}
