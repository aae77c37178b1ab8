use std::collections::BTreeMap;

use aquifer_core::{Constrained, Constraint, StrictlyPositive, units};
use aquifer_edb::{ComponentRecord, ParameterValue};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uom::si::{
    diffusion_coefficient::square_meter_per_second,
    dynamic_viscosity::pascal_second,
    f64::{DiffusionCoefficient, DynamicViscosity, Length, MassDensity, MolarMass},
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    molar_mass::kilogram_per_mole,
};

use crate::{ActivityCoefficientModel, IonError, SOLVENT};

const DEFAULT_MW_WATER: f64 = 18e-3;
const DEFAULT_DENS_MASS: f64 = 1000.0;
const DEFAULT_VISC_D: f64 = 1e-3;
const DEFAULT_DIELECTRIC_CONSTANT: f64 = 80.4;
const DEFAULT_RADIUS_STOKES: f64 = 1e-10;
const DEFAULT_DIFFUSIVITY: f64 = 1e-9;

/// Data for one dissolved species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solute {
    mw: MolarMass,
    charge: i32,
    radius_stokes: Length,
    diffusivity: DiffusionCoefficient,
}

impl Solute {
    /// Creates a solute with the default Stokes radius (1e-10 m) and bulk
    /// diffusivity (1e-9 m²/s).
    ///
    /// # Errors
    ///
    /// Returns [`IonError::InvalidParameter`] if `mw` is not strictly positive.
    pub fn new(mw: MolarMass, charge: i32) -> Result<Self, IonError> {
        Ok(Self {
            mw: positive("mw_comp", mw)?,
            charge,
            radius_stokes: Length::new::<meter>(DEFAULT_RADIUS_STOKES),
            diffusivity: DiffusionCoefficient::new::<square_meter_per_second>(DEFAULT_DIFFUSIVITY),
        })
    }

    /// Replaces the Stokes radius.
    ///
    /// # Errors
    ///
    /// Returns [`IonError::InvalidParameter`] if the radius is not strictly positive.
    pub fn with_radius_stokes(self, radius_stokes: Length) -> Result<Self, IonError> {
        Ok(Self {
            radius_stokes: positive("radius_stokes_comp", radius_stokes)?,
            ..self
        })
    }

    /// Replaces the bulk diffusivity.
    ///
    /// # Errors
    ///
    /// Returns [`IonError::InvalidParameter`] if the diffusivity is not strictly positive.
    pub fn with_diffusivity(self, diffusivity: DiffusionCoefficient) -> Result<Self, IonError> {
        Ok(Self {
            diffusivity: positive("diffus_phase_comp", diffusivity)?,
            ..self
        })
    }

    #[must_use]
    pub fn mw(&self) -> MolarMass {
        self.mw
    }

    #[must_use]
    pub fn charge(&self) -> i32 {
        self.charge
    }

    #[must_use]
    pub fn radius_stokes(&self) -> Length {
        self.radius_stokes
    }

    #[must_use]
    pub fn diffusivity(&self) -> DiffusionCoefficient {
        self.diffusivity
    }
}

/// Serialized configuration of an [`IonPropertyPackage`].
///
/// All values are in SI units: molecular weights in kg/mol, Stokes radii in
/// m, and diffusivities in m²/s. `mw_data` may also carry `H2O`.
///
/// ```
/// use aquifer_ion::{ActivityCoefficientModel, IonConfig, IonPropertyPackage};
///
/// let config: IonConfig = serde_yaml::from_str(
///     "
/// solute_list: [Na_+, Cl_-]
/// mw_data: {H2O: 18.0e-3, Na_+: 23.0e-3, Cl_-: 35.0e-3}
/// charge: {Na_+: 1, Cl_-: -1}
/// activity_coefficient_model: davies
/// ",
/// )
/// .unwrap();
///
/// let package = IonPropertyPackage::try_from(config).unwrap();
/// assert_eq!(package.activity_model(), ActivityCoefficientModel::Davies);
/// assert_eq!(package.solute_names().collect::<Vec<_>>(), ["Cl_-", "Na_+"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IonConfig {
    pub solute_list: Vec<String>,
    pub mw_data: BTreeMap<String, f64>,
    pub charge: BTreeMap<String, i32>,
    pub stokes_radius_data: BTreeMap<String, f64>,
    pub diffusivity_data: BTreeMap<String, f64>,
    pub activity_coefficient_model: ActivityCoefficientModel,
}

/// Parameters of a liquid phase of water and dissolved ions.
///
/// The phase density, viscosity, and dielectric constant are fixed at
/// values for dilute water near room temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct IonPropertyPackage {
    solutes: BTreeMap<String, Solute>,
    mw_water: MolarMass,
    dens_mass: MassDensity,
    visc_d: DynamicViscosity,
    dielectric_constant: f64,
    activity_model: ActivityCoefficientModel,
}

impl Default for IonPropertyPackage {
    fn default() -> Self {
        Self::new(ActivityCoefficientModel::default())
    }
}

impl IonPropertyPackage {
    /// Creates a package with no solutes.
    #[must_use]
    pub fn new(activity_model: ActivityCoefficientModel) -> Self {
        Self {
            solutes: BTreeMap::new(),
            mw_water: MolarMass::new::<kilogram_per_mole>(DEFAULT_MW_WATER),
            dens_mass: MassDensity::new::<kilogram_per_cubic_meter>(DEFAULT_DENS_MASS),
            visc_d: DynamicViscosity::new::<pascal_second>(DEFAULT_VISC_D),
            dielectric_constant: DEFAULT_DIELECTRIC_CONSTANT,
            activity_model,
        }
    }

    /// Builds a package from electrolyte database records.
    ///
    /// Each record must carry an `mw` parameter. The `H2O` record sets the
    /// solvent molecular weight; every other record becomes a solute whose
    /// charge is the record's charge, or zero for neutral species.
    ///
    /// # Errors
    ///
    /// Returns [`IonError::MissingMolecularWeight`] or
    /// [`IonError::UnitMismatch`] if a record's `mw` is absent or malformed.
    pub fn from_components<'a>(
        records: impl IntoIterator<Item = &'a ComponentRecord>,
        activity_model: ActivityCoefficientModel,
    ) -> Result<Self, IonError> {
        let mut package = Self::new(activity_model);
        for record in records {
            let mw = record_mw(record)?;
            if record.name == SOLVENT {
                package.mw_water = positive("mw_comp", mw)?;
            } else {
                let charge = record.charge().unwrap_or(0);
                package.add_solute(record.name.clone(), Solute::new(mw, charge)?)?;
            }
        }
        Ok(package)
    }

    /// Adds a solute, replacing any existing solute of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`IonError::SolventAsSolute`] if `name` is `H2O`.
    pub fn add_solute(&mut self, name: impl Into<String>, solute: Solute) -> Result<(), IonError> {
        let name = name.into();
        if name == SOLVENT {
            return Err(IonError::SolventAsSolute);
        }
        debug!(solute = %name, charge = solute.charge, "adding solute");
        self.solutes.insert(name, solute);
        Ok(())
    }

    /// Replaces the solvent dielectric constant used by the Davies model.
    ///
    /// # Errors
    ///
    /// Returns [`IonError::InvalidParameter`] if it is not strictly positive.
    pub fn with_dielectric_constant(self, dielectric_constant: f64) -> Result<Self, IonError> {
        Ok(Self {
            dielectric_constant: positive("dielectric_constant", dielectric_constant)?,
            ..self
        })
    }

    /// Returns the solute names, in order.
    pub fn solute_names(&self) -> impl Iterator<Item = &str> {
        self.solutes.keys().map(String::as_str)
    }

    /// Returns the data for `name`, if it is a solute of this package.
    #[must_use]
    pub fn solute(&self, name: &str) -> Option<&Solute> {
        self.solutes.get(name)
    }

    /// Returns the molecular weight of `component`, solvent included.
    #[must_use]
    pub fn mw(&self, component: &str) -> Option<MolarMass> {
        if component == SOLVENT {
            Some(self.mw_water)
        } else {
            self.solute(component).map(Solute::mw)
        }
    }

    #[must_use]
    pub fn dens_mass(&self) -> MassDensity {
        self.dens_mass
    }

    #[must_use]
    pub fn visc_d(&self) -> DynamicViscosity {
        self.visc_d
    }

    #[must_use]
    pub fn dielectric_constant(&self) -> f64 {
        self.dielectric_constant
    }

    #[must_use]
    pub fn activity_model(&self) -> ActivityCoefficientModel {
        self.activity_model
    }
}

impl TryFrom<IonConfig> for IonPropertyPackage {
    type Error = IonError;

    fn try_from(config: IonConfig) -> Result<Self, IonError> {
        let mut package = Self::new(config.activity_coefficient_model);
        if let Some(&mw) = config.mw_data.get(SOLVENT) {
            package.mw_water = positive("mw_comp", MolarMass::new::<kilogram_per_mole>(mw))?;
        }

        for name in config.solute_list {
            let mw = config
                .mw_data
                .get(&name)
                .ok_or_else(|| IonError::MissingMolecularWeight {
                    component: name.clone(),
                })?;
            let charge = config
                .charge
                .get(&name)
                .ok_or_else(|| IonError::MissingCharge {
                    solute: name.clone(),
                })?;

            let mut solute = Solute::new(MolarMass::new::<kilogram_per_mole>(*mw), *charge)?;
            if let Some(&radius) = config.stokes_radius_data.get(&name) {
                solute = solute.with_radius_stokes(Length::new::<meter>(radius))?;
            }
            if let Some(&diffusivity) = config.diffusivity_data.get(&name) {
                solute = solute.with_diffusivity(
                    DiffusionCoefficient::new::<square_meter_per_second>(diffusivity),
                )?;
            }
            package.add_solute(name, solute)?;
        }
        Ok(package)
    }
}

fn positive<T>(name: &str, value: T) -> Result<T, IonError>
where
    StrictlyPositive: Constraint<T>,
{
    StrictlyPositive::new(value)
        .map(Constrained::into_inner)
        .map_err(|source| IonError::InvalidParameter {
            name: name.to_owned(),
            source,
        })
}

fn record_mw(record: &ComponentRecord) -> Result<MolarMass, IonError> {
    match record.parameter_data.get("mw") {
        Some(ParameterValue::Scalar(param)) => {
            units::molar_mass(param.value, &param.units).map_err(|source| IonError::UnitMismatch {
                component: record.name.clone(),
                source,
            })
        }
        _ => Err(IonError::MissingMolecularWeight {
            component: record.name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use aquifer_core::ConstraintError;
    use aquifer_edb::{EdbConfig, ElectrolyteDb};

    fn kg_mol(value: f64) -> MolarMass {
        MolarMass::new::<kilogram_per_mole>(value)
    }

    #[test]
    fn defaults() {
        let package = IonPropertyPackage::default();
        assert_eq!(package.activity_model(), ActivityCoefficientModel::Ideal);
        assert_eq!(package.mw(SOLVENT), Some(kg_mol(18e-3)));
        assert_eq!(package.dens_mass().get::<kilogram_per_cubic_meter>(), 1000.0);
        assert_eq!(package.visc_d().get::<pascal_second>(), 1e-3);
        assert_eq!(package.dielectric_constant(), 80.4);
        assert_eq!(package.solute_names().count(), 0);

        let solute = Solute::new(kg_mol(23e-3), 1).unwrap();
        assert_eq!(solute.radius_stokes().get::<meter>(), 1e-10);
        assert_eq!(solute.diffusivity().get::<square_meter_per_second>(), 1e-9);
    }

    #[test]
    fn solvent_is_not_a_solute() {
        let mut package = IonPropertyPackage::default();
        let err = package
            .add_solute(SOLVENT, Solute::new(kg_mol(18e-3), 0).unwrap())
            .unwrap_err();
        assert!(matches!(err, IonError::SolventAsSolute));
    }

    #[test]
    fn parameters_must_be_positive() {
        assert!(matches!(
            Solute::new(kg_mol(0.0), 1),
            Err(IonError::InvalidParameter {
                source: ConstraintError::Zero,
                ..
            })
        ));
        let solute = Solute::new(kg_mol(23e-3), 1).unwrap();
        assert!(solute.with_radius_stokes(Length::new::<meter>(-1e-10)).is_err());
        assert!(
            IonPropertyPackage::default()
                .with_dielectric_constant(f64::INFINITY)
                .is_err()
        );
    }

    #[test]
    fn config_reads_optional_transport_data() {
        let config: IonConfig = serde_yaml::from_str(
            "
solute_list: [Ca_2+]
mw_data: {Ca_2+: 40.0e-3}
charge: {Ca_2+: 2}
stokes_radius_data: {Ca_2+: 3.09e-10}
diffusivity_data: {Ca_2+: 0.792e-9}
",
        )
        .unwrap();

        let package = IonPropertyPackage::try_from(config).unwrap();
        let calcium = package.solute("Ca_2+").unwrap();
        assert_eq!(calcium.charge(), 2);
        assert_eq!(calcium.radius_stokes().get::<meter>(), 3.09e-10);
        assert_eq!(
            calcium.diffusivity().get::<square_meter_per_second>(),
            0.792e-9
        );
        assert_eq!(package.mw(SOLVENT), Some(kg_mol(18e-3)));
    }

    #[test]
    fn config_requires_mw_and_charge() {
        let missing_mw = IonConfig {
            solute_list: vec!["Na_+".into()],
            charge: BTreeMap::from([("Na_+".into(), 1)]),
            ..IonConfig::default()
        };
        assert!(matches!(
            IonPropertyPackage::try_from(missing_mw),
            Err(IonError::MissingMolecularWeight { ref component }) if component == "Na_+"
        ));

        let missing_charge = IonConfig {
            solute_list: vec!["Na_+".into()],
            mw_data: BTreeMap::from([("Na_+".into(), 23e-3)]),
            ..IonConfig::default()
        };
        assert!(matches!(
            IonPropertyPackage::try_from(missing_charge),
            Err(IonError::MissingCharge { ref solute }) if solute == "Na_+"
        ));
    }

    #[test]
    fn builds_from_database_records() {
        let db = ElectrolyteDb::connect(&EdbConfig::new("memory:")).unwrap();
        let records = db.get_components(["H2O", "Ca_2+", "OH_-", "CO2"]).unwrap();

        let package =
            IonPropertyPackage::from_components(&records, ActivityCoefficientModel::Davies)
                .unwrap();

        assert_eq!(
            package.solute_names().collect::<Vec<_>>(),
            ["CO2", "Ca_2+", "OH_-"]
        );
        assert_eq!(package.solute("Ca_2+").unwrap().charge(), 2);
        assert_eq!(package.solute("OH_-").unwrap().charge(), -1);
        assert_eq!(package.solute("CO2").unwrap().charge(), 0);
        assert_relative_eq!(
            package.mw(SOLVENT).unwrap().get::<kilogram_per_mole>(),
            18.0153e-3,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            package.mw("Ca_2+").unwrap().get::<kilogram_per_mole>(),
            40.078e-3,
            max_relative = 1e-12
        );
    }

    #[test]
    fn records_need_a_molecular_weight() {
        let bare = ComponentRecord::new("Na_+");
        let err = IonPropertyPackage::from_components([&bare], ActivityCoefficientModel::Ideal)
            .unwrap_err();
        assert!(matches!(
            err,
            IonError::MissingMolecularWeight { ref component } if component == "Na_+"
        ));
    }
}
