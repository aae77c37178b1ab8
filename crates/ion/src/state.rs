use std::collections::BTreeMap;

use aquifer_core::{Model, NonNegative};
use tracing::debug;
use uom::si::{
    catalytic_activity::mole_per_second,
    f64::{
        CatalyticActivity, MassDensity, MassRate, Molality, MolarConcentration, Pressure,
        ThermodynamicTemperature, VolumeRate,
    },
    mass_density::kilogram_per_cubic_meter,
    mass_rate::kilogram_per_second,
    molality::mole_per_kilogram,
    molar_concentration::mole_per_cubic_meter,
    molar_mass::kilogram_per_mole,
    pressure::pascal,
    thermodynamic_temperature::kelvin,
    volume_rate::cubic_meter_per_second,
};

use crate::{ElectroneutralityError, IonError, IonPropertyPackage, activity::debye_huckel_a};

/// Name of the solvent component.
pub const SOLVENT: &str = "H2O";

/// A mole flow rate, in mol/s.
pub type MolarFlow = CatalyticActivity;

const GAS_CONSTANT: f64 = 8.314_462_618;

const TEMPERATURE_BOUNDS: (f64, f64) = (273.15, 373.15);
const PRESSURE_BOUNDS: (f64, f64) = (1e5, 5e7);

/// Component mole flows at a temperature and pressure.
#[derive(Debug, Clone, PartialEq)]
pub struct IonState {
    flow_mol: BTreeMap<String, MolarFlow>,
    temperature: ThermodynamicTemperature,
    pressure: Pressure,
}

impl IonState {
    /// Creates a state with no flows.
    ///
    /// # Errors
    ///
    /// Returns [`IonError::OutOfBounds`] if the temperature is outside
    /// 273.15–373.15 K or the pressure is outside 1e5–5e7 Pa.
    pub fn new(
        temperature: ThermodynamicTemperature,
        pressure: Pressure,
    ) -> Result<Self, IonError> {
        within("temperature", temperature.get::<kelvin>(), TEMPERATURE_BOUNDS)?;
        within("pressure", pressure.get::<pascal>(), PRESSURE_BOUNDS)?;
        Ok(Self {
            flow_mol: BTreeMap::new(),
            temperature,
            pressure,
        })
    }

    /// Sets the mole flow of `component`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`IonError::InvalidFlow`] if the flow is negative or not finite.
    pub fn insert(
        &mut self,
        component: impl Into<String>,
        flow: MolarFlow,
    ) -> Result<(), IonError> {
        let component = component.into();
        match NonNegative::new(flow) {
            Ok(flow) => {
                self.flow_mol.insert(component, flow.into_inner());
                Ok(())
            }
            Err(source) => Err(IonError::InvalidFlow { component, source }),
        }
    }

    /// Returns the mole flow of `component`, if present.
    #[must_use]
    pub fn flow_mol(&self, component: &str) -> Option<MolarFlow> {
        self.flow_mol.get(component).copied()
    }

    /// Returns the component names, in order.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.flow_mol.keys().map(String::as_str)
    }

    #[must_use]
    pub fn temperature(&self) -> ThermodynamicTemperature {
        self.temperature
    }

    #[must_use]
    pub fn pressure(&self) -> Pressure {
        self.pressure
    }
}

/// Properties of an [`IonState`].
///
/// Per-component maps cover every component of the state, solvent included,
/// except `molality_comp` and `act_coeff_comp`, which cover solutes only.
#[derive(Debug, Clone, PartialEq)]
pub struct IonProperties {
    pub dens_mass: MassDensity,
    pub flow_vol: VolumeRate,
    pub flow_mass_comp: BTreeMap<String, MassRate>,
    pub mass_frac_comp: BTreeMap<String, f64>,
    pub mole_frac_comp: BTreeMap<String, f64>,
    pub conc_mass_comp: BTreeMap<String, MassDensity>,
    pub conc_mol_comp: BTreeMap<String, MolarConcentration>,
    pub molality_comp: BTreeMap<String, Molality>,
    pub act_coeff_comp: BTreeMap<String, f64>,
    pub ionic_strength: Molality,

    /// Van 't Hoff osmotic pressure, `Σ c_j·R·T` over the solutes.
    pub pressure_osm: Pressure,

    /// Net charge flow, `Σ z_j·n_j` over the solutes.
    pub net_charge_flow: MolarFlow,
}

impl IonProperties {
    /// Tolerance used by [`IonProperties::assert_electroneutrality`] when none is given.
    pub const DEFAULT_ELECTRONEUTRALITY_TOLERANCE: f64 = 1e-6;

    /// Checks that the net charge flow is within `tolerance` mol/s of zero.
    ///
    /// # Errors
    ///
    /// Returns an [`ElectroneutralityError`] carrying the net charge flow if
    /// it exceeds the tolerance.
    pub fn assert_electroneutrality(
        &self,
        tolerance: Option<f64>,
    ) -> Result<(), ElectroneutralityError> {
        let tolerance = tolerance.unwrap_or(Self::DEFAULT_ELECTRONEUTRALITY_TOLERANCE);
        let net_charge = self.net_charge_flow.get::<mole_per_second>();
        if net_charge.abs() <= tolerance {
            debug!(net_charge, "electroneutrality satisfied");
            Ok(())
        } else {
            Err(ElectroneutralityError {
                net_charge,
                tolerance,
            })
        }
    }
}

impl Model for IonPropertyPackage {
    type Input = IonState;
    type Output = IonProperties;
    type Error = IonError;

    fn call(&self, state: &IonState) -> Result<IonProperties, IonError> {
        let n_water = state
            .flow_mol(SOLVENT)
            .map(|flow| flow.get::<mole_per_second>())
            .filter(|&flow| flow > 0.0)
            .ok_or(IonError::MissingWater)?;

        let species = state
            .flow_mol
            .iter()
            .map(|(name, flow)| {
                let mw = self
                    .mw(name)
                    .ok_or_else(|| IonError::UnknownComponent(name.clone()))?;
                Ok::<_, IonError>((
                    name.as_str(),
                    flow.get::<mole_per_second>(),
                    mw.get::<kilogram_per_mole>(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rho = self.dens_mass().get::<kilogram_per_cubic_meter>();
        let mw_water = self.mw(SOLVENT).map_or(0.0, |mw| mw.get::<kilogram_per_mole>());
        let temperature = state.temperature.get::<kelvin>();

        let total_mass: f64 = species.iter().map(|(_, n, mw)| n * mw).sum();
        let total_mol: f64 = species.iter().map(|(_, n, _)| n).sum();

        let mut properties = IonProperties {
            dens_mass: self.dens_mass(),
            flow_vol: VolumeRate::new::<cubic_meter_per_second>(total_mass / rho),
            flow_mass_comp: BTreeMap::new(),
            mass_frac_comp: BTreeMap::new(),
            mole_frac_comp: BTreeMap::new(),
            conc_mass_comp: BTreeMap::new(),
            conc_mol_comp: BTreeMap::new(),
            molality_comp: BTreeMap::new(),
            act_coeff_comp: BTreeMap::new(),
            ionic_strength: Molality::new::<mole_per_kilogram>(0.0),
            pressure_osm: Pressure::new::<pascal>(0.0),
            net_charge_flow: MolarFlow::new::<mole_per_second>(0.0),
        };

        let mut ionic_strength = 0.0;
        let mut solute_conc_mol = 0.0;
        let mut net_charge = 0.0;

        for &(name, n, mw) in &species {
            let flow_mass = n * mw;
            let mass_frac = flow_mass / total_mass;
            let conc_mass = rho * mass_frac;
            let conc_mol = conc_mass / mw;

            let key = name.to_owned();
            properties
                .flow_mass_comp
                .insert(key.clone(), MassRate::new::<kilogram_per_second>(flow_mass));
            properties.mass_frac_comp.insert(key.clone(), mass_frac);
            properties.mole_frac_comp.insert(key.clone(), n / total_mol);
            properties
                .conc_mass_comp
                .insert(key.clone(), MassDensity::new::<kilogram_per_cubic_meter>(conc_mass));
            properties
                .conc_mol_comp
                .insert(key, MolarConcentration::new::<mole_per_cubic_meter>(conc_mol));

            if let Some(solute) = self.solute(name) {
                let molality = n / n_water / mw_water;
                let charge = f64::from(solute.charge());
                properties
                    .molality_comp
                    .insert(name.to_owned(), Molality::new::<mole_per_kilogram>(molality));
                ionic_strength += 0.5 * molality * charge * charge;
                solute_conc_mol += conc_mol;
                net_charge += charge * n;
            }
        }

        let a = debye_huckel_a(self.dielectric_constant(), temperature);
        for name in properties.molality_comp.keys() {
            if let Some(solute) = self.solute(name) {
                let gamma = self
                    .activity_model()
                    .coefficient(solute.charge(), ionic_strength, a);
                properties.act_coeff_comp.insert(name.clone(), gamma);
            }
        }

        properties.ionic_strength = Molality::new::<mole_per_kilogram>(ionic_strength);
        properties.pressure_osm =
            Pressure::new::<pascal>(solute_conc_mol * GAS_CONSTANT * temperature);
        properties.net_charge_flow = MolarFlow::new::<mole_per_second>(net_charge);

        debug!(
            components = species.len(),
            ionic_strength,
            pressure_osm = ?properties.pressure_osm,
            "evaluated ion properties"
        );
        Ok(properties)
    }
}

fn within(name: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), IonError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(IonError::OutOfBounds {
            name,
            value,
            min,
            max,
        })
    }
}
