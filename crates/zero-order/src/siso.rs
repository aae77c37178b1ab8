use aquifer_core::{Model, NonNegative, units::EnergyIntensity};
use aquifer_costing::{CapitalCost, CapitalCostFunction, TechnoEconomicDb, UnitParameters};
use tracing::debug;
use uom::si::f64::Power;

use crate::{UnitModelError, WATER, WaterStream};

/// A single-inlet, single-outlet unit that passes its inlet through unchanged.
///
/// Pumps, static mixers, and storage tanks are modeled this way. Their only
/// effect is an electricity demand proportional to the inlet volumetric flow.
///
/// # Example
///
/// ```
/// use aquifer_core::Model;
/// use aquifer_costing::TechnoEconomicDb;
/// use aquifer_zero_order::{SisoUnit, WaterStream, technology};
/// use uom::si::{f64::MassRate, mass_rate::kilogram_per_second, power::kilowatt};
///
/// let db = TechnoEconomicDb::bundled();
/// let pump = SisoUnit::from_database(&db, technology::PUMP, None).unwrap();
///
/// let inlet = WaterStream::from_flows([("H2O", MassRate::new::<kilogram_per_second>(1000.0))])
///     .unwrap();
/// let output = pump.call(&inlet).unwrap();
///
/// assert_eq!(output.outlet, inlet);
/// assert!((output.electricity.get::<kilowatt>() - 183.6).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SisoUnit {
    technology: String,
    energy_intensity: EnergyIntensity,
    capital_cost: CapitalCostFunction,
}

/// Outlet and utility demand of a [`SisoUnit`].
#[derive(Debug, Clone, PartialEq)]
pub struct SisoOutput {
    pub outlet: WaterStream,
    pub electricity: Power,
    pub capital_cost: CapitalCost,
}

impl SisoUnit {
    /// Builds a unit from already loaded parameters.
    ///
    /// Recovery and removal entries are ignored; the outlet always equals the inlet.
    pub fn from_parameters(technology: impl Into<String>, parameters: &UnitParameters) -> Self {
        Self {
            technology: technology.into(),
            energy_intensity: parameters.energy_intensity,
            capital_cost: parameters.capital_cost,
        }
    }

    /// Loads the unit's parameters from a techno-economic database.
    ///
    /// # Errors
    ///
    /// Returns [`UnitModelError::Costing`] if the lookup or validation fails.
    pub fn from_database(
        db: &TechnoEconomicDb,
        technology: &str,
        subtype: Option<&str>,
    ) -> Result<Self, UnitModelError> {
        let parameters = db.unit_parameters(technology, subtype)?;
        Ok(Self::from_parameters(technology, &parameters))
    }

    /// Returns the technology name.
    #[must_use]
    pub fn technology(&self) -> &str {
        &self.technology
    }

    /// Returns the electricity used per volume of inlet flow.
    #[must_use]
    pub fn energy_intensity(&self) -> EnergyIntensity {
        self.energy_intensity
    }
}

impl Model for SisoUnit {
    type Input = WaterStream;
    type Output = SisoOutput;
    type Error = UnitModelError;

    fn call(&self, inlet: &WaterStream) -> Result<SisoOutput, UnitModelError> {
        if inlet.flow_mass(WATER).is_none() {
            return Err(UnitModelError::MissingWater);
        }

        let (electricity, capital_cost) =
            utilities(inlet, self.energy_intensity, &self.capital_cost)?;
        debug!(technology = %self.technology, electricity = ?electricity, "solved SISO unit");

        Ok(SisoOutput {
            outlet: inlet.clone(),
            electricity,
            capital_cost,
        })
    }
}

/// Electricity demand and capital cost at the inlet volumetric flow.
pub(crate) fn utilities(
    inlet: &WaterStream,
    energy_intensity: EnergyIntensity,
    capital_cost: &CapitalCostFunction,
) -> Result<(Power, CapitalCost), UnitModelError> {
    let flow_vol = inlet.flow_vol();
    let flow = NonNegative::new(flow_vol).map_err(|source| UnitModelError::InvalidFlow {
        component: "total".to_owned(),
        source,
    })?;
    Ok((energy_intensity * flow_vol, capital_cost.evaluate(flow)))
}
