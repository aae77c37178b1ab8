use std::collections::BTreeMap;

use aquifer_core::{Fraction, Model, units::EnergyIntensity};
use aquifer_costing::{CapitalCost, CapitalCostFunction, TechnoEconomicDb, UnitParameters};
use tracing::{debug, warn};
use uom::si::f64::Power;

use crate::{LoadOptions, UnitModelError, WATER, WaterStream, siso::utilities};

/// A single-inlet, double-outlet unit that splits its inlet into a treated
/// stream and a byproduct stream.
///
/// The treated stream keeps the recovered fraction of water and the
/// unremoved fraction of each solute. The byproduct takes the rest, so every
/// component's mass is conserved.
#[derive(Debug, Clone, PartialEq)]
pub struct SidoUnit {
    technology: String,
    energy_intensity: EnergyIntensity,
    capital_cost: CapitalCostFunction,
    recovery_frac_mass_h2o: Fraction,
    removal_frac_mass_solute: BTreeMap<String, Fraction>,
    default_removal: Option<Fraction>,
    required_solutes: &'static [&'static str],
}

/// Outlets and utility demand of a [`SidoUnit`].
#[derive(Debug, Clone, PartialEq)]
pub struct SidoOutput {
    pub treated: WaterStream,
    pub byproduct: WaterStream,
    pub electricity: Power,
    pub capital_cost: CapitalCost,
}

impl SidoUnit {
    /// Builds a unit from already loaded parameters.
    pub fn from_parameters(
        technology: impl Into<String>,
        parameters: &UnitParameters,
        options: LoadOptions,
    ) -> Self {
        let technology = technology.into();
        Self {
            required_solutes: crate::technology::required_solutes(&technology),
            technology,
            energy_intensity: parameters.energy_intensity,
            capital_cost: parameters.capital_cost,
            recovery_frac_mass_h2o: parameters.recovery_frac_mass_h2o,
            removal_frac_mass_solute: parameters.removal_frac_mass_solute.clone(),
            default_removal: options
                .use_default_removal
                .then_some(parameters.default_removal_frac_mass_solute),
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
        options: LoadOptions,
    ) -> Result<Self, UnitModelError> {
        let parameters = db.unit_parameters(technology, subtype)?;
        Ok(Self::from_parameters(technology, &parameters, options))
    }

    /// Returns the technology name.
    #[must_use]
    pub fn technology(&self) -> &str {
        &self.technology
    }

    /// Returns the fraction of inlet water sent to the treated stream.
    #[must_use]
    pub fn recovery_frac_mass_h2o(&self) -> Fraction {
        self.recovery_frac_mass_h2o
    }

    /// Returns the removal fraction applied to `solute`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitModelError::MissingRemoval`] if the solute is not listed
    /// and default removal is disabled.
    pub fn removal_fraction(&self, solute: &str) -> Result<Fraction, UnitModelError> {
        if let Some(removal) = self.removal_frac_mass_solute.get(solute) {
            return Ok(*removal);
        }
        match self.default_removal {
            Some(removal) => {
                debug!(technology = %self.technology, solute, "using default removal fraction");
                Ok(removal)
            }
            None => Err(UnitModelError::MissingRemoval {
                technology: self.technology.clone(),
                solute: solute.to_owned(),
            }),
        }
    }
}

impl Model for SidoUnit {
    type Input = WaterStream;
    type Output = SidoOutput;
    type Error = UnitModelError;

    fn call(&self, inlet: &WaterStream) -> Result<SidoOutput, UnitModelError> {
        let water = inlet.flow_mass(WATER).ok_or(UnitModelError::MissingWater)?;
        if let Some(solute) = self
            .required_solutes
            .iter()
            .find(|solute| inlet.flow_mass(solute).is_none())
        {
            return Err(UnitModelError::MissingSolute {
                technology: self.technology.clone(),
                solute: (*solute).to_owned(),
            });
        }

        let mut treated = WaterStream::new();
        let mut byproduct = WaterStream::new();

        let recovered = self.recovery_frac_mass_h2o * water;
        treated.insert(WATER, recovered)?;
        byproduct.insert(WATER, water - recovered)?;

        for (solute, flow) in inlet.solutes() {
            let passed = self.removal_fraction(solute)?.complement() * flow;
            treated.insert(solute, passed)?;
            byproduct.insert(solute, flow - passed)?;
        }

        if byproduct.flow_mass_total().value <= 0.0 {
            warn!(technology = %self.technology, "byproduct stream is empty");
        }

        let (electricity, capital_cost) =
            utilities(inlet, self.energy_intensity, &self.capital_cost)?;
        debug!(technology = %self.technology, electricity = ?electricity, "solved SIDO unit");

        Ok(SidoOutput {
            treated,
            byproduct,
            electricity,
            capital_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        f64::MassRate, mass_density::kilogram_per_cubic_meter, mass_rate::kilogram_per_second,
        power::kilowatt, volume_rate::cubic_meter_per_second,
    };

    use crate::technology;

    fn kg_s(value: f64) -> MassRate {
        MassRate::new::<kilogram_per_second>(value)
    }

    fn conc(stream: &WaterStream, component: &str) -> f64 {
        stream
            .conc_mass(component)
            .unwrap()
            .get::<kilogram_per_cubic_meter>()
    }

    fn assert_conserved(inlet: &WaterStream, output: &SidoOutput) {
        for component in inlet.components() {
            let total = output.treated.flow_mass(component).unwrap()
                + output.byproduct.flow_mass(component).unwrap();
            assert_relative_eq!(
                total.get::<kilogram_per_second>(),
                inlet.flow_mass(component).unwrap().get::<kilogram_per_second>(),
                max_relative = 1e-12
            );
        }
    }

    fn bioreactor_inlet() -> WaterStream {
        WaterStream::from_flows([
            ("H2O", kg_s(10_000.0)),
            ("boron", kg_s(1.0)),
            ("selenium", kg_s(1.0)),
            ("foo", kg_s(1.0)),
        ])
        .unwrap()
    }

    #[test]
    fn bioreactor_with_default_removal() {
        let db = TechnoEconomicDb::bundled();
        let options = LoadOptions {
            use_default_removal: true,
        };
        let unit = SidoUnit::from_database(&db, technology::BIOREACTOR, None, options).unwrap();

        let inlet = bioreactor_inlet();
        let output = unit.call(&inlet).unwrap();
        let treated = &output.treated;

        assert_relative_eq!(
            treated.flow_vol().get::<cubic_meter_per_second>(),
            9.7012,
            max_relative = 1e-4
        );
        assert_relative_eq!(conc(treated, "boron"), 0.020616, max_relative = 1e-4);
        assert_relative_eq!(conc(treated, "selenium"), 3.6078e-3, max_relative = 1e-4);
        assert_relative_eq!(conc(treated, "foo"), 0.10308, max_relative = 1e-4);
        assert_eq!(output.electricity.get::<kilowatt>(), 0.0);

        assert_conserved(&inlet, &output);
    }

    #[test]
    fn bioreactor_without_default_removal() {
        let db = TechnoEconomicDb::bundled();
        let unit =
            SidoUnit::from_database(&db, technology::BIOREACTOR, None, LoadOptions::default())
                .unwrap();

        let err = unit.call(&bioreactor_inlet()).unwrap_err();
        assert!(matches!(
            err,
            UnitModelError::MissingRemoval { ref solute, .. } if solute == "foo"
        ));
        assert_eq!(unit.removal_fraction("boron").unwrap().get(), 0.8);
    }

    #[test]
    fn brine_concentrator() {
        let db = TechnoEconomicDb::bundled();
        let unit = SidoUnit::from_database(
            &db,
            technology::BRINE_CONCENTRATOR,
            None,
            LoadOptions::default(),
        )
        .unwrap();

        let inlet =
            WaterStream::from_flows([("H2O", kg_s(10_000.0)), ("tds", kg_s(250.0))]).unwrap();
        let output = unit.call(&inlet).unwrap();

        assert_relative_eq!(
            output.treated.flow_vol().get::<cubic_meter_per_second>(),
            9.005,
            max_relative = 1e-9
        );
        assert_relative_eq!(conc(&output.treated, "tds"), 0.555247, max_relative = 1e-5);
        assert_relative_eq!(conc(&output.byproduct, "tds"), 196.78715, max_relative = 1e-5);
        assert_relative_eq!(
            output.electricity.get::<kilowatt>(),
            855_570.663,
            max_relative = 1e-5
        );

        assert_conserved(&inlet, &output);
    }

    #[test]
    fn brine_concentrator_requires_tds() {
        let db = TechnoEconomicDb::bundled();
        let options = LoadOptions {
            use_default_removal: true,
        };
        let unit =
            SidoUnit::from_database(&db, technology::BRINE_CONCENTRATOR, None, options).unwrap();

        let inlet = WaterStream::from_flows([("H2O", kg_s(10_000.0)), ("foo", kg_s(1.0))]).unwrap();
        let err = unit.call(&inlet).unwrap_err();
        assert!(matches!(
            err,
            UnitModelError::MissingSolute { ref technology, ref solute }
                if technology == "brine_concentrator" && solute == "tds"
        ));
    }

    #[test]
    fn other_units_require_no_solutes() {
        assert!(technology::required_solutes(technology::BIOREACTOR).is_empty());
        assert_eq!(
            technology::required_solutes(technology::BRINE_CONCENTRATOR),
            ["tds"]
        );
    }

    #[test]
    fn vfa_recovery() {
        let db = TechnoEconomicDb::bundled();
        let unit =
            SidoUnit::from_database(&db, technology::VFA_RECOVERY, None, LoadOptions::default())
                .unwrap();

        let inlet = WaterStream::from_flows([
            ("H2O", kg_s(1000.0)),
            ("vfa", kg_s(10.0)),
            ("cod", kg_s(20.0)),
        ])
        .unwrap();
        let output = unit.call(&inlet).unwrap();

        let treated = |component: &str| {
            output
                .treated
                .flow_mass(component)
                .unwrap()
                .get::<kilogram_per_second>()
        };
        assert_relative_eq!(treated("H2O"), 950.0, max_relative = 1e-12);
        assert_relative_eq!(treated("vfa"), 1.0, max_relative = 1e-12);
        assert_relative_eq!(treated("cod"), 11.0, max_relative = 1e-12);

        assert_relative_eq!(
            output.electricity.get::<kilowatt>(),
            1.03 * 0.12 * 3600.0,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            output.capital_cost.amount,
            2.4 * (1.03 * 86.4_f64).powf(0.6),
            max_relative = 1e-9
        );
        assert_eq!(output.capital_cost.currency.year, 2020);

        assert_conserved(&inlet, &output);
    }

    #[test]
    fn full_recovery_leaves_empty_byproduct() {
        let db = TechnoEconomicDb::bundled();
        let parameters = db.unit_parameters(technology::PUMP, None).unwrap();
        let unit = SidoUnit::from_parameters(
            "passthrough",
            &parameters,
            LoadOptions {
                use_default_removal: true,
            },
        );

        let inlet = WaterStream::from_flows([("H2O", kg_s(5.0)), ("tss", kg_s(0.1))]).unwrap();
        let output = unit.call(&inlet).unwrap();
        assert_eq!(output.treated, inlet);
        assert_eq!(output.byproduct.flow_mass_total().value, 0.0);
    }
}
