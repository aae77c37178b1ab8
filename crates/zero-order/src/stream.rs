use std::collections::BTreeMap;

use aquifer_core::NonNegative;
use uom::si::{
    f64::{MassDensity, MassRate, VolumeRate},
    mass_density::kilogram_per_cubic_meter,
    mass_rate::kilogram_per_second,
};

use crate::UnitModelError;

/// Name of the solvent component.
pub const WATER: &str = "H2O";

/// Density assumed for every stream, 1000 kg/m³.
#[must_use]
pub fn water_density() -> MassDensity {
    MassDensity::new::<kilogram_per_cubic_meter>(1000.0)
}

/// A water stream described by component mass flows.
///
/// Streams have a fixed density, so the volumetric flow is the total mass
/// flow divided by [`water_density`].
///
/// # Example
///
/// ```
/// use aquifer_zero_order::WaterStream;
/// use uom::si::{
///     f64::MassRate, mass_density::kilogram_per_cubic_meter, mass_rate::kilogram_per_second,
///     volume_rate::cubic_meter_per_second,
/// };
///
/// let kg_s = |value| MassRate::new::<kilogram_per_second>(value);
/// let stream = WaterStream::from_flows([("H2O", kg_s(999.0)), ("tds", kg_s(1.0))]).unwrap();
///
/// assert_eq!(stream.flow_vol().get::<cubic_meter_per_second>(), 1.0);
/// assert_eq!(stream.conc_mass("tds").unwrap().get::<kilogram_per_cubic_meter>(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaterStream {
    flows: BTreeMap<String, MassRate>,
}

impl WaterStream {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stream from `(component, mass flow)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`UnitModelError::InvalidFlow`] if any flow is negative or `NaN`.
    pub fn from_flows<I, S>(flows: I) -> Result<Self, UnitModelError>
    where
        I: IntoIterator<Item = (S, MassRate)>,
        S: Into<String>,
    {
        let mut stream = Self::new();
        for (component, flow) in flows {
            stream.insert(component, flow)?;
        }
        Ok(stream)
    }

    /// Sets the mass flow of a component, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`UnitModelError::InvalidFlow`] if the flow is negative or `NaN`.
    pub fn insert(
        &mut self,
        component: impl Into<String>,
        flow: MassRate,
    ) -> Result<(), UnitModelError> {
        let component = component.into();
        match NonNegative::new(flow) {
            Ok(flow) => {
                self.flows.insert(component, flow.into_inner());
                Ok(())
            }
            Err(source) => Err(UnitModelError::InvalidFlow { component, source }),
        }
    }

    /// Returns the mass flow of a component, if present.
    #[must_use]
    pub fn flow_mass(&self, component: &str) -> Option<MassRate> {
        self.flows.get(component).copied()
    }

    /// Returns the component names, in order.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.flows.keys().map(String::as_str)
    }

    /// Returns every `(component, mass flow)` pair except water.
    pub fn solutes(&self) -> impl Iterator<Item = (&str, MassRate)> {
        self.flows
            .iter()
            .filter(|(name, _)| name.as_str() != WATER)
            .map(|(name, flow)| (name.as_str(), *flow))
    }

    /// Returns the total mass flow.
    #[must_use]
    pub fn flow_mass_total(&self) -> MassRate {
        self.flows
            .values()
            .fold(MassRate::new::<kilogram_per_second>(0.0), |total, flow| total + *flow)
    }

    /// Returns the volumetric flow.
    #[must_use]
    pub fn flow_vol(&self) -> VolumeRate {
        self.flow_mass_total() / water_density()
    }

    /// Returns the mass concentration of a component.
    ///
    /// Returns `None` if the component is absent or the stream has no flow.
    #[must_use]
    pub fn conc_mass(&self, component: &str) -> Option<MassDensity> {
        let flow_vol = self.flow_vol();
        if flow_vol.value <= 0.0 {
            return None;
        }
        self.flow_mass(component).map(|flow| flow / flow_vol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use aquifer_core::ConstraintError;
    use uom::si::volume_rate::cubic_meter_per_second;

    fn kg_s(value: f64) -> MassRate {
        MassRate::new::<kilogram_per_second>(value)
    }

    #[test]
    fn pump_inlet_properties() {
        let stream = WaterStream::from_flows([
            ("H2O", kg_s(1000.0)),
            ("sulfur", kg_s(1.0)),
            ("toc", kg_s(2.0)),
            ("tss", kg_s(3.0)),
        ])
        .unwrap();

        assert_relative_eq!(stream.flow_vol().get::<cubic_meter_per_second>(), 1.006);
        assert_relative_eq!(
            stream.conc_mass("H2O").unwrap().get::<kilogram_per_cubic_meter>(),
            994.035_785,
            max_relative = 1e-8
        );
        assert_eq!(stream.solutes().count(), 3);
        assert_eq!(stream.conc_mass("boron"), None);
    }

    #[test]
    fn empty_stream_has_no_concentration() {
        let stream = WaterStream::from_flows([("H2O", kg_s(0.0))]).unwrap();
        assert_eq!(stream.flow_vol().get::<cubic_meter_per_second>(), 0.0);
        assert_eq!(stream.conc_mass("H2O"), None);
    }

    #[test]
    fn rejects_negative_flow() {
        let err = WaterStream::from_flows([("H2O", kg_s(1.0)), ("tds", kg_s(-0.5))]).unwrap_err();
        assert!(matches!(
            err,
            UnitModelError::InvalidFlow {
                ref component,
                source: ConstraintError::Negative,
            } if component == "tds"
        ));
    }
}
