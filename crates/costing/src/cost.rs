use std::fmt;

use aquifer_core::{Constrained, NonNegative, StrictlyPositive, units::Currency};
use serde::{Deserialize, Serialize};
use uom::si::{f64::VolumeRate, ratio::ratio};

/// A capital cost in a given currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalCost {
    /// The cost, in units of `currency` (for example millions of dollars).
    pub amount: f64,
    pub currency: Currency,
}

impl CapitalCost {
    /// Returns the cost in plain dollars of the same reference year.
    #[must_use]
    pub fn in_dollars(self) -> Self {
        Self {
            amount: self.amount * f64::from(self.currency.scale),
            currency: self.currency.dollars(),
        }
    }
}

impl fmt::Display for CapitalCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// A power-law capital cost curve in the inlet volumetric flow.
///
/// ```text
/// cost = cap_basis * (flow / flow_basis) ^ cap_exp
/// ```
///
/// # Example
///
/// ```
/// use aquifer_core::{NonNegative, StrictlyPositive, units::currency};
/// use aquifer_costing::CapitalCostFunction;
/// use uom::si::{f64::VolumeRate, volume_rate::cubic_meter_per_hour};
///
/// let curve = CapitalCostFunction::new(
///     StrictlyPositive::new(18.87).unwrap(),
///     currency("MUSD_2018").unwrap(),
///     StrictlyPositive::new(VolumeRate::new::<cubic_meter_per_hour>(4732.0)).unwrap(),
///     0.7,
/// );
///
/// let flow = NonNegative::new(VolumeRate::new::<cubic_meter_per_hour>(4732.0)).unwrap();
/// let cost = curve.evaluate(flow);
/// assert_eq!(cost.amount, 18.87);
/// assert_eq!(cost.currency.to_string(), "MUSD_2018");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalCostFunction {
    cap_basis: Constrained<f64, StrictlyPositive>,
    currency: Currency,
    flow_basis: Constrained<VolumeRate, StrictlyPositive>,
    cap_exp: f64,
}

impl CapitalCostFunction {
    /// Creates a cost curve from its basis cost, basis flow, and exponent.
    #[must_use]
    pub fn new(
        cap_basis: Constrained<f64, StrictlyPositive>,
        currency: Currency,
        flow_basis: Constrained<VolumeRate, StrictlyPositive>,
        cap_exp: f64,
    ) -> Self {
        Self {
            cap_basis,
            currency,
            flow_basis,
            cap_exp,
        }
    }

    /// Returns the capital cost at the basis flow.
    #[must_use]
    pub fn cap_basis(&self) -> f64 {
        *self.cap_basis.as_ref()
    }

    /// Returns the currency unit costs are expressed in.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the flow at which the cost equals the basis cost.
    #[must_use]
    pub fn flow_basis(&self) -> VolumeRate {
        *self.flow_basis.as_ref()
    }

    /// Returns the scaling exponent.
    #[must_use]
    pub fn cap_exp(&self) -> f64 {
        self.cap_exp
    }

    /// Evaluates the cost curve at an inlet flow.
    #[must_use]
    pub fn evaluate(&self, flow: Constrained<VolumeRate, NonNegative>) -> CapitalCost {
        let scale = (flow.into_inner() / self.flow_basis()).get::<ratio>();
        CapitalCost {
            amount: self.cap_basis() * scale.powf(self.cap_exp),
            currency: self.currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use aquifer_core::units::currency;
    use uom::si::volume_rate::{cubic_meter_per_hour, cubic_meter_per_second};

    fn bioreactor_curve() -> CapitalCostFunction {
        CapitalCostFunction::new(
            StrictlyPositive::new(18.87).unwrap(),
            currency("MUSD_2018").unwrap(),
            StrictlyPositive::new(VolumeRate::new::<cubic_meter_per_hour>(4732.0)).unwrap(),
            0.7,
        )
    }

    #[test]
    fn power_law_scaling() {
        let curve = bioreactor_curve();

        let double = NonNegative::new(VolumeRate::new::<cubic_meter_per_hour>(9464.0)).unwrap();
        assert_relative_eq!(curve.evaluate(double).amount, 18.87 * 2f64.powf(0.7));

        let flow = NonNegative::new(VolumeRate::new::<cubic_meter_per_second>(10.0)).unwrap();
        let expected = 18.87 * (36_000.0_f64 / 4732.0).powf(0.7);
        assert_relative_eq!(curve.evaluate(flow).amount, expected, epsilon = 1e-12);
    }

    #[test]
    fn zero_flow_costs_nothing() {
        let zero = NonNegative::new(VolumeRate::new::<cubic_meter_per_second>(0.0)).unwrap();
        assert_eq!(bioreactor_curve().evaluate(zero).amount, 0.0);
    }

    #[test]
    fn converts_to_dollars() {
        let cost = CapitalCost {
            amount: 1.5,
            currency: currency("MUSD_2018").unwrap(),
        };
        let dollars = cost.in_dollars();
        assert_relative_eq!(dollars.amount, 1.5e6);
        assert_eq!(dollars.to_string(), "1500000 USD_2018");
    }
}
