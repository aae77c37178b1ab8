//! Parsing of unit strings found in parameter files.
//!
//! Data files pair every numeric value with a unit string such as
//! `"kWh/m^3"` or `"m^3/hr"`. The functions here turn a `(value, units)` pair
//! into a typed [`uom`] quantity, failing with [`UnitError::Mismatch`] when
//! the string names a known unit of the wrong dimension.
//!
//! Unit strings are matched after removing whitespace, and `**` is accepted
//! as a synonym for `^`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::{
    f64::{
        MassDensity, MolarEnergy, MolarHeatCapacity, MolarMass, Pressure,
        ThermodynamicTemperature, VolumeRate,
    },
    mass_density::kilogram_per_cubic_meter,
    molar_energy::joule_per_mole,
    molar_heat_capacity::joule_per_kelvin_mole,
    molar_mass::kilogram_per_mole,
    pressure::pascal,
    thermodynamic_temperature::kelvin,
    volume_rate::cubic_meter_per_second,
};

/// Electricity consumed per unit volume treated.
///
/// Energy per volume shares its dimension with pressure, so the SI value is
/// stored in pascal (J/m³).
/// Multiplying by a [`VolumeRate`] yields a [`uom::si::f64::Power`].
pub type EnergyIntensity = Pressure;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const CUBIC_METERS_PER_GALLON: f64 = 3.785_411_784e-3;
const JOULES_PER_KILOWATT_HOUR: f64 = 3.6e6;

/// Errors returned when a unit string cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UnitError {
    /// The unit string is not recognized at all.
    #[error("unknown unit `{0}`")]
    Unknown(String),

    /// The unit string is recognized but measures a different quantity.
    #[error("unit `{found}` is not a unit of {expected}")]
    Mismatch {
        expected: &'static str,
        found: String,
    },
}

/// The physical dimension a unit string measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Dimensionless,
    VolumeRate,
    EnergyIntensity,
    MolarEnergy,
    MolarEntropy,
    MolarMass,
    Temperature,
    Density,
    Currency,
}

impl Kind {
    fn describe(self) -> &'static str {
        match self {
            Kind::Dimensionless => "a dimensionless quantity",
            Kind::VolumeRate => "volumetric flow",
            Kind::EnergyIntensity => "energy per volume",
            Kind::MolarEnergy => "molar energy",
            Kind::MolarEntropy => "molar entropy",
            Kind::MolarMass => "molar mass",
            Kind::Temperature => "temperature",
            Kind::Density => "mass density",
            Kind::Currency => "currency",
        }
    }
}

fn normalize(units: &str) -> String {
    units
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace("**", "^")
}

/// Returns the dimension and the factor converting into SI base units.
fn lookup(units: &str) -> Option<(Kind, f64)> {
    let entry = match normalize(units).as_str() {
        "" | "dimensionless" | "fraction" | "-" | "1" => (Kind::Dimensionless, 1.0),

        "m^3/s" => (Kind::VolumeRate, 1.0),
        "m^3/hr" | "m^3/h" => (Kind::VolumeRate, 1.0 / SECONDS_PER_HOUR),
        "m^3/day" | "m^3/d" => (Kind::VolumeRate, 1.0 / SECONDS_PER_DAY),
        "L/s" => (Kind::VolumeRate, 1e-3),
        "gal/min" | "gpm" => (Kind::VolumeRate, CUBIC_METERS_PER_GALLON / 60.0),
        "gal/day" | "gpd" => (Kind::VolumeRate, CUBIC_METERS_PER_GALLON / SECONDS_PER_DAY),
        "Mgal/day" | "MGD" => (
            Kind::VolumeRate,
            1e6 * CUBIC_METERS_PER_GALLON / SECONDS_PER_DAY,
        ),

        "kWh/m^3" => (Kind::EnergyIntensity, JOULES_PER_KILOWATT_HOUR),
        "Wh/m^3" => (Kind::EnergyIntensity, JOULES_PER_KILOWATT_HOUR / 1e3),
        "J/m^3" => (Kind::EnergyIntensity, 1.0),
        "kWh/kgal" => (
            Kind::EnergyIntensity,
            JOULES_PER_KILOWATT_HOUR / (1e3 * CUBIC_METERS_PER_GALLON),
        ),

        "J/mol" => (Kind::MolarEnergy, 1.0),
        "kJ/mol" => (Kind::MolarEnergy, 1e3),

        "J/mol/K" | "J/K/mol" | "J/(mol*K)" => (Kind::MolarEntropy, 1.0),
        "kJ/mol/K" | "kJ/K/mol" => (Kind::MolarEntropy, 1e3),

        "kg/mol" => (Kind::MolarMass, 1.0),
        "g/mol" => (Kind::MolarMass, 1e-3),

        "K" => (Kind::Temperature, 1.0),

        "kg/m^3" | "g/L" => (Kind::Density, 1.0),

        other if Currency::parse(other).is_some() => (Kind::Currency, 1.0),

        _ => return None,
    };
    Some(entry)
}

fn expect(units: &str, kind: Kind) -> Result<f64, UnitError> {
    match lookup(units) {
        Some((found, factor)) if found == kind => Ok(factor),
        Some(_) => Err(UnitError::Mismatch {
            expected: kind.describe(),
            found: units.to_owned(),
        }),
        None => Err(UnitError::Unknown(units.to_owned())),
    }
}

/// Checks that `units` names a dimensionless quantity.
///
/// # Errors
///
/// Returns a [`UnitError`] if the unit is unknown or not dimensionless.
pub fn dimensionless(units: &str) -> Result<(), UnitError> {
    expect(units, Kind::Dimensionless).map(|_| ())
}

/// Interprets `value` in `units` as a volumetric flow.
///
/// # Errors
///
/// Returns a [`UnitError`] if the unit is unknown or not a flow unit.
///
/// # Example
///
/// ```
/// use aquifer_core::units;
/// use uom::si::volume_rate::cubic_meter_per_second;
///
/// let flow = units::volume_rate(3600.0, "m^3/hr").unwrap();
/// assert!((flow.get::<cubic_meter_per_second>() - 1.0).abs() < 1e-12);
///
/// assert!(units::volume_rate(1.0, "kWh/m^3").is_err());
/// ```
pub fn volume_rate(value: f64, units: &str) -> Result<VolumeRate, UnitError> {
    let factor = expect(units, Kind::VolumeRate)?;
    Ok(VolumeRate::new::<cubic_meter_per_second>(value * factor))
}

/// Interprets `value` in `units` as an [`EnergyIntensity`].
///
/// # Errors
///
/// Returns a [`UnitError`] if the unit is unknown or not energy per volume.
pub fn energy_intensity(value: f64, units: &str) -> Result<EnergyIntensity, UnitError> {
    let factor = expect(units, Kind::EnergyIntensity)?;
    Ok(EnergyIntensity::new::<pascal>(value * factor))
}

/// Interprets `value` in `units` as a molar energy, such as a reaction enthalpy.
///
/// # Errors
///
/// Returns a [`UnitError`] if the unit is unknown or not a molar energy.
pub fn molar_energy(value: f64, units: &str) -> Result<MolarEnergy, UnitError> {
    let factor = expect(units, Kind::MolarEnergy)?;
    Ok(MolarEnergy::new::<joule_per_mole>(value * factor))
}

/// Interprets `value` in `units` as a molar entropy, such as a reaction entropy.
///
/// # Errors
///
/// Returns a [`UnitError`] if the unit is unknown or not a molar entropy.
pub fn molar_entropy(value: f64, units: &str) -> Result<MolarHeatCapacity, UnitError> {
    let factor = expect(units, Kind::MolarEntropy)?;
    Ok(MolarHeatCapacity::new::<joule_per_kelvin_mole>(value * factor))
}

/// Interprets `value` in `units` as a molar mass, such as a molecular weight.
///
/// # Errors
///
/// Returns a [`UnitError`] if the unit is unknown or not a molar mass.
pub fn molar_mass(value: f64, units: &str) -> Result<MolarMass, UnitError> {
    let factor = expect(units, Kind::MolarMass)?;
    Ok(MolarMass::new::<kilogram_per_mole>(value * factor))
}

/// Interprets `value` in `units` as an absolute temperature.
///
/// # Errors
///
/// Returns a [`UnitError`] if the unit is unknown or not a temperature.
pub fn temperature(value: f64, units: &str) -> Result<ThermodynamicTemperature, UnitError> {
    expect(units, Kind::Temperature)?;
    Ok(ThermodynamicTemperature::new::<kelvin>(value))
}

/// Interprets `value` in `units` as a mass density.
///
/// # Errors
///
/// Returns a [`UnitError`] if the unit is unknown or not a density.
pub fn mass_density(value: f64, units: &str) -> Result<MassDensity, UnitError> {
    let factor = expect(units, Kind::Density)?;
    Ok(MassDensity::new::<kilogram_per_cubic_meter>(value * factor))
}

/// Interprets `units` as a currency.
///
/// # Errors
///
/// Returns a [`UnitError`] if the unit is unknown or not a currency.
pub fn currency(units: &str) -> Result<Currency, UnitError> {
    let normalized = normalize(units);
    match Currency::parse(&normalized) {
        Some(currency) => Ok(currency),
        None if lookup(&normalized).is_some() => Err(UnitError::Mismatch {
            expected: Kind::Currency.describe(),
            found: units.to_owned(),
        }),
        None => Err(UnitError::Unknown(units.to_owned())),
    }
}

/// A currency unit with a magnitude prefix and a cost reference year.
///
/// Parsed from strings such as `"USD_2018"`, `"kUSD_2020"` or `"MUSD_2018"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Multiplier into plain dollars (1, 1e3, or 1e6).
    pub scale: u32,
    /// The year the amounts are expressed in.
    pub year: u16,
}

impl Currency {
    fn parse(units: &str) -> Option<Self> {
        let (prefix, year) = units.split_once("USD_")?;
        let scale = match prefix {
            "" => 1,
            "k" => 1_000,
            "M" => 1_000_000,
            _ => return None,
        };
        let year = year.parse().ok()?;
        Some(Self { scale, year })
    }

    /// Returns the same year in plain dollars.
    #[must_use]
    pub fn dollars(self) -> Self {
        Self { scale: 1, ..self }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.scale {
            1_000 => "k",
            1_000_000 => "M",
            _ => "",
        };
        write!(f, "{prefix}USD_{}", self.year)
    }
}
