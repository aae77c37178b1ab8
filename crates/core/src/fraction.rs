use std::{cmp::Ordering, ops::Mul};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A bounded scalar in `[0.0, 1.0]`.
///
/// Used for water recovery and solute removal fractions.
/// Because the wrapped `f64` is always finite and within `[0, 1]`,
/// `Fraction` implements [`Eq`] and [`Ord`].
///
/// # Examples
/// ```
/// use aquifer_core::Fraction;
///
/// let removal = Fraction::new(0.8).unwrap();
/// assert_eq!(removal.get(), 0.8);
/// assert_eq!(removal.complement().get(), 1.0 - 0.8);
///
/// // Scale a mass flow by a fraction (either order).
/// assert_eq!(removal * 10.0, 8.0);
/// assert_eq!(10.0 * removal, 8.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Fraction(f64);

impl Fraction {
    /// The fraction `0.0`.
    pub const ZERO: Self = Self(0.0);

    /// The fraction `1.0`.
    pub const ONE: Self = Self(1.0);

    /// Creates a `Fraction` if `value` is within `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`FractionError::NotFinite`] if `value` is `NaN` or infinite.
    /// Returns [`FractionError::OutOfRange`] if `value` is below `0.0`
    /// or above `1.0`.
    pub fn new(value: f64) -> Result<Self, FractionError> {
        if !value.is_finite() {
            return Err(FractionError::NotFinite(value));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(FractionError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Returns the inner `f64`.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns `1 - self`, the fraction that passes through.
    #[must_use]
    pub fn complement(self) -> Self {
        Self(1.0 - self.0)
    }
}

impl TryFrom<f64> for Fraction {
    type Error = FractionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Fraction::new(value)
    }
}

impl From<Fraction> for f64 {
    fn from(f: Fraction) -> Self {
        f.0
    }
}

impl<T: Mul<f64, Output = T>> Mul<T> for Fraction {
    type Output = T;

    fn mul(self, rhs: T) -> Self::Output {
        rhs * self.0
    }
}

impl Mul<Fraction> for f64 {
    type Output = f64;

    fn mul(self, rhs: Fraction) -> Self::Output {
        self * rhs.0
    }
}

impl Eq for Fraction {}

impl Ord for Fraction {
    /// The unwrap cannot fail since `Fraction` never holds `NaN`.
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap()
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Errors that can occur when constructing a [`Fraction`].
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FractionError {
    /// Input was not finite.
    #[error("value is not finite: {0}")]
    NotFinite(f64),

    /// Input was outside the allowed range.
    #[error("value {0} is outside the range [0, 1]")]
    OutOfRange(f64),
}
