//! Numeric invariants checked once at construction.
//!
//! Cost-function parameters such as a capital basis or a flow basis only make
//! sense when strictly positive. Wrapping them in [`Constrained`] moves that
//! check to load time so downstream arithmetic can trust the value.

use std::{cmp::Ordering, marker::PhantomData};

use thiserror::Error;
use uom::si::{Dimension, Quantity, Units};

/// A trait for enforcing numeric invariants at construction time.
pub trait Constraint<T> {
    /// Checks that the given value satisfies this constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if the value does not satisfy the constraint.
    fn check(value: &T) -> Result<(), ConstraintError>;
}

/// An error returned when a [`Constraint`] is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("value must not be negative")]
    Negative,
    #[error("value must not be zero")]
    Zero,
    #[error("value is not a number")]
    NotANumber,
    #[error("value must be finite")]
    Infinite,
}

/// A wrapper enforcing a numeric constraint at construction time.
///
/// # Example
///
/// ```
/// use aquifer_core::{Constrained, StrictlyPositive};
///
/// let basis = Constrained::<f64, StrictlyPositive>::new(4732.0).unwrap();
/// assert_eq!(basis.into_inner(), 4732.0);
///
/// assert!(StrictlyPositive::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    _marker: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// Constructs a new constrained value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not satisfy the constraint.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::check(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, C: Constraint<T>> AsRef<T> for Constrained<T, C> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Marker for values strictly greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictlyPositive;

impl StrictlyPositive {
    /// Constructs a [`Constrained`] strictly positive value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is zero, negative, infinite, or `NaN`.
    pub fn new<T>(value: T) -> Result<Constrained<T, StrictlyPositive>, ConstraintError>
    where
        StrictlyPositive: Constraint<T>,
    {
        Constrained::new(value)
    }
}

/// Marker for values greater than or equal to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonNegative;

impl NonNegative {
    /// Constructs a [`Constrained`] non-negative value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is negative, infinite, or `NaN`.
    pub fn new<T>(value: T) -> Result<Constrained<T, NonNegative>, ConstraintError>
    where
        NonNegative: Constraint<T>,
    {
        Constrained::new(value)
    }
}

fn check_sign(value: f64, allow_zero: bool) -> Result<(), ConstraintError> {
    if value.is_infinite() {
        return Err(ConstraintError::Infinite);
    }
    match value.partial_cmp(&0.0) {
        None => Err(ConstraintError::NotANumber),
        Some(Ordering::Less) => Err(ConstraintError::Negative),
        Some(Ordering::Equal) if !allow_zero => Err(ConstraintError::Zero),
        Some(_) => Ok(()),
    }
}

impl Constraint<f64> for StrictlyPositive {
    fn check(value: &f64) -> Result<(), ConstraintError> {
        check_sign(*value, false)
    }
}

impl Constraint<f64> for NonNegative {
    fn check(value: &f64) -> Result<(), ConstraintError> {
        check_sign(*value, true)
    }
}

impl<D, U> Constraint<Quantity<D, U, f64>> for StrictlyPositive
where
    D: Dimension + ?Sized,
    U: Units<f64> + ?Sized,
{
    fn check(value: &Quantity<D, U, f64>) -> Result<(), ConstraintError> {
        check_sign(value.value, false)
    }
}

impl<D, U> Constraint<Quantity<D, U, f64>> for NonNegative
where
    D: Dimension + ?Sized,
    U: Units<f64> + ?Sized,
{
    fn check(value: &Quantity<D, U, f64>) -> Result<(), ConstraintError> {
        check_sign(value.value, true)
    }
}
