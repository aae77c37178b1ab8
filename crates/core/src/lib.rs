//! Core types shared across the Aquifer crates.
//!
//! This crate defines the small set of abstractions the database, costing,
//! and unit-model crates build on:
//!
//! - [`Fraction`]: a value guaranteed to lie in `[0, 1]`
//! - [`Constrained`]: a wrapper enforcing a numeric invariant such as
//!   [`StrictlyPositive`] at construction time
//! - [`units`]: parsing of the unit strings found in data files into
//!   [`uom`] quantities
//! - [`Param`]: a value and unit string pair as found in data files
//! - [`Model`]: a callable mapping a typed input to a typed output

mod constraint;
mod fraction;
mod model;
mod param;

pub mod units;

pub use constraint::{Constrained, Constraint, ConstraintError, NonNegative, StrictlyPositive};
pub use fraction::{Fraction, FractionError};
pub use model::Model;
pub use param::Param;
