use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A phase label used in bases and reaction stoichiometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Liq,
    Vap,
    Sol,
}

impl Phase {
    /// All phases, in declaration order.
    pub const ALL: [Phase; 3] = [Phase::Liq, Phase::Vap, Phase::Sol];

    /// Returns the label used in documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Liq => "Liq",
            Phase::Vap => "Vap",
            Phase::Sol => "Sol",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`Phase`] or [`PhasePair`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown phase `{0}`")]
pub struct UnknownPhase(String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| UnknownPhase(s.to_owned()))
    }
}

/// The physical type of a phase, as declared by a base or a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhaseType {
    LiquidPhase,
    AqueousPhase,
    VaporPhase,
    SolidPhase,
}

/// An ordered pair of phases in equilibrium, such as vapor-liquid.
///
/// Serialized as `"<first>_<second>"` (for example `"Vap_Liq"`) so that it
/// can key maps in JSON and YAML documents.
///
/// ```
/// use aquifer_edb::{Phase, PhasePair};
///
/// let pair: PhasePair = "Vap_Liq".parse().unwrap();
/// assert_eq!(pair, PhasePair::new(Phase::Vap, Phase::Liq));
/// assert!(pair.contains(Phase::Liq));
/// assert_eq!(pair.to_string(), "Vap_Liq");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PhasePair(pub Phase, pub Phase);

impl PhasePair {
    #[must_use]
    pub fn new(first: Phase, second: Phase) -> Self {
        Self(first, second)
    }

    /// Returns `true` if either side of the pair is `phase`.
    #[must_use]
    pub fn contains(self, phase: Phase) -> bool {
        self.0 == phase || self.1 == phase
    }
}

impl fmt::Display for PhasePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.0, self.1)
    }
}

impl FromStr for PhasePair {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (first, second) = s.split_once('_').ok_or_else(|| UnknownPhase(s.to_owned()))?;
        Ok(Self(first.parse()?, second.parse()?))
    }
}

impl From<PhasePair> for String {
    fn from(pair: PhasePair) -> Self {
        pair.to_string()
    }
}

impl TryFrom<String> for PhasePair {
    type Error = UnknownPhase;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
