use std::collections::BTreeMap;

use aquifer_core::Param;
use serde::{Deserialize, Serialize};

/// Parameter data attached to a component or reaction.
///
/// Most parameters are a single [`Param`]; correlation coefficients are
/// stored as a map from coefficient index (`"1"`, `"2"`, ...) to [`Param`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Scalar(Param),
    Indexed(BTreeMap<String, Param>),
}

impl From<Param> for ParameterValue {
    fn from(param: Param) -> Self {
        Self::Scalar(param)
    }
}
