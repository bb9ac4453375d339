//! Load case identifiers
//!
//! Three input cases come from the frame analysis (self-weight, rail and the
//! moving-load envelope); the others are combinations derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CalcError;

/// Identifier of a load case or load combination
///
/// The serialized form is the short code used in analysis exports.
///
/// # Example
/// ```
/// use calc_core::loads::LoadCaseId;
///
/// let uls = LoadCaseId::Elu;
/// assert_eq!(uls.code(), "ELU");
/// assert!(uls.is_combination());
/// assert_eq!("ENV_MOVEL".parse::<LoadCaseId>().unwrap(), LoadCaseId::EnvMovel);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadCaseId {
    /// DEAD - structure self-weight
    #[serde(rename = "DEAD")]
    Dead,
    /// TRILHO - rail and fixings (secondary permanent load)
    #[serde(rename = "TRILHO")]
    Trilho,
    /// ENV_MOVEL - envelope of the moving load
    #[serde(rename = "ENV_MOVEL")]
    EnvMovel,
    /// ELU - ultimate limit state combination
    #[serde(rename = "ELU")]
    Elu,
    /// FADIGA - fatigue combination
    #[serde(rename = "FADIGA")]
    Fadiga,
    /// ELS-FREQ - frequent service combination
    #[serde(rename = "ELS-FREQ")]
    ElsFreq,
    /// ELS-QP - quasi-permanent service combination
    #[serde(rename = "ELS-QP")]
    ElsQp,
}

impl LoadCaseId {
    /// All identifiers, input cases first
    pub const ALL: [LoadCaseId; 7] = [
        LoadCaseId::Dead,
        LoadCaseId::Trilho,
        LoadCaseId::EnvMovel,
        LoadCaseId::Elu,
        LoadCaseId::Fadiga,
        LoadCaseId::ElsFreq,
        LoadCaseId::ElsQp,
    ];

    /// The derived combinations
    pub const COMBINATIONS: [LoadCaseId; 4] = [
        LoadCaseId::Elu,
        LoadCaseId::Fadiga,
        LoadCaseId::ElsFreq,
        LoadCaseId::ElsQp,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LoadCaseId::Dead => "DEAD",
            LoadCaseId::Trilho => "TRILHO",
            LoadCaseId::EnvMovel => "ENV_MOVEL",
            LoadCaseId::Elu => "ELU",
            LoadCaseId::Fadiga => "FADIGA",
            LoadCaseId::ElsFreq => "ELS-FREQ",
            LoadCaseId::ElsQp => "ELS-QP",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LoadCaseId::Dead => "Self-weight",
            LoadCaseId::Trilho => "Rail",
            LoadCaseId::EnvMovel => "Moving load envelope",
            LoadCaseId::Elu => "Ultimate combination",
            LoadCaseId::Fadiga => "Fatigue combination",
            LoadCaseId::ElsFreq => "Frequent service combination",
            LoadCaseId::ElsQp => "Quasi-permanent service combination",
        }
    }

    /// True for cases derived from the three input cases
    pub fn is_combination(&self) -> bool {
        Self::COMBINATIONS.contains(self)
    }

    /// True for cases that carry max/min bounds rather than single values
    pub fn is_envelope(&self) -> bool {
        !matches!(self, LoadCaseId::Dead | LoadCaseId::Trilho)
    }

    /// True for the permanent input cases (self-weight and rail)
    pub fn is_permanent(&self) -> bool {
        matches!(self, LoadCaseId::Dead | LoadCaseId::Trilho)
    }
}

impl fmt::Display for LoadCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LoadCaseId {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        LoadCaseId::ALL
            .iter()
            .copied()
            .find(|id| id.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| CalcError::load_case_not_found(code))
    }
}
