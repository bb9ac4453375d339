//! Load combinations for a crane-runway / rail beam
//!
//! Every combination has the form
//!
//! ```text
//! S = γg·(DEAD + TRILHO) + γq·φ·ENV_MOVEL
//! ```
//!
//! where `φ = CIV·CIA·CNF` is the product of the dynamic coefficients. The
//! permanent cases are read at the stations of the moving-load envelope,
//! matching one-sided limits at supports (see [`super::envelope`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::envelope::{DeterministicCase, EnvelopeCase, ForceBounds, ForcePair, StationValue};
use super::load_types::LoadCaseId;
use crate::errors::{ensure_non_negative, ensure_positive, CalcError, CalcResult};

/// A load combination with factors per input case
///
/// # Example
/// ```
/// use calc_core::loads::{LoadCaseId, LoadCombination};
///
/// let combo = LoadCombination::new(LoadCaseId::Elu, "1.4(G+T) + 1.4Q")
///     .with_factor(LoadCaseId::Dead, 1.4)
///     .with_factor(LoadCaseId::Trilho, 1.4)
///     .with_factor(LoadCaseId::EnvMovel, 1.4);
/// assert_eq!(combo.get_factor(LoadCaseId::EnvMovel), 1.4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Which combination this is (ELU, FADIGA, ...)
    pub kind: LoadCaseId,
    /// Human-readable equation
    pub equation: String,
    /// Factor per input case (missing = 0)
    pub factors: HashMap<LoadCaseId, f64>,
}

impl LoadCombination {
    pub fn new(kind: LoadCaseId, equation: impl Into<String>) -> Self {
        LoadCombination {
            kind,
            equation: equation.into(),
            factors: HashMap::new(),
        }
    }

    pub fn with_factor(mut self, case: LoadCaseId, factor: f64) -> Self {
        self.factors.insert(case, factor);
        self
    }

    pub fn get_factor(&self, case: LoadCaseId) -> f64 {
        self.factors.get(&case).copied().unwrap_or(0.0)
    }

    pub fn name(&self) -> &'static str {
        self.kind.code()
    }

    /// Combine one station.
    ///
    /// Permanent values are single-valued, so they shift both bounds; the
    /// mobile bounds are scaled by their factor times `dynamic`.
    pub fn apply(&self, dead: ForcePair, trilho: ForcePair, mobile: &ForceBounds, dynamic: f64) -> ForceBounds {
        let g_m = self.get_factor(LoadCaseId::Dead) * dead.m_knm + self.get_factor(LoadCaseId::Trilho) * trilho.m_knm;
        let g_v = self.get_factor(LoadCaseId::Dead) * dead.v_kn + self.get_factor(LoadCaseId::Trilho) * trilho.v_kn;
        let q = self.get_factor(LoadCaseId::EnvMovel) * dynamic;
        ForceBounds {
            m_max_knm: g_m + q * mobile.m_max_knm,
            m_min_knm: g_m + q * mobile.m_min_knm,
            v_max_kn: g_v + q * mobile.v_max_kn,
            v_min_kn: g_v + q * mobile.v_min_kn,
        }
    }
}

/// Dynamic coefficients applied to the moving load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicCoefficients {
    /// Vertical impact coefficient
    pub civ: f64,
    /// Additional impact coefficient
    pub cia: f64,
    /// Lane-number coefficient
    pub cnf: f64,
}

impl Default for DynamicCoefficients {
    fn default() -> Self {
        DynamicCoefficients {
            civ: 1.0,
            cia: 1.0,
            cnf: 1.0,
        }
    }
}

impl DynamicCoefficients {
    pub fn product(&self) -> f64 {
        self.civ * self.cia * self.cnf
    }

    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("civ", self.civ)?;
        ensure_positive("cia", self.cia)?;
        ensure_positive("cnf", self.cnf)?;
        Ok(())
    }
}

/// Partial factors of the standard combination set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinationSettings {
    /// γg of the ultimate combination
    pub gamma_g: f64,
    /// γq of the ultimate combination
    pub gamma_q: f64,
    /// ψ of the moving load in the fatigue combination
    pub psi_fatigue: f64,
    /// ψ1 of the frequent combination
    pub psi_frequent: f64,
    /// ψ2 of the quasi-permanent combination
    pub psi_quasi_permanent: f64,
    pub dynamic: DynamicCoefficients,
}

impl Default for CombinationSettings {
    fn default() -> Self {
        CombinationSettings {
            gamma_g: 1.4,
            gamma_q: 1.4,
            psi_fatigue: 1.0,
            psi_frequent: 0.8,
            psi_quasi_permanent: 0.5,
            dynamic: DynamicCoefficients::default(),
        }
    }
}

impl CombinationSettings {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("gamma_g", self.gamma_g)?;
        ensure_positive("gamma_q", self.gamma_q)?;
        ensure_non_negative("psi_fatigue", self.psi_fatigue)?;
        ensure_non_negative("psi_frequent", self.psi_frequent)?;
        ensure_non_negative("psi_quasi_permanent", self.psi_quasi_permanent)?;
        self.dynamic.validate()
    }

    /// The combination named by `kind`
    pub fn combination(&self, kind: LoadCaseId) -> CalcResult<LoadCombination> {
        let (gamma, psi, equation) = match kind {
            LoadCaseId::Elu => (self.gamma_g, self.gamma_q, format!("{}(G+T) + {}Q", self.gamma_g, self.gamma_q)),
            LoadCaseId::Fadiga => (1.0, self.psi_fatigue, format!("G+T + {}Q", self.psi_fatigue)),
            LoadCaseId::ElsFreq => (1.0, self.psi_frequent, format!("G+T + {}Q", self.psi_frequent)),
            LoadCaseId::ElsQp => (1.0, self.psi_quasi_permanent, format!("G+T + {}Q", self.psi_quasi_permanent)),
            other => {
                return Err(CalcError::invalid_input(
                    "kind",
                    other.code(),
                    "Not a load combination",
                ))
            }
        };
        Ok(LoadCombination::new(kind, equation)
            .with_factor(LoadCaseId::Dead, gamma)
            .with_factor(LoadCaseId::Trilho, gamma)
            .with_factor(LoadCaseId::EnvMovel, psi))
    }

    /// All four combinations, in [`LoadCaseId::COMBINATIONS`] order
    pub fn combinations(&self) -> Vec<LoadCombination> {
        LoadCaseId::COMBINATIONS
            .iter()
            .filter_map(|&kind| self.combination(kind).ok())
            .collect()
    }
}

/// The combination set with default factors:
///
/// 1. ELU: 1.4(G+T) + 1.4Q
/// 2. FADIGA: G+T + 1.0Q
/// 3. ELS-FREQ: G+T + 0.8Q
/// 4. ELS-QP: G+T + 0.5Q
pub fn nbr6118_combinations() -> Vec<LoadCombination> {
    CombinationSettings::default().combinations()
}

/// Build a combined envelope at the stations of the moving-load envelope.
///
/// The nth occurrence of a station in the envelope is matched with the nth
/// occurrence in each permanent case, so jumps over supports survive.
pub fn combine(
    combo: &LoadCombination,
    dynamic: &DynamicCoefficients,
    dead: &DeterministicCase,
    trilho: &DeterministicCase,
    mobile: &EnvelopeCase,
) -> CalcResult<EnvelopeCase> {
    dynamic.validate()?;
    let phi = dynamic.product();
    let points = mobile
        .points()
        .iter()
        .map(|p| {
            let g = dead.value_at(p.station)?;
            let t = trilho.value_at(p.station)?;
            Ok(StationValue {
                station: p.station,
                values: combo.apply(g, t, &p.values, phi),
            })
        })
        .collect::<CalcResult<Vec<_>>>()?;

    log::debug!(
        "combined {} = {} over {} stations (dynamic factor {:.3})",
        combo.name(),
        combo.equation,
        points.len(),
        phi
    );
    Ok(EnvelopeCase::from_points(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::envelope::{DeterministicRow, EnvelopeRow, Station};
    use approx::assert_relative_eq;

    fn cases() -> (DeterministicCase, DeterministicCase, EnvelopeCase) {
        let dead = DeterministicCase::from_rows(
            "DEAD",
            vec![
                DeterministicRow { x: 0.0, v: -9.57, m: 0.0 },
                DeterministicRow { x: 6.0, v: 15.88, m: -18.95 },
                DeterministicRow { x: 6.0, v: -15.88, m: -18.95 },
                DeterministicRow { x: 12.0, v: 9.57, m: 0.0 },
            ],
        )
        .unwrap();
        // No jump recorded for the rail: one row serves both sides
        let trilho = DeterministicCase::from_rows(
            "TRILHO",
            vec![
                DeterministicRow { x: 0.0, v: -1.13, m: 0.0 },
                DeterministicRow { x: 6.0, v: 1.87, m: -2.23 },
                DeterministicRow { x: 12.0, v: 1.13, m: 0.0 },
            ],
        )
        .unwrap();
        let mobile = EnvelopeCase::from_rows(
            "ENV_MOVEL",
            vec![
                EnvelopeRow { x: 0.0, v_max: 10.47, v_min: -105.52, m_max: 0.0, m_min: 0.0 },
                EnvelopeRow { x: 6.0, v_max: 119.46, v_min: 0.0, m_max: 0.0, m_min: -73.3 },
                EnvelopeRow { x: 6.0, v_max: 0.0, v_min: -109.16, m_max: 0.0, m_min: -73.3 },
                EnvelopeRow { x: 12.0, v_max: 105.52, v_min: -10.47, m_max: 0.0, m_min: 0.0 },
            ],
        )
        .unwrap();
        (dead, trilho, mobile)
    }

    #[test]
    fn test_standard_set() {
        let combos = nbr6118_combinations();
        assert_eq!(combos.len(), 4);
        assert_eq!(combos[0].name(), "ELU");
        assert_eq!(combos[0].get_factor(LoadCaseId::Dead), 1.4);
        assert_eq!(combos[1].get_factor(LoadCaseId::EnvMovel), 1.0);
        assert_eq!(combos[2].get_factor(LoadCaseId::EnvMovel), 0.8);
        assert_eq!(combos[3].get_factor(LoadCaseId::EnvMovel), 0.5);
        assert_eq!(combos[3].get_factor(LoadCaseId::Trilho), 1.0);
    }

    #[test]
    fn test_input_case_is_not_a_combination() {
        assert!(CombinationSettings::default().combination(LoadCaseId::Dead).is_err());
    }

    #[test]
    fn test_apply_station() {
        let combo = CombinationSettings::default().combination(LoadCaseId::Elu).unwrap();
        let g = ForcePair { v_kn: 10.0, m_knm: 20.0 };
        let t = ForcePair { v_kn: 1.0, m_knm: 2.0 };
        let q = ForceBounds { m_max_knm: 50.0, m_min_knm: -10.0, v_max_kn: 30.0, v_min_kn: -5.0 };
        let s = combo.apply(g, t, &q, 1.0);
        assert_relative_eq!(s.m_max_knm, 1.4 * 22.0 + 1.4 * 50.0, epsilon = 1e-12);
        assert_relative_eq!(s.m_min_knm, 1.4 * 22.0 - 1.4 * 10.0, epsilon = 1e-12);
        assert_relative_eq!(s.v_min_kn, 1.4 * 11.0 - 1.4 * 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uls_keeps_support_jump() {
        let (dead, trilho, mobile) = cases();
        let combo = CombinationSettings::default().combination(LoadCaseId::Elu).unwrap();
        let elu = combine(&combo, &DynamicCoefficients::default(), &dead, &trilho, &mobile).unwrap();

        assert_eq!(elu.len(), 4);
        let left = elu.value_at(Station::left(6.0)).unwrap();
        let right = elu.value_at(Station::right(6.0)).unwrap();
        assert_relative_eq!(left.m_min_knm, -132.272, epsilon = 1e-9);
        assert_relative_eq!(left.v_max_kn, 192.094, epsilon = 1e-9);
        // Rail has no jump, so its single value is used on the right as well
        assert_relative_eq!(right.v_min_kn, 1.4 * (-15.88 + 1.87) + 1.4 * -109.16, epsilon = 1e-9);
    }

    #[test]
    fn test_dynamic_coefficients_scale_mobile_only() {
        let (dead, trilho, mobile) = cases();
        let settings = CombinationSettings {
            dynamic: DynamicCoefficients { civ: 1.25, cia: 1.0, cnf: 1.1 },
            ..CombinationSettings::default()
        };
        let combo = settings.combination(LoadCaseId::Fadiga).unwrap();
        let fad = combine(&combo, &settings.dynamic, &dead, &trilho, &mobile).unwrap();
        let left = fad.value_at(Station::left(6.0)).unwrap();
        assert_relative_eq!(left.m_min_knm, -21.18 + 1.375 * -73.3, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = CombinationSettings {
            psi_frequent: -0.1,
            ..CombinationSettings::default()
        };
        assert!(settings.validate().is_err());
        let dynamic = DynamicCoefficients { civ: 0.0, ..DynamicCoefficients::default() };
        assert!(dynamic.validate().is_err());
    }

    #[test]
    fn test_combination_serialization() {
        let combo = CombinationSettings::default().combination(LoadCaseId::ElsQp).unwrap();
        let json = serde_json::to_string(&combo).unwrap();
        let parsed: LoadCombination = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind, LoadCaseId::ElsQp);
        assert_eq!(parsed.get_factor(LoadCaseId::EnvMovel), 0.5);
    }
}
