//! Reinforcing Steel (CA-50 / CA-60)
//!
//! Design properties of reinforcing bars and the fatigue stress-range limits
//! used for repeated loading.
//!
//! ## Fatigue stress-range limits (MPa)
//!
//! | Bar type | φ ≤ 16 | φ ≤ 20 | φ ≤ 25 | φ > 25 |
//! |---|---|---|---|---|
//! | Straight | 190 | 185 | 175 | 165 |
//! | Bent | 85 | 85 | 85 | 85 |
//! | Stirrup | 85 | 85 | 85 | 85 |
//!
//! ## Example
//!
//! ```rust
//! use calc_core::materials::steel::{BarType, ReinforcingSteel};
//!
//! let ca50 = ReinforcingSteel::new(500.0).unwrap();
//! assert_eq!(ca50.fatigue_limit_mpa(20.0, BarType::Straight), 185.0);
//! assert_eq!(ca50.fatigue_limit_mpa(20.0, BarType::Stirrup), 85.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ensure_positive, CalcResult};

/// Elastic modulus of reinforcing steel (MPa)
pub const ES_MPA: f64 = 210_000.0;

/// Partial safety factor for steel
pub const GAMMA_S: f64 = 1.15;

/// Upper bound on the design strength of transverse reinforcement (MPa)
pub const FYWD_MAX_MPA: f64 = 435.0;

/// Stress-range limit for bent bars and stirrups (MPa)
pub const BENT_BAR_FATIGUE_LIMIT_MPA: f64 = 85.0;

/// Straight-bar stress-range limits keyed by the upper bound of each
/// diameter class (mm). Bars above the last bound use `STRAIGHT_BAR_LIMIT_ABOVE`.
const STRAIGHT_BAR_LIMITS: [(f64, f64); 3] = [(16.0, 190.0), (20.0, 185.0), (25.0, 175.0)];
const STRAIGHT_BAR_LIMIT_ABOVE: f64 = 165.0;

/// Shape of a bar for the purpose of fatigue classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BarType {
    #[default]
    Straight,
    Bent,
    Stirrup,
}

impl BarType {
    pub fn display_name(&self) -> &'static str {
        match self {
            BarType::Straight => "straight bar",
            BarType::Bent => "bent bar",
            BarType::Stirrup => "stirrup",
        }
    }
}

impl fmt::Display for BarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Reinforcing steel defined by its characteristic yield strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReinforcingSteel {
    fyk_mpa: f64,
}

impl ReinforcingSteel {
    pub fn new(fyk_mpa: f64) -> CalcResult<Self> {
        ensure_positive("fyk_mpa", fyk_mpa)?;
        Ok(ReinforcingSteel { fyk_mpa })
    }

    pub fn fyk_mpa(&self) -> f64 {
        self.fyk_mpa
    }

    pub fn es_mpa(&self) -> f64 {
        ES_MPA
    }

    /// Design yield strength
    pub fn fyd_mpa(&self) -> f64 {
        self.fyk_mpa / GAMMA_S
    }

    /// Design yield strain in per mille
    pub fn epsilon_yd_permille(&self) -> f64 {
        self.fyd_mpa() / ES_MPA * 1000.0
    }

    /// Design strength when used as transverse reinforcement
    pub fn fywd_mpa(&self) -> f64 {
        self.fyd_mpa().min(FYWD_MAX_MPA)
    }

    /// Stress-range limit for a bar of the given diameter (mm) and shape.
    pub fn fatigue_limit_mpa(&self, diameter_mm: f64, bar_type: BarType) -> f64 {
        fatigue_limit_mpa(diameter_mm, bar_type)
    }
}

/// Table lookup, no interpolation between diameter classes.
pub fn fatigue_limit_mpa(diameter_mm: f64, bar_type: BarType) -> f64 {
    match bar_type {
        BarType::Bent | BarType::Stirrup => BENT_BAR_FATIGUE_LIMIT_MPA,
        BarType::Straight => STRAIGHT_BAR_LIMITS
            .iter()
            .find(|(max_phi, _)| diameter_mm <= *max_phi)
            .map(|(_, limit)| *limit)
            .unwrap_or(STRAIGHT_BAR_LIMIT_ABOVE),
    }
}

impl fmt::Display for ReinforcingSteel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CA-{:.0}", self.fyk_mpa / 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ca50_design_values() {
        let s = ReinforcingSteel::new(500.0).unwrap();
        assert_relative_eq!(s.fyd_mpa(), 434.7826, epsilon = 1e-4);
        assert_relative_eq!(s.epsilon_yd_permille(), 2.0704, epsilon = 1e-4);
        assert_relative_eq!(s.fywd_mpa(), s.fyd_mpa(), epsilon = 1e-12);
        assert_eq!(s.to_string(), "CA-50");
    }

    #[test]
    fn test_fywd_capped() {
        let ca60 = ReinforcingSteel::new(600.0).unwrap();
        assert_eq!(ca60.fywd_mpa(), FYWD_MAX_MPA);
    }

    #[test]
    fn test_fatigue_table_boundaries() {
        assert_eq!(fatigue_limit_mpa(10.0, BarType::Straight), 190.0);
        assert_eq!(fatigue_limit_mpa(16.0, BarType::Straight), 190.0);
        assert_eq!(fatigue_limit_mpa(16.1, BarType::Straight), 185.0);
        assert_eq!(fatigue_limit_mpa(20.0, BarType::Straight), 185.0);
        assert_eq!(fatigue_limit_mpa(25.0, BarType::Straight), 175.0);
        assert_eq!(fatigue_limit_mpa(32.0, BarType::Straight), 165.0);
        assert_eq!(fatigue_limit_mpa(32.0, BarType::Bent), 85.0);
        assert_eq!(fatigue_limit_mpa(8.0, BarType::Stirrup), 85.0);
    }

    #[test]
    fn test_invalid_fyk() {
        assert!(ReinforcingSteel::new(0.0).is_err());
        assert!(ReinforcingSteel::new(f64::INFINITY).is_err());
    }
}
