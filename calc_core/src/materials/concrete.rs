//! # Concrete
//!
//! Design properties of structural concrete per NBR 6118, derived from the
//! characteristic compressive strength `fck` and the coarse aggregate type.
//!
//! Every derived quantity is a method computed from the two stored inputs, so
//! a `Concrete` value can be shared freely between verifiers.
//!
//! | Property | Expression |
//! |---|---|
//! | `fcd` | `fck / 1.4` |
//! | `fctm` | `0.3·fck^(2/3)` (fck ≤ 50), `2.12·ln(1 + 0.11·fck)` above |
//! | `fctk,inf` / `fctk,sup` | `0.7·fctm` / `1.3·fctm` |
//! | `fctd` | `fctk,inf / 1.4` |
//! | `Eci` | `αE·5600·√fck` |
//! | `Ecs` | `min(0.8 + 0.2·fck/80, 1)·Eci` |
//! | `σcd` | `0.85·fcd` |
//! | `fcd,fad` / `fctd,fad` | `0.45·fcd` / `0.30·fctd` |
//!
//! ## Example
//!
//! ```rust
//! use calc_core::materials::{Aggregate, Concrete};
//!
//! let c30 = Concrete::new(30.0, Aggregate::Granite).unwrap();
//! assert!((c30.fcd_mpa() - 30.0 / 1.4).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ensure_positive, CalcResult};

/// Partial safety factor for concrete
pub const GAMMA_C: f64 = 1.4;

/// Coarse aggregate type, which scales the initial elastic modulus.
///
/// Deserialization is lenient: unrecognized names fall back to granite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Aggregate {
    #[default]
    Granite,
    Basalt,
    Limestone,
    Sandstone,
}

impl Aggregate {
    pub const ALL: [Aggregate; 4] = [
        Aggregate::Granite,
        Aggregate::Basalt,
        Aggregate::Limestone,
        Aggregate::Sandstone,
    ];

    /// Modulus multiplier αE
    pub fn alpha_e(&self) -> f64 {
        match self {
            Aggregate::Granite => 1.0,
            Aggregate::Basalt => 1.2,
            Aggregate::Limestone => 0.9,
            Aggregate::Sandstone => 0.7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::Granite => "granite",
            Aggregate::Basalt => "basalt",
            Aggregate::Limestone => "limestone",
            Aggregate::Sandstone => "sandstone",
        }
    }
}

impl From<String> for Aggregate {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "basalt" | "basalto" => Aggregate::Basalt,
            "limestone" | "calcario" => Aggregate::Limestone,
            "sandstone" | "arenito" => Aggregate::Sandstone,
            "granite" | "granito" => Aggregate::Granite,
            other => {
                log::debug!("unknown aggregate '{}', using granite", other);
                Aggregate::Granite
            }
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Structural concrete defined by `fck` and aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Concrete {
    fck_mpa: f64,
    aggregate: Aggregate,
}

impl Concrete {
    /// Create a concrete class. `fck` must be a positive finite value in MPa.
    pub fn new(fck_mpa: f64, aggregate: Aggregate) -> CalcResult<Self> {
        ensure_positive("fck_mpa", fck_mpa)?;
        Ok(Concrete { fck_mpa, aggregate })
    }

    pub fn fck_mpa(&self) -> f64 {
        self.fck_mpa
    }

    pub fn aggregate(&self) -> Aggregate {
        self.aggregate
    }

    /// Design compressive strength
    pub fn fcd_mpa(&self) -> f64 {
        self.fck_mpa / GAMMA_C
    }

    /// Mean tensile strength
    pub fn fctm_mpa(&self) -> f64 {
        if self.fck_mpa <= 50.0 {
            0.3 * self.fck_mpa.powf(2.0 / 3.0)
        } else {
            2.12 * (1.0 + 0.11 * self.fck_mpa).ln()
        }
    }

    pub fn fctk_inf_mpa(&self) -> f64 {
        0.7 * self.fctm_mpa()
    }

    pub fn fctk_sup_mpa(&self) -> f64 {
        1.3 * self.fctm_mpa()
    }

    /// Design tensile strength
    pub fn fctd_mpa(&self) -> f64 {
        self.fctk_inf_mpa() / GAMMA_C
    }

    /// Initial (tangent) elastic modulus
    pub fn eci_mpa(&self) -> f64 {
        self.aggregate.alpha_e() * 5600.0 * self.fck_mpa.sqrt()
    }

    /// Secant elastic modulus
    pub fn ecs_mpa(&self) -> f64 {
        let alpha_i = (0.8 + 0.2 * self.fck_mpa / 80.0).min(1.0);
        alpha_i * self.eci_mpa()
    }

    /// Stress of the rectangular compression block
    pub fn sigma_cd_mpa(&self) -> f64 {
        0.85 * self.fcd_mpa()
    }

    /// Compressive stress limit under repeated loading
    pub fn fcd_fad_mpa(&self) -> f64 {
        0.45 * self.fcd_mpa()
    }

    /// Tensile stress limit for crack onset under repeated loading
    pub fn fctd_fad_mpa(&self) -> f64 {
        0.30 * self.fctd_mpa()
    }
}

impl fmt::Display for Concrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{} ({})", self.fck_mpa, self.aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_c30_properties() {
        let c = Concrete::new(30.0, Aggregate::Granite).unwrap();
        assert_relative_eq!(c.fcd_mpa(), 21.428571, epsilon = 1e-5);
        assert_relative_eq!(c.fctm_mpa(), 2.896468, epsilon = 1e-5);
        assert_relative_eq!(c.fctd_mpa(), 0.7 * c.fctm_mpa() / 1.4, epsilon = 1e-12);
        assert_relative_eq!(c.eci_mpa(), 30672.46, epsilon = 0.01);
        // 0.8 + 0.2·30/80 = 0.875
        assert_relative_eq!(c.ecs_mpa(), 0.875 * c.eci_mpa(), epsilon = 1e-9);
        assert_relative_eq!(c.sigma_cd_mpa(), 0.85 * c.fcd_mpa(), epsilon = 1e-12);
    }

    #[test]
    fn test_fatigue_limits_are_exact_fractions() {
        for fck in [20.0, 25.0, 30.0, 40.0, 50.0, 70.0] {
            let c = Concrete::new(fck, Aggregate::Basalt).unwrap();
            assert_eq!(c.fcd_fad_mpa(), 0.45 * c.fcd_mpa());
            assert_eq!(c.fctd_fad_mpa(), 0.30 * c.fctd_mpa());
            assert_eq!(c.fcd_mpa(), fck / 1.4);
        }
    }

    #[test]
    fn test_high_strength_tensile_branch() {
        let c = Concrete::new(70.0, Aggregate::Granite).unwrap();
        assert_relative_eq!(c.fctm_mpa(), 2.12 * (1.0f64 + 7.7).ln(), epsilon = 1e-12);
        assert_relative_eq!(c.fctk_sup_mpa(), 1.3 * c.fctm_mpa(), epsilon = 1e-12);
    }

    #[test]
    fn test_ecs_factor_capped() {
        let c = Concrete::new(90.0, Aggregate::Granite).unwrap();
        assert_relative_eq!(c.ecs_mpa(), c.eci_mpa(), epsilon = 1e-9);
    }

    #[test]
    fn test_aggregate_multiplier() {
        let granite = Concrete::new(25.0, Aggregate::Granite).unwrap();
        let basalt = Concrete::new(25.0, Aggregate::Basalt).unwrap();
        let sandstone = Concrete::new(25.0, Aggregate::Sandstone).unwrap();
        assert_relative_eq!(basalt.eci_mpa() / granite.eci_mpa(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(sandstone.eci_mpa() / granite.eci_mpa(), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregate_lenient_deserialization() {
        let a: Aggregate = serde_json::from_str("\"limestone\"").unwrap();
        assert_eq!(a, Aggregate::Limestone);
        let unknown: Aggregate = serde_json::from_str("\"slag\"").unwrap();
        assert_eq!(unknown.alpha_e(), 1.0);
        assert_eq!(serde_json::to_string(&Aggregate::Basalt).unwrap(), "\"basalt\"");
    }

    #[test]
    fn test_invalid_fck() {
        assert!(Concrete::new(0.0, Aggregate::Granite).is_err());
        assert!(Concrete::new(f64::NAN, Aggregate::Granite).is_err());
        assert!(Concrete::new(-20.0, Aggregate::Granite).is_err());
    }
}
