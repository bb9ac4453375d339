//! # Materials
//!
//! Concrete and reinforcing steel per NBR 6118.
//!
//! ## Material Types
//!
//! - **Concrete**: defined by `fck` and aggregate type, see [`concrete`]
//! - **Reinforcing steel**: defined by `fyk`, with the fatigue stress-range
//!   table, see [`steel`]
//!
//! Callers describe materials with a [`MaterialSpec`] (plain JSON record with
//! defaults) and turn it into validated [`SectionMaterials`] once per
//! verification request.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::materials::MaterialSpec;
//!
//! // C30 concrete, CA-50 longitudinal bars and stirrups
//! let materials = MaterialSpec::default().build().unwrap();
//! let summary = materials.summary();
//! println!("fcd = {:.2} MPa, Ecs = {:.2} GPa", summary.fcd_mpa, summary.ecs_gpa);
//! ```

pub mod concrete;
pub mod steel;

pub use concrete::{Aggregate, Concrete};
pub use steel::{BarType, ReinforcingSteel, ES_MPA};

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;

/// Characteristic material values supplied by the caller.
///
/// ## JSON Example
///
/// ```json
/// { "fck_mpa": 30.0, "fyk_mpa": 500.0, "fywk_mpa": 500.0, "aggregate": "granite" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSpec {
    /// Concrete characteristic compressive strength (MPa)
    pub fck_mpa: f64,
    /// Longitudinal steel characteristic yield strength (MPa)
    pub fyk_mpa: f64,
    /// Stirrup steel characteristic yield strength (MPa)
    pub fywk_mpa: f64,
    /// Coarse aggregate
    pub aggregate: Aggregate,
}

impl Default for MaterialSpec {
    fn default() -> Self {
        MaterialSpec {
            fck_mpa: 30.0,
            fyk_mpa: 500.0,
            fywk_mpa: 500.0,
            aggregate: Aggregate::Granite,
        }
    }
}

impl MaterialSpec {
    /// Validate and build the design materials
    pub fn build(&self) -> CalcResult<SectionMaterials> {
        Ok(SectionMaterials {
            concrete: Concrete::new(self.fck_mpa, self.aggregate)?,
            steel: ReinforcingSteel::new(self.fyk_mpa)?,
            stirrup_steel: ReinforcingSteel::new(self.fywk_mpa)?,
        })
    }
}

/// Validated materials shared by every verifier of one section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionMaterials {
    pub concrete: Concrete,
    pub steel: ReinforcingSteel,
    pub stirrup_steel: ReinforcingSteel,
}

/// Headline material values for reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSummary {
    pub fck_mpa: f64,
    pub fcd_mpa: f64,
    pub fctm_mpa: f64,
    pub ecs_gpa: f64,
    pub fcd_fad_mpa: f64,
    pub fyk_mpa: f64,
    pub fyd_mpa: f64,
    pub es_gpa: f64,
    /// Straight-bar stress-range limit for a 20 mm bar
    pub fatigue_limit_mpa: f64,
}

impl SectionMaterials {
    pub fn summary(&self) -> MaterialSummary {
        MaterialSummary {
            fck_mpa: self.concrete.fck_mpa(),
            fcd_mpa: self.concrete.fcd_mpa(),
            fctm_mpa: self.concrete.fctm_mpa(),
            ecs_gpa: self.concrete.ecs_mpa() / 1000.0,
            fcd_fad_mpa: self.concrete.fcd_fad_mpa(),
            fyk_mpa: self.steel.fyk_mpa(),
            fyd_mpa: self.steel.fyd_mpa(),
            es_gpa: self.steel.es_mpa() / 1000.0,
            fatigue_limit_mpa: self.steel.fatigue_limit_mpa(20.0, BarType::Straight),
        }
    }

    /// Modular ratio `n = Es / Ecs`
    pub fn modular_ratio(&self) -> f64 {
        self.steel.es_mpa() / self.concrete.ecs_mpa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spec_defaults_from_partial_json() {
        let spec: MaterialSpec = serde_json::from_str(r#"{"fck_mpa": 35.0}"#).unwrap();
        assert_eq!(spec.fck_mpa, 35.0);
        assert_eq!(spec.fyk_mpa, 500.0);
        assert_eq!(spec.fywk_mpa, 500.0);
        assert_eq!(spec.aggregate, Aggregate::Granite);
    }

    #[test]
    fn test_build_rejects_bad_values() {
        let spec = MaterialSpec { fywk_mpa: -1.0, ..Default::default() };
        assert!(spec.build().is_err());
    }

    #[test]
    fn test_summary() {
        let m = MaterialSpec::default().build().unwrap();
        let s = m.summary();
        assert_relative_eq!(s.fcd_mpa, 30.0 / 1.4, epsilon = 1e-12);
        assert_relative_eq!(s.es_gpa, 210.0, epsilon = 1e-12);
        assert_eq!(s.fatigue_limit_mpa, 185.0);
        assert_relative_eq!(m.modular_ratio(), 210_000.0 / m.concrete.ecs_mpa(), epsilon = 1e-12);
    }
}
