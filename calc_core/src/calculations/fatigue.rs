//! # Fatigue (NBR 6118 §23)
//!
//! Stage II (cracked, transformed section) stresses in the longitudinal steel
//! and the compressed concrete under the fatigue combination.
//!
//! The neutral axis and inertia are computed once at construction:
//!
//! ```text
//! bw/2·x² + n·As·x − n·As·d = 0        (positive root)
//! I_II = bw·x³/3 + n·As·(d − x)²        with n = Es/Ecs
//! ```
//!
//! | Check | Criterion |
//! |---|---|
//! | Steel | `Δσs ≤ Δfsd,fad` from the bar table |
//! | Concrete | `σc(Mmax) ≤ 0.45·fcd` |
//! | Crack onset | `6M/(bw·h²) > 0.30·fctd` (informational) |

use serde::{Deserialize, Serialize};

use super::{CheckOutcome, CheckStatus};
use crate::errors::{ensure_finite, ensure_positive, CalcResult};
use crate::materials::{BarType, SectionMaterials};
use crate::section::SectionGeometry;
use crate::units::{KnCm, KnM, KnPerCm2, Mpa};

/// Longitudinal steel stress range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteelFatigueCheck {
    pub status: CheckStatus,
    pub m_max_knm: f64,
    pub m_min_knm: f64,
    pub sigma_max_mpa: f64,
    pub sigma_min_mpa: f64,
    pub delta_sigma_mpa: f64,
    pub limit_mpa: f64,
    pub utilization_pct: f64,
    pub message: String,
}

impl CheckOutcome for SteelFatigueCheck {
    fn status(&self) -> CheckStatus {
        self.status
    }

    fn utilization_pct(&self) -> Option<f64> {
        Some(self.utilization_pct)
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Concrete compression under repeated loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteFatigueCheck {
    pub status: CheckStatus,
    pub m_max_knm: f64,
    pub sigma_c_mpa: f64,
    pub limit_mpa: f64,
    pub utilization_pct: f64,
    pub message: String,
}

impl CheckOutcome for ConcreteFatigueCheck {
    fn status(&self) -> CheckStatus {
        self.status
    }

    fn utilization_pct(&self) -> Option<f64> {
        Some(self.utilization_pct)
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Behavior stage of the section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Uncracked
    I,
    /// Cracked
    II,
}

/// Crack onset under the fatigue combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueCracking {
    pub sigma_t_mpa: f64,
    pub limit_mpa: f64,
    pub cracked: bool,
    pub stage: Stage,
    pub message: String,
}

/// Steel and concrete fatigue plus the cracking indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueSummary {
    pub status: CheckStatus,
    pub steel: SteelFatigueCheck,
    pub concrete: ConcreteFatigueCheck,
    pub cracking: FatigueCracking,
    pub message: String,
}

impl CheckOutcome for FatigueSummary {
    fn status(&self) -> CheckStatus {
        self.status
    }

    fn utilization_pct(&self) -> Option<f64> {
        Some(self.steel.utilization_pct.max(self.concrete.utilization_pct))
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Cracked-section fatigue checker with cached Stage II properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FatigueChecker {
    bw: f64,
    h: f64,
    d: f64,
    as_cm2: f64,
    bar_diameter_mm: f64,
    bar_type: BarType,
    n: f64,
    x_ii: f64,
    i_ii: f64,
    steel_limit_mpa: f64,
    fcd_fad_mpa: f64,
    fctd_fad_mpa: f64,
}

impl FatigueChecker {
    pub fn new(
        geometry: &SectionGeometry,
        materials: &SectionMaterials,
        as_cm2: f64,
        bar_diameter_mm: f64,
        bar_type: BarType,
    ) -> CalcResult<Self> {
        geometry.validate()?;
        ensure_positive("as_cm2", as_cm2)?;
        ensure_positive("bar_diameter_mm", bar_diameter_mm)?;

        let bw = geometry.bw_cm;
        let d = geometry.d();
        let n = materials.modular_ratio();

        let a = bw / 2.0;
        let b = n * as_cm2;
        let c = -n * as_cm2 * d;
        let x_ii = (-b + (b * b - 4.0 * a * c).sqrt()) / (2.0 * a);
        let i_ii = bw * x_ii.powi(3) / 3.0 + n * as_cm2 * (d - x_ii).powi(2);

        Ok(FatigueChecker {
            bw,
            h: geometry.h_cm,
            d,
            as_cm2,
            bar_diameter_mm,
            bar_type,
            n,
            x_ii,
            i_ii,
            steel_limit_mpa: materials.steel.fatigue_limit_mpa(bar_diameter_mm, bar_type),
            fcd_fad_mpa: materials.concrete.fcd_fad_mpa(),
            fctd_fad_mpa: materials.concrete.fctd_fad_mpa(),
        })
    }

    pub fn modular_ratio(&self) -> f64 {
        self.n
    }

    /// Stage II neutral axis depth (cm)
    pub fn x_ii_cm(&self) -> f64 {
        self.x_ii
    }

    /// Stage II moment of inertia (cm⁴)
    pub fn i_ii_cm4(&self) -> f64 {
        self.i_ii
    }

    pub fn as_cm2(&self) -> f64 {
        self.as_cm2
    }

    pub fn bar_diameter_mm(&self) -> f64 {
        self.bar_diameter_mm
    }

    /// Lever arm of the cracked section `d − x/3` (cm)
    pub fn lever_arm_cm(&self) -> f64 {
        self.d - self.x_ii / 3.0
    }

    /// Steel stress (MPa) at moment `M` (kN·m)
    pub fn steel_stress_mpa(&self, m_knm: f64) -> f64 {
        let m = KnCm::from(KnM(m_knm)).0;
        Mpa::from(KnPerCm2(self.n * m * (self.d - self.x_ii) / self.i_ii)).0
    }

    /// Concrete extreme-fiber compression (MPa) at moment `M` (kN·m)
    pub fn concrete_stress_mpa(&self, m_knm: f64) -> f64 {
        let m = KnCm::from(KnM(m_knm)).0;
        Mpa::from(KnPerCm2(m * self.x_ii / self.i_ii)).0
    }

    pub fn verify_steel_fatigue(&self, m_max_knm: f64, m_min_knm: f64) -> CalcResult<SteelFatigueCheck> {
        ensure_finite("m_max_knm", m_max_knm)?;
        ensure_finite("m_min_knm", m_min_knm)?;

        let sigma_max = self.steel_stress_mpa(m_max_knm.abs());
        let sigma_min = self.steel_stress_mpa(m_min_knm.abs());
        let delta_sigma = (sigma_max - sigma_min).abs();
        let limit = self.steel_limit_mpa;
        let utilization = delta_sigma / limit * 100.0;
        let ok = delta_sigma <= limit;

        Ok(SteelFatigueCheck {
            status: if ok { CheckStatus::Ok } else { CheckStatus::Fail },
            m_max_knm,
            m_min_knm,
            sigma_max_mpa: sigma_max,
            sigma_min_mpa: sigma_min,
            delta_sigma_mpa: delta_sigma,
            limit_mpa: limit,
            utilization_pct: utilization,
            message: if ok {
                format!("Steel fatigue OK ({:.1}%, {} φ{})", utilization, self.bar_type, self.bar_diameter_mm)
            } else {
                format!("Steel fatigue exceeded ({:.1}%)", utilization)
            },
        })
    }

    pub fn verify_concrete_compression_fatigue(&self, m_max_knm: f64) -> CalcResult<ConcreteFatigueCheck> {
        ensure_finite("m_max_knm", m_max_knm)?;
        let sigma_c = self.concrete_stress_mpa(m_max_knm.abs());
        let limit = self.fcd_fad_mpa;
        let utilization = sigma_c / limit * 100.0;
        let ok = sigma_c <= limit;

        Ok(ConcreteFatigueCheck {
            status: if ok { CheckStatus::Ok } else { CheckStatus::Fail },
            m_max_knm,
            sigma_c_mpa: sigma_c,
            limit_mpa: limit,
            utilization_pct: utilization,
            message: if ok {
                format!("Concrete compression fatigue OK ({:.1}%)", utilization)
            } else {
                format!("Concrete compression fatigue exceeded ({:.1}%)", utilization)
            },
        })
    }

    /// Whether the gross section cracks under `Mmax`.
    pub fn check_cracking_fatigue(&self, m_max_knm: f64) -> CalcResult<FatigueCracking> {
        ensure_finite("m_max_knm", m_max_knm)?;
        let m = KnCm::from(KnM(m_max_knm.abs())).0;
        let sigma_t = Mpa::from(KnPerCm2(6.0 * m / (self.bw * self.h.powi(2)))).0;
        let limit = self.fctd_fad_mpa;
        let cracked = sigma_t > limit;

        Ok(FatigueCracking {
            sigma_t_mpa: sigma_t,
            limit_mpa: limit,
            cracked,
            stage: if cracked { Stage::II } else { Stage::I },
            message: if cracked {
                "Section cracked under fatigue loading (Stage II)".to_string()
            } else {
                "Section uncracked (Stage I)".to_string()
            },
        })
    }

    /// Steel and concrete checks; cracking is reported but does not gate.
    pub fn verify_all(&self, m_max_knm: f64, m_min_knm: f64) -> CalcResult<FatigueSummary> {
        let steel = self.verify_steel_fatigue(m_max_knm, m_min_knm)?;
        let concrete = self.verify_concrete_compression_fatigue(m_max_knm)?;
        let cracking = self.check_cracking_fatigue(m_max_knm)?;

        let all_ok = steel.status.is_ok() && concrete.status.is_ok();
        Ok(FatigueSummary {
            status: if all_ok { CheckStatus::Ok } else { CheckStatus::Fail },
            steel,
            concrete,
            cracking,
            message: if all_ok {
                "All fatigue checks OK".to_string()
            } else {
                "Fatigue check failed".to_string()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialSpec;
    use approx::assert_relative_eq;

    fn checker(as_cm2: f64) -> FatigueChecker {
        let geometry = SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap();
        let materials = MaterialSpec::default().build().unwrap();
        FatigueChecker::new(&geometry, &materials, as_cm2, 20.0, BarType::Straight).unwrap()
    }

    #[test]
    fn test_stage_ii_properties() {
        let c = checker(12.566);
        let n = c.modular_ratio();
        // Neutral axis satisfies the first-moment equation
        let x = c.x_ii_cm();
        assert_relative_eq!(30.0 * x * x / 2.0, n * 12.566 * (55.0 - x), epsilon = 1e-6);
        assert!(x > 0.0 && x < 55.0);
        let expected_i = 30.0 * x.powi(3) / 3.0 + n * 12.566 * (55.0 - x).powi(2);
        assert_relative_eq!(c.i_ii_cm4(), expected_i, epsilon = 1e-6);
    }

    #[test]
    fn test_equal_moments_give_zero_range() {
        let c = checker(12.566);
        let r = c.verify_steel_fatigue(80.0, 80.0).unwrap();
        assert_eq!(r.delta_sigma_mpa, 0.0);
        assert_eq!(r.status, CheckStatus::Ok);
    }

    #[test]
    fn test_sign_of_moments_ignored() {
        let c = checker(12.566);
        let a = c.verify_steel_fatigue(100.0, 20.0).unwrap();
        let b = c.verify_steel_fatigue(-100.0, -20.0).unwrap();
        assert_relative_eq!(a.delta_sigma_mpa, b.delta_sigma_mpa, epsilon = 1e-12);
        assert_eq!(a.limit_mpa, 185.0);
    }

    #[test]
    fn test_steel_stress_linear_in_moment() {
        let c = checker(12.566);
        assert_relative_eq!(c.steel_stress_mpa(100.0), 2.0 * c.steel_stress_mpa(50.0), epsilon = 1e-9);
        // Internal couple: As·σs·z = M
        let sigma = c.steel_stress_mpa(100.0) / 10.0;
        assert_relative_eq!(12.566 * sigma * c.lever_arm_cm(), 10_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_large_range_fails() {
        let c = checker(6.0);
        let r = c.verify_steel_fatigue(250.0, 0.0).unwrap();
        assert_eq!(r.status, CheckStatus::Fail);
        assert!(r.utilization_pct > 100.0);
    }

    #[test]
    fn test_concrete_fatigue_limit() {
        let c = checker(12.566);
        let r = c.verify_concrete_compression_fatigue(50.0).unwrap();
        assert_relative_eq!(r.limit_mpa, 0.45 * 30.0 / 1.4, epsilon = 1e-12);
        assert_eq!(r.status, CheckStatus::Ok);
    }

    #[test]
    fn test_cracking_threshold() {
        let c = checker(12.566);
        // fctd,fad = 0.3·1.448 = 0.4345 MPa; σt = 6M/(bw·h²) -> M ≈ 7.8 kN·m
        assert!(!c.check_cracking_fatigue(1.0).unwrap().cracked);
        let cracked = c.check_cracking_fatigue(10.0).unwrap();
        assert!(cracked.cracked);
        assert_eq!(cracked.stage, Stage::II);
    }

    #[test]
    fn test_verify_all_ignores_cracking() {
        let c = checker(12.566);
        let r = c.verify_all(60.0, 20.0).unwrap();
        assert!(r.cracking.cracked);
        assert_eq!(r.status, CheckStatus::Ok);
    }

    #[test]
    fn test_invalid_area() {
        let geometry = SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap();
        let materials = MaterialSpec::default().build().unwrap();
        assert!(FatigueChecker::new(&geometry, &materials, 0.0, 20.0, BarType::Straight).is_err());
    }
}
