//! # Shear (NBR 6118 §17.4, Model I, θ = 45°)
//!
//! Truss-analogy stirrup design with the compression strut check, stirrup
//! fatigue under repeated loading (§23.5.5, concrete contribution halved) and
//! the shift `al` of the moment diagram.
//!
//! ## Key quantities
//!
//! ```text
//! fywd = min(fywk/1.15, 435 MPa)
//! αv2  = 1 − fck/250
//! Vrd2 = 0.27·αv2·fcd·bw·d
//! Vc0  = 0.6·fctd·bw·d
//! Asw,min = 0.2·fctm/fywk·bw·100   (cm²/m)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::shear::ShearDesigner;
//! use calc_core::materials::MaterialSpec;
//! use calc_core::section::SectionGeometry;
//!
//! let geometry = SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap();
//! let materials = MaterialSpec::default().build().unwrap();
//! let shear = ShearDesigner::new(&geometry, &materials).unwrap();
//!
//! let design = shear.design_stirrups_uls(150.0).unwrap();
//! assert!(shear.vrd2_kn() > 150.0);
//! assert!(design.requirement.unwrap().asw_final_cm2_per_m >= shear.asw_min_cm2_per_m());
//! ```

use serde::{Deserialize, Serialize};

use super::{CheckOutcome, CheckStatus};
use crate::errors::{ensure_finite, ensure_non_negative, ensure_positive, CalcResult};
use crate::materials::steel::{fatigue_limit_mpa, BarType};
use crate::materials::SectionMaterials;
use crate::section::SectionGeometry;
use crate::units::{KnPerCm2, Mpa};

/// Lever arm factor of the truss model (z = 0.9·d)
const Z_FACTOR: f64 = 0.9;

/// Stirrups required by one design shear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StirrupRequirement {
    /// Force carried by the stirrups (kN)
    pub vsw_kn: f64,
    pub asw_calc_cm2_per_m: f64,
    pub asw_min_cm2_per_m: f64,
    pub asw_final_cm2_per_m: f64,
    /// Maximum stirrup spacing (cm)
    pub s_max_cm: f64,
}

/// ULS stirrup design for one shear force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupDesign {
    pub status: CheckStatus,
    /// |Vsd| (kN)
    pub vsd_kn: f64,
    pub vrd2_kn: f64,
    /// |Vsd| / Vrd2 · 100
    pub strut_ratio_pct: f64,
    pub vc0_kn: f64,
    /// `None` when the strut crushes
    pub requirement: Option<StirrupRequirement>,
    pub message: String,
}

impl CheckOutcome for StirrupDesign {
    fn status(&self) -> CheckStatus {
        self.status
    }

    fn utilization_pct(&self) -> Option<f64> {
        Some(self.strut_ratio_pct)
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Stirrup stress range under the fatigue combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupFatigueCheck {
    pub status: CheckStatus,
    /// |Vmax| − |Vmin| (kN)
    pub delta_v_kn: f64,
    pub vc_fad_kn: f64,
    pub delta_vsw_kn: f64,
    pub delta_sigma_mpa: f64,
    pub limit_mpa: f64,
    pub utilization_pct: f64,
    pub message: String,
}

impl CheckOutcome for StirrupFatigueCheck {
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

/// ULS design compared with the provided stirrups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearCheck {
    pub status: CheckStatus,
    pub design: StirrupDesign,
    pub asw_provided_cm2_per_m: f64,
    /// max(Asw,req/Asw,prov·100, strut ratio); `None` without stirrups
    pub utilization_pct: Option<f64>,
    /// Shift of the moment diagram (cm)
    pub al_cm: f64,
    pub message: String,
}

impl CheckOutcome for ShearCheck {
    fn status(&self) -> CheckStatus {
        self.status
    }

    fn utilization_pct(&self) -> Option<f64> {
        self.utilization_pct
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Shear designer for one section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearDesigner {
    bw: f64,
    d: f64,
    fck: f64,
    fywk: f64,
    fctm: f64,
    /// kN/cm²
    fcd: f64,
    /// kN/cm²
    fctd: f64,
    /// kN/cm²
    fywd: f64,
}

impl ShearDesigner {
    pub fn new(geometry: &SectionGeometry, materials: &SectionMaterials) -> CalcResult<Self> {
        geometry.validate()?;
        let concrete = &materials.concrete;
        Ok(ShearDesigner {
            bw: geometry.bw_cm,
            d: geometry.d(),
            fck: concrete.fck_mpa(),
            fywk: materials.stirrup_steel.fyk_mpa(),
            fctm: concrete.fctm_mpa(),
            fcd: KnPerCm2::from(Mpa(concrete.fcd_mpa())).0,
            fctd: KnPerCm2::from(Mpa(concrete.fctd_mpa())).0,
            fywd: KnPerCm2::from(Mpa(materials.stirrup_steel.fywd_mpa())).0,
        })
    }

    pub fn alpha_v2(&self) -> f64 {
        1.0 - self.fck / 250.0
    }

    /// Compression strut capacity (kN)
    pub fn vrd2_kn(&self) -> f64 {
        0.27 * self.alpha_v2() * self.fcd * self.bw * self.d
    }

    /// Concrete contribution (kN)
    pub fn vc0_kn(&self) -> f64 {
        0.6 * self.fctd * self.bw * self.d
    }

    /// Concrete contribution under repeated loading (kN)
    pub fn vc_fad_kn(&self) -> f64 {
        0.5 * self.vc0_kn()
    }

    /// Minimum stirrup area (cm²/m)
    pub fn asw_min_cm2_per_m(&self) -> f64 {
        0.2 * self.fctm / self.fywk * self.bw * 100.0
    }

    /// Stirrups for the ULS shear `Vsd` (kN, sign ignored).
    pub fn design_stirrups_uls(&self, vsd_kn: f64) -> CalcResult<StirrupDesign> {
        ensure_finite("vsd_kn", vsd_kn)?;
        let vsd = vsd_kn.abs();
        let vrd2 = self.vrd2_kn();
        let vc0 = self.vc0_kn();
        let ratio = vsd / vrd2;

        if ratio > 1.0 {
            log::debug!("strut crushing: Vsd = {:.2} kN > Vrd2 = {:.2} kN", vsd, vrd2);
            return Ok(StirrupDesign {
                status: CheckStatus::Fail,
                vsd_kn: vsd,
                vrd2_kn: vrd2,
                strut_ratio_pct: ratio * 100.0,
                vc0_kn: vc0,
                requirement: None,
                message: "Compression strut crushing; enlarge the section".to_string(),
            });
        }

        let vsw = (vsd - vc0).max(0.0);
        let asw_calc = if vsw > 0.0 {
            vsw / (Z_FACTOR * self.d * self.fywd) * 100.0
        } else {
            0.0
        };
        let asw_min = self.asw_min_cm2_per_m();
        let s_max = if vsd <= 0.67 * vrd2 {
            (0.6 * self.d).min(30.0)
        } else {
            (0.3 * self.d).min(20.0)
        };

        Ok(StirrupDesign {
            status: CheckStatus::Ok,
            vsd_kn: vsd,
            vrd2_kn: vrd2,
            strut_ratio_pct: ratio * 100.0,
            vc0_kn: vc0,
            requirement: Some(StirrupRequirement {
                vsw_kn: vsw,
                asw_calc_cm2_per_m: asw_calc,
                asw_min_cm2_per_m: asw_min,
                asw_final_cm2_per_m: asw_calc.max(asw_min),
                s_max_cm: s_max,
            }),
            message: format!("Strut OK ({:.1}% utilization)", ratio * 100.0),
        })
    }

    /// Stirrup stress range for shear varying between `Vmax` and `Vmin`
    /// with `asw_s` cm²/m of stirrups.
    pub fn verify_stirrup_fatigue(&self, v_max_kn: f64, v_min_kn: f64, asw_s_cm2_per_m: f64) -> CalcResult<StirrupFatigueCheck> {
        ensure_finite("v_max_kn", v_max_kn)?;
        ensure_finite("v_min_kn", v_min_kn)?;
        ensure_positive("asw_s_cm2_per_m", asw_s_cm2_per_m)?;

        let limit = fatigue_limit_mpa(0.0, BarType::Stirrup);
        let delta_v = v_max_kn.abs() - v_min_kn.abs();
        let vc_fad = self.vc_fad_kn();
        let delta_vsw = (delta_v - vc_fad).max(0.0);

        if delta_vsw == 0.0 {
            return Ok(StirrupFatigueCheck {
                status: CheckStatus::Ok,
                delta_v_kn: delta_v,
                vc_fad_kn: vc_fad,
                delta_vsw_kn: 0.0,
                delta_sigma_mpa: 0.0,
                limit_mpa: limit,
                utilization_pct: 0.0,
                message: "Concrete absorbs the whole shear variation".to_string(),
            });
        }

        // cm²/m -> cm²/cm
        let asw_per_cm = asw_s_cm2_per_m / 100.0;
        let delta_sigma = Mpa::from(KnPerCm2(delta_vsw / (Z_FACTOR * self.d * asw_per_cm))).0;
        let utilization = delta_sigma / limit * 100.0;
        let ok = delta_sigma <= limit;

        Ok(StirrupFatigueCheck {
            status: if ok { CheckStatus::Ok } else { CheckStatus::Fail },
            delta_v_kn: delta_v,
            vc_fad_kn: vc_fad,
            delta_vsw_kn: delta_vsw,
            delta_sigma_mpa: delta_sigma,
            limit_mpa: limit,
            utilization_pct: utilization,
            message: if ok {
                format!("Stirrup fatigue OK ({:.1}%)", utilization)
            } else {
                format!("Stirrup fatigue exceeded ({:.1}%)", utilization)
            },
        })
    }

    /// Shift `al` of the moment diagram (cm).
    pub fn moment_shift_cm(&self, vsd_kn: f64) -> CalcResult<f64> {
        ensure_finite("vsd_kn", vsd_kn)?;
        let vsd = vsd_kn.abs();
        let vc0 = self.vc0_kn();
        let base = 0.5 * self.d;
        if vsd <= vc0 {
            return Ok(base);
        }
        Ok((base * vsd / (vsd - vc0)).max(base))
    }

    /// ULS design for `Vsd` against the provided stirrups (cm²/m).
    pub fn verify_section(&self, vsd_kn: f64, asw_provided_cm2_per_m: f64) -> CalcResult<ShearCheck> {
        ensure_non_negative("asw_provided_cm2_per_m", asw_provided_cm2_per_m)?;
        let design = self.design_stirrups_uls(vsd_kn)?;
        let al_cm = self.moment_shift_cm(vsd_kn)?;

        let (status, utilization, message) = match design.requirement {
            Some(req) if asw_provided_cm2_per_m == 0.0 => (
                CheckStatus::Fail,
                None,
                format!("No stirrups provided (Asw,req = {:.2} cm²/m)", req.asw_final_cm2_per_m),
            ),
            Some(req) => {
                let steel_ratio = req.asw_final_cm2_per_m / asw_provided_cm2_per_m * 100.0;
                let utilization = steel_ratio.max(design.strut_ratio_pct);
                let status = if utilization <= 100.0 { CheckStatus::Ok } else { CheckStatus::Fail };
                let message = format!(
                    "Asw,req = {:.2} cm²/m / Asw,prov = {:.2} cm²/m, strut {:.1}%",
                    req.asw_final_cm2_per_m, asw_provided_cm2_per_m, design.strut_ratio_pct
                );
                (status, Some(utilization), message)
            }
            None => (CheckStatus::Fail, Some(design.strut_ratio_pct), design.message.clone()),
        };

        Ok(ShearCheck {
            status,
            design,
            asw_provided_cm2_per_m,
            utilization_pct: utilization,
            al_cm,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialSpec;
    use approx::assert_relative_eq;

    fn designer() -> ShearDesigner {
        let geometry = SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap();
        let materials = MaterialSpec::default().build().unwrap();
        ShearDesigner::new(&geometry, &materials).unwrap()
    }

    #[test]
    fn test_capacities() {
        let s = designer();
        assert_relative_eq!(s.alpha_v2(), 0.88, epsilon = 1e-12);
        assert_relative_eq!(s.vrd2_kn(), 840.09, epsilon = 0.01);
        assert_relative_eq!(s.vc0_kn(), 143.37, epsilon = 0.01);
        assert_relative_eq!(s.vc_fad_kn(), 0.5 * s.vc0_kn(), epsilon = 1e-12);
        assert_relative_eq!(s.asw_min_cm2_per_m(), 3.4758, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_shear_gives_minimum() {
        let s = designer();
        let design = s.design_stirrups_uls(0.0).unwrap();
        assert_eq!(design.status, CheckStatus::Ok);
        let req = design.requirement.unwrap();
        assert_eq!(req.asw_calc_cm2_per_m, 0.0);
        assert_eq!(req.asw_final_cm2_per_m, s.asw_min_cm2_per_m());
    }

    #[test]
    fn test_design_150kn() {
        let s = designer();
        let design = s.design_stirrups_uls(-150.0).unwrap();
        assert_eq!(design.status, CheckStatus::Ok);
        assert_eq!(design.vsd_kn, 150.0);
        let req = design.requirement.unwrap();
        assert_relative_eq!(req.vsw_kn, 6.625, epsilon = 0.01);
        assert_relative_eq!(req.asw_calc_cm2_per_m, 0.3078, epsilon = 1e-3);
        assert!(req.asw_final_cm2_per_m >= req.asw_min_cm2_per_m);
        assert_eq!(req.s_max_cm, 30.0);
    }

    #[test]
    fn test_high_shear_reduces_spacing() {
        let s = designer();
        let req = s.design_stirrups_uls(700.0).unwrap().requirement.unwrap();
        assert_eq!(req.s_max_cm, 16.5);
        assert!(req.asw_calc_cm2_per_m > req.asw_min_cm2_per_m);
    }

    #[test]
    fn test_strut_crushing() {
        let design = designer().design_stirrups_uls(900.0).unwrap();
        assert_eq!(design.status, CheckStatus::Fail);
        assert!(design.requirement.is_none());
        assert!(design.strut_ratio_pct > 100.0);
    }

    #[test]
    fn test_stirrup_fatigue() {
        let s = designer();
        let absorbed = s.verify_stirrup_fatigue(100.0, -40.0, 6.7).unwrap();
        assert_eq!(absorbed.status, CheckStatus::Ok);
        assert_eq!(absorbed.delta_sigma_mpa, 0.0);

        // ΔV = 200, ΔVsw = 200 − 71.69 = 128.31 kN
        let check = s.verify_stirrup_fatigue(220.0, 20.0, 6.7).unwrap();
        let expected = (200.0 - s.vc_fad_kn()) / (0.9 * 55.0 * 0.067) * 10.0;
        assert_relative_eq!(check.delta_sigma_mpa, expected, epsilon = 1e-9);
        assert_eq!(check.status, CheckStatus::Fail);
        assert_eq!(check.limit_mpa, 85.0);

        let stout = s.verify_stirrup_fatigue(220.0, 20.0, 40.0).unwrap();
        assert_eq!(stout.status, CheckStatus::Ok);
    }

    #[test]
    fn test_moment_shift() {
        let s = designer();
        assert_eq!(s.moment_shift_cm(100.0).unwrap(), 27.5);
        let al = s.moment_shift_cm(300.0).unwrap();
        assert_relative_eq!(al, 27.5 * 300.0 / (300.0 - s.vc0_kn()), epsilon = 1e-12);
        assert!(al > 27.5);
    }

    #[test]
    fn test_section_utilization() {
        let s = designer();
        let ok = s.verify_section(150.0, 6.7).unwrap();
        assert_eq!(ok.status, CheckStatus::Ok);
        assert_relative_eq!(ok.utilization_pct.unwrap(), s.asw_min_cm2_per_m() / 6.7 * 100.0, epsilon = 1e-9);

        let thin = s.verify_section(150.0, 2.0).unwrap();
        assert_eq!(thin.status, CheckStatus::Fail);

        let crushed = s.verify_section(900.0, 50.0).unwrap();
        assert_eq!(crushed.status, CheckStatus::Fail);
        assert!(crushed.utilization_pct.unwrap() > 100.0);
    }

    #[test]
    fn test_no_stirrups_fails_and_serializes() {
        let check = designer().verify_section(150.0, 0.0).unwrap();
        assert_eq!(check.status, CheckStatus::Fail);
        assert_eq!(check.utilization_pct, None);

        let json = serde_json::to_string(&check).unwrap();
        assert!(json.contains("\"utilization_pct\":null"));
        let parsed: ShearCheck = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, CheckStatus::Fail);
        assert_eq!(parsed.utilization_pct, None);
    }
}
