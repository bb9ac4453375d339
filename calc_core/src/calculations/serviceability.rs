//! # Serviceability (NBR 6118 §17.3)
//!
//! Crack width under the frequent combination and long-term deflection under
//! the quasi-permanent combination.
//!
//! ## Section properties
//!
//! - Gross: `Ic = bw·h³/12`, `yt = h/2`, cracking moment `Mr = 1.5·fctm·Ic/yt`
//! - Stage II with compression steel: positive root of
//!   `bw/2·x² + n·(As' + As)·x − n·(As'·d' + As·d) = 0`,
//!   `I_II = bw·x³/3 + n·As'·(x − d')² + n·As·(d − x)²`
//! - Branson: `EI = Ecs·[Ic·(Mr/Ma)³ + I_II·(1 − (Mr/Ma)³)]` for `|Ma| > Mr`
//!
//! ## Crack width
//!
//! ```text
//! wk1 = φ/(12.5·η1) · σsi/Es · 3σsi/fctm
//! wk2 = φ/(12.5·η1) · σsi/Es · (4/ρri + 45)
//! wk  = min(wk1, wk2)
//! ```
//!
//! ## Deflection
//!
//! Curvatures `M/EI(M)` are integrated twice over one span
//! ([`CurvatureIntegrator`]); the total deflection multiplies the immediate one
//! by `1 + αf` and is compared with `L/250`.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::serviceability::{ServiceabilityChecker, ServiceabilityOptions};
//! use calc_core::materials::MaterialSpec;
//! use calc_core::section::SectionGeometry;
//!
//! let geometry = SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap();
//! let materials = MaterialSpec::default().build().unwrap();
//! let els = ServiceabilityChecker::new(&geometry, &materials, 12.57, ServiceabilityOptions::default()).unwrap();
//!
//! let crack = els.verify_crack_width(40.0).unwrap();
//! assert_eq!(crack.wk_mm, 0.0); // below the cracking moment
//! ```

use serde::{Deserialize, Serialize};

use super::curvature::{CurvatureIntegrator, CurvaturePoint, DeflectionProfile};
use super::{CheckOutcome, CheckStatus};
use crate::errors::{ensure_finite, ensure_non_negative, ensure_positive, CalcResult};
use crate::materials::SectionMaterials;
use crate::section::SectionGeometry;
use crate::units::{Centimeters, KnCm, KnM, KnPerCm2, Meters, Mpa};

/// Plasticity factor of the cracking moment for rectangular sections
const ALPHA_RECT: f64 = 1.5;

/// Age when the shoring is removed (months)
const T0_MONTHS: f64 = 1.0;

/// Deflection limit denominator (visual acceptability)
pub const DEFLECTION_LIMIT_RATIO: f64 = 250.0;

/// ξ(t) table, t in months
const CREEP_TABLE: [(f64, f64); 14] = [
    (0.0, 0.00),
    (0.5, 0.54),
    (1.0, 0.68),
    (2.0, 0.84),
    (3.0, 0.95),
    (4.0, 1.02),
    (5.0, 1.08),
    (6.0, 1.13),
    (12.0, 1.36),
    (24.0, 1.64),
    (36.0, 1.79),
    (48.0, 1.87),
    (60.0, 1.92),
    (70.0, 2.00),
];

/// Time function ξ(t) for long-term deflection, linear between table entries
/// and 2.0 from 70 months on.
pub fn creep_time_function(t_months: f64) -> f64 {
    CREEP_TABLE
        .windows(2)
        .find(|w| t_months >= w[0].0 && t_months < w[1].0)
        .map(|w| {
            let (t0, x0) = w[0];
            let (t1, x1) = w[1];
            x0 + (x1 - x0) * (t_months - t0) / (t1 - t0)
        })
        .unwrap_or(2.0)
}

/// Serviceability parameters with their usual values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceabilityOptions {
    /// As' (cm²)
    pub compression_area_cm2: f64,
    /// d' (cm)
    pub compression_depth_cm: f64,
    pub bar_diameter_mm: f64,
    /// Bond coefficient (2.25 for ribbed bars)
    pub eta1: f64,
    pub crack_width_limit_mm: f64,
    pub creep_duration_months: f64,
}

impl Default for ServiceabilityOptions {
    fn default() -> Self {
        ServiceabilityOptions {
            compression_area_cm2: 0.0,
            compression_depth_cm: 5.0,
            bar_diameter_mm: 20.0,
            eta1: 2.25,
            crack_width_limit_mm: 0.30,
            creep_duration_months: 70.0,
        }
    }
}

impl ServiceabilityOptions {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_non_negative("compression_area_cm2", self.compression_area_cm2)?;
        ensure_positive("compression_depth_cm", self.compression_depth_cm)?;
        ensure_positive("bar_diameter_mm", self.bar_diameter_mm)?;
        ensure_positive("eta1", self.eta1)?;
        ensure_positive("crack_width_limit_mm", self.crack_width_limit_mm)?;
        ensure_non_negative("creep_duration_months", self.creep_duration_months)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackWidthCheck {
    pub status: CheckStatus,
    pub m_freq_knm: f64,
    pub cracked: bool,
    pub sigma_si_mpa: f64,
    pub wk1_mm: f64,
    pub wk2_mm: f64,
    pub wk_mm: f64,
    pub wk_lim_mm: f64,
    pub utilization_pct: f64,
    pub message: String,
}

impl CheckOutcome for CrackWidthCheck {
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

/// Long-term multiplier αf and its ingredients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreepFactor {
    pub xi_t: f64,
    pub xi_t0: f64,
    pub rho_prime: f64,
    pub alpha_f: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionCheck {
    pub status: CheckStatus,
    pub span_m: f64,
    /// Immediate deflection magnitude (cm)
    pub f0_cm: f64,
    pub alpha_f: f64,
    /// `f0·(1 + αf)` (cm)
    pub f_total_cm: f64,
    /// `L/250` (cm)
    pub f_lim_cm: f64,
    /// Station of the maximum, local to the span (m)
    pub max_x_m: f64,
    pub utilization_pct: f64,
    /// Total deflection along the span
    pub profile: DeflectionProfile,
    pub message: String,
}

impl CheckOutcome for DeflectionCheck {
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

/// Section constants reported alongside the checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceSectionProperties {
    pub mr_knm: f64,
    pub ic_cm4: f64,
    pub x_ii_cm: f64,
    pub i_ii_cm4: f64,
    pub ecs_mpa: f64,
    pub fctm_mpa: f64,
    pub alpha_e: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceabilitySummary {
    pub status: CheckStatus,
    pub cracking: CrackWidthCheck,
    pub deflection: DeflectionCheck,
    pub section: ServiceSectionProperties,
    pub message: String,
}

impl CheckOutcome for ServiceabilitySummary {
    fn status(&self) -> CheckStatus {
        self.status
    }

    fn utilization_pct(&self) -> Option<f64> {
        Some(self.cracking.utilization_pct.max(self.deflection.utilization_pct))
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Service-state checker with cached gross and Stage II properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceabilityChecker {
    bw: f64,
    h: f64,
    d: f64,
    as_cm2: f64,
    options: ServiceabilityOptions,
    alpha_e: f64,
    es_mpa: f64,
    ecs_mpa: f64,
    fctm_mpa: f64,
    ic: f64,
    yt: f64,
    x_ii: f64,
    i_ii: f64,
}

impl ServiceabilityChecker {
    pub fn new(
        geometry: &SectionGeometry,
        materials: &SectionMaterials,
        as_cm2: f64,
        options: ServiceabilityOptions,
    ) -> CalcResult<Self> {
        geometry.validate()?;
        options.validate()?;
        ensure_positive("as_cm2", as_cm2)?;

        let bw = geometry.bw_cm;
        let d = geometry.d();
        let n = materials.modular_ratio();
        let as_p = options.compression_area_cm2;
        let d_p = options.compression_depth_cm;

        let a = bw / 2.0;
        let b = n * (as_p + as_cm2);
        let c = -(n * as_p * d_p + n * as_cm2 * d);
        let x_ii = (-b + (b * b - 4.0 * a * c).sqrt()) / (2.0 * a);
        let i_ii = bw * x_ii.powi(3) / 3.0 + n * as_p * (x_ii - d_p).powi(2) + n * as_cm2 * (d - x_ii).powi(2);

        Ok(ServiceabilityChecker {
            bw,
            h: geometry.h_cm,
            d,
            as_cm2,
            options,
            alpha_e: n,
            es_mpa: materials.steel.es_mpa(),
            ecs_mpa: materials.concrete.ecs_mpa(),
            fctm_mpa: materials.concrete.fctm_mpa(),
            ic: geometry.gross_inertia_cm4(),
            yt: geometry.yt_cm(),
            x_ii,
            i_ii,
        })
    }

    pub fn options(&self) -> &ServiceabilityOptions {
        &self.options
    }

    /// Cracking moment (kN·m)
    pub fn cracking_moment_knm(&self) -> f64 {
        let fctm = KnPerCm2::from(Mpa(self.fctm_mpa)).0;
        KnM::from(KnCm(ALPHA_RECT * fctm * self.ic / self.yt)).0
    }

    pub fn x_ii_cm(&self) -> f64 {
        self.x_ii
    }

    pub fn i_ii_cm4(&self) -> f64 {
        self.i_ii
    }

    pub fn section_properties(&self) -> ServiceSectionProperties {
        ServiceSectionProperties {
            mr_knm: self.cracking_moment_knm(),
            ic_cm4: self.ic,
            x_ii_cm: self.x_ii,
            i_ii_cm4: self.i_ii,
            ecs_mpa: self.ecs_mpa,
            fctm_mpa: self.fctm_mpa,
            alpha_e: self.alpha_e,
        }
    }

    /// Branson stiffness (kN·cm²) at service moment `Ma` (kN·m)
    pub fn equivalent_stiffness(&self, ma_knm: f64) -> f64 {
        let ecs = KnPerCm2::from(Mpa(self.ecs_mpa)).0;
        let mr = self.cracking_moment_knm();
        let ma = ma_knm.abs();
        if ma <= mr {
            return ecs * self.ic;
        }
        let ratio = (mr / ma).powi(3);
        ecs * self.ic * ratio + ecs * self.i_ii * (1.0 - ratio)
    }

    /// Tension steel stress in Stage II (MPa)
    pub fn steel_stress_mpa(&self, m_knm: f64) -> f64 {
        let m = KnCm::from(KnM(m_knm.abs())).0;
        Mpa::from(KnPerCm2(m * (self.d - self.x_ii) / self.i_ii * self.alpha_e)).0
    }

    pub fn verify_crack_width(&self, m_freq_knm: f64) -> CalcResult<CrackWidthCheck> {
        ensure_finite("m_freq_knm", m_freq_knm)?;
        let wk_lim = self.options.crack_width_limit_mm;

        if m_freq_knm.abs() <= self.cracking_moment_knm() {
            return Ok(CrackWidthCheck {
                status: CheckStatus::Ok,
                m_freq_knm,
                cracked: false,
                sigma_si_mpa: 0.0,
                wk1_mm: 0.0,
                wk2_mm: 0.0,
                wk_mm: 0.0,
                wk_lim_mm: wk_lim,
                utilization_pct: 0.0,
                message: "Uncracked section (Stage I)".to_string(),
            });
        }

        let sigma = self.steel_stress_mpa(m_freq_knm);
        let phi = self.options.bar_diameter_mm;
        let base = phi / (12.5 * self.options.eta1) * (sigma / self.es_mpa);

        let acri = self.bw * (2.5 * (self.h - self.d)).min(self.h / 2.0);
        let rho_ri = self.as_cm2 / acri;

        let wk1 = base * (3.0 * sigma / self.fctm_mpa);
        let wk2 = base * (4.0 / rho_ri + 45.0);
        let wk = wk1.min(wk2);
        let ok = wk <= wk_lim;
        let utilization = wk / wk_lim * 100.0;

        Ok(CrackWidthCheck {
            status: if ok { CheckStatus::Ok } else { CheckStatus::Fail },
            m_freq_knm,
            cracked: true,
            sigma_si_mpa: sigma,
            wk1_mm: wk1,
            wk2_mm: wk2,
            wk_mm: wk,
            wk_lim_mm: wk_lim,
            utilization_pct: utilization,
            message: if ok {
                format!("wk = {:.2} mm ≤ {} mm", wk, wk_lim)
            } else {
                format!("wk = {:.2} mm > {} mm", wk, wk_lim)
            },
        })
    }

    pub fn creep_factor(&self) -> CreepFactor {
        let xi_t = creep_time_function(self.options.creep_duration_months);
        let xi_t0 = creep_time_function(T0_MONTHS);
        let rho_prime = self.options.compression_area_cm2 / (self.bw * self.d);
        CreepFactor {
            xi_t,
            xi_t0,
            rho_prime,
            alpha_f: (xi_t - xi_t0) / (1.0 + 50.0 * rho_prime),
        }
    }

    /// Immediate deflection of one span from its `(x, M)` series, with `x`
    /// in meters measured from the left support and `M` in kN·m.
    pub fn calc_deflection(&self, moments: &[(f64, f64)], span_m: f64) -> CalcResult<DeflectionProfile> {
        ensure_positive("span_m", span_m)?;
        let integrator = CurvatureIntegrator::new(Centimeters::from(Meters(span_m)).0)?;
        let points = moments
            .iter()
            .map(|&(x_m, m_knm)| {
                ensure_finite("m_knm", m_knm)?;
                Ok(CurvaturePoint {
                    x_cm: Centimeters::from(Meters(x_m)).0,
                    kappa_per_cm: KnCm::from(KnM(m_knm)).0 / self.equivalent_stiffness(m_knm),
                })
            })
            .collect::<CalcResult<Vec<_>>>()?;
        integrator.integrate(&points)
    }

    /// Total deflection against `L/250`.
    pub fn verify_deflection(&self, moments: &[(f64, f64)], span_m: f64) -> CalcResult<DeflectionCheck> {
        let immediate = self.calc_deflection(moments, span_m)?;
        let f0 = immediate.max_f_cm.abs();
        let alpha_f = self.creep_factor().alpha_f;
        let f_total = f0 * (1.0 + alpha_f);
        let f_lim = Centimeters::from(Meters(span_m)).0 / DEFLECTION_LIMIT_RATIO;
        let ok = f_total <= f_lim;
        let utilization = f_total / f_lim * 100.0;

        Ok(DeflectionCheck {
            status: if ok { CheckStatus::Ok } else { CheckStatus::Fail },
            span_m,
            f0_cm: f0,
            alpha_f,
            f_total_cm: f_total,
            f_lim_cm: f_lim,
            max_x_m: Meters::from(Centimeters(immediate.max_x_cm)).0,
            utilization_pct: utilization,
            profile: immediate.scaled(1.0 + alpha_f),
            message: if ok {
                format!("f = {:.2} cm ≤ L/250 = {:.2} cm", f_total, f_lim)
            } else {
                format!("f = {:.2} cm > L/250 = {:.2} cm", f_total, f_lim)
            },
        })
    }

    pub fn verify_all(&self, m_freq_knm: f64, moments_qp: &[(f64, f64)], span_m: f64) -> CalcResult<ServiceabilitySummary> {
        let cracking = self.verify_crack_width(m_freq_knm)?;
        let deflection = self.verify_deflection(moments_qp, span_m)?;
        let all_ok = cracking.status.is_ok() && deflection.status.is_ok();

        Ok(ServiceabilitySummary {
            status: if all_ok { CheckStatus::Ok } else { CheckStatus::Fail },
            cracking,
            deflection,
            section: self.section_properties(),
            message: if all_ok {
                "All serviceability checks OK".to_string()
            } else {
                "Serviceability check failed".to_string()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialSpec;
    use approx::assert_relative_eq;

    const AS_4PHI20: f64 = 12.566_370_614_359_172;

    fn checker(options: ServiceabilityOptions) -> ServiceabilityChecker {
        let geometry = SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap();
        let materials = MaterialSpec::default().build().unwrap();
        ServiceabilityChecker::new(&geometry, &materials, AS_4PHI20, options).unwrap()
    }

    fn uniform_moments(span_m: f64, m_mid: f64, n: usize) -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| {
                let x = span_m * i as f64 / (n - 1) as f64;
                (x, 4.0 * m_mid * x * (span_m - x) / (span_m * span_m))
            })
            .collect()
    }

    #[test]
    fn test_cracking_moment() {
        let c = checker(ServiceabilityOptions::default());
        // 1.5·0.28965·540000/30/100
        assert_relative_eq!(c.cracking_moment_knm(), 78.20, epsilon = 0.01);
    }

    #[test]
    fn test_compression_steel_lowers_neutral_axis() {
        let plain = checker(ServiceabilityOptions::default());
        let doubly = checker(ServiceabilityOptions {
            compression_area_cm2: 6.0,
            ..Default::default()
        });
        assert!(doubly.x_ii_cm() < plain.x_ii_cm());
        assert!(doubly.i_ii_cm4() > plain.i_ii_cm4());
    }

    #[test]
    fn test_branson_bounds() {
        let c = checker(ServiceabilityOptions::default());
        let ecs = 0.875 * 5600.0 * 30f64.sqrt() / 10.0;
        let gross = ecs * 540_000.0;
        assert_relative_eq!(c.equivalent_stiffness(50.0), gross, max_relative = 1e-12);
        let cracked = c.equivalent_stiffness(300.0);
        assert!(cracked < gross);
        assert!(cracked > ecs * c.i_ii_cm4());
        // monotone in |Ma|
        assert!(c.equivalent_stiffness(-400.0) < cracked);
    }

    #[test]
    fn test_crack_width_uncracked() {
        let r = checker(ServiceabilityOptions::default()).verify_crack_width(-60.0).unwrap();
        assert_eq!(r.status, CheckStatus::Ok);
        assert!(!r.cracked);
        assert_eq!(r.wk_mm, 0.0);
    }

    #[test]
    fn test_crack_width_cracked() {
        let c = checker(ServiceabilityOptions::default());
        let r = c.verify_crack_width(150.0).unwrap();
        assert!(r.cracked);
        assert_eq!(r.wk_mm, r.wk1_mm.min(r.wk2_mm));
        assert_relative_eq!(r.sigma_si_mpa, 240.3, epsilon = 0.1);
        // wk2 governs: 0.134 mm against wk1 = 0.203 mm
        assert_relative_eq!(r.wk_mm, 0.134, epsilon = 0.001);
        assert_eq!(r.wk_mm, r.wk2_mm);
        assert_eq!(r.status, CheckStatus::Ok);

        let strict = checker(ServiceabilityOptions {
            crack_width_limit_mm: 0.1,
            ..Default::default()
        });
        assert_eq!(strict.verify_crack_width(150.0).unwrap().status, CheckStatus::Fail);
    }

    #[test]
    fn test_creep_table() {
        assert_eq!(creep_time_function(0.0), 0.0);
        assert_eq!(creep_time_function(1.0), 0.68);
        assert_relative_eq!(creep_time_function(9.0), 1.13 + 0.23 * 0.5, epsilon = 1e-12);
        assert_eq!(creep_time_function(70.0), 2.0);
        assert_eq!(creep_time_function(240.0), 2.0);

        let c = checker(ServiceabilityOptions::default());
        assert_relative_eq!(c.creep_factor().alpha_f, 1.32, epsilon = 1e-12);

        let doubly = checker(ServiceabilityOptions {
            compression_area_cm2: 3.3,
            ..Default::default()
        });
        // ρ' = 3.3/1650 = 0.002
        assert_relative_eq!(doubly.creep_factor().alpha_f, 1.32 / 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_deflection_boundary_and_symmetry() {
        let c = checker(ServiceabilityOptions::default());
        let profile = c.calc_deflection(&uniform_moments(6.0, 120.0, 25), 6.0).unwrap();
        let n = profile.points.len();
        assert_eq!(profile.points[0].f_cm, 0.0);
        assert_eq!(profile.points[n - 1].f_cm, 0.0);
        assert_relative_eq!(profile.max_x_cm, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_deflection_uncracked_matches_closed_form() {
        let c = checker(ServiceabilityOptions::default());
        let check = c.verify_deflection(&uniform_moments(6.0, 10.0, 61), 6.0).unwrap();
        let ei = c.equivalent_stiffness(0.0);
        // 5·M·L²/(48·EI)
        let expected = 5.0 * 1000.0 * 600.0 * 600.0 / (48.0 * ei);
        assert_relative_eq!(check.f0_cm, expected, max_relative = 0.01);
        assert_relative_eq!(check.f_total_cm, check.f0_cm * 2.32, epsilon = 1e-12);
        assert_relative_eq!(check.f_lim_cm, 2.4, epsilon = 1e-12);
        assert_eq!(check.status, CheckStatus::Ok);
        assert_relative_eq!(check.max_x_m, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_deflection_rejects_multi_span_series() {
        let c = checker(ServiceabilityOptions::default());
        let moments = [(0.0, 0.0), (3.0, 50.0), (3.0, 40.0), (6.0, 0.0)];
        assert!(c.calc_deflection(&moments, 6.0).is_err());
    }

    #[test]
    fn test_verify_all() {
        let c = checker(ServiceabilityOptions::default());
        let summary = c.verify_all(100.0, &uniform_moments(6.0, 80.0, 31), 6.0).unwrap();
        assert_eq!(summary.status, CheckStatus::Ok);
        assert_relative_eq!(summary.section.mr_knm, c.cracking_moment_knm(), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_options() {
        let geometry = SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap();
        let materials = MaterialSpec::default().build().unwrap();
        let bad = ServiceabilityOptions { eta1: 0.0, ..Default::default() };
        assert!(ServiceabilityChecker::new(&geometry, &materials, AS_4PHI20, bad).is_err());
    }
}
