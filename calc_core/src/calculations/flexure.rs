//! # ULS Flexure (NBR 6118 §17.2.2)
//!
//! Rectangular stress-block design and verification of a rectangular section
//! in simple bending. Valid for `fck ≤ 50 MPa` (λ = 0.80, αc = 0.85,
//! εcu = 3.5‰, ductility limit x/d ≤ 0.45).
//!
//! ## Single reinforcement
//!
//! The neutral axis is the smaller root of
//!
//! ```text
//! 0.5·λ²·bw·σcd·x² − λ·bw·σcd·d·x + Md = 0
//! ```
//!
//! A negative discriminant or a root outside `(0, d)` means the stress block
//! cannot carry the moment: the design is reported with status `ERROR`.
//!
//! ## Double reinforcement
//!
//! With compression steel `As'` at depth `d'`, equilibrium is solved assuming
//! the compression bars yield, falling back to the elastic branch
//! `σs' = Es·εcu·(x − d')/x` when they do not. Exceeding the ductility limit
//! or the resisting moment only adds warnings; the result is still returned.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::flexure::FlexuralDesigner;
//! use calc_core::calculations::CheckStatus;
//! use calc_core::materials::MaterialSpec;
//! use calc_core::section::SectionGeometry;
//!
//! let geometry = SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap();
//! let materials = MaterialSpec::default().build().unwrap();
//! let designer = FlexuralDesigner::new(&geometry, &materials).unwrap();
//!
//! let design = designer.design_reinforcement(200.0).unwrap();
//! assert_eq!(design.status, CheckStatus::Ok);
//! assert!(design.xi < 0.45);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CheckOutcome, CheckStatus};
use crate::errors::{ensure_finite, ensure_non_negative, ensure_positive, CalcResult};
use crate::materials::SectionMaterials;
use crate::section::SectionGeometry;
use crate::units::{KnCm, KnM, KnPerCm2, Mpa};

/// Stress-block depth factor
pub const LAMBDA: f64 = 0.80;
/// Ultimate concrete strain (‰)
pub const EPSILON_CU: f64 = 3.5;
/// Ultimate steel strain (‰)
pub const EPSILON_SU: f64 = 10.0;
/// Ductility limit x/d for fck ≤ 50 MPa
pub const XI_LIM: f64 = 0.45;
/// Boundary between strain domains 2 and 3
pub const XI_23: f64 = 0.259;
/// Minimum longitudinal reinforcement ratio
pub const RHO_MIN: f64 = 0.0015;

/// Strain domain at ultimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// Steel at 10‰, concrete below εcu
    II,
    /// Concrete at εcu, steel yielding
    III,
    /// Concrete at εcu, steel below yield
    IV,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Domain::II => "II",
            Domain::III => "III",
            Domain::IV => "IV",
        };
        write!(f, "{}", s)
    }
}

/// Concrete and steel strains (‰) at ultimate for a given `xi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainStrains {
    pub eps_c: f64,
    pub eps_s: f64,
}

/// Strains at ultimate, clamped to `[0, εcu]` and `[0, εsu]`.
///
/// Returns `None` for `xi ≤ 0` (no compression zone).
pub fn domain_strains(xi: f64) -> Option<DomainStrains> {
    if !xi.is_finite() || xi <= 0.0 {
        return None;
    }
    let (eps_c, eps_s) = if xi <= XI_23 {
        (EPSILON_SU * xi / (1.0 - xi), EPSILON_SU)
    } else {
        (EPSILON_CU, EPSILON_CU * (1.0 - xi) / xi)
    };
    Some(DomainStrains {
        eps_c: eps_c.clamp(0.0, EPSILON_CU),
        eps_s: eps_s.clamp(0.0, EPSILON_SU),
    })
}

/// Classify `xi`; anything beyond the ductility limit is domain IV.
pub fn classify_domain(xi: f64) -> Domain {
    if xi <= XI_23 {
        Domain::II
    } else if xi <= XI_LIM {
        Domain::III
    } else {
        Domain::IV
    }
}

/// Single-reinforcement design for one moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexureDesign {
    pub status: CheckStatus,
    /// Design moment as given (kN·m)
    pub md_knm: f64,
    /// Neutral axis depth (cm)
    pub x_cm: f64,
    pub xi: f64,
    pub xi_lim: f64,
    /// Lever arm (cm)
    pub z_cm: f64,
    pub as_calc_cm2: f64,
    pub as_min_cm2: f64,
    pub as_final_cm2: f64,
    pub ductile: bool,
    pub domain: Option<Domain>,
    pub strains: Option<DomainStrains>,
    pub message: String,
}

impl CheckOutcome for FlexureDesign {
    fn status(&self) -> CheckStatus {
        self.status
    }

    fn utilization_pct(&self) -> Option<f64> {
        None
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Design compared against the provided tension steel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexureCheck {
    pub status: CheckStatus,
    pub design: FlexureDesign,
    pub as_provided_cm2: f64,
    /// `As_final / As_provided · 100`
    pub utilization_pct: Option<f64>,
    /// Resisting moment of the provided steel (kN·m)
    pub mrd_knm: f64,
    pub message: String,
}

impl CheckOutcome for FlexureCheck {
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

/// Verification of a doubly reinforced section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleReinforcementCheck {
    pub status: CheckStatus,
    pub md_knm: f64,
    pub as_cm2: f64,
    pub as_prime_cm2: f64,
    pub x_cm: f64,
    pub xi: f64,
    /// Compression steel stress (MPa), positive in compression
    pub sigma_s_prime_mpa: f64,
    pub compression_yields: bool,
    pub mrd_knm: f64,
    pub domain: Option<Domain>,
    pub warnings: Vec<String>,
    pub message: String,
}

impl CheckOutcome for DoubleReinforcementCheck {
    fn status(&self) -> CheckStatus {
        self.status
    }

    fn utilization_pct(&self) -> Option<f64> {
        (self.mrd_knm > 0.0).then(|| self.md_knm.abs() / self.mrd_knm * 100.0)
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Steel areas for a moment beyond the ductility limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleReinforcementDesign {
    pub status: CheckStatus,
    pub md_knm: f64,
    /// Moment carried with `x = xi_lim·d` and tension steel only (kN·m)
    pub m_lim_knm: f64,
    pub x_cm: f64,
    pub as_cm2: f64,
    pub as_prime_cm2: f64,
    pub sigma_s_prime_mpa: f64,
    pub requires_compression_steel: bool,
    pub message: String,
}

/// Rectangular stress-block designer for one section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexuralDesigner {
    bw: f64,
    h: f64,
    d: f64,
    d_prime: f64,
    /// kN/cm²
    sigma_cd: f64,
    /// kN/cm²
    fyd: f64,
    /// kN/cm²
    es: f64,
}

impl FlexuralDesigner {
    pub fn new(geometry: &SectionGeometry, materials: &SectionMaterials) -> CalcResult<Self> {
        geometry.validate()?;
        Ok(FlexuralDesigner {
            bw: geometry.bw_cm,
            h: geometry.h_cm,
            d: geometry.d(),
            d_prime: geometry.d_prime_cm,
            sigma_cd: KnPerCm2::from(Mpa(materials.concrete.sigma_cd_mpa())).0,
            fyd: KnPerCm2::from(Mpa(materials.steel.fyd_mpa())).0,
            es: KnPerCm2::from(Mpa(materials.steel.es_mpa())).0,
        })
    }

    /// Minimum tension steel `0.0015·bw·h` (cm²)
    pub fn as_min_cm2(&self) -> f64 {
        RHO_MIN * self.bw * self.h
    }

    /// Neutral axis for a moment in kN·cm; `None` when no valid root exists.
    fn neutral_axis_cm(&self, md_kncm: f64) -> Option<f64> {
        if md_kncm == 0.0 {
            return Some(0.0);
        }
        let a = 0.5 * LAMBDA.powi(2) * self.bw * self.sigma_cd;
        let b = -LAMBDA * self.bw * self.sigma_cd * self.d;
        let disc = b * b - 4.0 * a * md_kncm;
        if disc < 0.0 {
            return None;
        }
        let x = (-b - disc.sqrt()) / (2.0 * a);
        (x > 0.0 && x < self.d).then_some(x)
    }

    /// Required tension steel for `|Md|` (kN·m).
    pub fn design_reinforcement(&self, md_knm: f64) -> CalcResult<FlexureDesign> {
        ensure_finite("md_knm", md_knm)?;
        let md = KnCm::from(KnM(md_knm.abs())).0;
        let as_min = self.as_min_cm2();

        let x = match self.neutral_axis_cm(md) {
            Some(x) => x,
            None => {
                log::debug!("no stress-block solution for Md = {:.2} kN·m", md_knm);
                return Ok(FlexureDesign {
                    status: CheckStatus::Error,
                    md_knm,
                    x_cm: 0.0,
                    xi: 0.0,
                    xi_lim: XI_LIM,
                    z_cm: 0.0,
                    as_calc_cm2: 0.0,
                    as_min_cm2: as_min,
                    as_final_cm2: 0.0,
                    ductile: false,
                    domain: None,
                    strains: None,
                    message: "Moment exceeds the capacity of the section in simple bending".to_string(),
                });
            }
        };

        let xi = x / self.d;
        let z = self.d - 0.5 * LAMBDA * x;
        let as_calc = md / (self.fyd * z);
        let as_final = as_calc.max(as_min);
        let ductile = xi <= XI_LIM;
        let domain = (xi > 0.0).then(|| classify_domain(xi));

        let message = if ductile {
            format!("Ductile section (x/d = {:.3})", xi)
        } else {
            format!("x/d = {:.3} > {} (double reinforcement recommended)", xi, XI_LIM)
        };

        Ok(FlexureDesign {
            status: if ductile { CheckStatus::Ok } else { CheckStatus::Warning },
            md_knm,
            x_cm: x,
            xi,
            xi_lim: XI_LIM,
            z_cm: z,
            as_calc_cm2: as_calc,
            as_min_cm2: as_min,
            as_final_cm2: as_final,
            ductile,
            domain,
            strains: domain_strains(xi),
            message,
        })
    }

    /// Compare the required steel for `Md` with the provided area.
    pub fn verify_section(&self, md_knm: f64, as_provided_cm2: f64) -> CalcResult<FlexureCheck> {
        ensure_positive("as_provided_cm2", as_provided_cm2)?;
        let design = self.design_reinforcement(md_knm)?;
        let mrd_knm = self.resistant_moment_knm(as_provided_cm2)?;

        if design.status == CheckStatus::Error {
            let message = design.message.clone();
            return Ok(FlexureCheck {
                status: CheckStatus::Error,
                design,
                as_provided_cm2,
                utilization_pct: None,
                mrd_knm,
                message,
            });
        }

        let utilization = design.as_final_cm2 / as_provided_cm2 * 100.0;
        let status = if utilization <= 100.0 { CheckStatus::Ok } else { CheckStatus::Fail };
        let message = format!(
            "As,req = {:.2} cm² / As,prov = {:.2} cm² ({:.1}%)",
            design.as_final_cm2, as_provided_cm2, utilization
        );

        Ok(FlexureCheck {
            status,
            design,
            as_provided_cm2,
            utilization_pct: Some(utilization),
            mrd_knm,
            message,
        })
    }

    /// Resisting moment (kN·m) of a tension area; zero when the compression
    /// block would be deeper than `d`.
    pub fn resistant_moment_knm(&self, as_cm2: f64) -> CalcResult<f64> {
        ensure_non_negative("as_cm2", as_cm2)?;
        let rs = as_cm2 * self.fyd;
        let x = rs / (LAMBDA * self.bw * self.sigma_cd);
        if x > self.d {
            return Ok(0.0);
        }
        let z = self.d - 0.5 * LAMBDA * x;
        Ok(KnM::from(KnCm(rs * z)).0)
    }

    /// Compression steel stress (kN/cm²) for neutral axis `x`.
    fn compression_steel_stress(&self, x: f64) -> f64 {
        let strain = EPSILON_CU / 1000.0 * (x - self.d_prime) / x;
        (self.es * strain).clamp(-self.fyd, self.fyd)
    }

    /// Verify a section with tension steel `As` and compression steel `As'`.
    pub fn verify_double_reinforcement(
        &self,
        md_knm: f64,
        as_cm2: f64,
        as_prime_cm2: f64,
    ) -> CalcResult<DoubleReinforcementCheck> {
        ensure_finite("md_knm", md_knm)?;
        ensure_positive("as_cm2", as_cm2)?;
        ensure_non_negative("as_prime_cm2", as_prime_cm2)?;

        let block = LAMBDA * self.bw * self.sigma_cd;
        let eps_yd = self.fyd / self.es;

        // Compression bars yielding
        let mut x = (as_cm2 - as_prime_cm2) * self.fyd / block;
        let yields = x > self.d_prime && EPSILON_CU / 1000.0 * (x - self.d_prime) / x >= eps_yd;
        if !yields {
            // block·x² + (As'·Es·εcu − As·fyd)·x − As'·Es·εcu·d' = 0
            let k = as_prime_cm2 * self.es * EPSILON_CU / 1000.0;
            let b = k - as_cm2 * self.fyd;
            let c = -k * self.d_prime;
            x = (-b + (b * b - 4.0 * block * c).sqrt()) / (2.0 * block);
        }

        let sigma_s_prime = if yields { self.fyd } else { self.compression_steel_stress(x) };
        let md_abs = md_knm.abs();

        if !(x > 0.0 && x < self.d) {
            return Ok(DoubleReinforcementCheck {
                status: CheckStatus::Error,
                md_knm,
                as_cm2,
                as_prime_cm2,
                x_cm: x,
                xi: x / self.d,
                sigma_s_prime_mpa: Mpa::from(KnPerCm2(sigma_s_prime)).0,
                compression_yields: yields,
                mrd_knm: 0.0,
                domain: None,
                warnings: Vec::new(),
                message: "Neutral axis outside the section; stress block not applicable".to_string(),
            });
        }

        let xi = x / self.d;
        let mrd_kncm = block * x * (self.d - 0.5 * LAMBDA * x) + as_prime_cm2 * sigma_s_prime * (self.d - self.d_prime);
        let mrd_knm = KnM::from(KnCm(mrd_kncm)).0;

        let mut warnings = Vec::new();
        if xi > XI_LIM {
            warnings.push(format!("x/d = {:.3} exceeds the ductility limit {}", xi, XI_LIM));
        }
        if md_abs > mrd_knm {
            warnings.push(format!("Md = {:.2} kN·m exceeds Mrd = {:.2} kN·m", md_abs, mrd_knm));
        }
        let status = if warnings.is_empty() { CheckStatus::Ok } else { CheckStatus::Warning };
        let message = if warnings.is_empty() {
            format!("Mrd = {:.2} kN·m (x/d = {:.3})", mrd_knm, xi)
        } else {
            warnings.join("; ")
        };

        Ok(DoubleReinforcementCheck {
            status,
            md_knm,
            as_cm2,
            as_prime_cm2,
            x_cm: x,
            xi,
            sigma_s_prime_mpa: Mpa::from(KnPerCm2(sigma_s_prime)).0,
            compression_yields: yields,
            mrd_knm,
            domain: Some(classify_domain(xi)),
            warnings,
            message,
        })
    }

    /// Tension and compression steel for `Md` with the neutral axis held at
    /// the ductility limit.
    pub fn design_double_reinforcement(&self, md_knm: f64) -> CalcResult<DoubleReinforcementDesign> {
        ensure_finite("md_knm", md_knm)?;
        let md = KnCm::from(KnM(md_knm.abs())).0;
        let block = LAMBDA * self.bw * self.sigma_cd;

        let x_lim = XI_LIM * self.d;
        let z_lim = self.d - 0.5 * LAMBDA * x_lim;
        let m_lim = block * x_lim * z_lim;
        let m_lim_knm = KnM::from(KnCm(m_lim)).0;

        if md <= m_lim {
            let single = self.design_reinforcement(md_knm)?;
            return Ok(DoubleReinforcementDesign {
                status: single.status,
                md_knm,
                m_lim_knm,
                x_cm: single.x_cm,
                as_cm2: single.as_final_cm2,
                as_prime_cm2: 0.0,
                sigma_s_prime_mpa: 0.0,
                requires_compression_steel: false,
                message: "Tension steel only".to_string(),
            });
        }

        let delta_m = md - m_lim;
        let arm = self.d - self.d_prime;
        let sigma_s_prime = self.compression_steel_stress(x_lim);
        if sigma_s_prime <= 0.0 {
            return Ok(DoubleReinforcementDesign {
                status: CheckStatus::Error,
                md_knm,
                m_lim_knm,
                x_cm: x_lim,
                as_cm2: 0.0,
                as_prime_cm2: 0.0,
                sigma_s_prime_mpa: Mpa::from(KnPerCm2(sigma_s_prime)).0,
                requires_compression_steel: true,
                message: "Compression steel lies below the neutral axis".to_string(),
            });
        }

        let as_prime = delta_m / (arm * sigma_s_prime);
        let as_total = (m_lim / (self.fyd * z_lim) + delta_m / (arm * self.fyd)).max(self.as_min_cm2());

        Ok(DoubleReinforcementDesign {
            status: CheckStatus::Ok,
            md_knm,
            m_lim_knm,
            x_cm: x_lim,
            as_cm2: as_total,
            as_prime_cm2: as_prime,
            sigma_s_prime_mpa: Mpa::from(KnPerCm2(sigma_s_prime)).0,
            requires_compression_steel: true,
            message: format!("As = {:.2} cm², As' = {:.2} cm²", as_total, as_prime),
        })
    }
}
