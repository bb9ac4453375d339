//! # Section Check
//!
//! Every verification of one cross-section under explicitly given forces:
//!
//! - ULS flexure of the provided tension steel
//! - ULS shear (strut and stirrups) and stirrup fatigue
//! - Stage II fatigue of the longitudinal steel and concrete
//! - crack width under the frequent combination
//!
//! The section passes when every check is `OK`.
//!
//! ## Example
//!
//! ```
//! use calc_core::calculations::section_check::{calculate, SectionCheckInput, SectionForces};
//! use calc_core::loads::ForceBounds;
//! use calc_core::section::SectionGeometry;
//!
//! let input = SectionCheckInput {
//!     label: "Midspan".to_string(),
//!     geometry: SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap(),
//!     materials: Default::default(),
//!     reinforcement: Default::default(),
//!     service: Default::default(),
//!     forces: SectionForces {
//!         uls: ForceBounds { m_max_knm: 150.0, m_min_knm: 0.0, v_max_kn: 100.0, v_min_kn: -20.0 },
//!         fatigue: ForceBounds { m_max_knm: 100.0, m_min_knm: 20.0, v_max_kn: 60.0, v_min_kn: -10.0 },
//!         frequent: ForceBounds { m_max_knm: 90.0, m_min_knm: 20.0, v_max_kn: 50.0, v_min_kn: -10.0 },
//!     },
//! };
//! let result = calculate(&input).unwrap();
//! assert!(result.flexure.utilization_pct.unwrap() < 100.0);
//! ```

use serde::{Deserialize, Serialize};

use super::fatigue::{FatigueChecker, FatigueSummary};
use super::flexure::{FlexuralDesigner, FlexureCheck};
use super::serviceability::{CrackWidthCheck, ServiceabilityChecker, ServiceabilityOptions};
use super::shear::{ShearCheck, ShearDesigner, StirrupFatigueCheck};
use super::{CheckOutcome, CheckStatus};
use crate::errors::CalcResult;
use crate::loads::ForceBounds;
use crate::materials::{MaterialSpec, SectionMaterials};
use crate::section::{ReinforcementLayout, SectionGeometry};

/// Internal forces acting on the section, one set per combination
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionForces {
    /// Ultimate combination
    pub uls: ForceBounds,
    /// Fatigue combination
    pub fatigue: ForceBounds,
    /// Frequent service combination
    pub frequent: ForceBounds,
}

/// Order a pair of bounds by magnitude: `(larger, smaller)`.
fn by_magnitude(a: f64, b: f64) -> (f64, f64) {
    if a.abs() >= b.abs() {
        (a, b)
    } else {
        (b, a)
    }
}

impl SectionForces {
    /// Design moment `max(|M_max|, |M_min|)` (kN·m)
    pub fn md_knm(&self) -> f64 {
        self.uls.max_abs_moment()
    }

    /// Design shear `max(|V_max|, |V_min|)` (kN)
    pub fn vd_kn(&self) -> f64 {
        self.uls.max_abs_shear()
    }

    /// Frequent moment of larger magnitude, sign kept (kN·m)
    pub fn m_freq_knm(&self) -> f64 {
        by_magnitude(self.frequent.m_max_knm, self.frequent.m_min_knm).0
    }
}

/// Input for a single-section verification.
///
/// `service` supplies η1, the crack-width limit and the creep duration;
/// compression steel and bar diameter are taken from `reinforcement` and
/// `d'` from `geometry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionCheckInput {
    pub label: String,
    pub geometry: SectionGeometry,
    #[serde(default)]
    pub materials: MaterialSpec,
    #[serde(default)]
    pub reinforcement: ReinforcementLayout,
    #[serde(default)]
    pub service: ServiceabilityOptions,
    pub forces: SectionForces,
}

impl SectionCheckInput {
    /// Serviceability options with the reinforcement-dependent fields filled in
    pub fn service_options(&self) -> ServiceabilityOptions {
        service_options(&self.service, &self.geometry, &self.reinforcement)
    }
}

pub(crate) fn service_options(
    base: &ServiceabilityOptions,
    geometry: &SectionGeometry,
    reinforcement: &ReinforcementLayout,
) -> ServiceabilityOptions {
    ServiceabilityOptions {
        compression_area_cm2: reinforcement.compression_area_cm2,
        compression_depth_cm: geometry.d_prime_cm,
        bar_diameter_mm: reinforcement.bar_diameter_mm,
        ..*base
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionCheckResult {
    pub label: String,
    /// Effective depth used (cm)
    pub d_cm: f64,
    pub as_provided_cm2: f64,
    pub asw_provided_cm2_per_m: f64,
    pub md_knm: f64,
    pub vd_kn: f64,
    pub flexure: FlexureCheck,
    pub shear: ShearCheck,
    pub stirrup_fatigue: StirrupFatigueCheck,
    pub fatigue: FatigueSummary,
    pub crack_width: CrackWidthCheck,
    /// Worst status of all checks
    pub status: CheckStatus,
    /// True when every check is OK
    pub section_ok: bool,
}

impl SectionCheckResult {
    /// `(name, status, utilization)` of each check, in report order
    pub fn checks(&self) -> Vec<(&'static str, CheckStatus, Option<f64>)> {
        vec![
            ("Flexure ULS", self.flexure.status(), self.flexure.utilization_pct()),
            ("Shear ULS", self.shear.status(), self.shear.utilization_pct()),
            ("Stirrup fatigue", self.stirrup_fatigue.status(), self.stirrup_fatigue.utilization_pct()),
            ("Steel fatigue", self.fatigue.steel.status(), self.fatigue.steel.utilization_pct()),
            ("Concrete fatigue", self.fatigue.concrete.status(), self.fatigue.concrete.utilization_pct()),
            ("Crack width", self.crack_width.status(), self.crack_width.utilization_pct()),
        ]
    }

    /// Largest utilization among the checks that report one (%)
    pub fn max_utilization_pct(&self) -> Option<f64> {
        self.checks()
            .into_iter()
            .filter_map(|(_, _, u)| u)
            .filter(|u| u.is_finite())
            .reduce(f64::max)
    }
}

/// Run every check for one section.
pub fn calculate(input: &SectionCheckInput) -> CalcResult<SectionCheckResult> {
    let materials = input.materials.build()?;
    check_section(
        &input.label,
        &input.geometry,
        &materials,
        &input.reinforcement,
        &input.service_options(),
        &input.forces,
    )
}

/// Same as [`calculate`] with materials already built.
pub(crate) fn check_section(
    label: &str,
    geometry: &SectionGeometry,
    materials: &SectionMaterials,
    reinforcement: &ReinforcementLayout,
    service: &ServiceabilityOptions,
    forces: &SectionForces,
) -> CalcResult<SectionCheckResult> {
    geometry.validate()?;
    reinforcement.validate()?;

    let as_prov = reinforcement.tension_area_cm2();
    let asw_prov = reinforcement.stirrup_area_per_m();
    let md = forces.md_knm();
    let vd = forces.vd_kn();

    let flexure = FlexuralDesigner::new(geometry, materials)?.verify_section(md, as_prov)?;

    let shear_designer = ShearDesigner::new(geometry, materials)?;
    let shear = shear_designer.verify_section(vd, asw_prov)?;
    let (v_hi, v_lo) = by_magnitude(forces.fatigue.v_max_kn, forces.fatigue.v_min_kn);
    let stirrup_fatigue = shear_designer.verify_stirrup_fatigue(v_hi, v_lo, asw_prov)?;

    let (m_hi, m_lo) = by_magnitude(forces.fatigue.m_max_knm, forces.fatigue.m_min_knm);
    let fatigue = FatigueChecker::new(
        geometry,
        materials,
        as_prov,
        reinforcement.bar_diameter_mm,
        reinforcement.bar_type,
    )?
    .verify_all(m_hi, m_lo)?;

    let crack_width =
        ServiceabilityChecker::new(geometry, materials, as_prov, *service)?.verify_crack_width(forces.m_freq_knm())?;

    let statuses = [
        flexure.status,
        shear.status,
        stirrup_fatigue.status,
        fatigue.status,
        crack_width.status,
    ];
    let status = statuses.iter().fold(CheckStatus::Ok, |acc, s| acc.worst(*s));
    let section_ok = statuses.iter().all(|s| s.is_ok());

    if !section_ok {
        log::warn!("section '{}' needs attention: {}", label, status);
    }

    Ok(SectionCheckResult {
        label: label.to_string(),
        d_cm: geometry.d(),
        as_provided_cm2: as_prov,
        asw_provided_cm2_per_m: asw_prov,
        md_knm: md,
        vd_kn: vd,
        flexure,
        shear,
        stirrup_fatigue,
        fatigue,
        crack_width,
        status,
        section_ok,
    })
}
