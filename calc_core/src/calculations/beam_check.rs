//! # Beam Check
//!
//! Full verification of a continuous rail beam from its load envelopes:
//!
//! 1. Build the ultimate, fatigue, frequent and quasi-permanent combinations
//! 2. Extract the global critical sections and any pinned sections
//! 3. Run [`section_check`](super::section_check) at each of them
//! 4. Check the deflection of every span under the quasi-permanent
//!    combination, integrating the `M_max` and `M_min` diagrams separately
//!    and keeping the larger deflection
//!
//! ## Example
//!
//! ```
//! use calc_core::calculations::beam_check::{calculate, BeamCheckInput};
//!
//! let input = BeamCheckInput::sample().unwrap();
//! let result = calculate(&input).unwrap();
//!
//! assert_eq!(result.deflections.len(), 2);
//! assert!(result.sections.len() >= 3);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::section_check::{check_section, service_options, SectionCheckResult, SectionForces};
use super::serviceability::{DeflectionCheck, ServiceabilityChecker, ServiceabilityOptions};
use super::CheckStatus;
use crate::errors::CalcResult;
use crate::loads::{
    find_critical_sections, pinned_sections, CombinationSettings, CriticalSection, EnvelopeSummary, LoadCaseId,
    LoadStore, PinnedSection, SectionId, Span,
};
use crate::materials::{MaterialSpec, MaterialSummary};
use crate::section::{ReinforcementLayout, SectionGeometry};

/// Input for a full beam verification.
///
/// When `geometry.d_cm` is omitted the effective depth is derived from the
/// cover and the bar sizes of `reinforcement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamCheckInput {
    pub label: String,
    pub geometry: SectionGeometry,
    #[serde(default)]
    pub materials: MaterialSpec,
    #[serde(default)]
    pub reinforcement: ReinforcementLayout,
    #[serde(default)]
    pub service: ServiceabilityOptions,
    pub loads: LoadStore,
    #[serde(default)]
    pub settings: CombinationSettings,
    #[serde(default)]
    pub pinned_sections: Vec<PinnedSection>,
}

impl BeamCheckInput {
    /// The built-in two-span rail beam: 30×60 cm, C30, 4φ20, φ8 c/15
    pub fn sample() -> CalcResult<Self> {
        Ok(BeamCheckInput {
            label: "Rail beam (sample)".to_string(),
            geometry: SectionGeometry {
                bw_cm: 30.0,
                h_cm: 60.0,
                d_cm: None,
                c_nom_cm: 3.0,
                d_prime_cm: 5.0,
            },
            materials: MaterialSpec::default(),
            reinforcement: ReinforcementLayout::default(),
            service: ServiceabilityOptions::default(),
            loads: LoadStore::sample()?,
            settings: CombinationSettings::default(),
            pinned_sections: Vec::new(),
        })
    }
}

/// Which bound of the quasi-permanent envelope produced a deflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentBranch {
    MMax,
    MMin,
}

impl fmt::Display for MomentBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MomentBranch::MMax => write!(f, "M_max"),
            MomentBranch::MMin => write!(f, "M_min"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanDeflection {
    pub span: Span,
    pub governing: MomentBranch,
    /// Total deflection of the other branch (cm)
    pub other_f_total_cm: f64,
    pub check: DeflectionCheck,
}

/// One verified section with the forces it was checked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionVerification {
    pub section: CriticalSection,
    pub forces: SectionForces,
    pub result: SectionCheckResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamCheckResult {
    pub label: String,
    /// Effective depth used (cm)
    pub d_cm: f64,
    pub materials: MaterialSummary,
    pub summary: EnvelopeSummary,
    pub sections: Vec<SectionVerification>,
    pub deflections: Vec<SpanDeflection>,
    pub status: CheckStatus,
    pub all_ok: bool,
}

impl BeamCheckResult {
    pub fn section(&self, id: SectionId) -> Option<&SectionVerification> {
        self.sections.iter().find(|s| s.section.id == id)
    }
}

fn span_deflection(checker: &ServiceabilityChecker, span: &Span, series: &[(f64, f64, f64)]) -> CalcResult<SpanDeflection> {
    let m_max: Vec<(f64, f64)> = series.iter().map(|&(x, hi, _)| (x, hi)).collect();
    let m_min: Vec<(f64, f64)> = series.iter().map(|&(x, _, lo)| (x, lo)).collect();
    let from_max = checker.verify_deflection(&m_max, span.length_m())?;
    let from_min = checker.verify_deflection(&m_min, span.length_m())?;

    log::debug!(
        "span '{}': f_total = {:.3} cm (M_max), {:.3} cm (M_min)",
        span.label,
        from_max.f_total_cm,
        from_min.f_total_cm
    );

    let (governing, check, other) = if from_max.f_total_cm >= from_min.f_total_cm {
        (MomentBranch::MMax, from_max, from_min)
    } else {
        (MomentBranch::MMin, from_min, from_max)
    };
    Ok(SpanDeflection {
        span: span.clone(),
        governing,
        other_f_total_cm: other.f_total_cm,
        check,
    })
}

/// Run the full beam verification.
pub fn calculate(input: &BeamCheckInput) -> CalcResult<BeamCheckResult> {
    input.settings.validate()?;
    input.loads.validate()?;
    input.reinforcement.validate()?;
    let materials = input.materials.build()?;
    let geometry = input.geometry.with_detailed_depth(&input.reinforcement)?;
    let service = service_options(&input.service, &geometry, &input.reinforcement);

    let loads = &input.loads;
    let settings = &input.settings;
    let elu = loads.combined(LoadCaseId::Elu, settings)?;
    let fadiga = loads.combined(LoadCaseId::Fadiga, settings)?;
    let frequent = loads.combined(LoadCaseId::ElsFreq, settings)?;
    let quasi_permanent = loads.combined(LoadCaseId::ElsQp, settings)?;

    let mut critical = find_critical_sections(&elu, Some(&fadiga));
    critical.extend(pinned_sections(&input.pinned_sections, &elu)?);

    let sections = critical
        .into_iter()
        .map(|section| {
            let forces = SectionForces {
                uls: elu.value_at(section.station)?,
                fatigue: fadiga.value_at(section.station)?,
                frequent: frequent.value_at(section.station)?,
            };
            let label = format!("{} ({})", section.label, section.station);
            let result = check_section(&label, &geometry, &materials, &input.reinforcement, &service, &forces)?;
            Ok(SectionVerification { section, forces, result })
        })
        .collect::<CalcResult<Vec<_>>>()?;

    let checker = ServiceabilityChecker::new(&geometry, &materials, input.reinforcement.tension_area_cm2(), service)?;
    let deflections = loads
        .spans()
        .iter()
        .map(|span| {
            let series: Vec<(f64, f64, f64)> = quasi_permanent
                .span_series(span)
                .into_iter()
                .map(|(x, b)| (x, b.m_max_knm, b.m_min_knm))
                .collect();
            span_deflection(&checker, span, &series)
        })
        .collect::<CalcResult<Vec<_>>>()?;

    let status = sections
        .iter()
        .map(|s| s.result.status)
        .chain(deflections.iter().map(|d| d.check.status))
        .fold(CheckStatus::Ok, CheckStatus::worst);
    let all_ok = sections.iter().all(|s| s.result.section_ok) && deflections.iter().all(|d| d.check.status.is_ok());

    if !all_ok {
        log::warn!("beam '{}' has checks needing attention ({})", input.label, status);
    }

    Ok(BeamCheckResult {
        label: input.label.clone(),
        d_cm: geometry.d(),
        materials: materials.summary(),
        summary: loads.summary(settings)?,
        sections,
        deflections,
        status,
        all_ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::Station;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_critical_sections() {
        let result = calculate(&BeamCheckInput::sample().unwrap()).unwrap();

        let flex = result.section(SectionId::GlobalFlexure).unwrap();
        // x = 2 m and x = 10 m tie; the first station wins
        assert_relative_eq!(flex.section.station.x_m, 2.0);
        assert_relative_eq!(flex.result.md_knm, 162.96, epsilon = 1e-6);

        let shear = result.section(SectionId::GlobalShear).unwrap();
        assert_eq!(shear.section.station, Station::left(6.0));
        assert_relative_eq!(shear.result.vd_kn, 192.094, epsilon = 1e-6);

        assert!(result.section(SectionId::GlobalFatigue).is_some());
    }

    #[test]
    fn test_detailed_depth_used() {
        let result = calculate(&BeamCheckInput::sample().unwrap()).unwrap();
        // 60 - 3 - 0.8 - 2.0/2
        assert_relative_eq!(result.d_cm, 55.2, epsilon = 1e-9);
    }

    #[test]
    fn test_span_deflections_vanish_at_supports() {
        let result = calculate(&BeamCheckInput::sample().unwrap()).unwrap();
        for d in &result.deflections {
            let pts = &d.check.profile.points;
            assert_eq!(pts.first().unwrap().f_cm, 0.0);
            assert_eq!(pts.last().unwrap().f_cm, 0.0);
            assert!(d.check.f_total_cm >= d.other_f_total_cm);
            assert_relative_eq!(d.check.span_m, 6.0);
        }
    }

    #[test]
    fn test_pinned_section_is_verified() {
        let mut input = BeamCheckInput::sample().unwrap();
        let pin = PinnedSection::new("Quarter span", 3.0);
        input.pinned_sections.push(pin.clone());
        let result = calculate(&input).unwrap();
        let pinned = result.section(SectionId::Pinned(pin.id)).unwrap();
        assert_relative_eq!(pinned.section.station.x_m, 3.0);
        assert_eq!(result.sections.len(), 4);
    }

    #[test]
    fn test_pinned_section_outside_beam_is_error() {
        let mut input = BeamCheckInput::sample().unwrap();
        input.pinned_sections.push(PinnedSection::new("Outside", 13.0));
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_all_ok_matches_parts() {
        let result = calculate(&BeamCheckInput::sample().unwrap()).unwrap();
        let expected = result.sections.iter().all(|s| s.result.section_ok)
            && result.deflections.iter().all(|d| d.check.status.is_ok());
        assert_eq!(result.all_ok, expected);
    }
}
