use approx::assert_relative_eq;

use calc_core::calculations::beam_check::{self, BeamCheckInput, MomentBranch};
use calc_core::calculations::fatigue::FatigueChecker;
use calc_core::calculations::flexure::FlexuralDesigner;
use calc_core::calculations::section_check::{self, SectionCheckInput, SectionForces};
use calc_core::calculations::serviceability::{ServiceabilityChecker, ServiceabilityOptions};
use calc_core::calculations::shear::ShearDesigner;
use calc_core::calculations::{CalculationItem, CalculationOutput, CheckStatus};
use calc_core::file_io::{load_project, save_project};
use calc_core::loads::{CombinationSettings, ForceBounds, LoadCaseId, LoadStore, SectionId, Station};
use calc_core::materials::{BarType, MaterialSpec, SectionMaterials};
use calc_core::project::Project;
use calc_core::section::{ReinforcementLayout, SectionGeometry};

fn c30() -> SectionMaterials {
    MaterialSpec::default().build().unwrap()
}

fn section_30x60() -> SectionGeometry {
    SectionGeometry::rectangular(30.0, 60.0, 55.0).unwrap()
}

#[test]
fn uls_support_moment_is_captured_at_left_limit() {
    let store = LoadStore::sample().unwrap();
    let elu = store.combined(LoadCaseId::Elu, &CombinationSettings::default()).unwrap();

    let support = elu.value_at(Station::left(6.0)).unwrap();
    let most_negative = elu
        .points()
        .iter()
        .map(|p| p.values.m_min_knm)
        .fold(f64::INFINITY, f64::min);
    assert_relative_eq!(support.m_min_knm, most_negative);

    // Interpolating across the support would average the two limits
    let right = elu.value_at(Station::right(6.0)).unwrap();
    assert!(support.v_max_kn != right.v_max_kn || support.v_min_kn != right.v_min_kn);
}

#[test]
fn sample_beam_full_pipeline() {
    let result = beam_check::calculate(&BeamCheckInput::sample().unwrap()).unwrap();

    assert_eq!(result.summary.span_count, 2);
    assert_relative_eq!(result.summary.total_length_m, 12.0);
    assert_relative_eq!(result.summary.min_m_min_knm, -132.272, epsilon = 1e-6);

    let flex = result.section(SectionId::GlobalFlexure).unwrap();
    assert_ne!(flex.result.flexure.status, CheckStatus::Error);
    assert!(flex.result.flexure.design.as_final_cm2 >= flex.result.flexure.design.as_min_cm2);

    let fatigue = result.section(SectionId::GlobalFatigue).unwrap();
    assert_relative_eq!(fatigue.section.station.x_m, 2.0);
    assert!(fatigue.result.fatigue.steel.delta_sigma_mpa > 0.0);

    assert_eq!(result.deflections.len(), 2);
    for d in &result.deflections {
        assert!(matches!(d.governing, MomentBranch::MMax | MomentBranch::MMin));
        assert!(d.check.f_total_cm >= d.check.f0_cm);
        assert_relative_eq!(d.check.f_lim_cm, 600.0 / 250.0);
    }

    let worst = result
        .sections
        .iter()
        .map(|s| s.result.status)
        .chain(result.deflections.iter().map(|d| d.check.status))
        .fold(CheckStatus::Ok, CheckStatus::worst);
    assert_eq!(result.status, worst);
}

#[test]
fn section_forces_read_from_combinations() {
    let input = BeamCheckInput::sample().unwrap();
    let result = beam_check::calculate(&input).unwrap();
    let shear = result.section(SectionId::GlobalShear).unwrap();

    let fadiga = input
        .loads
        .combined(LoadCaseId::Fadiga, &input.settings)
        .unwrap()
        .value_at(shear.section.station)
        .unwrap();
    assert_eq!(shear.forces.fatigue, fadiga);
    assert_relative_eq!(shear.result.vd_kn, shear.forces.uls.max_abs_shear());
}

#[test]
fn heavier_live_factor_raises_design_forces() {
    let base = BeamCheckInput::sample().unwrap();
    let mut heavy = base.clone();
    heavy.settings.gamma_q = 2.0;

    let base_result = beam_check::calculate(&base).unwrap();
    let heavy_result = beam_check::calculate(&heavy).unwrap();
    assert!(heavy_result.summary.max_abs_v_kn > base_result.summary.max_abs_v_kn);
    assert!(heavy_result.summary.min_m_min_knm < base_result.summary.min_m_min_knm);
}

#[test]
fn ductile_design_for_200_knm() {
    let designer = FlexuralDesigner::new(&section_30x60(), &c30()).unwrap();
    let design = designer.design_reinforcement(200.0).unwrap();

    assert_ne!(design.status, CheckStatus::Error);
    assert!(design.xi < 0.45);
    assert!(design.ductile);
    assert!(design.as_final_cm2 >= 2.7 - 1e-9);

    let check = designer.verify_section(200.0, design.as_final_cm2).unwrap();
    assert_relative_eq!(check.utilization_pct.unwrap(), 100.0, epsilon = 1e-9);
}

#[test]
fn resistant_moment_inverts_design() {
    let designer = FlexuralDesigner::new(&section_30x60(), &c30()).unwrap();
    let as_cm2 = 8.0;
    let mrd = designer.resistant_moment_knm(as_cm2).unwrap();
    let design = designer.design_reinforcement(mrd).unwrap();
    assert_relative_eq!(design.as_calc_cm2, as_cm2, epsilon = 1e-6);
}

#[test]
fn stirrups_for_150_kn() {
    let designer = ShearDesigner::new(&section_30x60(), &c30()).unwrap();
    assert!(designer.vrd2_kn() > 150.0);

    let design = designer.design_stirrups_uls(150.0).unwrap();
    assert_eq!(design.status, CheckStatus::Ok);
    let req = design.requirement.unwrap();
    assert!(req.asw_final_cm2_per_m >= designer.asw_min_cm2_per_m());

    let none = designer.design_stirrups_uls(0.0).unwrap();
    assert_eq!(none.status, CheckStatus::Ok);
    assert_relative_eq!(none.requirement.unwrap().asw_final_cm2_per_m, designer.asw_min_cm2_per_m());
}

#[test]
fn equal_fatigue_moments_have_no_stress_range() {
    let checker = FatigueChecker::new(&section_30x60(), &c30(), 12.566, 20.0, BarType::Straight).unwrap();
    let check = checker.verify_steel_fatigue(85.0, 85.0).unwrap();
    assert_eq!(check.delta_sigma_mpa, 0.0);
    assert_eq!(check.status, CheckStatus::Ok);
}

#[test]
fn symmetric_span_deflects_most_at_midspan() {
    let checker = ServiceabilityChecker::new(&section_30x60(), &c30(), 12.566, ServiceabilityOptions::default()).unwrap();
    let span = 6.0;
    let q = 20.0;
    let moments: Vec<(f64, f64)> = (0..=24)
        .map(|i| {
            let x = span * i as f64 / 24.0;
            (x, q * x * (span - x) / 2.0)
        })
        .collect();

    let profile = checker.calc_deflection(&moments, span).unwrap();
    assert_eq!(profile.points.first().unwrap().f_cm, 0.0);
    assert_eq!(profile.points.last().unwrap().f_cm, 0.0);
    assert_relative_eq!(profile.max_x_cm, 300.0, epsilon = 1e-6);
}

#[test]
fn standalone_section_from_json() {
    let json = r#"{
        "label": "Support section",
        "geometry": { "bw_cm": 30.0, "h_cm": 60.0, "d_cm": 55.0 },
        "reinforcement": { "bar_count": 4 },
        "forces": {
            "uls": { "m_max_knm": 40.0, "m_min_knm": -150.0, "v_max_kn": 180.0, "v_min_kn": -60.0 },
            "fatigue": { "m_max_knm": 20.0, "m_min_knm": -100.0, "v_max_kn": 120.0, "v_min_kn": -40.0 },
            "frequent": { "m_max_knm": 15.0, "m_min_knm": -80.0, "v_max_kn": 100.0, "v_min_kn": -30.0 }
        }
    }"#;
    let input: SectionCheckInput = serde_json::from_str(json).unwrap();
    let result = section_check::calculate(&input).unwrap();

    assert_relative_eq!(result.md_knm, 150.0);
    assert_relative_eq!(result.vd_kn, 180.0);
    assert_relative_eq!(result.crack_width.m_freq_knm, -80.0);
    assert_eq!(result.checks().len(), 6);
}

#[test]
fn zero_forces_need_only_minimum_steel() {
    let input = SectionCheckInput {
        label: "Unloaded".to_string(),
        geometry: section_30x60(),
        materials: MaterialSpec::default(),
        reinforcement: ReinforcementLayout::default(),
        service: ServiceabilityOptions::default(),
        forces: SectionForces {
            uls: ForceBounds::default(),
            fatigue: ForceBounds::default(),
            frequent: ForceBounds::default(),
        },
    };
    let result = section_check::calculate(&input).unwrap();
    assert_eq!(result.flexure.status, CheckStatus::Ok);
    assert_eq!(result.shear.status, CheckStatus::Ok);
    assert!(result.section_ok);
}

#[test]
fn project_file_roundtrip_gives_same_results() {
    let path = std::env::temp_dir().join(format!("concreta_it_{}.rcp", std::process::id()));
    let mut project = Project::sample().unwrap();
    project.add_item(CalculationItem::Section(SectionCheckInput {
        label: "Midspan".to_string(),
        geometry: section_30x60(),
        materials: MaterialSpec::default(),
        reinforcement: ReinforcementLayout::default(),
        service: ServiceabilityOptions::default(),
        forces: SectionForces {
            uls: ForceBounds {
                m_max_knm: 150.0,
                m_min_knm: 0.0,
                v_max_kn: 50.0,
                v_min_kn: -50.0,
            },
            ..SectionForces::default()
        },
    }));
    save_project(&project, &path).unwrap();
    let loaded = load_project(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.item_count(), 2);
    let outputs = |p: &Project| -> Vec<CalculationOutput> {
        p.items_by_label()
            .into_iter()
            .map(|(_, item)| item.calculate().unwrap())
            .collect()
    };
    for (before, after) in outputs(&project).iter().zip(outputs(&loaded).iter()) {
        assert_eq!(before.label(), after.label());
        assert_eq!(before.status(), after.status());
        match (before, after) {
            (CalculationOutput::Beam(a), CalculationOutput::Beam(b)) => {
                assert_eq!(a.sections.len(), b.sections.len());
                assert_relative_eq!(a.summary.min_m_min_knm, b.summary.min_m_min_knm, epsilon = 1e-9);
            }
            (CalculationOutput::Section(a), CalculationOutput::Section(b)) => {
                assert_relative_eq!(a.md_knm, b.md_knm, epsilon = 1e-9);
            }
            _ => panic!("item kinds changed across save/load"),
        }
    }
}
