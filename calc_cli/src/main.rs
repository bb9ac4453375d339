//! # Concreta CLI
//!
//! Verifies every item of a `.rcp` project (or the built-in sample beam)
//! and prints a fixed-width report, or the raw results as JSON.
//!
//! ```text
//! calc_cli                          # verify the sample beam
//! calc_cli --input job.rcp --json   # JSON results for a project
//! calc_cli --save sample.rcp        # write the sample project to disk
//! ```
//!
//! Set `RUST_LOG=debug` to follow the pipeline.

use std::path::PathBuf;
use std::process;

use calc_core::calculations::beam_check::BeamCheckResult;
use calc_core::calculations::section_check::SectionCheckResult;
use calc_core::calculations::CalculationOutput;
use calc_core::{load_project, save_project, CalcResult, Project};
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "calc_cli",
    about = "Verifies reinforced-concrete rail beams (NBR 6118)"
)]
struct Options {
    /// Project file to verify; the sample beam when omitted
    #[structopt(short, long, parse(from_os_str))]
    input: Option<PathBuf>,

    /// Print the results as JSON instead of the text report
    #[structopt(long)]
    json: bool,

    /// Write the sample project to this file and exit
    #[structopt(long, parse(from_os_str))]
    save: Option<PathBuf>,
}

const RULE: &str = "═══════════════════════════════════════════════════════════════";

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(u) if u.is_finite() => format!("{:6.1} %", u),
        _ => "      -".to_string(),
    }
}

fn print_section(result: &SectionCheckResult) {
    println!("  {}", result.label);
    println!(
        "    Md = {:.2} kNm   Vd = {:.2} kN   d = {:.2} cm   As = {:.2} cm²   Asw = {:.2} cm²/m",
        result.md_knm, result.vd_kn, result.d_cm, result.as_provided_cm2, result.asw_provided_cm2_per_m
    );
    for (name, status, utilization) in result.checks() {
        println!("    {:<18} {:<8} {}", name, status, fmt_pct(utilization));
    }
}

fn print_beam(result: &BeamCheckResult) {
    let s = &result.summary;
    let m = &result.materials;
    println!(
        "  Beam: {} span(s), L = {:.2} m, d = {:.2} cm",
        s.span_count, s.total_length_m, result.d_cm
    );
    println!(
        "  fck = {:.0} MPa  fcd = {:.2} MPa  fyd = {:.2} MPa  Δfsd,fad = {:.0} MPa",
        m.fck_mpa, m.fcd_mpa, m.fyd_mpa, m.fatigue_limit_mpa
    );
    println!(
        "  ELU: M_max = {:.2} kNm  M_min = {:.2} kNm  |V|max = {:.2} kN",
        s.max_m_max_knm, s.min_m_min_knm, s.max_abs_v_kn
    );
    println!();

    for verification in &result.sections {
        print_section(&verification.result);
        println!();
    }

    println!("  Deflection (quasi-permanent)");
    for d in &result.deflections {
        println!(
            "    {:<12} {:<6} f = {:7.3} cm  lim = {:7.3} cm  {:<8} {}",
            d.span.label,
            d.governing,
            d.check.f_total_cm,
            d.check.f_lim_cm,
            d.check.status,
            fmt_pct(Some(d.check.utilization_pct))
        );
    }
}

fn print_report(project: &Project, outputs: &[CalculationOutput]) {
    println!("{}", RULE);
    println!("  CONCRETA - {} - job {}", project.settings.code, project.meta.job_id);
    println!("{}", RULE);

    for output in outputs {
        println!();
        println!("▸ {}  [{}]", output.label(), output.status());
        println!();
        match output {
            CalculationOutput::Beam(result) => print_beam(result),
            CalculationOutput::Section(result) => print_section(result),
        }
    }

    let all_ok = outputs.iter().all(CalculationOutput::all_ok);
    println!();
    println!("{}", RULE);
    println!("  {}", if all_ok { "ALL CHECKS OK" } else { "CHECKS NEED ATTENTION" });
    println!("{}", RULE);
}

fn run(options: Options) -> CalcResult<()> {
    if let Some(path) = &options.save {
        save_project(&Project::sample()?, path)?;
        println!("Sample project written to {}", path.display());
        return Ok(());
    }

    let project = match &options.input {
        Some(path) => load_project(path)?,
        None => Project::sample()?,
    };
    log::info!("verifying {} item(s)", project.item_count());

    let outputs = project
        .items_by_label()
        .into_iter()
        .map(|(_, item)| item.calculate())
        .collect::<CalcResult<Vec<_>>>()?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        print_report(&project, &outputs);
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Options::from_args()) {
        eprintln!("error [{}]: {}", e.error_code(), e);
        process::exit(1);
    }
}
