//! `pstmargin report`: base-vs-optimized comparison tables as CSV.

use anyhow::{Context, Result};
use pstmargin_algo::{base_case, optimize, MilpBackend};
use pstmargin_cli::PstMarginConfig;
use serde::Serialize;
use std::fs;
use std::path::Path;

use super::{resolve_dataset, resolve_solver_options};

pub const REPORT_FILES: [&str; 4] = [
    "margins_base_vs_opt.csv",
    "absflow_vs_limit.csv",
    "controls_taps.csv",
    "controls_gens.csv",
];

#[derive(Debug, Serialize)]
struct MarginRow<'a> {
    line: &'a str,
    base_margin: f64,
    opt_margin: Option<f64>,
}

#[derive(Debug, Serialize)]
struct AbsFlowRow<'a> {
    line: &'a str,
    f_max: f64,
    base_abs_flow: f64,
    opt_abs_flow: Option<f64>,
}

#[derive(Debug, Serialize)]
struct TapRow<'a> {
    pst: &'a str,
    base_tap: i32,
    opt_tap: Option<f64>,
}

#[derive(Debug, Serialize)]
struct GenRow<'a> {
    generator: &'a str,
    base_mw: f64,
    opt_mw: Option<f64>,
}

/// Header row goes out even when `rows` is empty.
fn write_csv<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer
        .write_record(header)
        .with_context(|| format!("writing {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn handle(
    dataset: Option<&Path>,
    out_dir: &Path,
    solver: Option<MilpBackend>,
    time_limit: Option<f64>,
    config: &PstMarginConfig,
) -> Result<()> {
    let ds = resolve_dataset(dataset, config)?;
    let options = resolve_solver_options(config, solver, time_limit)?;
    let base = base_case(&ds);
    let result = optimize(&ds, &options).context("running margin optimizer")?;

    if result.flows.is_none() {
        tracing::warn!(
            status = %result.status,
            "no optimized solution; optimized columns left empty"
        );
    }
    let flows = result.flows.as_ref();
    let controls = result.controls.as_ref();

    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    write_csv(
        &out_dir.join(REPORT_FILES[0]),
        &["line", "base_margin", "opt_margin"],
        ds.line_ids().map(|id| MarginRow {
            line: &ds.line(id).name,
            base_margin: base.margin(id),
            opt_margin: flows.map(|f| f.margin(id)),
        }),
    )?;
    write_csv(
        &out_dir.join(REPORT_FILES[1]),
        &["line", "f_max", "base_abs_flow", "opt_abs_flow"],
        ds.line_ids().map(|id| AbsFlowRow {
            line: &ds.line(id).name,
            f_max: ds.line(id).f_max,
            base_abs_flow: base.flow(id).abs(),
            opt_abs_flow: flows.map(|f| f.flow(id).abs()),
        }),
    )?;
    write_csv(
        &out_dir.join(REPORT_FILES[2]),
        &["pst", "base_tap", "opt_tap"],
        ds.pst_ids().map(|id| TapRow {
            pst: &ds.pst(id).name,
            base_tap: ds.pst(id).t_init,
            opt_tap: controls.and_then(|c| c.tap(id)),
        }),
    )?;
    write_csv(
        &out_dir.join(REPORT_FILES[3]),
        &["generator", "base_mw", "opt_mw"],
        ds.gen_ids().map(|id| GenRow {
            generator: &ds.generator(id).name,
            base_mw: ds.generator(id).g_init,
            opt_mw: controls.and_then(|c| c.gen(id)),
        }),
    )?;

    println!("Status: {}", result.status);
    println!("Saved tables to: {}", out_dir.display());
    for name in REPORT_FILES {
        println!("- {}", name);
    }
    Ok(())
}
