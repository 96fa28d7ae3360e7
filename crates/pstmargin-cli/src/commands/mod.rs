pub mod base;
pub mod dataset;
pub mod evaluate;
pub mod optimize;
pub mod report;

use anyhow::{Context, Result};
use pstmargin_algo::{ControlSetting, FlowState, MilpBackend, SolverOptions};
use pstmargin_cli::PstMarginConfig;
use pstmargin_core::{io, synthetic, SensitivityDataset};
use std::io::{self as stdio, Write};
use std::path::Path;
use tabwriter::TabWriter;

/// Load the dataset named on the command line, else the configured one, else
/// the built-in synthetic network.
pub fn resolve_dataset(
    flag: Option<&Path>,
    config: &PstMarginConfig,
) -> Result<SensitivityDataset> {
    match flag.or(config.dataset.as_deref()) {
        Some(path) => io::load_dataset(path)
            .with_context(|| format!("loading dataset {}", path.display())),
        None => {
            tracing::debug!("no dataset given, using built-in synthetic network");
            Ok(synthetic::dataset())
        }
    }
}

pub fn resolve_solver_options(
    config: &PstMarginConfig,
    solver: Option<MilpBackend>,
    time_limit: Option<f64>,
) -> Result<SolverOptions> {
    config.solver.to_options(solver, time_limit)
}

/// Per-line table of one flow state.
pub fn print_flow_table(dataset: &SensitivityDataset, state: &FlowState) -> Result<()> {
    let mut writer = TabWriter::new(stdio::stdout());
    writeln!(writer, "LINE\tFLOW (MW)\tLIMIT (MW)\tMARGIN (MW)")?;
    for (id, flow, margin) in state.iter() {
        let line = dataset.line(id);
        let flag = if margin < 0.0 { "  OVERLOAD" } else { "" };
        writeln!(
            writer,
            "{}\t{:.3}\t{:.3}\t{:.3}{}",
            line.name, flow, line.f_max, margin, flag
        )?;
    }
    writer.flush()?;
    println!(
        "Min margin: {:.3} MW (line {})",
        state.min_margin,
        dataset.line(state.binding_line()).name
    );
    Ok(())
}

/// Per-line base-vs-optimized comparison.
pub fn print_comparison_table(
    dataset: &SensitivityDataset,
    base: &FlowState,
    optimized: &FlowState,
) -> Result<()> {
    let mut writer = TabWriter::new(stdio::stdout());
    writeln!(
        writer,
        "LINE\tLIMIT (MW)\tBASE FLOW\tBASE MARGIN\tOPT FLOW\tOPT MARGIN"
    )?;
    for id in dataset.line_ids() {
        writeln!(
            writer,
            "{}\t{:.3}\t{:.3}\t{:.3}\t{:.3}\t{:.3}",
            dataset.line(id).name,
            dataset.line(id).f_max,
            base.flow(id),
            base.margin(id),
            optimized.flow(id),
            optimized.margin(id)
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Taps and generator outputs against their initial values.
pub fn print_controls(dataset: &SensitivityDataset, controls: &ControlSetting) -> Result<()> {
    let mut writer = TabWriter::new(stdio::stdout());
    if dataset.num_phase_shifters() > 0 {
        writeln!(writer, "PST\tINIT\tTAP\tBOUNDS")?;
        for id in dataset.pst_ids() {
            let pst = dataset.pst(id);
            let (lo, hi) = pst.tap_bounds();
            let tap = controls.tap(id).unwrap_or(pst.t_init as f64);
            writeln!(writer, "{}\t{}\t{}\t[{}, {}]", pst.name, pst.t_init, tap, lo, hi)?;
        }
        writer.flush()?;
    }
    if dataset.num_generators() > 0 {
        let mut writer = TabWriter::new(stdio::stdout());
        writeln!(writer, "GENERATOR\tINIT (MW)\tOUTPUT (MW)\tDELTA (MW)")?;
        for id in dataset.gen_ids() {
            let gen = dataset.generator(id);
            let output = controls.gen(id).unwrap_or(gen.g_init);
            writeln!(
                writer,
                "{}\t{:.3}\t{:.3}\t{:+.3}",
                gen.name,
                gen.g_init,
                output,
                output - gen.g_init
            )?;
        }
        writer.flush()?;
    }
    Ok(())
}
