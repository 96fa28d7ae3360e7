//! `pstmargin optimize`

use anyhow::{Context, Result};
use pstmargin_algo::{base_case, optimize, FlowState, MilpBackend, OptimizationResult};
use pstmargin_cli::PstMarginConfig;
use pstmargin_core::SensitivityDataset;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::{
    print_comparison_table, print_controls, print_flow_table, resolve_dataset,
    resolve_solver_options,
};

/// Solution output format
#[derive(Debug, Serialize)]
struct OptimizeOutput {
    dataset: String,
    backend: MilpBackend,
    status: String,
    base_min_margin: f64,
    objective_min_margin: Option<f64>,
    recomputed_min_margin: Option<f64>,
    consistency_gap: Option<f64>,
    solve_time_ms: u64,
    taps: Vec<TapOutput>,
    gens: Vec<GenOutput>,
    lines: Vec<LineOutput>,
}

#[derive(Debug, Serialize)]
struct TapOutput {
    name: String,
    t_init: i32,
    tap: Option<f64>,
}

#[derive(Debug, Serialize)]
struct GenOutput {
    name: String,
    g_init: f64,
    output: Option<f64>,
}

#[derive(Debug, Serialize)]
struct LineOutput {
    name: String,
    f_max: f64,
    base_flow: f64,
    base_margin: f64,
    opt_flow: Option<f64>,
    opt_margin: Option<f64>,
}

pub fn handle(
    dataset: Option<&Path>,
    solver: Option<MilpBackend>,
    time_limit: Option<f64>,
    out: Option<&Path>,
    config: &PstMarginConfig,
) -> Result<()> {
    let ds = resolve_dataset(dataset, config)?;
    let options = resolve_solver_options(config, solver, time_limit)?;
    let base = base_case(&ds);

    println!("=== Base case ({}) ===", ds.name());
    print_flow_table(&ds, &base)?;

    let result = optimize(&ds, &options).context("running margin optimizer")?;

    println!("\n=== Optimized ({}) ===", result.backend);
    println!("{}", result.summary(&ds));
    match (&result.controls, &result.flows) {
        (Some(controls), Some(flows)) => {
            println!();
            print_controls(&ds, controls)?;
            println!();
            print_comparison_table(&ds, &base, flows)?;
        }
        _ => println!("No solution available: {}", result.status),
    }

    if let Some(path) = out {
        let output = build_output(&ds, &base, &result);
        let json = serde_json::to_string_pretty(&output).context("serializing solution")?;
        let mut file = File::create(path)
            .with_context(|| format!("creating output file {}", path.display()))?;
        file.write_all(json.as_bytes()).context("writing output")?;
        println!("\nResults written to {}", path.display());
    }

    Ok(())
}

fn build_output(
    ds: &SensitivityDataset,
    base: &FlowState,
    result: &OptimizationResult,
) -> OptimizeOutput {
    let controls = result.controls.as_ref();
    let flows = result.flows.as_ref();

    OptimizeOutput {
        dataset: ds.name().to_string(),
        backend: result.backend,
        status: result.status.to_string(),
        base_min_margin: base.min_margin,
        objective_min_margin: result.objective_min_margin,
        recomputed_min_margin: result.min_margin_recomputed(),
        consistency_gap: result.consistency_gap(),
        solve_time_ms: result.solve_time.as_millis() as u64,
        taps: ds
            .pst_ids()
            .map(|id| TapOutput {
                name: ds.pst(id).name.clone(),
                t_init: ds.pst(id).t_init,
                tap: controls.and_then(|c| c.tap(id)),
            })
            .collect(),
        gens: ds
            .gen_ids()
            .map(|id| GenOutput {
                name: ds.generator(id).name.clone(),
                g_init: ds.generator(id).g_init,
                output: controls.and_then(|c| c.gen(id)),
            })
            .collect(),
        lines: ds
            .line_ids()
            .map(|id| LineOutput {
                name: ds.line(id).name.clone(),
                f_max: ds.line(id).f_max,
                base_flow: base.flow(id),
                base_margin: base.margin(id),
                opt_flow: flows.map(|f| f.flow(id)),
                opt_margin: flows.map(|f| f.margin(id)),
            })
            .collect(),
    }
}
