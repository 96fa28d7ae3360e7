use anyhow::{Context, Result};
use pstmargin_algo::{evaluate, ControlSetting};
use pstmargin_cli::PstMarginConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{print_flow_table, resolve_dataset};

/// Control setting input format (JSON)
#[derive(Debug, Deserialize)]
struct ControlsInput {
    #[serde(default)]
    taps: HashMap<String, f64>,
    #[serde(default)]
    gens: HashMap<String, f64>,
}

pub fn handle(controls: &Path, dataset: Option<&Path>, config: &PstMarginConfig) -> Result<()> {
    let ds = resolve_dataset(dataset, config)?;

    let input: ControlsInput = {
        let file = File::open(controls)
            .with_context(|| format!("opening controls file: {}", controls.display()))?;
        serde_json::from_reader(BufReader::new(file)).context("parsing controls JSON")?
    };

    let setting = ControlSetting::from_named(&ds, &input.taps, &input.gens)
        .context("resolving control names")?;
    let state = evaluate(&ds, &setting).context("evaluating controls")?;

    let imbalance = setting.net_generation_change(&ds);
    if imbalance.abs() > 1e-6 {
        tracing::warn!(imbalance, "control setting does not preserve total generation");
    }

    print_flow_table(&ds, &state)
}
