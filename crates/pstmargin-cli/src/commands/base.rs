use anyhow::Result;
use pstmargin_algo::base_case;
use pstmargin_cli::PstMarginConfig;
use std::path::Path;

use super::{print_flow_table, resolve_dataset};

pub fn handle(dataset: Option<&Path>, config: &PstMarginConfig) -> Result<()> {
    let ds = resolve_dataset(dataset, config)?;
    let state = base_case(&ds);

    println!(
        "Base case for '{}': {} lines, {} PSTs, {} generators",
        ds.name(),
        ds.num_lines(),
        ds.num_phase_shifters(),
        ds.num_generators()
    );
    print_flow_table(&ds, &state)
}
