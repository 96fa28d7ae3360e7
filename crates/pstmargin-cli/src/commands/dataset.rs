use anyhow::{Context, Result};
use pstmargin_cli::{DatasetCommands, PstMarginConfig};
use pstmargin_core::{io, synthetic, SensitivityDataset};
use std::io::{self as stdio, Write};
use tabwriter::TabWriter;

use super::resolve_dataset;

pub fn handle(command: &DatasetCommands, config: &PstMarginConfig) -> Result<()> {
    match command {
        DatasetCommands::Show { dataset } => {
            let ds = resolve_dataset(dataset.as_deref(), config)?;
            show(&ds)
        }
        DatasetCommands::Export { out } => {
            io::save_dataset(&synthetic::dataset(), out)
                .with_context(|| format!("writing dataset {}", out.display()))?;
            println!("Synthetic dataset written to {}", out.display());
            Ok(())
        }
        DatasetCommands::Validate { file } => {
            let ds = io::load_dataset(file)
                .with_context(|| format!("validating dataset {}", file.display()))?;
            println!("Dataset '{}' is valid", ds.name());
            println!("  {} lines", ds.num_lines());
            println!("  {} phase shifters", ds.num_phase_shifters());
            println!("  {} generators", ds.num_generators());
            println!("  {} coupled tap pairs", ds.coupled_taps().len());
            for pst in ds.phase_shifters() {
                let (lo, hi) = pst.tap_bounds();
                if pst.t_init < lo || pst.t_init > hi {
                    println!(
                        "  Warning: {} t_init {} lies outside tap bounds [{}, {}]",
                        pst.name, pst.t_init, lo, hi
                    );
                }
            }
            Ok(())
        }
    }
}

fn show(ds: &SensitivityDataset) -> Result<()> {
    println!("Dataset: {}", ds.name());

    let mut writer = TabWriter::new(stdio::stdout());
    writeln!(writer, "LINE\tF_REF (MW)\tF_MAX (MW)")?;
    for line in ds.lines() {
        writeln!(writer, "{}\t{:.3}\t{:.3}", line.name, line.f_ref, line.f_max)?;
    }
    writer.flush()?;

    let mut writer = TabWriter::new(stdio::stdout());
    writeln!(writer, "\nPST\tT_INIT\tT_RANGE")?;
    for pst in ds.phase_shifters() {
        writeln!(writer, "{}\t{}\t{}", pst.name, pst.t_init, pst.t_range)?;
    }
    writer.flush()?;

    let mut writer = TabWriter::new(stdio::stdout());
    writeln!(writer, "\nGENERATOR\tG_INIT\tG_MIN\tG_MAX")?;
    for g in ds.generators() {
        writeln!(
            writer,
            "{}\t{:.3}\t{:.3}\t{:.3}",
            g.name, g.g_init, g.g_min, g.g_max
        )?;
    }
    writer.flush()?;

    for pair in ds.coupled_taps() {
        println!("Coupled: {} = {}", ds.pst(pair.a).name, ds.pst(pair.b).name);
    }

    let mut writer = TabWriter::new(stdio::stdout());
    writeln!(writer, "\nLINE\tCONTROL\tCOEFFICIENT")?;
    for (row, col, value) in ds.psdf_matrix().nonzeros() {
        writeln!(
            writer,
            "{}\t{} (PSDF)\t{}",
            ds.lines()[row].name,
            ds.phase_shifters()[col].name,
            value
        )?;
    }
    for (row, col, value) in ds.ptdf_matrix().nonzeros() {
        writeln!(
            writer,
            "{}\t{} (PTDF)\t{}",
            ds.lines()[row].name,
            ds.generators()[col].name,
            value
        )?;
    }
    writer.flush()?;
    Ok(())
}
