use clap::{Parser, Subcommand, ValueHint};
use pstmargin_algo::MilpBackend;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pstmargin",
    author,
    version,
    about = "Maximize the worst-case line thermal margin with PST taps and generator redispatch",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// Configuration file (defaults to <config dir>/pstmargin/config.toml when present)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print base-case flows and margins
    Base {
        /// Dataset file (.toml or .json); the built-in synthetic network if omitted
        #[arg(long, value_hint = ValueHint::FilePath)]
        dataset: Option<PathBuf>,
    },
    /// Solve the max-min margin MILP and compare against the base case
    Optimize {
        /// Dataset file (.toml or .json); the built-in synthetic network if omitted
        #[arg(long, value_hint = ValueHint::FilePath)]
        dataset: Option<PathBuf>,
        /// MILP backend (microlp, highs, cbc)
        #[arg(long)]
        solver: Option<MilpBackend>,
        /// Wall-clock limit in seconds
        #[arg(long)]
        time_limit: Option<f64>,
        /// Write the result as JSON
        #[arg(long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Evaluate flows and margins for a name-keyed control setting
    Evaluate {
        /// JSON file: {"taps": {"P1": 3, ...}, "gens": {"G1": 310.0, ...}}
        #[arg(long, value_hint = ValueHint::FilePath)]
        controls: PathBuf,
        /// Dataset file (.toml or .json); the built-in synthetic network if omitted
        #[arg(long, value_hint = ValueHint::FilePath)]
        dataset: Option<PathBuf>,
    },
    /// Write base-vs-optimized comparison tables as CSV
    Report {
        /// Dataset file (.toml or .json); the built-in synthetic network if omitted
        #[arg(long, value_hint = ValueHint::FilePath)]
        dataset: Option<PathBuf>,
        /// Output directory (created if absent)
        #[arg(long, default_value = "results", value_hint = ValueHint::DirPath)]
        out_dir: PathBuf,
        /// MILP backend (microlp, highs, cbc)
        #[arg(long)]
        solver: Option<MilpBackend>,
        /// Wall-clock limit in seconds
        #[arg(long)]
        time_limit: Option<f64>,
    },
    /// Dataset utilities
    Dataset {
        #[command(subcommand)]
        command: DatasetCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum DatasetCommands {
    /// Print element tables and sensitivity coefficients
    Show {
        #[arg(long, value_hint = ValueHint::FilePath)]
        dataset: Option<PathBuf>,
    },
    /// Write the built-in synthetic dataset to a .toml or .json file
    Export {
        #[arg(long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
    /// Load and validate a dataset file
    Validate {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
}
