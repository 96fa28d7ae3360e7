pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, DatasetCommands};
pub use config::{default_config_path, load_config, PstMarginConfig, SolverConfig};
