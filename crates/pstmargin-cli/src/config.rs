//! Optional TOML configuration.
//!
//! ```toml
//! dataset = "network.toml"
//!
//! [solver]
//! backend = "microlp"
//! time_limit_secs = 30.0
//! tolerance = 1e-4
//! verbose = false
//! ```
//!
//! A relative `dataset` path is resolved against the config file's directory.

use anyhow::{bail, Context, Result};
use dirs::config_dir;
use pstmargin_algo::{MilpBackend, SolverOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PstMarginConfig {
    /// Default dataset file for commands run without `--dataset`
    #[serde(default)]
    pub dataset: Option<PathBuf>,
    #[serde(default)]
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub time_limit_secs: Option<f64>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            time_limit_secs: None,
            tolerance: default_tolerance(),
            verbose: false,
        }
    }
}

fn default_backend() -> String {
    MilpBackend::default().as_str().to_string()
}

fn default_tolerance() -> f64 {
    SolverOptions::default().tolerance
}

impl SolverConfig {
    /// Resolve into solver options, applying command-line overrides.
    pub fn to_options(
        &self,
        backend: Option<MilpBackend>,
        time_limit_secs: Option<f64>,
    ) -> Result<SolverOptions> {
        let backend = match backend {
            Some(b) => b,
            None => self
                .backend
                .parse::<MilpBackend>()
                .map_err(anyhow::Error::msg)
                .context("reading [solver] backend from config")?,
        };
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            bail!("solver tolerance must be a non-negative number, got {}", self.tolerance);
        }

        let mut options = SolverOptions::default()
            .with_backend(backend)
            .with_tolerance(self.tolerance);
        options.verbose = self.verbose;

        if let Some(secs) = time_limit_secs.or(self.time_limit_secs) {
            if !(secs.is_finite() && secs > 0.0) {
                bail!("time limit must be a positive number of seconds, got {}", secs);
            }
            options = options.with_time_limit(Duration::from_secs_f64(secs));
        }
        Ok(options)
    }
}

/// `<config dir>/pstmargin/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("pstmargin").join("config.toml"))
}

/// Load configuration from an explicit path, or the default location if it
/// exists, or fall back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<PstMarginConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(PstMarginConfig::default()),
        },
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let mut config: PstMarginConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing config file {}", path.display()))?;

    if let (Some(dataset), Some(parent)) = (config.dataset.as_mut(), path.parent()) {
        if dataset.is_relative() {
            *dataset = parent.join(&*dataset);
        }
    }
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_solver_section() {
        let config: PstMarginConfig = toml::from_str("").unwrap();
        assert_eq!(config, PstMarginConfig::default());
        let opts = config.solver.to_options(None, None).unwrap();
        assert_eq!(opts, SolverOptions::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let solver = SolverConfig {
            backend: "highs".into(),
            time_limit_secs: Some(30.0),
            tolerance: 1e-3,
            verbose: true,
        };
        let opts = solver.to_options(Some(MilpBackend::Microlp), Some(5.0)).unwrap();
        assert_eq!(opts.backend, MilpBackend::Microlp);
        assert_eq!(opts.time_limit, Some(Duration::from_secs(5)));
        assert_eq!(opts.tolerance, 1e-3);
        assert!(opts.verbose);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_backend = SolverConfig {
            backend: "gurobi".into(),
            ..SolverConfig::default()
        };
        assert!(bad_backend.to_options(None, None).is_err());
        assert!(SolverConfig::default().to_options(None, Some(-1.0)).is_err());
    }

    #[test]
    fn test_relative_dataset_resolved_against_config_dir() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "dataset = \"net.toml\"\n[solver]\nbackend = \"microlp\"\ntime_limit_secs = 2.5\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.dataset, Some(tmp.path().join("net.toml")));
        assert_eq!(config.solver.time_limit_secs, Some(2.5));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let tmp = tempdir().unwrap();
        assert!(load_config(Some(&tmp.path().join("absent.toml"))).is_err());
    }
}
