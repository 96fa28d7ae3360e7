//! MILP backend selection and solver options.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// MILP solver backends reachable through `good_lp`.
///
/// Every variant can be named on the command line; whether it can actually
/// run depends on the crate features it was compiled with (see
/// [`MilpBackend::is_available`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MilpBackend {
    /// microlp - pure-Rust simplex with branch-and-bound (always compiled)
    #[default]
    Microlp,
    /// HiGHS - dual simplex / branch-and-cut (feature `solver-highs`)
    Highs,
    /// COIN-OR CBC - branch-and-cut, links the system CBC library (feature `solver-cbc`)
    Cbc,
}

const KNOWN_BACKENDS: &[&str] = &["microlp", "highs", "cbc"];

impl MilpBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilpBackend::Microlp => "microlp",
            MilpBackend::Highs => "highs",
            MilpBackend::Cbc => "cbc",
        }
    }

    /// Whether this backend was compiled into the binary.
    pub fn is_available(&self) -> bool {
        match self {
            MilpBackend::Microlp => true,
            MilpBackend::Highs => cfg!(feature = "solver-highs"),
            MilpBackend::Cbc => cfg!(feature = "solver-cbc"),
        }
    }

    /// Names of all backends compiled into this build.
    pub fn available() -> Vec<&'static str> {
        [MilpBackend::Microlp, MilpBackend::Highs, MilpBackend::Cbc]
            .iter()
            .filter(|b| b.is_available())
            .map(|b| b.as_str())
            .collect()
    }
}

impl fmt::Display for MilpBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilpBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "microlp" | "default" => Ok(MilpBackend::Microlp),
            "highs" => Ok(MilpBackend::Highs),
            "cbc" | "coin_cbc" => Ok(MilpBackend::Cbc),
            other => Err(format!(
                "unknown MILP backend '{}'; supported values: {}",
                other,
                KNOWN_BACKENDS.join(", ")
            )),
        }
    }
}

/// Options for one optimization run
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// Backend to solve with
    pub backend: MilpBackend,
    /// Wall-clock limit handed to the backend
    pub time_limit: Option<Duration>,
    /// Accepted gap between solver objective and recomputed min margin (MW)
    pub tolerance: f64,
    /// Whether to let the backend print its own log
    pub verbose: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            backend: MilpBackend::default(),
            time_limit: None,
            tolerance: 1e-4,
            verbose: false,
        }
    }
}

impl SolverOptions {
    pub fn with_backend(mut self, backend: MilpBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_names() {
        assert_eq!("microlp".parse::<MilpBackend>(), Ok(MilpBackend::Microlp));
        assert_eq!("HiGHS".parse::<MilpBackend>(), Ok(MilpBackend::Highs));
        assert_eq!("coin_cbc".parse::<MilpBackend>(), Ok(MilpBackend::Cbc));
        let err = "gurobi".parse::<MilpBackend>().unwrap_err();
        assert!(err.contains("microlp, highs, cbc"));
    }

    #[test]
    fn test_microlp_always_available() {
        assert!(MilpBackend::Microlp.is_available());
        assert!(MilpBackend::available().contains(&"microlp"));
    }

    #[test]
    fn test_default_options() {
        let opts = SolverOptions::default();
        assert_eq!(opts.backend, MilpBackend::Microlp);
        assert!(opts.time_limit.is_none());
        assert_eq!(opts.tolerance, 1e-4);
    }
}
