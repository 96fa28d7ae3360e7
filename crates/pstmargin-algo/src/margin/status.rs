//! Backend-independent solve status.

use good_lp::{ResolutionError, SolutionStatus};
use serde::Serialize;
use std::fmt;

/// Outcome of a MILP solve.
///
/// Only [`SolveStatus::Optimal`] guarantees that controls and flows are
/// present in the result; [`SolveStatus::TimedOut`] may carry a best-found
/// solution when the backend returned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The backend stopped without proving anything (error message returned)
    NotSolved,
    /// The backend terminated with a status it could not classify
    Undefined,
    /// The wall-clock limit was reached
    TimedOut,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    /// Status of a solve that returned values.
    ///
    /// A gap-limited incumbent counts as optimal: no gap is requested, so it
    /// only appears within the backend's default MIP tolerance.
    pub fn from_solution_status(status: SolutionStatus) -> Self {
        match status {
            SolutionStatus::Optimal | SolutionStatus::GapLimit => SolveStatus::Optimal,
            SolutionStatus::TimeLimit => SolveStatus::TimedOut,
            #[allow(unreachable_patterns)]
            _ => SolveStatus::Undefined,
        }
    }

    /// Translate a `good_lp` resolution error.
    pub fn from_resolution_error(err: &ResolutionError) -> Self {
        match err {
            ResolutionError::Infeasible => SolveStatus::Infeasible,
            ResolutionError::Unbounded => SolveStatus::Unbounded,
            ResolutionError::Other(msg) if mentions_time_limit(msg) => SolveStatus::TimedOut,
            ResolutionError::Other(_) => SolveStatus::Undefined,
            ResolutionError::Str(msg) if mentions_time_limit(msg) => SolveStatus::TimedOut,
            ResolutionError::Str(_) => SolveStatus::NotSolved,
            #[allow(unreachable_patterns)]
            _ => SolveStatus::Undefined,
        }
    }
}

fn mentions_time_limit(msg: &str) -> bool {
    let lower = msg.to_ascii_lowercase();
    lower.contains("time limit") || lower.contains("timelimit") || lower.contains("time_limit")
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SolveStatus::Optimal => "Optimal",
            SolveStatus::Infeasible => "Infeasible",
            SolveStatus::Unbounded => "Unbounded",
            SolveStatus::NotSolved => "Not Solved",
            SolveStatus::Undefined => "Undefined",
            SolveStatus::TimedOut => "Timed Out",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_resolution_errors() {
        assert_eq!(
            SolveStatus::from_resolution_error(&ResolutionError::Infeasible),
            SolveStatus::Infeasible
        );
        assert_eq!(
            SolveStatus::from_resolution_error(&ResolutionError::Unbounded),
            SolveStatus::Unbounded
        );
        assert_eq!(
            SolveStatus::from_resolution_error(&ResolutionError::Other("NotSet")),
            SolveStatus::Undefined
        );
        assert_eq!(
            SolveStatus::from_resolution_error(&ResolutionError::Other("ReachedTimeLimit")),
            SolveStatus::TimedOut
        );
        assert_eq!(
            SolveStatus::from_resolution_error(&ResolutionError::Str("numerical trouble".into())),
            SolveStatus::NotSolved
        );
    }

    #[test]
    fn test_solution_status_comes_from_backend() {
        assert_eq!(
            SolveStatus::from_solution_status(SolutionStatus::Optimal),
            SolveStatus::Optimal
        );
        assert_eq!(
            SolveStatus::from_solution_status(SolutionStatus::GapLimit),
            SolveStatus::Optimal
        );
        assert_eq!(
            SolveStatus::from_solution_status(SolutionStatus::TimeLimit),
            SolveStatus::TimedOut
        );
        assert_eq!(
            SolveStatus::from_resolution_error(&ResolutionError::Other(
                "Time limit reached before finding a feasible solution"
            )),
            SolveStatus::TimedOut
        );
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(SolveStatus::NotSolved.to_string(), "Not Solved");
        assert_eq!(SolveStatus::Optimal.to_string(), "Optimal");
        assert!(SolveStatus::Optimal.is_optimal());
        assert!(!SolveStatus::TimedOut.is_optimal());
    }
}
