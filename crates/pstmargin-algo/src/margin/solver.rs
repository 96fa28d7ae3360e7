//! Margin MILP solve and result extraction.

use super::backend::{MilpBackend, SolverOptions};
use super::model::MarginModel;
use super::solution::OptimizationResult;
use super::status::SolveStatus;
use crate::evaluate::{evaluate, ControlSetting, EvaluateError};
use good_lp::solvers::microlp::microlp;
use good_lp::{
    Constraint, ResolutionError, Solution, SolutionStatus, SolverModel, Variable, WithTimeLimit,
};
use pstmargin_core::{GenId, PstId, SensitivityDataset};
use std::time::Instant;
use thiserror::Error;

/// Margin optimizer errors
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("MILP backend '{backend}' is not available: {reason}")]
    SolverUnavailable {
        backend: MilpBackend,
        reason: String,
    },

    #[error("Failed to evaluate optimized controls: {0}")]
    Evaluate(#[from] EvaluateError),
}

/// Raw values read back from a backend solution
struct RawSolution {
    status: SolutionStatus,
    objective: f64,
    taps: Vec<f64>,
    gens: Vec<f64>,
}

/// Maximize the minimum thermal margin over all lines.
///
/// Returns `Ok` for every solver outcome, including infeasible and timed-out
/// runs; only an unavailable backend or a broken extraction is an error.
///
/// # Example
///
/// ```rust
/// use pstmargin_algo::margin::{optimize, SolverOptions};
/// use pstmargin_core::synthetic;
///
/// let dataset = synthetic::dataset();
/// let result = optimize(&dataset, &SolverOptions::default())?;
/// assert!(result.status.is_optimal());
/// assert!(result.is_consistent(1e-4));
/// # Ok::<(), pstmargin_algo::margin::OptimizeError>(())
/// ```
pub fn optimize(
    dataset: &SensitivityDataset,
    options: &SolverOptions,
) -> Result<OptimizationResult, OptimizeError> {
    let backend = options.backend;
    if !backend.is_available() {
        return Err(OptimizeError::SolverUnavailable {
            backend,
            reason: format!(
                "not compiled into this build (available: {})",
                MilpBackend::available().join(", ")
            ),
        });
    }

    let MarginModel {
        vars,
        taps,
        gens,
        margin,
        constraints,
    } = MarginModel::build(dataset);

    let start = Instant::now();
    let outcome = match backend {
        MilpBackend::Microlp => {
            let model = vars.maximise(margin).using(microlp);
            run(model, options, constraints, margin, &taps, &gens)
        }
        #[cfg(feature = "solver-highs")]
        MilpBackend::Highs => {
            use good_lp::solvers::highs::highs;
            let mut model = vars.maximise(margin).using(highs);
            model.set_verbose(options.verbose);
            run(model, options, constraints, margin, &taps, &gens)
        }
        #[cfg(feature = "solver-cbc")]
        MilpBackend::Cbc => {
            use good_lp::solvers::coin_cbc::coin_cbc;
            let mut model = vars.maximise(margin).using(coin_cbc);
            model.set_parameter("log", if options.verbose { "1" } else { "0" });
            run(model, options, constraints, margin, &taps, &gens)
        }
        #[allow(unreachable_patterns)]
        other => {
            return Err(OptimizeError::SolverUnavailable {
                backend: other,
                reason: "not compiled into this build".into(),
            })
        }
    };
    let solve_time = start.elapsed();

    let raw = match outcome {
        Ok(raw) => raw,
        Err(err) => {
            let status = SolveStatus::from_resolution_error(&err);
            tracing::warn!(
                backend = %backend,
                status = %status,
                error = %err,
                "margin MILP not solved to optimality"
            );
            return Ok(OptimizationResult::without_solution(
                status, backend, solve_time,
            ));
        }
    };

    let status = SolveStatus::from_solution_status(raw.status);
    if !status.is_optimal() {
        tracing::warn!(
            backend = %backend,
            status = %status,
            "time limit reached; keeping best solution found"
        );
    }

    let mut controls = ControlSetting::new();
    for (i, value) in raw.taps.iter().enumerate() {
        controls.set_tap(PstId::new(i), value.round());
    }
    for (i, value) in raw.gens.iter().enumerate() {
        controls.set_gen(GenId::new(i), *value);
    }
    let flows = evaluate(dataset, &controls)?;

    let result = OptimizationResult {
        status,
        backend,
        objective_min_margin: Some(raw.objective),
        controls: Some(controls),
        flows: Some(flows),
        solve_time,
    };

    tracing::info!(
        backend = %backend,
        status = %result.status,
        objective = raw.objective,
        solve_ms = solve_time.as_millis() as u64,
        "margin MILP solved"
    );
    if let Some(gap) = result.consistency_gap() {
        if gap > options.tolerance {
            tracing::warn!(
                gap,
                tolerance = options.tolerance,
                "solver objective differs from recomputed min margin"
            );
        }
    }

    Ok(result)
}

fn run<M>(
    model: M,
    options: &SolverOptions,
    constraints: Vec<Constraint>,
    margin: Variable,
    taps: &[Variable],
    gens: &[Variable],
) -> Result<RawSolution, ResolutionError>
where
    M: SolverModel<Error = ResolutionError> + WithTimeLimit,
{
    let model = match options.time_limit {
        Some(limit) => model.with_time_limit(limit.as_secs_f64()),
        None => model,
    };
    let solution = model.with_all(constraints).solve()?;
    Ok(RawSolution {
        status: solution.status(),
        objective: solution.value(margin),
        taps: taps.iter().map(|v| solution.value(*v)).collect(),
        gens: gens.iter().map(|v| solution.value(*v)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pstmargin_core::DatasetBuilder;

    #[test]
    fn test_single_line_symmetric_optimum() {
        // flow = 40 + 10·t, t ∈ [-5, 5]; best tap is -4 for flow 0
        let ds = DatasetBuilder::new()
            .line("A", 40.0, 100.0)
            .phase_shifter("P", 0, 5)
            .psdf("A", "P", 10.0)
            .build()
            .unwrap();
        let result = optimize(&ds, &SolverOptions::default()).unwrap();
        assert_eq!(result.status, SolveStatus::Optimal);
        let p = ds.pst_id("P").unwrap();
        assert_eq!(result.controls.as_ref().unwrap().tap(p), Some(-4.0));
        assert!((result.objective_min_margin.unwrap() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_generous_time_limit_keeps_optimal_status() {
        let ds = DatasetBuilder::new()
            .line("A", 40.0, 100.0)
            .phase_shifter("P", 0, 5)
            .psdf("A", "P", 10.0)
            .build()
            .unwrap();
        let opts = SolverOptions::default().with_time_limit(std::time::Duration::from_secs(60));
        let result = optimize(&ds, &opts).unwrap();
        assert_eq!(result.status, SolveStatus::Optimal);
        assert!(result.is_consistent(1e-6));
    }

    #[cfg(not(feature = "solver-cbc"))]
    #[test]
    fn test_cbc_unavailable_without_feature() {
        let ds = pstmargin_core::synthetic::dataset();
        let opts = SolverOptions::default().with_backend(MilpBackend::Cbc);
        let err = optimize(&ds, &opts).unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::SolverUnavailable {
                backend: MilpBackend::Cbc,
                ..
            }
        ));
    }
}
