//! Optimization result types.

use super::backend::MilpBackend;
use super::status::SolveStatus;
use crate::evaluate::{ControlSetting, FlowState};
use pstmargin_core::{GenId, PstId, SensitivityDataset};
use std::collections::HashMap;
use std::time::Duration;

/// Outcome of one max-min margin solve.
///
/// Non-optimal statuses are reported here rather than as errors. The numeric
/// fields are `None` unless the backend produced values.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub status: SolveStatus,
    pub backend: MilpBackend,
    /// Objective value `m` as reported by the solver (MW)
    pub objective_min_margin: Option<f64>,
    /// Optimized taps (integral) and generator outputs
    pub controls: Option<ControlSetting>,
    /// Flows recomputed from `controls` by the evaluator
    pub flows: Option<FlowState>,
    pub solve_time: Duration,
}

impl OptimizationResult {
    pub(crate) fn without_solution(
        status: SolveStatus,
        backend: MilpBackend,
        solve_time: Duration,
    ) -> Self {
        Self {
            status,
            backend,
            objective_min_margin: None,
            controls: None,
            flows: None,
            solve_time,
        }
    }

    pub fn taps(&self) -> Option<&HashMap<PstId, f64>> {
        self.controls.as_ref().map(|c| c.taps())
    }

    pub fn gens(&self) -> Option<&HashMap<GenId, f64>> {
        self.controls.as_ref().map(|c| c.gens())
    }

    /// Minimum margin recomputed from the extracted controls.
    pub fn min_margin_recomputed(&self) -> Option<f64> {
        self.flows.as_ref().map(|f| f.min_margin)
    }

    /// `|objective − recomputed min margin|`, when both are known.
    pub fn consistency_gap(&self) -> Option<f64> {
        match (self.objective_min_margin, self.min_margin_recomputed()) {
            (Some(obj), Some(recomputed)) => Some((obj - recomputed).abs()),
            _ => None,
        }
    }

    /// True when the gap is within `tolerance`. Results without a gap are not consistent.
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        self.consistency_gap().is_some_and(|gap| gap <= tolerance)
    }

    /// Generate a one-paragraph summary
    pub fn summary(&self, dataset: &SensitivityDataset) -> String {
        let mut s = format!(
            "Status: {} ({}, {:.3}s)",
            self.status,
            self.backend,
            self.solve_time.as_secs_f64()
        );
        if let Some(obj) = self.objective_min_margin {
            s.push_str(&format!("\nObjective min margin: {:.3} MW", obj));
        }
        if let Some(flows) = &self.flows {
            let binding = flows.binding_line();
            s.push_str(&format!(
                "\nRecomputed min margin: {:.3} MW (binding line {})",
                flows.min_margin,
                dataset.line(binding).name
            ));
        }
        if let Some(controls) = &self.controls {
            let moved = dataset
                .pst_ids()
                .filter(|id| {
                    controls
                        .tap(*id)
                        .is_some_and(|t| t != dataset.pst(*id).t_init as f64)
                })
                .count();
            s.push_str(&format!(
                "\nTaps moved: {}/{}, net generation change: {:.3} MW",
                moved,
                dataset.num_phase_shifters(),
                controls.net_generation_change(dataset)
            ));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::evaluate;
    use pstmargin_core::synthetic;

    #[test]
    fn test_gap_requires_both_values() {
        let result = OptimizationResult::without_solution(
            SolveStatus::Infeasible,
            MilpBackend::Microlp,
            Duration::ZERO,
        );
        assert!(result.consistency_gap().is_none());
        assert!(!result.is_consistent(1.0));
        assert!(result.taps().is_none());
    }

    #[test]
    fn test_gap_against_recomputed_flows() {
        let ds = synthetic::dataset();
        let controls = ControlSetting::base_case(&ds);
        let flows = evaluate(&ds, &controls).unwrap();
        let result = OptimizationResult {
            status: SolveStatus::Optimal,
            backend: MilpBackend::Microlp,
            objective_min_margin: Some(flows.min_margin + 0.5),
            controls: Some(controls),
            flows: Some(flows),
            solve_time: Duration::from_millis(3),
        };
        assert!((result.consistency_gap().unwrap() - 0.5).abs() < 1e-12);
        assert!(!result.is_consistent(1e-4));
        assert!(result.is_consistent(0.5 + 1e-9));
        assert!(result.summary(&ds).contains("Taps moved: 0/3"));
    }
}
