//! Flow and thermal-margin evaluation.
//!
//! Evaluation is linear superposition on the reference flow:
//!
//! ```text
//! flow(l)   = F_ref[l] + Σ_p PSDF[l,p]·(tap[p] − t_init[p])
//!                      + Σ_g PTDF[l,g]·(gen[g] − G_init[g])
//! margin(l) = F_max[l] − |flow(l)|
//! ```
//!
//! The same expression is assembled symbolically by the margin optimizer, so
//! evaluating the optimizer's controls here is an independent check of the
//! solver-reported objective. Negative margins (overloaded lines) are valid
//! output, not errors.

use pstmargin_core::{GenId, LineId, PstId, SensitivityDataset};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Kind of control referenced by an evaluation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    PhaseShifter,
    Generator,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::PhaseShifter => write!(f, "phase shifter"),
            ControlKind::Generator => write!(f, "generator"),
        }
    }
}

/// Errors from evaluating a control setting
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluateError {
    /// The setting omits a control that the dataset defines.
    #[error("Control setting has no value for {kind} '{name}'")]
    MissingControl { kind: ControlKind, name: String },

    /// A name-keyed setting references a control the dataset does not define.
    #[error("Unknown {kind} '{name}' in control setting")]
    UnknownControl { kind: ControlKind, name: String },
}

/// Tap positions and generator outputs for a dataset.
///
/// Values are keyed by the ids of the dataset that produced them. Taps are
/// stored as `f64` so solver output and hand-written settings share one type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlSetting {
    taps: HashMap<PstId, f64>,
    gens: HashMap<GenId, f64>,
}

impl ControlSetting {
    /// Empty setting; every control must be set before evaluation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every PST at `t_init` and every generator at `G_init`.
    pub fn base_case(dataset: &SensitivityDataset) -> Self {
        let mut setting = Self::new();
        for id in dataset.pst_ids() {
            setting.set_tap(id, dataset.pst(id).t_init as f64);
        }
        for id in dataset.gen_ids() {
            setting.set_gen(id, dataset.generator(id).g_init);
        }
        setting
    }

    /// Build a setting from name-keyed maps.
    ///
    /// Unknown names are rejected; controls that are absent stay unset and
    /// surface as [`EvaluateError::MissingControl`] on evaluation.
    pub fn from_named(
        dataset: &SensitivityDataset,
        taps: &HashMap<String, f64>,
        gens: &HashMap<String, f64>,
    ) -> Result<Self, EvaluateError> {
        let mut setting = Self::new();
        for (name, value) in taps {
            let id = dataset
                .pst_id(name)
                .ok_or_else(|| EvaluateError::UnknownControl {
                    kind: ControlKind::PhaseShifter,
                    name: name.clone(),
                })?;
            setting.set_tap(id, *value);
        }
        for (name, value) in gens {
            let id = dataset
                .gen_id(name)
                .ok_or_else(|| EvaluateError::UnknownControl {
                    kind: ControlKind::Generator,
                    name: name.clone(),
                })?;
            setting.set_gen(id, *value);
        }
        Ok(setting)
    }

    pub fn set_tap(&mut self, pst: PstId, value: f64) {
        self.taps.insert(pst, value);
    }

    pub fn set_gen(&mut self, gen: GenId, value: f64) {
        self.gens.insert(gen, value);
    }

    pub fn tap(&self, pst: PstId) -> Option<f64> {
        self.taps.get(&pst).copied()
    }

    pub fn gen(&self, gen: GenId) -> Option<f64> {
        self.gens.get(&gen).copied()
    }

    pub fn taps(&self) -> &HashMap<PstId, f64> {
        &self.taps
    }

    pub fn gens(&self) -> &HashMap<GenId, f64> {
        &self.gens
    }

    /// Net generation change relative to `G_init` (MW).
    ///
    /// Unset generators contribute nothing.
    pub fn net_generation_change(&self, dataset: &SensitivityDataset) -> f64 {
        self.gens
            .iter()
            .map(|(id, value)| value - dataset.generator(*id).g_init)
            .sum()
    }
}

/// Per-line flows and margins derived from one control setting.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState {
    flows: Vec<f64>,
    margins: Vec<f64>,
    /// Minimum margin over all lines (MW)
    pub min_margin: f64,
}

impl FlowState {
    /// Line flow (MW, signed).
    pub fn flow(&self, line: LineId) -> f64 {
        self.flows[line.value()]
    }

    /// Thermal margin `F_max − |flow|` (MW).
    pub fn margin(&self, line: LineId) -> f64 {
        self.margins[line.value()]
    }

    pub fn flows(&self) -> &[f64] {
        &self.flows
    }

    pub fn margins(&self) -> &[f64] {
        &self.margins
    }

    /// The line that sets `min_margin` (first one on ties).
    pub fn binding_line(&self) -> LineId {
        let mut best = 0;
        for (i, m) in self.margins.iter().enumerate() {
            if *m < self.margins[best] {
                best = i;
            }
        }
        LineId::new(best)
    }

    /// Lines whose flow exceeds the thermal limit.
    pub fn overloaded_lines(&self) -> Vec<LineId> {
        self.margins
            .iter()
            .enumerate()
            .filter(|(_, m)| **m < 0.0)
            .map(|(i, _)| LineId::new(i))
            .collect()
    }

    /// Iterate `(line, flow, margin)` in line order.
    pub fn iter(&self) -> impl Iterator<Item = (LineId, f64, f64)> + '_ {
        self.flows
            .iter()
            .zip(&self.margins)
            .enumerate()
            .map(|(i, (f, m))| (LineId::new(i), *f, *m))
    }
}

/// Evaluate line flows and margins for a control setting.
pub fn evaluate(
    dataset: &SensitivityDataset,
    controls: &ControlSetting,
) -> Result<FlowState, EvaluateError> {
    let tap_deltas = dataset
        .pst_ids()
        .map(|id| {
            let pst = dataset.pst(id);
            controls
                .tap(id)
                .map(|tap| tap - pst.t_init as f64)
                .ok_or_else(|| EvaluateError::MissingControl {
                    kind: ControlKind::PhaseShifter,
                    name: pst.name.clone(),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let gen_deltas = dataset
        .gen_ids()
        .map(|id| {
            let gen = dataset.generator(id);
            controls
                .gen(id)
                .map(|value| value - gen.g_init)
                .ok_or_else(|| EvaluateError::MissingControl {
                    kind: ControlKind::Generator,
                    name: gen.name.clone(),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    Ok(superpose(dataset, &tap_deltas, &gen_deltas))
}

/// Evaluate the base case (every control at its initial value).
pub fn base_case(dataset: &SensitivityDataset) -> FlowState {
    let tap_deltas = vec![0.0; dataset.num_phase_shifters()];
    let gen_deltas = vec![0.0; dataset.num_generators()];
    superpose(dataset, &tap_deltas, &gen_deltas)
}

fn superpose(dataset: &SensitivityDataset, tap_deltas: &[f64], gen_deltas: &[f64]) -> FlowState {
    let n_lines = dataset.num_lines();
    let mut flows = Vec::with_capacity(n_lines);
    let mut margins = Vec::with_capacity(n_lines);
    let mut min_margin = f64::INFINITY;

    for (row, line) in dataset.lines().iter().enumerate() {
        let shift: f64 = dataset
            .psdf_matrix()
            .row(row)
            .iter()
            .zip(tap_deltas)
            .map(|(k, d)| k * d)
            .sum();
        let redispatch: f64 = dataset
            .ptdf_matrix()
            .row(row)
            .iter()
            .zip(gen_deltas)
            .map(|(k, d)| k * d)
            .sum();

        let flow = line.f_ref + shift + redispatch;
        let margin = line.f_max - flow.abs();
        min_margin = min_margin.min(margin);
        flows.push(flow);
        margins.push(margin);
    }

    FlowState {
        flows,
        margins,
        min_margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pstmargin_core::DatasetBuilder;

    fn small_dataset() -> SensitivityDataset {
        DatasetBuilder::new()
            .line("A", 90.0, 100.0)
            .line("B", -30.0, 100.0)
            .phase_shifter("P", 0, 5)
            .generator("G1", 100.0, 50.0, 150.0)
            .generator("G2", 80.0, 0.0, 120.0)
            .psdf("A", "P", -10.0)
            .psdf("B", "P", -10.0)
            .ptdf("A", "G1", 0.5)
            .ptdf("B", "G2", -0.25)
            .build()
            .unwrap()
    }

    #[test]
    fn test_base_case_matches_reference() {
        let ds = small_dataset();
        let state = base_case(&ds);
        assert_eq!(state.flows(), &[90.0, -30.0]);
        assert_eq!(state.margins(), &[10.0, 70.0]);
        assert_eq!(state.min_margin, 10.0);
        assert_eq!(state.binding_line(), LineId::new(0));
    }

    #[test]
    fn test_evaluate_superposes_deltas() {
        let ds = small_dataset();
        let mut controls = ControlSetting::base_case(&ds);
        controls.set_tap(ds.pst_id("P").unwrap(), 2.0);
        controls.set_gen(ds.gen_id("G1").unwrap(), 120.0);
        controls.set_gen(ds.gen_id("G2").unwrap(), 60.0);

        let state = evaluate(&ds, &controls).unwrap();
        // A: 90 - 20 + 0.5*20 = 80, B: -30 - 20 - 0.25*(-20) = -45
        assert!((state.flow(LineId::new(0)) - 80.0).abs() < 1e-12);
        assert!((state.flow(LineId::new(1)) + 45.0).abs() < 1e-12);
        assert!((state.min_margin - 20.0).abs() < 1e-12);
        assert!(controls.net_generation_change(&ds).abs() < 1e-12);
    }

    #[test]
    fn test_negative_margin_is_reported() {
        let ds = small_dataset();
        let mut controls = ControlSetting::base_case(&ds);
        controls.set_tap(ds.pst_id("P").unwrap(), -3.0);

        let state = evaluate(&ds, &controls).unwrap();
        assert!((state.flow(LineId::new(0)) - 120.0).abs() < 1e-12);
        assert!(state.min_margin < 0.0);
        assert_eq!(state.overloaded_lines(), vec![LineId::new(0)]);
    }

    #[test]
    fn test_missing_control() {
        let ds = small_dataset();
        let mut controls = ControlSetting::new();
        controls.set_tap(ds.pst_id("P").unwrap(), 0.0);
        controls.set_gen(ds.gen_id("G1").unwrap(), 100.0);

        let err = evaluate(&ds, &controls).unwrap_err();
        assert_eq!(
            err,
            EvaluateError::MissingControl {
                kind: ControlKind::Generator,
                name: "G2".into()
            }
        );
    }

    #[test]
    fn test_from_named_rejects_unknown() {
        let ds = small_dataset();
        let taps = HashMap::from([("Q".to_string(), 1.0)]);
        let err = ControlSetting::from_named(&ds, &taps, &HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            EvaluateError::UnknownControl {
                kind: ControlKind::PhaseShifter,
                ..
            }
        ));
    }
}
