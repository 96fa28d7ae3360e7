//! MILP assembly for the max-min margin problem.

use good_lp::{constraint, variable, variables, Constraint, Expression, ProblemVariables, Variable};
use pstmargin_core::{LineId, SensitivityDataset};

/// Decision variables and constraints, ready to hand to a backend.
pub struct MarginModel {
    pub vars: ProblemVariables,
    /// One integer tap variable per PST, in `PstId` order
    pub taps: Vec<Variable>,
    /// One continuous output variable per generator, in `GenId` order
    pub gens: Vec<Variable>,
    /// The minimum margin being maximized
    pub margin: Variable,
    pub constraints: Vec<Constraint>,
}

impl MarginModel {
    /// Build variables and constraints for a dataset.
    ///
    /// Tap bounds come from [`PhaseShifter::tap_bounds`](pstmargin_core::PhaseShifter::tap_bounds),
    /// i.e. `[-t_range, t_range]` regardless of `t_init`.
    pub fn build(dataset: &SensitivityDataset) -> Self {
        let mut vars = variables!();

        let taps: Vec<Variable> = dataset
            .phase_shifters()
            .iter()
            .map(|pst| {
                let (lo, hi) = pst.tap_bounds();
                vars.add(variable().integer().min(lo as f64).max(hi as f64))
            })
            .collect();

        let gens: Vec<Variable> = dataset
            .generators()
            .iter()
            .map(|g| vars.add(variable().min(g.g_min).max(g.g_max)))
            .collect();

        let margin = vars.add(variable().min(0.0));

        let mut constraints = Vec::new();

        for pair in dataset.coupled_taps() {
            let a = taps[pair.a.value()];
            let b = taps[pair.b.value()];
            constraints.push(constraint!(a == b));
        }

        if !gens.is_empty() {
            let total: Expression = gens.iter().copied().sum();
            let total_init: f64 = dataset.generators().iter().map(|g| g.g_init).sum();
            constraints.push(constraint!(total == total_init));
        }

        for line_id in dataset.line_ids() {
            let f_max = dataset.line(line_id).f_max;
            let flow = flow_expression(dataset, line_id, &taps, &gens);
            constraints.push(constraint!(flow.clone() + margin <= f_max));
            constraints.push(constraint!(margin - flow <= f_max));
        }

        tracing::debug!(
            taps = taps.len(),
            gens = gens.len(),
            constraints = constraints.len(),
            "assembled margin MILP"
        );

        Self {
            vars,
            taps,
            gens,
            margin,
            constraints,
        }
    }
}

/// Symbolic flow on one line as an affine expression of the control variables.
///
/// Mirrors [`evaluate`](crate::evaluate::evaluate) term for term; the constant
/// part folds `F_ref` with the `t_init`/`G_init` offsets.
pub fn flow_expression(
    dataset: &SensitivityDataset,
    line: LineId,
    taps: &[Variable],
    gens: &[Variable],
) -> Expression {
    let mut constant = dataset.line(line).f_ref;
    let mut expr = Expression::from(0.0);

    for pst_id in dataset.pst_ids() {
        let k = dataset.psdf(line, pst_id);
        if k == 0.0 {
            continue;
        }
        constant -= k * dataset.pst(pst_id).t_init as f64;
        expr += k * taps[pst_id.value()];
    }

    for gen_id in dataset.gen_ids() {
        let k = dataset.ptdf(line, gen_id);
        if k == 0.0 {
            continue;
        }
        constant -= k * dataset.generator(gen_id).g_init;
        expr += k * gens[gen_id.value()];
    }

    expr + constant
}
