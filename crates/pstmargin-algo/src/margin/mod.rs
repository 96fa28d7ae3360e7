//! Max-Min Thermal Margin Optimization
//!
//! Chooses phase-shifter taps and generator redispatch so that the smallest
//! thermal margin over all monitored lines is as large as possible.
//!
//! ## MILP Formulation
//!
//! ```text
//! maximize    m
//!
//! subject to:
//!   t[a] = t[b]                          per ganged PST pair
//!   Σ_g (G[g] − G_init[g]) = 0           power balance (only with generators)
//!   flow(l) + m ≤ F_max[l]               upper envelope, per line
//!   m − flow(l) ≤ F_max[l]               lower envelope, per line
//!
//!   t[p] ∈ ℤ,  −t_range[p] ≤ t[p] ≤ t_range[p]
//!   G_min[g] ≤ G[g] ≤ G_max[g]
//!   m ≥ 0
//!
//! flow(l) = F_ref[l] + Σ_p PSDF[l,p]·(t[p] − t_init[p])
//!                    + Σ_g PTDF[l,g]·(G[g] − G_init[g])
//! ```
//!
//! The pair of envelope constraints linearizes `m ≤ F_max − |flow|`. Because
//! `m ≥ 0`, a dataset whose best achievable worst margin is negative is
//! reported as [`SolveStatus::Infeasible`].
//!
//! ## Tap Bounds
//!
//! Tap variables are bounded by `[−t_range, t_range]`, centered at zero and
//! not at `t_init`. A PST whose `t_init` lies outside that box is forced back
//! into it.
//!
//! ## Backends
//!
//! Solved through `good_lp`; see [`MilpBackend`] for the backends and the
//! features that enable them. Every result is cross-checked by re-evaluating
//! the extracted controls with [`crate::evaluate`].

mod backend;
mod model;
mod solution;
mod solver;
mod status;

pub use backend::{MilpBackend, SolverOptions};
pub use model::{flow_expression, MarginModel};
pub use solution::OptimizationResult;
pub use solver::{optimize, OptimizeError};
pub use status::SolveStatus;
