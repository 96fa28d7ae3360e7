//! # pstmargin-algo: Flow Evaluation and Margin Optimization
//!
//! Algorithms over a [`pstmargin_core::SensitivityDataset`]:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`evaluate`] | Linear flow/margin evaluation for a control setting |
//! | [`margin`] | Max-min thermal margin MILP over taps and redispatch |
//!
//! ## Example
//!
//! ```rust
//! use pstmargin_algo::{base_case, optimize, SolverOptions};
//! use pstmargin_core::synthetic;
//!
//! let dataset = synthetic::dataset();
//! let base = base_case(&dataset);
//! let result = optimize(&dataset, &SolverOptions::default())?;
//!
//! let optimized = result.min_margin_recomputed().unwrap();
//! assert!(optimized >= base.min_margin - 1e-6);
//! # Ok::<(), pstmargin_algo::OptimizeError>(())
//! ```

pub mod evaluate;
pub mod margin;

pub use evaluate::{base_case, evaluate, ControlKind, ControlSetting, EvaluateError, FlowState};
pub use margin::{
    optimize, MilpBackend, OptimizationResult, OptimizeError, SolveStatus, SolverOptions,
};
