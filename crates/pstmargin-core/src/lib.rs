//! # pstmargin-core: Sensitivity Dataset Model
//!
//! Provides the static data that drives thermal-margin studies: monitored
//! lines, phase-shifting transformers (PSTs), dispatchable generators, and the
//! linear sensitivity coefficients that tie control changes to line flows.
//!
//! ## Design Philosophy
//!
//! A [`SensitivityDataset`] is an immutable value built once and passed by
//! reference into the evaluator and optimizer in `pstmargin-algo`:
//!
//! - **Elements** live in arenas (`Vec`s) and are addressed by type-safe
//!   index ids ([`LineId`], [`PstId`], [`GenId`]) assigned at build time
//! - **Coefficients** are dense row-major matrices indexed by those ids, so
//!   every `(line, pst)` and `(line, gen)` pair has a defined value (zero when
//!   physically decoupled)
//! - **Validation** happens once in [`DatasetBuilder::build`]; downstream code
//!   never re-checks limits or bounds
//!
//! ## Quick Start
//!
//! ```rust
//! use pstmargin_core::DatasetBuilder;
//!
//! let dataset = DatasetBuilder::new()
//!     .line("L1", 90.0, 100.0)
//!     .line("L2", -30.0, 100.0)
//!     .phase_shifter("P1", 0, 5)
//!     .generator("G1", 100.0, 50.0, 150.0)
//!     .psdf("L1", "P1", -10.0)
//!     .psdf("L2", "P1", -10.0)
//!     .build()?;
//!
//! let l1 = dataset.line_id("L1").unwrap();
//! assert_eq!(dataset.line(l1).f_max, 100.0);
//! # Ok::<(), pstmargin_core::DatasetError>(())
//! ```
//!
//! ## Modules
//!
//! - [`dataset`] - Element types, coefficient matrices, builder
//! - [`error`] - Validation errors
//! - [`io`] - TOML/JSON dataset files
//! - [`synthetic`] - The built-in six-line study network

use serde::{Deserialize, Serialize};

pub mod dataset;
pub mod error;
pub mod io;
pub mod synthetic;

pub use dataset::{
    CoupledTapPair, DatasetBuilder, Generator, Line, PhaseShifter, SensitivityDataset,
    SensitivityMatrix,
};
pub use error::{DatasetError, DatasetIoError};
pub use io::{load_dataset, save_dataset, DatasetFile};

// Newtype wrappers for arena indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PstId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenId(usize);

impl LineId {
    #[inline]
    pub fn new(value: usize) -> Self {
        LineId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl PstId {
    #[inline]
    pub fn new(value: usize) -> Self {
        PstId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl GenId {
    #[inline]
    pub fn new(value: usize) -> Self {
        GenId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}
