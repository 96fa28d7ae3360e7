//! Sensitivity dataset: elements, coefficient matrices and builder.
//!
//! ## Linear flow model
//!
//! Every monitored line carries a reference flow `F_ref` observed at the
//! initial control setting. Control changes shift that flow linearly:
//!
//! ```text
//! flow(l) = F_ref[l] + Σ_p PSDF[l,p]·(tap[p] − t_init[p])
//!                    + Σ_g PTDF[l,g]·(gen[g] − G_init[g])
//! ```
//!
//! The dataset stores the inputs of this expression; the evaluator and the
//! optimizer in `pstmargin-algo` both derive flows from it.

use crate::error::DatasetError;
use crate::{GenId, LineId, PstId};
use std::collections::HashMap;

/// A monitored transmission line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub name: String,
    /// Flow at the initial control setting (MW, signed)
    pub f_ref: f64,
    /// Thermal limit (MW, strictly positive)
    pub f_max: f64,
}

impl Line {
    /// Margin at the reference flow: `F_max − |F_ref|`.
    pub fn reference_margin(&self) -> f64 {
        self.f_max - self.f_ref.abs()
    }
}

/// A phase-shifting transformer with a discrete tap changer.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseShifter {
    pub name: String,
    /// Tap position at the reference operating point
    pub t_init: i32,
    /// Symmetric tap range
    pub t_range: u32,
}

impl PhaseShifter {
    /// Tap bounds imposed on the optimizer: `[−t_range, t_range]`.
    ///
    /// Note that the box is centered at zero, not at `t_init`. A PST whose
    /// initial tap lies outside `[−t_range, t_range]` cannot return to its
    /// initial position during optimization. This mirrors the study model
    /// literally and is covered by tests; do not re-center it silently.
    ///
    /// Ranges above `i32::MAX` are rejected by [`DatasetBuilder::build`];
    /// a hand-built value saturates instead of wrapping.
    pub fn tap_bounds(&self) -> (i32, i32) {
        let range = i32::try_from(self.t_range).unwrap_or(i32::MAX);
        (-range, range)
    }
}

/// A dispatchable generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub name: String,
    /// Output at the reference operating point (MW)
    pub g_init: f64,
    /// Minimum output (MW)
    pub g_min: f64,
    /// Maximum output (MW)
    pub g_max: f64,
}

/// Two phase shifters that are mechanically ganged and must share a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoupledTapPair {
    pub a: PstId,
    pub b: PstId,
}

/// Dense row-major coefficient matrix (rows = lines, columns = controls).
///
/// Dense storage is used because every line is typically sensitive to every
/// control to some degree, and the matrices are small.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityMatrix {
    n_cols: usize,
    values: Vec<Vec<f64>>,
}

impl SensitivityMatrix {
    /// All-zero matrix of the given shape.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_cols,
            values: vec![vec![0.0; n_cols]; n_rows],
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row][col] = value;
    }

    /// Coefficients of one line against every control.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row]
    }

    pub fn num_rows(&self) -> usize {
        self.values.len()
    }

    pub fn num_cols(&self) -> usize {
        self.n_cols
    }

    /// Iterate `(row, col, value)` over nonzero entries.
    pub fn nonzeros(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.values.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| **v != 0.0)
                .map(move |(c, v)| (r, c, *v))
        })
    }
}

/// Immutable study dataset.
///
/// Constructed through [`DatasetBuilder`]; every invariant (positive limits,
/// bracketed generator bounds, resolved references) holds for the lifetime of
/// the value.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityDataset {
    name: String,
    lines: Vec<Line>,
    psts: Vec<PhaseShifter>,
    gens: Vec<Generator>,
    /// PSDF[line][pst] (MW per tap step)
    psdf: SensitivityMatrix,
    /// PTDF[line][gen] (MW per MW)
    ptdf: SensitivityMatrix,
    coupled: Vec<CoupledTapPair>,
    line_index: HashMap<String, LineId>,
    pst_index: HashMap<String, PstId>,
    gen_index: HashMap<String, GenId>,
}

impl SensitivityDataset {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn phase_shifters(&self) -> &[PhaseShifter] {
        &self.psts
    }

    pub fn generators(&self) -> &[Generator] {
        &self.gens
    }

    pub fn coupled_taps(&self) -> &[CoupledTapPair] {
        &self.coupled
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn num_phase_shifters(&self) -> usize {
        self.psts.len()
    }

    pub fn num_generators(&self) -> usize {
        self.gens.len()
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.value()]
    }

    pub fn pst(&self, id: PstId) -> &PhaseShifter {
        &self.psts[id.value()]
    }

    pub fn generator(&self, id: GenId) -> &Generator {
        &self.gens[id.value()]
    }

    pub fn line_ids(&self) -> impl Iterator<Item = LineId> {
        (0..self.lines.len()).map(LineId::new)
    }

    pub fn pst_ids(&self) -> impl Iterator<Item = PstId> {
        (0..self.psts.len()).map(PstId::new)
    }

    pub fn gen_ids(&self) -> impl Iterator<Item = GenId> {
        (0..self.gens.len()).map(GenId::new)
    }

    pub fn line_id(&self, name: &str) -> Option<LineId> {
        self.line_index.get(name).copied()
    }

    pub fn pst_id(&self, name: &str) -> Option<PstId> {
        self.pst_index.get(name).copied()
    }

    pub fn gen_id(&self, name: &str) -> Option<GenId> {
        self.gen_index.get(name).copied()
    }

    /// Flow sensitivity of `line` to one tap step of `pst`.
    #[inline]
    pub fn psdf(&self, line: LineId, pst: PstId) -> f64 {
        self.psdf.get(line.value(), pst.value())
    }

    /// Flow sensitivity of `line` to one MW of output at `gen`.
    #[inline]
    pub fn ptdf(&self, line: LineId, gen: GenId) -> f64 {
        self.ptdf.get(line.value(), gen.value())
    }

    pub fn psdf_matrix(&self) -> &SensitivityMatrix {
        &self.psdf
    }

    pub fn ptdf_matrix(&self) -> &SensitivityMatrix {
        &self.ptdf
    }

    /// Copy of this dataset with one thermal limit replaced.
    pub fn with_line_limit(&self, line: LineId, f_max: f64) -> Result<Self, DatasetError> {
        let name = self.line(line).name.clone();
        if !f_max.is_finite() {
            return Err(DatasetError::NonFinite {
                field: format!("line '{}' f_max", name),
            });
        }
        if f_max <= 0.0 {
            return Err(DatasetError::NonPositiveLimit { line: name, f_max });
        }
        let mut copy = self.clone();
        copy.lines[line.value()].f_max = f_max;
        Ok(copy)
    }
}

/// Builder for constructing validated datasets.
///
/// Coefficients and couplings reference elements by name; names are resolved
/// in [`DatasetBuilder::build`], so elements may be declared in any order.
/// Coefficients that are never set default to zero. Setting the same
/// coefficient twice keeps the last value.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    name: Option<String>,
    lines: Vec<Line>,
    psts: Vec<PhaseShifter>,
    gens: Vec<Generator>,
    psdf: Vec<(String, String, f64)>,
    ptdf: Vec<(String, String, f64)>,
    couplings: Vec<(String, String)>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a human-readable dataset label
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a monitored line
    pub fn line(mut self, name: impl Into<String>, f_ref: f64, f_max: f64) -> Self {
        self.lines.push(Line {
            name: name.into(),
            f_ref,
            f_max,
        });
        self
    }

    /// Add a phase shifter
    pub fn phase_shifter(mut self, name: impl Into<String>, t_init: i32, t_range: u32) -> Self {
        self.psts.push(PhaseShifter {
            name: name.into(),
            t_init,
            t_range,
        });
        self
    }

    /// Add a generator
    pub fn generator(
        mut self,
        name: impl Into<String>,
        g_init: f64,
        g_min: f64,
        g_max: f64,
    ) -> Self {
        self.gens.push(Generator {
            name: name.into(),
            g_init,
            g_min,
            g_max,
        });
        self
    }

    /// Set PSDF[line, pst]
    pub fn psdf(mut self, line: impl Into<String>, pst: impl Into<String>, value: f64) -> Self {
        self.psdf.push((line.into(), pst.into(), value));
        self
    }

    /// Set PTDF[line, gen]
    pub fn ptdf(mut self, line: impl Into<String>, gen: impl Into<String>, value: f64) -> Self {
        self.ptdf.push((line.into(), gen.into(), value));
        self
    }

    /// Gang two phase shifters together
    pub fn couple(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.couplings.push((a.into(), b.into()));
        self
    }

    /// Validate and build the dataset
    pub fn build(self) -> Result<SensitivityDataset, DatasetError> {
        if self.lines.is_empty() {
            return Err(DatasetError::NoLines);
        }

        let line_index = index_names(
            "line",
            self.lines.iter().map(|l| l.name.as_str()),
            LineId::new,
        )?;
        let pst_index = index_names(
            "phase shifter",
            self.psts.iter().map(|p| p.name.as_str()),
            PstId::new,
        )?;
        let gen_index = index_names(
            "generator",
            self.gens.iter().map(|g| g.name.as_str()),
            GenId::new,
        )?;

        for line in &self.lines {
            check_finite(line.f_ref, || format!("line '{}' f_ref", line.name))?;
            check_finite(line.f_max, || format!("line '{}' f_max", line.name))?;
            if line.f_max <= 0.0 {
                return Err(DatasetError::NonPositiveLimit {
                    line: line.name.clone(),
                    f_max: line.f_max,
                });
            }
        }

        for pst in &self.psts {
            if i32::try_from(pst.t_range).is_err() {
                return Err(DatasetError::TapRangeTooLarge {
                    name: pst.name.clone(),
                    t_range: pst.t_range,
                });
            }
        }

        for gen in &self.gens {
            check_finite(gen.g_init, || format!("generator '{}' g_init", gen.name))?;
            check_finite(gen.g_min, || format!("generator '{}' g_min", gen.name))?;
            check_finite(gen.g_max, || format!("generator '{}' g_max", gen.name))?;
            if !(gen.g_min <= gen.g_init && gen.g_init <= gen.g_max) {
                return Err(DatasetError::InvalidGeneratorBounds {
                    name: gen.name.clone(),
                    g_init: gen.g_init,
                    g_min: gen.g_min,
                    g_max: gen.g_max,
                });
            }
        }

        let mut psdf = SensitivityMatrix::zeros(self.lines.len(), self.psts.len());
        for (line, pst, value) in &self.psdf {
            let l = resolve_line(&line_index, line)?;
            let p = pst_index
                .get(pst)
                .copied()
                .ok_or_else(|| DatasetError::UnknownPhaseShifter(pst.clone()))?;
            check_finite(*value, || format!("PSDF[{}, {}]", line, pst))?;
            psdf.set(l.value(), p.value(), *value);
        }

        let mut ptdf = SensitivityMatrix::zeros(self.lines.len(), self.gens.len());
        for (line, gen, value) in &self.ptdf {
            let l = resolve_line(&line_index, line)?;
            let g = gen_index
                .get(gen)
                .copied()
                .ok_or_else(|| DatasetError::UnknownGenerator(gen.clone()))?;
            check_finite(*value, || format!("PTDF[{}, {}]", line, gen))?;
            ptdf.set(l.value(), g.value(), *value);
        }

        let mut coupled = Vec::with_capacity(self.couplings.len());
        for (a, b) in &self.couplings {
            if a == b {
                return Err(DatasetError::SelfCoupling(a.clone()));
            }
            let a_id = pst_index
                .get(a)
                .copied()
                .ok_or_else(|| DatasetError::UnknownPhaseShifter(a.clone()))?;
            let b_id = pst_index
                .get(b)
                .copied()
                .ok_or_else(|| DatasetError::UnknownPhaseShifter(b.clone()))?;
            coupled.push(CoupledTapPair { a: a_id, b: b_id });
        }

        Ok(SensitivityDataset {
            name: self.name.unwrap_or_else(|| "unnamed".to_string()),
            lines: self.lines,
            psts: self.psts,
            gens: self.gens,
            psdf,
            ptdf,
            coupled,
            line_index,
            pst_index,
            gen_index,
        })
    }
}

fn index_names<'a, Id>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
    make_id: fn(usize) -> Id,
) -> Result<HashMap<String, Id>, DatasetError> {
    let mut index = HashMap::new();
    for (i, name) in names.enumerate() {
        if index.insert(name.to_string(), make_id(i)).is_some() {
            return Err(DatasetError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(index)
}

fn resolve_line(index: &HashMap<String, LineId>, name: &str) -> Result<LineId, DatasetError> {
    index
        .get(name)
        .copied()
        .ok_or_else(|| DatasetError::UnknownLine(name.to_string()))
}

fn check_finite(value: f64, field: impl FnOnce() -> String) -> Result<(), DatasetError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DatasetError::NonFinite { field: field() })
    }
}
