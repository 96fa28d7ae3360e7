//! Built-in synthetic study network.
//!
//! Six monitored lines, three phase shifters (P2 and P3 ganged) and three
//! dispatchable generators. Lines L1, L3 and L5 start within 35 MW of their
//! thermal limits, so the base case has a tight worst-case margin that the
//! optimizer can widen by shifting taps and redistributing generation.
//!
//! ```text
//! line  F_ref   F_max   margin
//! L1    420.0   450.0    30.0
//! L2   -310.0   400.0    90.0
//! L3    265.0   300.0    35.0
//! L4   -180.0   250.0    70.0
//! L5    390.0   420.0    30.0
//! L6    150.0   300.0   150.0
//! ```

use crate::dataset::{DatasetBuilder, SensitivityDataset};

pub const LINES: [(&str, f64, f64); 6] = [
    ("L1", 420.0, 450.0),
    ("L2", -310.0, 400.0),
    ("L3", 265.0, 300.0),
    ("L4", -180.0, 250.0),
    ("L5", 390.0, 420.0),
    ("L6", 150.0, 300.0),
];

/// (name, t_init, t_range)
pub const PHASE_SHIFTERS: [(&str, i32, u32); 3] = [("P1", 0, 10), ("P2", 2, 8), ("P3", 2, 8)];

/// (name, g_init, g_min, g_max)
pub const GENERATORS: [(&str, f64, f64, f64); 3] = [
    ("G1", 300.0, 150.0, 450.0),
    ("G2", 250.0, 100.0, 400.0),
    ("G3", 200.0, 80.0, 320.0),
];

pub const COUPLED_TAPS: [(&str, &str); 1] = [("P2", "P3")];

/// PSDF rows in line order, columns P1..P3 (MW per tap step)
const PSDF: [[f64; 3]; 6] = [
    [-6.0, 0.0, 1.5],
    [4.0, -3.0, 0.0],
    [0.0, -5.0, -2.0],
    [1.0, 3.5, 0.0],
    [-2.5, 0.0, -4.5],
    [2.0, 1.0, 1.0],
];

/// PTDF rows in line order, columns G1..G3 (MW per MW)
const PTDF: [[f64; 3]; 6] = [
    [0.35, -0.10, 0.05],
    [-0.20, 0.30, -0.05],
    [0.15, 0.05, -0.25],
    [-0.05, -0.20, 0.10],
    [0.25, 0.10, -0.30],
    [0.05, -0.15, 0.20],
];

/// Build the synthetic dataset.
///
/// The tables above are constant and pass every `build()` check, so this
/// cannot fail; `test_synthetic_builder_validates` pins that.
pub fn dataset() -> SensitivityDataset {
    builder()
        .build()
        .unwrap_or_else(|err| unreachable!("synthetic dataset is valid: {err}"))
}

/// Builder pre-populated with the synthetic dataset, for tests that tweak it.
pub fn builder() -> DatasetBuilder {
    let mut builder = DatasetBuilder::new().name("synthetic-6l3p3g");

    for (name, f_ref, f_max) in LINES {
        builder = builder.line(name, f_ref, f_max);
    }
    for (name, t_init, t_range) in PHASE_SHIFTERS {
        builder = builder.phase_shifter(name, t_init, t_range);
    }
    for (name, g_init, g_min, g_max) in GENERATORS {
        builder = builder.generator(name, g_init, g_min, g_max);
    }

    for (row, (line, _, _)) in LINES.iter().enumerate() {
        for (col, (pst, _, _)) in PHASE_SHIFTERS.iter().enumerate() {
            if PSDF[row][col] != 0.0 {
                builder = builder.psdf(*line, *pst, PSDF[row][col]);
            }
        }
        for (col, (gen, _, _, _)) in GENERATORS.iter().enumerate() {
            if PTDF[row][col] != 0.0 {
                builder = builder.ptdf(*line, *gen, PTDF[row][col]);
            }
        }
    }

    for (a, b) in COUPLED_TAPS {
        builder = builder.couple(a, b);
    }

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_builder_validates() {
        assert!(builder().build().is_ok());
    }

    #[test]
    fn test_synthetic_shape() {
        let ds = dataset();
        assert_eq!(ds.num_lines(), 6);
        assert_eq!(ds.num_phase_shifters(), 3);
        assert_eq!(ds.num_generators(), 3);
        assert_eq!(ds.coupled_taps().len(), 1);
    }

    #[test]
    fn test_synthetic_coefficients_match_tables() {
        let ds = dataset();
        let l5 = ds.line_id("L5").unwrap();
        assert_eq!(ds.psdf(l5, ds.pst_id("P3").unwrap()), -4.5);
        assert_eq!(ds.ptdf(l5, ds.gen_id("G3").unwrap()), -0.30);
        assert_eq!(ds.psdf(l5, ds.pst_id("P2").unwrap()), 0.0);
    }

    #[test]
    fn test_synthetic_reference_margins() {
        let ds = dataset();
        let margins: Vec<f64> = ds.lines().iter().map(|l| l.reference_margin()).collect();
        assert_eq!(margins, vec![30.0, 90.0, 35.0, 70.0, 30.0, 150.0]);
    }
}
