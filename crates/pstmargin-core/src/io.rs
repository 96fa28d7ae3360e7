//! Dataset files (TOML or JSON).
//!
//! The on-disk layout lists elements as tables and coefficients as sparse
//! entries; any coefficient that is not listed is zero.
//!
//! ```toml
//! name = "two-line"
//! coupled_taps = [["P2", "P3"]]
//!
//! [[lines]]
//! name = "L1"
//! f_ref = 90.0
//! f_max = 100.0
//!
//! [[phase_shifters]]
//! name = "P1"
//! t_init = 0
//! t_range = 5
//!
//! [[generators]]
//! name = "G1"
//! g_init = 100.0
//! g_min = 50.0
//! g_max = 150.0
//!
//! [[psdf]]
//! line = "L1"
//! pst = "P1"
//! value = -10.0
//!
//! [[ptdf]]
//! line = "L1"
//! gen = "G1"
//! value = 0.5
//! ```

use crate::dataset::{DatasetBuilder, SensitivityDataset};
use crate::error::DatasetIoError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub name: String,
    pub f_ref: f64,
    pub f_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseShifterRecord {
    pub name: String,
    pub t_init: i32,
    pub t_range: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorRecord {
    pub name: String,
    pub g_init: f64,
    pub g_min: f64,
    pub g_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsdfEntry {
    pub line: String,
    pub pst: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtdfEntry {
    pub line: String,
    pub gen: String,
    pub value: f64,
}

/// Serialized form of a [`SensitivityDataset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub coupled_taps: Vec<(String, String)>,
    pub lines: Vec<LineRecord>,
    #[serde(default)]
    pub phase_shifters: Vec<PhaseShifterRecord>,
    #[serde(default)]
    pub generators: Vec<GeneratorRecord>,
    #[serde(default)]
    pub psdf: Vec<PsdfEntry>,
    #[serde(default)]
    pub ptdf: Vec<PtdfEntry>,
}

impl DatasetFile {
    /// Capture a dataset, omitting zero coefficients.
    pub fn from_dataset(dataset: &SensitivityDataset) -> Self {
        let line_name = |row: usize| dataset.lines()[row].name.clone();

        Self {
            name: Some(dataset.name().to_string()),
            coupled_taps: dataset
                .coupled_taps()
                .iter()
                .map(|pair| {
                    (
                        dataset.pst(pair.a).name.clone(),
                        dataset.pst(pair.b).name.clone(),
                    )
                })
                .collect(),
            lines: dataset
                .lines()
                .iter()
                .map(|l| LineRecord {
                    name: l.name.clone(),
                    f_ref: l.f_ref,
                    f_max: l.f_max,
                })
                .collect(),
            phase_shifters: dataset
                .phase_shifters()
                .iter()
                .map(|p| PhaseShifterRecord {
                    name: p.name.clone(),
                    t_init: p.t_init,
                    t_range: p.t_range,
                })
                .collect(),
            generators: dataset
                .generators()
                .iter()
                .map(|g| GeneratorRecord {
                    name: g.name.clone(),
                    g_init: g.g_init,
                    g_min: g.g_min,
                    g_max: g.g_max,
                })
                .collect(),
            psdf: dataset
                .psdf_matrix()
                .nonzeros()
                .map(|(row, col, value)| PsdfEntry {
                    line: line_name(row),
                    pst: dataset.phase_shifters()[col].name.clone(),
                    value,
                })
                .collect(),
            ptdf: dataset
                .ptdf_matrix()
                .nonzeros()
                .map(|(row, col, value)| PtdfEntry {
                    line: line_name(row),
                    gen: dataset.generators()[col].name.clone(),
                    value,
                })
                .collect(),
        }
    }

    /// Validate into a dataset.
    pub fn into_dataset(self) -> Result<SensitivityDataset, DatasetIoError> {
        let mut builder = DatasetBuilder::new();
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        for l in self.lines {
            builder = builder.line(l.name, l.f_ref, l.f_max);
        }
        for p in self.phase_shifters {
            builder = builder.phase_shifter(p.name, p.t_init, p.t_range);
        }
        for g in self.generators {
            builder = builder.generator(g.name, g.g_init, g.g_min, g.g_max);
        }
        for e in self.psdf {
            builder = builder.psdf(e.line, e.pst, e.value);
        }
        for e in self.ptdf {
            builder = builder.ptdf(e.line, e.gen, e.value);
        }
        for (a, b) in self.coupled_taps {
            builder = builder.couple(a, b);
        }
        Ok(builder.build()?)
    }
}

enum Format {
    Toml,
    Json,
}

fn format_of(path: &Path) -> Result<Format, DatasetIoError> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DatasetIoError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load and validate a dataset from a `.toml` or `.json` file.
pub fn load_dataset(path: &Path) -> Result<SensitivityDataset, DatasetIoError> {
    let format = format_of(path)?;
    let text = fs::read_to_string(path).map_err(|source| DatasetIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: DatasetFile = match format {
        Format::Toml => toml::from_str(&text)?,
        Format::Json => serde_json::from_str(&text)?,
    };
    let dataset = file.into_dataset()?;
    tracing::debug!(
        path = %path.display(),
        lines = dataset.num_lines(),
        psts = dataset.num_phase_shifters(),
        gens = dataset.num_generators(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Write a dataset to a `.toml` or `.json` file.
pub fn save_dataset(dataset: &SensitivityDataset, path: &Path) -> Result<(), DatasetIoError> {
    let file = DatasetFile::from_dataset(dataset);
    let text = match format_of(path)? {
        Format::Toml => toml::to_string_pretty(&file)?,
        Format::Json => serde_json::to_string_pretty(&file)?,
    };
    fs::write(path, text).map_err(|source| DatasetIoError::Io {
        path: path.to_path_buf(),
        source,
    })
}
