//! Error types for dataset construction and dataset files.
//!
//! [`DatasetError`] covers structural and numeric validation performed by
//! [`crate::DatasetBuilder::build`]. [`DatasetIoError`] wraps it together with
//! the I/O and format errors raised while reading or writing dataset files.

use std::path::PathBuf;
use thiserror::Error;

/// Validation failures raised while building a [`crate::SensitivityDataset`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// A dataset needs at least one monitored line.
    #[error("Dataset must contain at least one line")]
    NoLines,

    /// Two elements of the same kind share a name.
    #[error("Duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("Unknown line '{0}'")]
    UnknownLine(String),

    #[error("Unknown phase shifter '{0}'")]
    UnknownPhaseShifter(String),

    #[error("Unknown generator '{0}'")]
    UnknownGenerator(String),

    /// Thermal limits must be strictly positive.
    #[error("Line '{line}' has non-positive thermal limit {f_max} MW")]
    NonPositiveLimit { line: String, f_max: f64 },

    /// Generator bounds must bracket the initial output.
    #[error(
        "Generator '{name}' violates g_min <= g_init <= g_max ({g_min} <= {g_init} <= {g_max})"
    )]
    InvalidGeneratorBounds {
        name: String,
        g_init: f64,
        g_min: f64,
        g_max: f64,
    },

    /// A numeric field is NaN or infinite.
    #[error("Non-finite value for {field}")]
    NonFinite { field: String },

    /// Tap ranges must fit the signed tap positions.
    #[error("Phase shifter '{name}' tap range {t_range} exceeds {max}", max = i32::MAX)]
    TapRangeTooLarge { name: String, t_range: u32 },

    #[error("Phase shifter '{0}' cannot be coupled with itself")]
    SelfCoupling(String),
}

/// Errors from loading or saving dataset files.
#[derive(Error, Debug)]
pub enum DatasetIoError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Only `.toml` and `.json` files are understood.
    #[error("Unsupported dataset format for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::NonPositiveLimit {
            line: "L4".into(),
            f_max: 0.0,
        };
        assert!(err.to_string().contains("L4"));
        assert!(err.to_string().contains("non-positive"));
    }

    #[test]
    fn test_dataset_error_conversion() {
        let io_err: DatasetIoError = DatasetError::NoLines.into();
        assert!(matches!(io_err, DatasetIoError::Dataset(DatasetError::NoLines)));
        assert_eq!(
            io_err.to_string(),
            "Dataset must contain at least one line"
        );
    }
}
