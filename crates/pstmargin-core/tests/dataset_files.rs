//! Dataset file loading tests

use pstmargin_core::{load_dataset, save_dataset, synthetic, DatasetError, DatasetIoError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_and_reload_synthetic_toml() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("synthetic.toml");
    let original = synthetic::dataset();

    save_dataset(&original, &path).expect("writing TOML dataset");
    let reloaded = load_dataset(&path).expect("reading TOML dataset");

    assert_eq!(reloaded, original);
}

#[test]
fn test_load_json_dataset() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("two_line.json");
    fs::write(
        &path,
        r#"{
            "name": "two-line",
            "lines": [
                {"name": "A", "f_ref": 90.0, "f_max": 100.0},
                {"name": "B", "f_ref": -30.0, "f_max": 100.0}
            ],
            "phase_shifters": [{"name": "P", "t_init": 0, "t_range": 5}],
            "generators": [{"name": "G", "g_init": 100.0, "g_min": 50.0, "g_max": 150.0}],
            "psdf": [
                {"line": "A", "pst": "P", "value": -10.0},
                {"line": "B", "pst": "P", "value": -10.0}
            ]
        }"#,
    )
    .unwrap();

    let ds = load_dataset(&path).expect("reading JSON dataset");
    assert_eq!(ds.name(), "two-line");
    let b = ds.line_id("B").unwrap();
    assert_eq!(ds.psdf(b, ds.pst_id("P").unwrap()), -10.0);
    assert_eq!(ds.ptdf(b, ds.gen_id("G").unwrap()), 0.0);
}

#[test]
fn test_invalid_dataset_file_reports_validation_error() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("bad.toml");
    fs::write(
        &path,
        r#"
        [[lines]]
        name = "L1"
        f_ref = 10.0
        f_max = -5.0
        "#,
    )
    .unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(
        err,
        DatasetIoError::Dataset(DatasetError::NonPositiveLimit { .. })
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let tmp = tempdir().unwrap();
    let err = load_dataset(&tmp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, DatasetIoError::Io { .. }));
}
