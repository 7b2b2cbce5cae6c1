//! Persistence round trip and schema validation of the panel artifact.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use robot_panel::error::PanelError;
use robot_panel::panel::{ArtifactManifest, PanelArtifact, PanelRow, SCHEMA_VERSION};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("robot-panel-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample_row(country: &str, year: i32) -> PanelRow {
    PanelRow {
        country_code: country.to_string(),
        industry_code: "28".to_string(),
        nace_r2_code: "C28".to_string(),
        year,
        entity: format!("{country}_28"),
        year_int: year,
        ln_hours: Some(4.55),
        ln_robots: Some(1.2),
        ln_robots_lag1: Some(1.1),
        ln_va: Some(4.6),
        ln_cap: Some(3.9),
        ln_gdp: None,
        unemployment: Some(7.5),
        adjcov: Some(80.0),
        coord: Some(4.0),
        adjcov_centered: Some(2.5),
        high_coord: Some(1),
        high_robot_industry: 1,
        robot_wrkr_stock_95: Some(3.2),
        lab_qi: Some(94.7),
        va_pyp: Some(99.4),
        cap_qi: Some(49.2),
        gdp: Some(2000.0),
    }
}

fn sample_artifact() -> PanelArtifact {
    let rows = vec![sample_row("DE", 1995), sample_row("DE", 1996), sample_row("FR", 1995)];
    let mut sources = BTreeMap::new();
    sources.insert("ifr".to_string(), "fixture.csv".to_string());
    PanelArtifact {
        manifest: ArtifactManifest::new(rows.len(), sources),
        rows,
    }
}

#[test]
fn test_write_read_round_trip() {
    let dir = scratch_dir("round-trip");
    let csv_path = dir.join("cleaned_data.csv");
    let manifest_path = dir.join("cleaned_data.manifest.json");

    let artifact = sample_artifact();
    artifact.write(&csv_path, &manifest_path).unwrap();

    let restored = PanelArtifact::read(&csv_path, &manifest_path).unwrap();
    assert_eq!(restored.manifest.schema_version, SCHEMA_VERSION);
    assert_eq!(restored.rows.len(), 3);
    // everything except the deliberately unpersisted raw GDP level survives
    for (restored, mut original) in restored.rows.into_iter().zip(artifact.rows) {
        original.gdp = None;
        assert_eq!(restored, original);
    }
}

#[test]
fn test_unknown_schema_version_is_rejected() {
    let dir = scratch_dir("version");
    let csv_path = dir.join("cleaned_data.csv");
    let manifest_path = dir.join("cleaned_data.manifest.json");

    let artifact = sample_artifact();
    artifact.write(&csv_path, &manifest_path).unwrap();

    let tampered = fs::read_to_string(&manifest_path)
        .unwrap()
        .replace(
            &format!("\"schema_version\": {SCHEMA_VERSION}"),
            "\"schema_version\": 99",
        );
    fs::write(&manifest_path, tampered).unwrap();

    let error = PanelArtifact::read(&csv_path, &manifest_path).unwrap_err();
    match error {
        PanelError::SchemaMismatch { detail, .. } => {
            assert!(detail.contains("schema version 99"), "{detail}");
        }
        other => panic!("expected schema mismatch, got {other}"),
    }
}

#[test]
fn test_missing_declared_column_is_rejected() {
    let dir = scratch_dir("columns");
    let csv_path = dir.join("cleaned_data.csv");
    let manifest_path = dir.join("cleaned_data.manifest.json");

    let artifact = sample_artifact();
    artifact.write(&csv_path, &manifest_path).unwrap();

    let tampered = fs::read_to_string(&manifest_path)
        .unwrap()
        .replace("\"adjcov_centered\",", "");
    fs::write(&manifest_path, tampered).unwrap();

    let error = PanelArtifact::read(&csv_path, &manifest_path).unwrap_err();
    match error {
        PanelError::SchemaMismatch { detail, .. } => {
            assert!(detail.contains("adjcov_centered"), "{detail}");
        }
        other => panic!("expected schema mismatch, got {other}"),
    }
}

#[test]
fn test_row_count_disagreement_is_rejected() {
    let dir = scratch_dir("rows");
    let csv_path = dir.join("cleaned_data.csv");
    let manifest_path = dir.join("cleaned_data.manifest.json");

    let mut artifact = sample_artifact();
    artifact.manifest.n_rows = 7;
    artifact.write(&csv_path, &manifest_path).unwrap();

    let error = PanelArtifact::read(&csv_path, &manifest_path).unwrap_err();
    match error {
        PanelError::SchemaMismatch { detail, .. } => {
            assert!(detail.contains("row count"), "{detail}");
        }
        other => panic!("expected schema mismatch, got {other}"),
    }
}
