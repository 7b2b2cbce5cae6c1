//! The versioned panel artifact.
//!
//! Downstream estimation stages used to assume a particular file existed
//! with particular columns. The artifact makes that contract explicit: the
//! panel CSV travels with a JSON manifest declaring schema version, column
//! list, and the resolved source files, and every consumer validates the
//! manifest before touching the data.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result};
use crate::panel::row::PanelRow;

/// Bumped whenever the column set or semantics change
pub const SCHEMA_VERSION: u32 = 1;

/// Column order of the persisted panel, matching [`PanelRow`] field order
pub const COLUMNS: [&str; 22] = [
    "country_code",
    "industry_code",
    "nace_r2_code",
    "year",
    "entity",
    "year_int",
    "ln_hours",
    "ln_robots",
    "ln_robots_lag1",
    "ln_va",
    "ln_cap",
    "ln_gdp",
    "unemployment",
    "adjcov",
    "coord",
    "adjcov_centered",
    "high_coord",
    "high_robot_industry",
    "robot_wrkr_stock_95",
    "LAB_QI",
    "VA_PYP",
    "CAP_QI",
];

/// Machine-readable description of one persisted panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub schema_version: u32,
    pub columns: Vec<String>,
    pub n_rows: usize,
    /// Source name → resolved path or absence reason, as recorded at
    /// assembly time
    pub sources: BTreeMap<String, String>,
}

impl ArtifactManifest {
    #[must_use]
    pub fn new(n_rows: usize, sources: BTreeMap<String, String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            columns: COLUMNS.iter().map(ToString::to_string).collect(),
            n_rows,
            sources,
        }
    }

    /// Validate this manifest against the schema a consumer expects
    pub fn validate(&self, path: &Path) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(PanelError::SchemaMismatch {
                path: path.to_path_buf(),
                detail: format!(
                    "schema version {} (expected {SCHEMA_VERSION})",
                    self.schema_version
                ),
            });
        }
        for required in COLUMNS {
            if !self.columns.iter().any(|c| c == required) {
                return Err(PanelError::SchemaMismatch {
                    path: path.to_path_buf(),
                    detail: format!("missing column '{required}'"),
                });
            }
        }
        Ok(())
    }
}

/// The assembled panel plus its manifest
#[derive(Debug)]
pub struct PanelArtifact {
    pub rows: Vec<PanelRow>,
    pub manifest: ArtifactManifest,
}

impl PanelArtifact {
    /// Write the panel CSV and its manifest sidecar
    pub fn write(&self, csv_path: &Path, manifest_path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(csv_path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(PanelError::from)?;

        let manifest_json = serde_json::to_string_pretty(&self.manifest)?;
        fs::write(manifest_path, manifest_json)?;
        log::info!(
            "Saved {} rows to {} (manifest: {})",
            self.rows.len(),
            csv_path.display(),
            manifest_path.display()
        );
        Ok(())
    }

    /// Read and validate a persisted artifact. Fails with
    /// [`PanelError::SchemaMismatch`] rather than guessing at shapes.
    pub fn read(csv_path: &Path, manifest_path: &Path) -> Result<Self> {
        let manifest_json = fs::read_to_string(manifest_path).map_err(|e| {
            PanelError::SchemaMismatch {
                path: manifest_path.to_path_buf(),
                detail: format!("manifest unreadable: {e}"),
            }
        })?;
        let manifest: ArtifactManifest = serde_json::from_str(&manifest_json)?;
        manifest.validate(manifest_path)?;

        let mut reader = csv::Reader::from_path(csv_path)?;
        let mut rows = Vec::with_capacity(manifest.n_rows);
        for row in reader.deserialize::<PanelRow>() {
            rows.push(row?);
        }
        if rows.len() != manifest.n_rows {
            return Err(PanelError::SchemaMismatch {
                path: csv_path.to_path_buf(),
                detail: format!(
                    "row count {} disagrees with manifest ({})",
                    rows.len(),
                    manifest.n_rows
                ),
            });
        }
        Ok(Self { rows, manifest })
    }

    #[must_use]
    pub fn paths_from(base: &crate::config::SourcePaths) -> (PathBuf, PathBuf) {
        (base.cleaned_data(), base.cleaned_manifest())
    }
}
