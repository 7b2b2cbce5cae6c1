//! Configuration for the panel pipeline.
//!
//! Everything that was ambient module-level state in earlier versions of the
//! study (hardcoded paths, baseline windows, thresholds) lives in explicit
//! config values constructed once and passed into each stage.

use std::path::{Path, PathBuf};

/// Canonical spelling used for Greece in the assembled panel.
///
/// KLEMS-family sources code Greece as `EL`, institutional sources as `GRC`,
/// and Eurostat extractions vary between `EL` and `GR`. Both two-letter forms
/// are accepted on input; exactly one is emitted per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreeceSpelling {
    /// Eurostat/KLEMS convention (`EL`)
    El,
    /// ISO 3166 convention (`GR`)
    Gr,
}

impl GreeceSpelling {
    /// The two-letter code written into canonical keys
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::El => "EL",
            Self::Gr => "GR",
        }
    }
}

/// Thresholds for the per-subgroup usability gate
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Minimum number of distinct countries in a subgroup
    pub min_countries: usize,
    /// Minimum number of observations in a subgroup
    pub min_obs: usize,
    /// Minimum standard deviation of the moderator within a subgroup
    pub min_moderator_sd: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_countries: 5,
            min_obs: 50,
            min_moderator_sd: 1e-10,
        }
    }
}

/// Configuration for panel assembly and variable derivation
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// First year of the target panel window
    pub year_min: i32,
    /// Last year of the target panel window
    pub year_max: i32,
    /// Earliest year loaded from the treatment source so that lags are
    /// defined at `year_min`
    pub lag_preload_from: i32,
    /// Canonical spelling for Greece
    pub greece: GreeceSpelling,
    /// Inclusive year window for the time-invariant institutional baseline.
    /// The original cleaning script and its data check disagree (1990–1995
    /// vs. 1993–1995); 1990–1995 is the documented default for coverage.
    pub baseline_window: (i32, i32),
    /// Floor applied before taking logs of level variables
    pub log_floor: f64,
    /// Coordination-index cutoff for the `high_coord` indicator
    pub coord_high_threshold: f64,
    /// Usability gate thresholds
    pub gate: GateConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            year_min: 1995,
            year_max: 2019,
            lag_preload_from: 1993,
            greece: GreeceSpelling::El,
            baseline_window: (1990, 1995),
            log_floor: 0.1,
            coord_high_threshold: 4.0,
            gate: GateConfig::default(),
        }
    }
}

impl PanelConfig {
    /// All years of the target window, ascending
    #[must_use]
    pub fn target_years(&self) -> Vec<i32> {
        (self.year_min..=self.year_max).collect()
    }
}

/// Locations of the raw sources and pipeline outputs.
///
/// Each source carries an ordered list of candidate filenames tried in
/// sequence; the resolved path is recorded in the run's diagnostics rather
/// than hidden in control flow. The Eurostat GDP extraction historically
/// shipped under a misspelled name, hence its two candidates.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    /// Directory holding the raw source files
    pub data_dir: PathBuf,
    /// Directory for estimation outputs
    pub output_dir: PathBuf,
}

impl SourcePaths {
    /// Create source paths rooted at a data directory and an output directory
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Candidate filenames for the IFR robot-stock source (required)
    #[must_use]
    pub fn ifr_candidates(&self) -> Vec<PathBuf> {
        self.join_all(&["IFR_karol.csv"])
    }

    /// Candidate filenames for the KLEMS growth-accounts source (required)
    #[must_use]
    pub fn klems_candidates(&self) -> Vec<PathBuf> {
        self.join_all(&["klems_growth_accounts_basic.csv"])
    }

    /// Candidate filenames for the ICTWSS institutions source (optional)
    #[must_use]
    pub fn ictwss_candidates(&self) -> Vec<PathBuf> {
        self.join_all(&["ictwss_institutions.csv"])
    }

    /// Candidate filenames for Eurostat GDP (optional; typo variant first)
    #[must_use]
    pub fn gdp_candidates(&self) -> Vec<PathBuf> {
        self.join_all(&[
            "eurostata_gdp_nama_10_gdp.csv",
            "eurostat_gdp_nama_10_gdp.csv",
        ])
    }

    /// Candidate filenames for Eurostat unemployment (optional)
    #[must_use]
    pub fn unemployment_candidates(&self) -> Vec<PathBuf> {
        self.join_all(&["eurostat_employment_une_rt_a.csv"])
    }

    /// Candidate filenames for the industry automation weights (optional)
    #[must_use]
    pub fn weights_candidates(&self) -> Vec<PathBuf> {
        self.join_all(&["GM_industry_automation_weights_1980.csv"])
    }

    /// Candidate filenames for the ind1990 → NACE2 crosswalk (optional)
    #[must_use]
    pub fn ind1990_crosswalk_candidates(&self) -> Vec<PathBuf> {
        self.join_all(&["ind1990_to_nace2.csv"])
    }

    /// Candidate filenames for the wide country × year robot-stock table
    /// used by the shift-share exposure path (optional)
    #[must_use]
    pub fn robot_stock_wide_candidates(&self) -> Vec<PathBuf> {
        self.join_all(&["IFR_operational_stock_2004_to_2023.csv"])
    }

    /// Path of the assembled panel artifact
    #[must_use]
    pub fn cleaned_data(&self) -> PathBuf {
        self.data_dir.join("cleaned_data.csv")
    }

    /// Path of the artifact's schema manifest
    #[must_use]
    pub fn cleaned_manifest(&self) -> PathBuf {
        self.data_dir.join("cleaned_data.manifest.json")
    }

    /// Path of the shift-share exposure output
    #[must_use]
    pub fn exposure_output(&self) -> PathBuf {
        self.data_dir.join("IFR_industry_exposure_shift_share.csv")
    }

    /// Path of the NACE2-aggregated automation weights output
    #[must_use]
    pub fn nace2_weights_output(&self) -> PathBuf {
        self.data_dir.join("auto_weights_nace2.csv")
    }

    fn join_all(&self, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| self.data_dir.join(n)).collect()
    }
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self::new(Path::new("data"), Path::new("outputs"))
    }
}
