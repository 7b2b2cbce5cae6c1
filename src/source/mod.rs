//! Source loaders for the raw tabular inputs.
//!
//! Each loader reads one external source with a fixed column allow-list,
//! renames source-specific columns to the canonical schema, coerces numeric
//! values leniently (stray tokens become missing, never errors), and
//! normalizes country identifiers through the shared tables. A loader never
//! aborts the pipeline: missing or unparseable files come back as
//! [`LoadOutcome::Absent`] and the caller decides whether that is fatal.
//!
//! Available sources:
//! - IFR robot stocks (country × industry × year) — required
//! - KLEMS growth accounts (long, pivoted to wide) — required
//! - ICTWSS institutions (country × year) — optional
//! - Eurostat GDP and unemployment (country × year) — optional
//! - Automation weights, ind1990 crosswalk, wide robot stock — optional,
//!   shift-share exposure path

pub mod eurostat;
pub mod ictwss;
pub mod ifr;
pub mod klems;
pub mod weights;

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

/// Outcome of attempting to load one source.
///
/// `Absent` is a sentinel, not an error: the pipeline reports the gap and
/// continues with degraded coverage (or aborts, for required sources).
#[derive(Debug)]
pub enum LoadOutcome<T> {
    /// Source was read; `resolved_from` records which candidate path won
    Loaded { table: T, resolved_from: PathBuf },
    /// Source is missing or unreadable
    Absent { reason: String },
}

impl<T> LoadOutcome<T> {
    /// The loaded table, if any
    #[must_use]
    pub fn table(&self) -> Option<&T> {
        match self {
            Self::Loaded { table, .. } => Some(table),
            Self::Absent { .. } => None,
        }
    }

    /// The candidate path that was actually read, if any
    #[must_use]
    pub fn resolved_from(&self) -> Option<&Path> {
        match self {
            Self::Loaded { resolved_from, .. } => Some(resolved_from),
            Self::Absent { .. } => None,
        }
    }

    /// The absence reason, if absent
    #[must_use]
    pub fn absent_reason(&self) -> Option<&str> {
        match self {
            Self::Loaded { .. } => None,
            Self::Absent { reason } => Some(reason),
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Try candidate paths in order; first existing file wins
#[must_use]
pub fn resolve_candidates(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_file()).cloned()
}

/// Lenient numeric coercion: trims, tolerates empty and non-numeric tokens
#[must_use]
pub fn parse_f64(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() || token == ":" || token.eq_ignore_ascii_case("na")
        || token.eq_ignore_ascii_case("nan")
    {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lenient year coercion; accepts integer or float-formatted years
#[must_use]
pub fn parse_year(token: &str) -> Option<i32> {
    let token = token.trim();
    if let Ok(y) = token.parse::<i32>() {
        return Some(y);
    }
    parse_f64(token).map(|v| v as i32)
}

/// Header-indexed access into CSV records, so loaders read columns by
/// canonical name regardless of source column order or extra columns.
#[derive(Debug)]
pub struct ColumnIndex {
    columns: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl ColumnIndex {
    #[must_use]
    pub fn new(headers: &csv::StringRecord) -> Self {
        let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { columns, index }
    }

    /// Raw header names in file order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the source carries a column
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Field of a record under a named column
    #[must_use]
    pub fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        self.index.get(name).and_then(|&i| record.get(i))
    }
}

/// Open a CSV file for header-indexed reading. Returns the reader and its
/// column index, or a reason string when the file cannot be opened/parsed.
pub fn open_csv(path: &Path) -> std::result::Result<(csv::Reader<std::fs::File>, ColumnIndex), String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    let headers = reader
        .headers()
        .map_err(|e| format!("cannot read header of {}: {e}", path.display()))?
        .clone();
    Ok((reader, ColumnIndex::new(&headers)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion_is_lenient() {
        assert_eq!(parse_f64("3.5"), Some(3.5));
        assert_eq!(parse_f64(" 12 "), Some(12.0));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64(":"), None);
        assert_eq!(parse_f64("n/a?"), None);
        assert_eq!(parse_f64("NaN"), None);
    }

    #[test]
    fn year_coercion_accepts_float_years() {
        assert_eq!(parse_year("1995"), Some(1995));
        assert_eq!(parse_year("1995.0"), Some(1995));
        assert_eq!(parse_year("abc"), None);
    }
}
