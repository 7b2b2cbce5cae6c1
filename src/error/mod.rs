//! Error handling for the panel pipeline.
//!
//! Only conditions that make the whole run unusable are errors: a required
//! source that cannot be read, or a panel artifact whose schema does not
//! match what a downstream stage declared. Optional-source absence and
//! unresolvable identifiers are data, not errors, and show up in the
//! diagnostics instead.

use std::io;
use std::path::PathBuf;

/// Specialized error type for panel construction and estimation stages
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing tabular data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error encoding or decoding the artifact manifest
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// A source the panel cannot be assembled without is missing or unreadable.
    /// The field is `name`, not `source`: thiserror reserves `source` for a
    /// wrapped error cause.
    #[error("required source '{name}' is absent: {reason}")]
    RequiredSourceAbsent { name: String, reason: String },

    /// A panel artifact does not satisfy the schema a stage declared
    #[error("schema mismatch in {}: {detail}", .path.display())]
    SchemaMismatch { path: PathBuf, detail: String },

    /// Assembly produced no rows at all
    #[error("assembled panel is empty: {0}")]
    EmptyPanel(String),
}

/// Result type for panel pipeline operations
pub type Result<T> = std::result::Result<T, PanelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn required_source_absence_names_the_source_without_a_cause() {
        let error = PanelError::RequiredSourceAbsent {
            name: "IFR robots".to_string(),
            reason: "no candidate file exists".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "required source 'IFR robots' is absent: no candidate file exists"
        );
        // absence is a leaf condition, not a wrapped error
        assert!(error.source().is_none());
    }

    #[test]
    fn io_errors_carry_their_cause() {
        let error = PanelError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert!(error.source().is_some());
    }
}
