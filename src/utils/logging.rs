//! Logging utilities
//!
//! Section banners and check-result lines used by the data-check and
//! sample-diagnostics reports.

/// Heavy banner used to open a report section
pub const BAR: &str =
    "════════════════════════════════════════════════════════";
/// Light separator used inside a report section
pub const SEP: &str =
    "────────────────────────────────────────────────────────";

/// Open a banner-delimited report section
pub fn section(title: &str) {
    log::info!("\n{BAR}\n  {title}\n{SEP}");
}

/// Report a passed check
pub fn ok(msg: &str) {
    log::info!("  ✓ {msg}");
}

/// Report a degraded but non-fatal condition
pub fn warn(msg: &str) {
    log::warn!("  ⚠ {msg}");
}

/// Report a failed check
pub fn fail(msg: &str) {
    log::error!("  ✗ {msg}");
}
