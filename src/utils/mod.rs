//! Shared utilities: logging helpers and small numeric kernels.

pub mod logging;
pub mod stats;
