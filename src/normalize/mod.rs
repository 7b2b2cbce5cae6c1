//! Identifier normalization for countries and industries.
//!
//! Every raw source codes its keys differently: ISO2 with Eurostat quirks,
//! ISO3, free-text country names, IFR industry codes, ind1990 occupation
//! codes. This module owns the single set of mapping tables every stage
//! shares, so two stages can never disagree about what a token means.
//!
//! Available normalizers:
//! - `CountryTables`: ISO2 / ISO3 / Eurostat name → canonical ISO2,
//!   with bidirectional `EL`/`GR` aliasing for Greece
//! - `IndustryCrosswalk`: IFR industry code → NACE Rev. 2 manufacturing
//!   bucket (many-to-one), display names, high-robot classification

pub mod country;
pub mod industry;

pub use country::CountryTables;
pub use industry::IndustryCrosswalk;
