//! Panel preparation shared by diagnostics and estimation: control
//! selection, requirement-based subsetting, and entity-year deduplication.

use rustc_hash::FxHashSet;

use crate::panel::row::PanelRow;

/// Industry-level controls always enter; country-level controls enter only
/// when the column carries any data at all (a fully-absent optional source
/// must not knock every row out)
#[must_use]
pub fn select_controls(rows: &[PanelRow]) -> Vec<&'static str> {
    let mut controls = vec!["ln_va", "ln_cap"];
    if rows.iter().any(|r| r.ln_gdp.is_some()) {
        controls.push("ln_gdp");
    }
    if rows.iter().any(|r| r.unemployment.is_some()) {
        controls.push("unemployment");
    }
    controls
}

/// Subset rows to those carrying every required variable, dropping
/// duplicate (entity, year) observations, sorted deterministically
#[must_use]
pub fn prepare_panel(rows: &[PanelRow], require: &[&str]) -> Vec<PanelRow> {
    let mut prepared: Vec<PanelRow> = rows
        .iter()
        .filter(|r| r.has_all(require))
        .cloned()
        .collect();
    prepared.sort_by(|a, b| (&a.entity, a.year_int).cmp(&(&b.entity, b.year_int)));

    let mut seen: FxHashSet<(String, i32)> = FxHashSet::default();
    prepared.retain(|r| seen.insert((r.entity.clone(), r.year_int)));
    prepared
}

/// Distinct entity count of a prepared subset
#[must_use]
pub fn n_entities(rows: &[PanelRow]) -> usize {
    rows.iter()
        .map(|r| r.entity.as_str())
        .collect::<FxHashSet<_>>()
        .len()
}

/// Distinct country codes of a prepared subset, sorted
#[must_use]
pub fn countries_of(rows: &[PanelRow]) -> Vec<String> {
    let mut countries: Vec<String> = rows
        .iter()
        .map(|r| r.country_code.clone())
        .collect::<FxHashSet<_>>()
        .into_iter()
        .collect();
    countries.sort();
    countries
}
