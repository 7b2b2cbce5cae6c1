use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use log::{info, warn};

use robot_panel::config::{PanelConfig, SourcePaths};
use robot_panel::diagnostics::{datacheck, sample::SampleDiagnostics};
use robot_panel::error::Result;
use robot_panel::estimate::{
    WithinOls, heterogeneity, panel_models, run_industry_heterogeneity, run_panel_models,
};
use robot_panel::normalize::{CountryTables, IndustryCrosswalk};
use robot_panel::panel::{
    PanelArtifact, PanelSources, assemble, crosswalk, crosswalk::aggregate_weights_to_nace2,
    shift_share,
};
use robot_panel::source::{eurostat, ictwss, ifr, klems, weights};
use robot_panel::{ArtifactManifest, derive};

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let step: u32 = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2);
    let paths = match (args.get(2), args.get(3)) {
        (Some(data), Some(out)) => SourcePaths::new(data, out),
        (Some(data), None) => SourcePaths::new(data, "outputs"),
        _ => SourcePaths::default(),
    };
    let config = PanelConfig::default();

    if !paths.data_dir.exists() {
        warn!("Data directory not found: {}", paths.data_dir.display());
        return Ok(());
    }

    info!("Loading sources from: {}", paths.data_dir.display());
    let countries = CountryTables::new(config.greece);
    let crosswalk = IndustryCrosswalk::new();

    let start = Instant::now();
    let sources = PanelSources {
        ifr: ifr::load(&paths.ifr_candidates(), &countries),
        klems: klems::load(&paths.klems_candidates(), &countries),
        gdp: eurostat::load_series("gdp", &paths.gdp_candidates(), &countries),
        unemployment: eurostat::load_series(
            "unemployment",
            &paths.unemployment_candidates(),
            &countries,
        ),
        ictwss: ictwss::load(&paths.ictwss_candidates(), &countries),
    };
    info!("Sources loaded in {:?}", start.elapsed());

    // Step 1: read-only data check over the raw sources
    let report = datacheck::run(&sources, &config, &countries);
    datacheck::log_report(&report);
    if step <= 1 {
        return Ok(());
    }

    // Step 2: assemble, derive, persist, estimate
    let (candidate_rows, assembly) = assemble(&sources, &config, &countries, &crosswalk)?;
    info!("Treatment rows entering the join: {}", assembly.treatment_rows);

    let (rows, derived) = derive::apply(candidate_rows, &config, &crosswalk);
    info!(
        "Derived panel: {} rows retained of {} ({} dropped for missing core variables)",
        derived.rows_after,
        derived.rows_before,
        derived.rows_before - derived.rows_after
    );
    match derived.adjcov_mean {
        Some(mean) => info!("Coverage centered on full-panel mean {mean:.2}"),
        None => warn!("Institutional source absent; coverage columns are empty"),
    }

    let diagnostics = SampleDiagnostics::run(&rows);
    diagnostics.log();

    let manifest = ArtifactManifest::new(rows.len(), source_provenance(&sources));
    let artifact = PanelArtifact { rows, manifest };
    let (csv_path, manifest_path) = PanelArtifact::paths_from(&paths);
    ensure_parent(&csv_path)?;
    artifact.write(&csv_path, &manifest_path)?;

    build_shift_share_exposure(&paths, &countries)?;

    let models = run_panel_models(&artifact, &WithinOls);
    panel_models::write_outputs(&models, &paths.output_dir)?;

    let outcome = run_industry_heterogeneity(&artifact, &WithinOls, &config)?;
    heterogeneity::write_outputs(&outcome, &paths.output_dir)?;

    info!("Run complete in {:?}", start.elapsed());
    Ok(())
}

/// Record where each source actually came from, for the artifact manifest
fn source_provenance(sources: &PanelSources) -> BTreeMap<String, String> {
    let mut provenance = BTreeMap::new();
    let mut record = |name: &str, resolved: Option<&Path>, reason: Option<&str>| {
        let value = match (resolved, reason) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(reason)) => format!("absent: {reason}"),
            (None, None) => "absent".to_string(),
        };
        provenance.insert(name.to_string(), value);
    };
    record("ifr", sources.ifr.resolved_from(), sources.ifr.absent_reason());
    record("klems", sources.klems.resolved_from(), sources.klems.absent_reason());
    record("gdp", sources.gdp.resolved_from(), sources.gdp.absent_reason());
    record(
        "unemployment",
        sources.unemployment.resolved_from(),
        sources.unemployment.absent_reason(),
    );
    record("ictwss", sources.ictwss.resolved_from(), sources.ictwss.absent_reason());
    provenance
}

/// Build and persist the shift-share exposure panel when its three optional
/// inputs all resolve; otherwise log what was missing and move on
fn build_shift_share_exposure(paths: &SourcePaths, countries: &CountryTables) -> Result<()> {
    let weight_rows = weights::load_weights(&paths.weights_candidates());
    let crosswalk_rows = weights::load_ind1990_crosswalk(&paths.ind1990_crosswalk_candidates());
    let stock_rows = weights::load_robot_stock_wide(&paths.robot_stock_wide_candidates(), countries);

    let (Some(weight_rows), Some(crosswalk_rows), Some(stock_rows)) =
        (weight_rows.table(), crosswalk_rows.table(), stock_rows.table())
    else {
        info!("Shift-share inputs incomplete; skipping exposure construction");
        return Ok(());
    };

    let nace2 = aggregate_weights_to_nace2(weight_rows, crosswalk_rows);
    info!(
        "Aggregated {} ind1990 weights into {} NACE2 manufacturing divisions",
        weight_rows.len(),
        nace2.len()
    );
    let nace2_path = paths.nace2_weights_output();
    ensure_parent(&nace2_path)?;
    crosswalk::write_nace2_weights_csv(&nace2_path, &nace2)?;

    let exposure = shift_share::build_exposure(stock_rows, weight_rows);
    let output = paths.exposure_output();
    ensure_parent(&output)?;
    shift_share::write_exposure_csv(&output, &exposure)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
