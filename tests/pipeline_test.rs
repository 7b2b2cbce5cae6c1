//! End-to-end assembly and derivation over in-memory sources.

use std::collections::BTreeSet;
use std::path::PathBuf;

use robot_panel::config::PanelConfig;
use robot_panel::derive;
use robot_panel::normalize::{CountryTables, IndustryCrosswalk};
use robot_panel::panel::{PanelRow, PanelSources, assemble};
use robot_panel::source::LoadOutcome;
use robot_panel::source::eurostat::{CountryYearSeries, CountryYearValue};
use robot_panel::source::ictwss::{IctwssRecord, IctwssTable};
use robot_panel::source::ifr::{IfrRecord, IfrTable};
use robot_panel::source::klems::{KlemsTable, KlemsWideRow};

fn loaded<T>(table: T) -> LoadOutcome<T> {
    LoadOutcome::Loaded {
        table,
        resolved_from: PathBuf::from("fixture.csv"),
    }
}

fn absent<T>() -> LoadOutcome<T> {
    LoadOutcome::Absent {
        reason: "not part of this fixture".to_string(),
    }
}

fn ifr_row(country: &str, industry: &str, year: i32, stock: f64) -> IfrRecord {
    IfrRecord {
        country_code: country.to_string(),
        industry_code: industry.to_string(),
        year,
        robot_stock: Some(stock * 1000.0),
        robot_wrkr_stock_95: Some(stock),
        employment: Some(500.0),
    }
}

fn klems_row(country: &str, nace: &str, year: i32) -> KlemsWideRow {
    KlemsWideRow {
        country_code: country.to_string(),
        nace_r2_code: nace.to_string(),
        year,
        va_pyp: Some(100.0 + f64::from(year - 1995)),
        cap_qi: Some(50.0),
        capict_qi: Some(10.0),
        capnict_qi: Some(40.0),
        lab: Some(30.0),
        lab_qi: Some(95.0 + f64::from(year - 1995)),
    }
}

/// DE and FR with full coverage for industries 28 and 29 over 1993-1997,
/// plus a non-EU country and an unmapped industry that must both be
/// filtered.
fn fixture() -> PanelSources {
    let mut ifr_rows = Vec::new();
    for country in ["DE", "FR"] {
        for industry in ["28", "29"] {
            for year in 1993..=1997 {
                ifr_rows.push(ifr_row(country, industry, year, 2.0 + f64::from(year - 1993)));
            }
        }
    }
    ifr_rows.push(ifr_row("US", "28", 1995, 9.0));
    ifr_rows.push(ifr_row("DE", "unmapped-code", 1995, 9.0));

    let mut klems_rows = Vec::new();
    for country in ["DE", "FR"] {
        for nace in ["C28", "C29-C30"] {
            for year in 1995..=1997 {
                klems_rows.push(klems_row(country, nace, year));
            }
        }
    }

    PanelSources {
        ifr: loaded(IfrTable {
            rows: ifr_rows,
            raw_columns: vec!["country_code".to_string(), "year".to_string()],
            dropped_unresolved: 0,
        }),
        klems: loaded(KlemsTable {
            rows: klems_rows,
            vars_present: BTreeSet::from(["LAB_QI".to_string(), "VA_PYP".to_string()]),
            raw_columns: vec!["geo_code".to_string()],
            dropped_unresolved: 0,
        }),
        gdp: loaded(CountryYearSeries {
            name: "gdp",
            rows: (1995..=1997)
                .map(|year| CountryYearValue {
                    country_code: "DE".to_string(),
                    year,
                    value: 2000.0,
                })
                .collect(),
            raw_columns: vec![],
            dropped_unresolved: 0,
        }),
        unemployment: absent(),
        ictwss: loaded(IctwssTable {
            rows: vec![IctwssRecord {
                country_code: "DE".to_string(),
                year: 1993,
                adj_cov: Some(80.0),
                coord: Some(4.0),
            }],
            raw_columns: vec![],
            dropped_unresolved: 0,
        }),
    }
}

fn run_fixture() -> (Vec<PanelRow>, Vec<PanelRow>) {
    let config = PanelConfig::default();
    let countries = CountryTables::new(config.greece);
    let crosswalk = IndustryCrosswalk::new();
    let sources = fixture();
    let (candidate, _) = assemble(&sources, &config, &countries, &crosswalk)
        .expect("fixture assembly should succeed");
    let (derived, _) = derive::apply(candidate.clone(), &config, &crosswalk);
    (candidate, derived)
}

#[test]
fn test_inner_join_defines_the_sample() {
    let config = PanelConfig::default();
    let countries = CountryTables::new(config.greece);
    let crosswalk = IndustryCrosswalk::new();
    let (candidate, summary) = assemble(&fixture(), &config, &countries, &crosswalk).unwrap();

    // 2 countries x 2 industries x 3 target years with a growth-accounts match
    assert_eq!(candidate.len(), 12);
    assert_eq!(summary.matched_rows, 12);
    assert_eq!(summary.dropped_unmapped_industry, 1);
    // the US row never reaches the join; unmatched counts only EU rows
    assert!(candidate.iter().all(|r| r.country_code != "US"));
    assert_eq!(summary.unmatched_treatment_rows, 0);
}

#[test]
fn test_country_left_joins_never_drop_rows() {
    let (_, derived) = run_fixture();

    // FR has no macro or institutional coverage; its rows survive with
    // missing values in those columns
    let fr: Vec<&PanelRow> = derived.iter().filter(|r| r.country_code == "FR").collect();
    assert!(!fr.is_empty());
    assert!(fr.iter().all(|r| r.adjcov.is_none()));
    assert!(fr.iter().all(|r| r.coord.is_none()));
    assert!(fr.iter().all(|r| r.ln_gdp.is_none()));

    let de: Vec<&PanelRow> = derived.iter().filter(|r| r.country_code == "DE").collect();
    assert!(de.iter().all(|r| r.adjcov == Some(80.0)));
    assert!(de.iter().all(|r| r.high_coord == Some(1)));
    assert!(de.iter().all(|r| r.ln_gdp.is_some()));
}

#[test]
fn test_centering_uses_the_full_panel_mean() {
    let (_, derived) = run_fixture();

    // DE is the only covered country, so the panel mean equals its own
    // coverage and the centered value is exactly zero
    for row in &derived {
        match row.country_code.as_str() {
            "DE" => assert_eq!(row.adjcov_centered, Some(0.0)),
            _ => assert_eq!(row.adjcov_centered, None),
        }
    }
}

#[test]
fn test_lag_comes_from_the_preceding_calendar_year() {
    let (candidate, _) = run_fixture();

    let de: Vec<&PanelRow> = candidate
        .iter()
        .filter(|r| r.entity == "DE_28")
        .collect();
    assert_eq!(de.len(), 3); // 1995..=1997; preload years feed lags only
    for row in &de {
        // stock in year t is 2 + (t - 1993), so the lag is ln(stock - 1)
        let expected = f64::from(row.year - 1993 + 1).ln();
        let lag = row.ln_robots_lag1.expect("lag defined from preload year");
        assert!((lag - expected).abs() < 1e-12, "year {}", row.year);
    }
}

#[test]
fn test_gap_years_leave_the_lag_missing() {
    let config = PanelConfig::default();
    let countries = CountryTables::new(config.greece);
    let crosswalk = IndustryCrosswalk::new();

    let mut sources = fixture();
    let mut rows = Vec::new();
    for country in ["AT", "BE", "DK", "FI", "SE"] {
        for year in [1995, 1996, 1998] {
            rows.push(ifr_row(country, "28", year, 3.0));
        }
    }
    sources.ifr = loaded(IfrTable {
        rows,
        raw_columns: vec![],
        dropped_unresolved: 0,
    });
    let mut klems_rows = Vec::new();
    for country in ["AT", "BE", "DK", "FI", "SE"] {
        for year in [1995, 1996, 1998] {
            klems_rows.push(klems_row(country, "C28", year));
        }
    }
    sources.klems = loaded(KlemsTable {
        rows: klems_rows,
        vars_present: BTreeSet::new(),
        raw_columns: vec![],
        dropped_unresolved: 0,
    });

    let (candidate, _) = assemble(&sources, &config, &countries, &crosswalk).unwrap();
    let at: Vec<&PanelRow> = candidate.iter().filter(|r| r.entity == "AT_28").collect();
    assert_eq!(at.len(), 3);
    assert!(at[0].ln_robots_lag1.is_none()); // 1995: no 1994 observation
    assert!(at[1].ln_robots_lag1.is_some()); // 1996: lag from 1995
    assert!(at[2].ln_robots_lag1.is_none()); // 1998: 1997 is a gap, not interpolated
}

#[test]
fn test_zero_stock_is_missing_not_clipped() {
    let config = PanelConfig::default();
    let countries = CountryTables::new(config.greece);
    let crosswalk = IndustryCrosswalk::new();

    let mut sources = fixture();
    if let LoadOutcome::Loaded { table, .. } = &mut sources.ifr {
        for row in &mut table.rows {
            if row.country_code == "DE" && row.year == 1996 {
                row.robot_wrkr_stock_95 = Some(0.0);
            }
        }
    }

    let (candidate, _) = assemble(&sources, &config, &countries, &crosswalk).unwrap();
    let de_1996 = candidate
        .iter()
        .find(|r| r.entity == "DE_28" && r.year == 1996)
        .unwrap();
    assert!(de_1996.ln_robots.is_none());
    // and the following year's lag inherits the gap
    let de_1997 = candidate
        .iter()
        .find(|r| r.entity == "DE_28" && r.year == 1997)
        .unwrap();
    assert!(de_1997.ln_robots_lag1.is_none());
}

#[test]
fn test_assembly_is_deterministic() {
    let (first_candidate, first_derived) = run_fixture();
    let (second_candidate, second_derived) = run_fixture();
    assert_eq!(first_candidate, second_candidate);
    assert_eq!(first_derived, second_derived);
}

#[test]
fn test_missing_required_source_is_fatal() {
    let config = PanelConfig::default();
    let countries = CountryTables::new(config.greece);
    let crosswalk = IndustryCrosswalk::new();

    let mut sources = fixture();
    sources.klems = absent();
    let error = assemble(&sources, &config, &countries, &crosswalk).unwrap_err();
    assert!(error.to_string().contains("KLEMS"));
}
