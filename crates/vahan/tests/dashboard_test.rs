//! Integration tests for the dashboard pipeline over a sample dataset.

use chrono::NaiveDate;
use rstest::rstest;
use vahan::data::{Catalog, SampleConfig, SampleGenerator, TidyRecord, read_tidy, write_tidy};
use vahan::growth::Query;
use vahan::{Dashboard, ViewCache};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample() -> Vec<TidyRecord> {
    SampleGenerator::new(
        Catalog::default(),
        SampleConfig::new(ymd(2022, 1, 1), ymd(2024, 12, 1)),
    )
    .generate()
    .unwrap()
}

#[test]
fn test_full_dashboard_workflow() {
    let records = sample();
    let view = Dashboard::build(&records, &Query::new());

    let kpi = view.kpi.as_ref().unwrap();
    assert_eq!(kpi.date, ymd(2024, 12, 31));
    assert!(kpi.yoy_pct.is_some());
    assert!(kpi.qoq_pct.is_some());

    // 3 categories and 18 manufacturers over 36 months.
    assert_eq!(view.category_trends.len(), 3 * 36);
    assert_eq!(view.manufacturer_trends.len(), 18 * 36);
    assert_eq!(view.league.len(), 18);
}

#[rstest]
#[case(ymd(2024, 6, 1), ymd(2024, 6, 30))]
#[case(ymd(2023, 2, 1), ymd(2023, 2, 28))]
fn test_as_of_follows_date_range(#[case] end: NaiveDate, #[case] expected: NaiveDate) {
    let records = sample();
    let query = Query::new().with_date_range(ymd(2022, 1, 1), end).unwrap();
    let view = Dashboard::build(&records, &query);

    assert_eq!(view.kpi.unwrap().date, expected);
    assert!(view.league.iter().all(|g| g.date == expected));
}

#[test]
fn test_category_totals_match_manufacturer_sums() {
    let records = sample();
    let all = Dashboard::build(&records, &Query::new().with_categories(["3W"]));
    let manufacturers = Dashboard::build(
        &records,
        &Query::new().with_manufacturers(["Piaggio", "Mahindra Electric", "YC Electric", "Altigreen"]),
    );

    assert_eq!(all.kpi, manufacturers.kpi);
}

#[test]
fn test_cache_survives_persisted_round_trip() {
    let records = sample();
    let path = std::env::temp_dir().join(format!("vahan_dashboard_{}.csv", std::process::id()));
    write_tidy(&path, &records).unwrap();
    let reloaded = read_tidy(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut cache = ViewCache::new();
    let query = Query::new().with_categories(["2W"]);
    let first = cache.get_or_build(&records, &query);
    let second = cache.get_or_build(&reloaded, &query);

    assert_eq!(cache.stats(), (1, 1));
    assert_eq!(first, second);
}

#[test]
fn test_mixed_coverage_keeps_every_category() {
    // Category export covers 2W only; manufacturer export covers 3W only.
    let records = vec![
        TidyRecord::category_level(ymd(2023, 1, 31), "India", "2W", 800),
        TidyRecord::category_level(ymd(2024, 1, 31), "India", "2W", 1_000),
        TidyRecord::manufacturer_level(ymd(2023, 1, 31), "India", "3W", "Piaggio", 40),
        TidyRecord::manufacturer_level(ymd(2024, 1, 31), "India", "3W", "Piaggio", 50),
    ];

    let view = Dashboard::build(&records, &Query::new());
    let kpi = view.kpi.unwrap();
    assert_eq!(kpi.total, 1_050);
    assert_eq!(kpi.prev_year_total, Some(840));

    let latest: Vec<(Option<&str>, u64)> = view
        .category_trends
        .iter()
        .filter(|g| g.date == ymd(2024, 1, 31))
        .map(|g| (g.key.category.as_deref(), g.registrations))
        .collect();
    assert_eq!(latest, vec![(Some("2W"), 1_000), (Some("3W"), 50)]);
    assert_eq!(view.league.len(), 1);
}
