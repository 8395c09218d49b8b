use std::path::PathBuf;

use distress_recon::config::{DistressConfig, DuplicatePolicy};
use distress_recon::{run, ClientInput, ClientReport, ReconError, Table};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(name: &str) -> Table {
    let path = fixtures_dir().join(name);
    let data = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    Table::from_csv_str(&data).unwrap()
}

fn fixture_input() -> ClientInput {
    ClientInput {
        client: "fixture".into(),
        raw: Table::concat(vec![load("raw_part1.csv"), load("raw_part2.csv")]),
        domain: load("domain.csv"),
    }
}

fn load_and_run(config: &DistressConfig) -> ClientReport {
    run(config, fixture_input()).unwrap()
}

// -------------------------------------------------------------------------
// Default mapping
// -------------------------------------------------------------------------

#[test]
fn default_config_end_to_end() {
    let report = load_and_run(&DistressConfig::default());

    assert_eq!(report.meta.categories, 16);
    assert_eq!(report.merge.raw_rows, 7);
    assert_eq!(report.merge.raw_duplicates_dropped, 1);
    assert_eq!(report.merge.domain_rows, 6);
    assert_eq!(report.merge.merged, 5);
    assert_eq!(report.merge.raw_only, 1);
    assert_eq!(report.merge.domain_only, 1);
    assert_eq!(report.normalized_cells, 2);

    assert_eq!(report.total_records, 5);
    assert_eq!(report.matched_records, 3);
    assert_eq!(report.unmatched_records(), 2);
}

#[test]
fn discrepancies_rank_by_percentage_then_config_order() {
    let report = load_and_run(&DistressConfig::default());

    let top: Vec<(&str, usize, String)> = report
        .discrepancies
        .iter()
        .take(3)
        .map(|e| (e.category.as_str(), e.count, e.percentage_display()))
        .collect();
    assert_eq!(
        top,
        vec![
            ("Divorce", 1, "20.00%".to_string()),
            ("Prop", 1, "20.00%".to_string()),
            ("Estate", 0, "0.00%".to_string()),
        ]
    );
    assert_eq!(report.discrepancies.len(), 16);

    let mismatch_total: usize = report.mismatches.iter().map(|e| e.count).sum();
    assert_eq!(mismatch_total, 2);
    assert_eq!(report.mismatches[0].category, "Divorce");
    assert_eq!(report.mismatches[1].category, "Prop");
}

#[test]
fn first_raw_row_wins_for_duplicate_identifier() {
    let report = load_and_run(&DistressConfig::default());

    let ids = report.detail.column("PropertyID").unwrap();
    assert_eq!(ids, vec!["1001", "1002", "1003", "1004", "1005"]);
    // Second 1001 row has Divorce=0, Estate=1; the first (Divorce=1) survives
    assert_eq!(report.detail.column("DIVORCE_raw").unwrap()[0], "1");
    assert_eq!(report.detail.column("ESTATE_raw").unwrap()[0], "0");
}

#[test]
fn detail_layout_and_values() {
    let report = load_and_run(&DistressConfig::default());
    let detail = &report.detail;

    assert_eq!(
        &detail.headers[..10],
        &[
            "PropertyID",
            "ADDRESS",
            "ZIP",
            "COUNT OF DISTRESSES",
            "LIKELY DEAL SCORE",
            "BUYBOX SCORE",
            "SCORE",
            "LINK PROPERTIES",
            "Matched",
            "DIVORCE_raw",
        ]
    );
    assert_eq!(detail.headers.len(), 9 + 2 * 16);
    assert_eq!(detail.headers.last().unwrap(), "CODE VIOLATIONS_domain");

    assert_eq!(detail.column("ADDRESS").unwrap()[0], "12 Elm St");
    assert_eq!(detail.column("ZIP").unwrap()[2], "30303");
    assert_eq!(
        detail.column("BUYBOX SCORE").unwrap(),
        vec!["7", "0", "3", "2", "0"]
    );
    assert_eq!(
        detail.column("Matched").unwrap(),
        vec!["False", "True", "False", "True", "True"]
    );
    // "Unknown" eviction on 1004 normalized to 0
    assert_eq!(detail.column("EVICTION_raw").unwrap()[3], "0");
}

// -------------------------------------------------------------------------
// Failure modes
// -------------------------------------------------------------------------

#[test]
fn category_absent_from_raw_schema_fails() {
    let toml = r#"
[[categories]]
raw = "Divorce_Distress"
domain = "DIVORCE"

[[categories]]
raw = "Hoarding_Distress"
domain = "HOARDING"
"#;
    let config = DistressConfig::from_toml(toml).unwrap();
    let err = run(&config, fixture_input()).unwrap_err();
    assert!(matches!(err, ReconError::CategoryNotFound { .. }));
    assert!(err.to_string().contains("'Hoarding_Distress'"));
}

#[test]
fn domain_duplicates_follow_policy() {
    let mut input = fixture_input();
    input.domain = Table::concat(vec![load("domain.csv"), load("domain.csv")]);

    let err = run(&DistressConfig::default(), input.clone()).unwrap_err();
    assert!(matches!(err, ReconError::DuplicateDomainKeys { ref keys } if keys.len() == 6));

    let mut config = DistressConfig::default();
    config.join.on_domain_duplicate = DuplicatePolicy::KeepFirst;
    let report = run(&config, input).unwrap();
    assert_eq!(report.total_records, 5);
    assert_eq!(report.merge.domain_duplicates_dropped, 6);
}

#[test]
fn custom_mapping_subset() {
    let toml = r#"
[detail]
columns = ["PropertyID", "ADDRESS"]
integer_columns = []

[[categories]]
raw = "Absentee"
domain = "ABSENTEE"

[[categories]]
raw = "Prop_Vacant_Flag"
domain = "VACANT"
label = "Vacant"
"#;
    let config = DistressConfig::from_toml(toml).unwrap();
    let report = run(&config, fixture_input()).unwrap();

    assert_eq!(report.matched_records, 4);
    assert_eq!(report.discrepancies[0].category, "Vacant");
    assert_eq!(report.discrepancies[1].category, "Absentee");
    assert_eq!(
        report.detail.headers,
        vec![
            "PropertyID",
            "ADDRESS",
            "Matched",
            "ABSENTEE_raw",
            "ABSENTEE_domain",
            "VACANT_raw",
            "VACANT_domain",
        ]
    );
}
