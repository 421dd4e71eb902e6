//! Integration tests for the two-tier case loading policy.
//!
//! Each test builds its own fixture tree under the system temp dir so the
//! bundled fixtures and the process environment are never touched.

use std::path::{Path, PathBuf};

use saveandmiss_harness::fixtures::{load_collection, write_cases};
use saveandmiss_harness::{
    Case, CaseSource, FixtureError, HarnessConfig, HarnessError, run_with_config,
};

fn scratch_dir(prefix: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config_in(dir: &Path) -> HarnessConfig {
    HarnessConfig::default()
        .with_cases_dir(dir.join("cases"))
        .with_hidden_path(dir.join("hidden").join("saveandmiss_hidden.json"))
}

fn repeat(arg: &str, num: i64) -> String {
    arg.repeat(usize::try_from(num).unwrap_or(0))
}

#[test]
fn single_visible_case_without_hidden_file() {
    let dir = scratch_dir("sam-load-visible-only");
    let cfg = config_in(&dir);
    std::fs::create_dir_all(&cfg.cases_dir).unwrap();
    std::fs::write(
        cfg.visible_path(),
        r#"[{"arg":"ab","num":2,"want":"abab"}]"#,
    )
    .unwrap();

    let report = run_with_config(&cfg, repeat).unwrap();
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.results[0].case_name, "case_0");
    assert!(report.summary.all_passed());
    assert_eq!(report.fixtures.len(), 1);
}

#[test]
fn empty_visible_table_with_one_hidden_case() {
    let dir = scratch_dir("sam-load-hidden-only");
    let cfg = config_in(&dir);
    write_cases(&cfg.visible_path(), &[]).unwrap();
    std::fs::create_dir_all(cfg.hidden_path.parent().unwrap()).unwrap();
    std::fs::write(&cfg.hidden_path, r#"[{"arg":"x","num":0,"want":""}]"#).unwrap();

    let report = run_with_config(&cfg, repeat).unwrap();
    assert_eq!(report.summary.total, 1);
    let only = &report.summary.results[0];
    assert_eq!(only.case_name, "case_0");
    assert_eq!(only.source, CaseSource::Hidden);
    assert!(only.passed);
}

#[test]
fn executed_count_is_visible_plus_hidden() {
    let dir = scratch_dir("sam-load-counts");
    let cfg = config_in(&dir);
    let visible: Vec<Case> = (0..4).map(|i| Case::new("v", i, "v".repeat(i as usize))).collect();
    let hidden: Vec<Case> = (0..3).map(|i| Case::new("h", i, "h".repeat(i as usize))).collect();
    write_cases(&cfg.visible_path(), &visible).unwrap();
    write_cases(&cfg.hidden_path, &hidden).unwrap();

    let collection = load_collection(&cfg).unwrap();
    assert_eq!(collection.len(), 7);

    let report = run_with_config(&cfg, repeat).unwrap();
    assert_eq!(report.summary.total, 7);
    let labels: Vec<&str> = report
        .summary
        .results
        .iter()
        .map(|r| r.case_name.as_str())
        .collect();
    assert_eq!(
        labels,
        ["case_0", "case_1", "case_2", "case_3", "case_4", "case_5", "case_6"]
    );
    assert_eq!(report.summary.results[3].source, CaseSource::Visible);
    assert_eq!(report.summary.results[4].source, CaseSource::Hidden);
}

#[test]
fn mismatch_reports_inputs_and_outputs_and_continues() {
    let dir = scratch_dir("sam-load-mismatch");
    let cfg = config_in(&dir);
    write_cases(
        &cfg.visible_path(),
        &[
            Case::new("ab", 2, "ABAB"),
            Case::new("ab", 2, "abab "),
            Case::new("ab", 2, "abab"),
        ],
    )
    .unwrap();

    let report = run_with_config(&cfg, repeat).unwrap();
    let summary = &report.summary;
    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 2);
    assert!(summary.results[2].passed);

    let lines = summary.failure_lines();
    assert_eq!(
        lines,
        vec![
            r#"case_0: SaveAndMiss("ab",2) = "abab"; want "ABAB""#.to_string(),
            r#"case_1: SaveAndMiss("ab",2) = "abab"; want "abab ""#.to_string(),
        ]
    );
}

#[test]
fn selection_reruns_a_single_label() {
    let dir = scratch_dir("sam-load-selection");
    let cfg = config_in(&dir).with_selection(["case_1"]);
    write_cases(
        &cfg.visible_path(),
        &[Case::new("a", 1, "a"), Case::new("b", 2, "bb")],
    )
    .unwrap();

    let report = run_with_config(&cfg, repeat).unwrap();
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.results[0].case_name, "case_1");
    assert_eq!(report.inputs.selection, Some(vec!["case_1".to_string()]));
}

#[test]
fn missing_visible_file_is_fatal() {
    let dir = scratch_dir("sam-load-missing");
    let err = run_with_config(&config_in(&dir), repeat).unwrap_err();
    assert!(
        matches!(err, HarnessError::Fixture(FixtureError::Read { .. })),
        "unexpected error: {err}"
    );
    assert!(err.to_string().contains("saveandmiss.json"));
}

#[test]
fn zero_byte_hidden_file_is_fatal() {
    let dir = scratch_dir("sam-load-hidden-zero");
    let cfg = config_in(&dir);
    write_cases(&cfg.visible_path(), &[Case::new("a", 1, "a")]).unwrap();
    std::fs::create_dir_all(cfg.hidden_path.parent().unwrap()).unwrap();
    std::fs::write(&cfg.hidden_path, "").unwrap();

    let err = run_with_config(&cfg, repeat).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Fixture(FixtureError::Decode { .. })
    ));
}

#[test]
fn bundled_fixtures_load_in_visible_then_hidden_order() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let cfg = HarnessConfig::default()
        .with_cases_dir(root.join("tests/cases"))
        .with_hidden_path(root.join("tests/hidden/saveandmiss_hidden.json"));

    let collection = load_collection(&cfg).unwrap();
    assert!(collection.visible_len() > 0);
    assert!(collection.hidden_len() > 0);
    assert_eq!(
        collection.len(),
        collection.visible_len() + collection.hidden_len()
    );
    let last = collection.iter().last().unwrap();
    assert_eq!(last.source, CaseSource::Hidden);
    assert_eq!(last.label(), format!("case_{}", collection.len() - 1));
    // The final hidden record omits every key but `num`.
    assert_eq!(last.case, Case::new("", 4, ""));
}
