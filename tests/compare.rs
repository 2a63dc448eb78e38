// BOREBENCH COMPARATOR TESTS
// REPORT FILES ARE WRITTEN INTO A TEMP DIR, THEN COMPARED END TO END.

use std::fs;
use std::path::{Path, PathBuf};

use borebench::compare::{compare_files, compare_texts, render, resolve, Row, Side};
use borebench::detect::SchedulerLabel;
use borebench::metrics::{MetricKind, Winner};
use borebench::suite::Suite;

fn throughput_report(avg: &str, sd: &str, hb: &str) -> String {
    format!(
        "Scheduler: X\n\n\
TEST 1: Fairness (equal CPU-bound workers)\n\
Average execution time: {avg}s\n\
Standard deviation: {sd}s\n\
Status: OK\n\n\
TEST 2: hackbench\n\
Time: {hb}s\n\
Status: OK\n\n\
TEST 3: CPU stress\n\
Bogo ops/s: 1000.00\n\n\
TEST 4: sysbench\n\
Events per second: 500.00\n\n\
TEST 5: switch\n\
Bogo ops/s: 2000.00\n"
    )
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, text).unwrap();
    p
}

fn fairness_row(rows: &[Row]) -> &Row {
    rows.iter()
        .find(|r| matches!(r, Row::Compared { test: 1, kind: MetricKind::CompletionMean, .. }))
        .expect("fairness mean row")
}

// === END TO END ===

#[test]
fn bore_faster_fairness_is_bore_better() {
    let dir = tempfile::tempdir().unwrap();
    let d = write(dir.path(), "throughput_DEFAULT_20260101_000000.txt", &throughput_report("12.340000", "0.500000", "4.000"));
    let b = write(dir.path(), "throughput_BORE_20260101_000100.txt", &throughput_report("10.000000", "0.400000", "4.000"));

    // ARGUMENT ORDER DOES NOT CHANGE ORIENTATION
    for (x, y) in [(&d, &b), (&b, &d)] {
        let cmp = compare_files(x, y).unwrap();
        assert_eq!(cmp.baseline.label, Some(SchedulerLabel::Default));
        assert_eq!(cmp.candidate.label, Some(SchedulerLabel::Bore));
        match fairness_row(&cmp.rows) {
            Row::Compared { baseline, candidate, percent, winner, .. } => {
                assert_eq!(*baseline, 12.34);
                assert_eq!(*candidate, 10.0);
                assert_eq!(*percent, Some(-18.96));
                assert_eq!(*winner, Winner::Candidate);
            }
            other => panic!("unexpected row {:?}", other),
        }
        let text = render(&cmp);
        assert!(text.contains("DIFF: -18.96%"), "{}", text);
        assert!(text.contains("-> BORE BETTER"), "{}", text);
    }
}

#[test]
fn higher_is_better_metric_uses_polarity() {
    let base = "TEST 3: x\nBogo ops/s: 1000.00\n";
    let cand = "TEST 3: x\nBogo ops/s: 1100.00\n";
    let rows = compare_texts(Suite::Throughput, base, cand);
    let row = rows
        .iter()
        .find(|r| matches!(r, Row::Compared { test: 3, .. }))
        .unwrap();
    match row {
        Row::Compared { percent, winner, .. } => {
            assert_eq!(*percent, Some(10.0));
            assert_eq!(*winner, Winner::Candidate);
        }
        _ => unreachable!(),
    }
}

#[test]
fn render_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let d = write(dir.path(), "throughput_DEFAULT_1.txt", &throughput_report("1.000000", "0.1", "2.000"));
    let b = write(dir.path(), "throughput_BORE_2.txt", &throughput_report("1.100000", "0.1", "1.900"));
    let first = render(&compare_files(&d, &b).unwrap());
    let second = render(&compare_files(&d, &b).unwrap());
    assert_eq!(first, second);
}

// === PARTIAL AND MALFORMED INPUT ===

#[test]
fn missing_metric_only_affects_its_row() {
    let base = throughput_report("1.000000", "0.1", "2.000");
    let cand = throughput_report("1.000000", "0.1", "2.000").replace("Time: 2.000s\n", "");
    let rows = compare_texts(Suite::Throughput, &base, &cand);
    let missing: Vec<&Row> = rows.iter().filter(|r| matches!(r, Row::Missing { .. })).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(
        missing[0],
        &Row::Missing { test: 2, kind: MetricKind::Elapsed, sides: vec![Side::Candidate] }
    );
    assert!(rows.iter().any(|r| matches!(r, Row::Compared { test: 1, .. })));
    assert!(rows.iter().any(|r| matches!(r, Row::Compared { test: 5, .. })));
}

#[test]
fn missing_metric_warns_in_render() {
    let dir = tempfile::tempdir().unwrap();
    let d = write(dir.path(), "throughput_DEFAULT_1.txt", &throughput_report("1.0", "0.1", "2.000"));
    let b = write(
        dir.path(),
        "throughput_BORE_2.txt",
        &throughput_report("1.0", "0.1", "2.000").replace("Time: 2.000s\n", ""),
    );
    let text = render(&compare_files(&d, &b).unwrap());
    assert!(text.contains("WARNING: could not extract elapsed time from BORE"), "{}", text);
}

#[test]
fn missing_metric_is_listed_in_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let d = write(dir.path(), "throughput_DEFAULT_1.txt", &throughput_report("1.0", "0.1", "2.000"));
    let b = write(
        dir.path(),
        "throughput_BORE_2.txt",
        &throughput_report("1.0", "0.1", "2.000").replace("Time: 2.000s\n", ""),
    );
    let cmp = compare_files(&d, &b).unwrap();
    assert_eq!(cmp.warnings(), vec!["TEST 2: could not extract elapsed time from BORE".to_string()]);

    let clean = compare_files(&d, &d).unwrap();
    assert!(clean.warnings().is_empty());
}

#[test]
fn reordered_sections_still_match() {
    let base = "TEST 2: hb\nTime: 5.000s\nTEST 1: f\nAverage execution time: 2.0s\nStandard deviation: 0.1s\n";
    let cand = "TEST 1: f\nAverage execution time: 1.0s\nStandard deviation: 0.1s\nTEST 2: hb\nTime: 4.000s\n";
    let rows = compare_texts(Suite::Throughput, base, cand);
    assert!(matches!(
        fairness_row(&rows),
        Row::Compared { percent: Some(p), .. } if *p == -50.0
    ));
}

#[test]
fn zero_baseline_has_no_percentage() {
    let rows = compare_texts(Suite::Throughput, "TEST 2: x\nTime: 0.000s\n", "TEST 2: x\nTime: 1.000s\n");
    let row = rows.iter().find(|r| matches!(r, Row::Compared { test: 2, .. })).unwrap();
    assert!(matches!(row, Row::Compared { percent: None, winner: Winner::Baseline, .. }));
}

#[test]
fn nonexistent_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let d = write(dir.path(), "throughput_DEFAULT_1.txt", "");
    let err = compare_files(&d, &dir.path().join("throughput_BORE_9.txt")).unwrap_err();
    assert!(err.to_string().contains("FILE NOT FOUND"));
}

#[test]
fn category_mismatch_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let t = write(dir.path(), "throughput_DEFAULT_1.txt", "");
    let r = write(dir.path(), "responsiveness_BORE_1.txt", "");
    let err = compare_files(&t, &r).unwrap_err();
    assert!(err.to_string().contains("CATEGORY MISMATCH"));
}

// === INPUT RESOLUTION ===

#[test]
fn keyword_picks_newest_pair() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "throughput_DEFAULT_20260101_000000.txt", "");
    let newest_d = write(dir.path(), "throughput_DEFAULT_20260301_000000.txt", "");
    write(dir.path(), "throughput_BORE_20260101_000000.txt", "");
    let newest_b = write(dir.path(), "throughput_BORE_20260201_000000.txt", "");
    write(dir.path(), "throughput_BORE_20270101_000000.log", "");

    let pairs = resolve(&["throughput".to_string()], dir.path()).unwrap();
    assert_eq!(pairs, vec![(newest_d, newest_b)]);
}

#[test]
fn single_path_pairs_with_opposite_label() {
    let dir = tempfile::tempdir().unwrap();
    let mine = write(dir.path(), "responsiveness_BORE_20260101_000000.txt", "");
    let other = write(dir.path(), "responsiveness_DEFAULT_20260102_000000.txt", "");
    let arg = mine.to_string_lossy().into_owned();
    assert_eq!(resolve(&[arg], dir.path()).unwrap(), vec![(mine, other)]);
}

#[test]
fn no_arguments_covers_every_complete_category() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "throughput_DEFAULT_1.txt", "");
    write(dir.path(), "throughput_BORE_1.txt", "");
    write(dir.path(), "responsiveness_BORE_1.txt", "");
    let pairs = resolve(&[], dir.path()).unwrap();
    assert_eq!(pairs.len(), 1);
}

#[test]
fn no_pairs_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(resolve(&[], dir.path()).is_err());
    assert!(resolve(&["responsiveness".to_string()], dir.path()).is_err());
}
