// BOREBENCH LIVE A/B SMOKE TEST
// RUNS A SHORTENED THROUGHPUT SUITE TWICE (FORCED BORE, FORCED DEFAULT)
// AGAINST THE REAL TOOLS, THEN COMPARES THE TWO REPORTS.
//
// REQUIRES hackbench, stress-ng, sysbench ON PATH.
// RUN: cargo test --test live --release -- --ignored --test-threads=1

use std::path::Path;
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_borebench");

fn borebench(args: &[&str], results: &Path, scheduler: Option<&str>) -> Output {
    let mut cmd = Command::new(BIN);
    cmd.args(args).env("BOREBENCH_RESULTS", results).env("RUST_LOG", "warn");
    match scheduler {
        Some(s) => cmd.env("SCHEDULER", s),
        None => cmd.env_remove("SCHEDULER"),
    };
    cmd.output().expect("spawn borebench")
}

fn assert_ok(out: &Output, what: &str) {
    if !out.status.success() {
        panic!(
            "{} FAILED ({})\nSTDOUT:\n{}\nSTDERR:\n{}",
            what,
            out.status,
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        );
    }
}

#[test]
#[ignore]
fn throughput_ab_smoke() {
    let dir = tempfile::tempdir().unwrap();
    let quick = ["run", "throughput", "--single", "--duration", "2", "--work", "2000000", "--workers", "4"];

    for label in ["DEFAULT", "BORE"] {
        let out = borebench(&quick, dir.path(), Some(label));
        assert_ok(&out, &format!("RUN {}", label));
    }

    let reports: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".txt"))
        .collect();
    assert_eq!(reports.len(), 2, "{:?}", reports);

    let out = borebench(&["compare", "throughput"], dir.path(), None);
    assert_ok(&out, "COMPARE");
    let text = String::from_utf8_lossy(&out.stdout);
    println!("{}", text);
    assert!(text.contains("BASELINE:  DEFAULT"));
    assert!(text.contains("CANDIDATE: BORE"));
    assert!(text.contains("SUMMARY:"));
}

#[test]
#[ignore]
fn detect_prints_a_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let out = borebench(&["detect"], dir.path(), None);
    assert_ok(&out, "DETECT");
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("SCHEDULER:"));
    assert!(text.contains("DECIDED BY:"));
}
