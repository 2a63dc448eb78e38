// BOREBENCH FAIRNESS FAN-OUT
// SPAWN N IDENTICAL CPU-BOUND WORKERS AT ONCE, JOIN ALL, FOLD THEIR
// SELF-REPORTED COMPLETION TIMES.
//
// EACH WORKER IS THIS BINARY'S HIDDEN `worker` SUBCOMMAND. EACH WRITES ONE
// LINE TO ITS OWN FILE IN A PER-RUN TEMP DIR (PID + ITERATION QUALIFIED),
// SO THERE ARE NO SHARED WRITE TARGETS. THE TEMP DIR IS REMOVED ON DROP,
// AND UNJOINED WORKERS ARE KILLED ON DROP.

use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use regex::Regex;

use crate::process::ProcGuard;
use crate::suite::FanoutPlan;

static WORKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"WORKER\s+(\d+)\s+ELAPSED\s+([0-9]+(?:\.[0-9]+)?)").expect("static regex")
});

// THE FIXED WORKLOAD: SUM OF i^2 FOR i IN 0..n, WRAPPING
pub fn sum_of_squares(n: u64) -> u64 {
    let mut acc: u64 = 0;
    for i in 0..n {
        acc = acc.wrapping_add(std::hint::black_box(i).wrapping_mul(i));
    }
    acc
}

pub fn worker_line(id: usize, elapsed_secs: f64) -> String {
    format!("WORKER {} ELAPSED {:.6}", id, elapsed_secs)
}

// (ID, ELAPSED SECONDS)
pub fn parse_worker_line(text: &str) -> Option<(usize, f64)> {
    let c = WORKER_LINE.captures(text)?;
    Some((c[1].parse::<usize>().ok()?, c[2].parse::<f64>().ok()?))
}

// WORKER SIDE: RUN THE WORKLOAD, APPEND ONE LINE TO `out`
pub fn run_worker(id: usize, work: u64, out: &Path) -> Result<()> {
    let start = Instant::now();
    let sum = sum_of_squares(work);
    let elapsed = start.elapsed().as_secs_f64();
    std::hint::black_box(sum);

    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(out)
        .with_context(|| format!("opening worker output {}", out.display()))?;
    writeln!(f, "{}", worker_line(id, elapsed))?;
    Ok(())
}

pub fn temp_prefix(iteration: u32) -> String {
    format!("borebench-{}-{}-", std::process::id(), iteration)
}

// PARENT SIDE: FORK ALL, JOIN ALL, RETURN COMPLETION TIMES IN WORKER ORDER
pub fn run_fanout(worker_exe: &Path, plan: &FanoutPlan, iteration: u32) -> Result<Vec<f64>> {
    if plan.workers == 0 {
        bail!("FAN-OUT NEEDS AT LEAST ONE WORKER");
    }
    let dir = tempfile::Builder::new()
        .prefix(&temp_prefix(iteration))
        .tempdir()
        .context("creating fan-out temp dir")?;

    let mut running: Vec<(usize, PathBuf, ProcGuard)> = Vec::with_capacity(plan.workers);
    for id in 0..plan.workers {
        let out = dir.path().join(format!("worker-{}.out", id));
        let child = Command::new(worker_exe)
            .arg("worker")
            .arg("--id")
            .arg(id.to_string())
            .arg("--work")
            .arg(plan.work.to_string())
            .arg("--out")
            .arg(&out)
            .process_group(0)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("spawning worker {} ({})", id, worker_exe.display()))?;
        running.push((id, out, ProcGuard::new(child)));
    }
    log::debug!("FAN-OUT: {} WORKERS IN {}", plan.workers, dir.path().display());

    // JOIN BARRIER. AN EARLY RETURN DROPS THE REMAINING GUARDS (KILL) AND dir (REMOVE).
    let mut times = Vec::with_capacity(plan.workers);
    for (id, out, guard) in running {
        let status = guard.wait().with_context(|| format!("waiting for worker {}", id))?;
        if !status.success() {
            bail!("WORKER {} EXITED WITH {}", id, status);
        }
        let text = std::fs::read_to_string(&out)
            .with_context(|| format!("reading worker output {}", out.display()))?;
        let (reported, secs) = parse_worker_line(&text)
            .with_context(|| format!("worker {} wrote no ELAPSED line", id))?;
        if reported != id {
            bail!("WORKER OUTPUT {} CLAIMS ID {}", out.display(), reported);
        }
        times.push(secs);
    }
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_of_squares_small() {
        // 0 + 1 + 4 + 9 + 16
        assert_eq!(sum_of_squares(5), 30);
        assert_eq!(sum_of_squares(0), 0);
    }

    #[test]
    fn worker_line_parses_back() {
        let line = worker_line(3, 1.25);
        assert_eq!(line, "WORKER 3 ELAPSED 1.250000");
        assert_eq!(parse_worker_line(&line), Some((3, 1.25)));
        assert_eq!(parse_worker_line("garbage"), None);
    }

    #[test]
    fn temp_prefix_is_pid_and_iteration_qualified() {
        let p = temp_prefix(4);
        assert!(p.starts_with(&format!("borebench-{}-4-", std::process::id())));
    }

    #[test]
    fn run_worker_appends_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("w.out");
        run_worker(2, 1000, &out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert_eq!(parse_worker_line(&text).map(|(id, _)| id), Some(2));
    }

    #[test]
    fn zero_workers_is_an_error() {
        let plan = FanoutPlan { workers: 0, work: 1 };
        assert!(run_fanout(Path::new("/nonexistent"), &plan, 1).is_err());
    }
}
