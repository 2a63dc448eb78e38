// BOREBENCH RUN -- DETECT, CONFIGURE, EXECUTE ONE SUITE

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use borebench::config::{
    self, BenchConfig, RunMode, DEFAULT_FAIRNESS_WORK, DEFAULT_FAIRNESS_WORKERS,
    DEFAULT_LATENCY_LOOPS, DEFAULT_PAUSE_SECS, DEFAULT_REPETITIONS, DEFAULT_RESULTS_DIR,
    DEFAULT_STRESS_SECS,
};
use borebench::detect::{self, KernelSignals};
use borebench::process::{is_root, SystemExecutor};
use borebench::runner::Runner;
use borebench::suite::Suite;

use super::{status, Status};

fn parse_suite(s: &str) -> Result<Suite, String> {
    Suite::from_keyword(s).ok_or_else(|| format!("unknown suite {:?} (throughput | responsiveness)", s))
}

#[derive(Args)]
pub struct RunArgs {
    /// Benchmark suite: throughput | responsiveness
    #[arg(value_parser = parse_suite)]
    suite: Suite,

    /// Force the scheduler label (BORE, BORE_SCHEDULER, DEFAULT, EEVDF, CFS)
    #[arg(long, env = detect::OVERRIDE_ENV)]
    scheduler: Option<String>,

    /// Run every scenario once; the first failure aborts the run
    #[arg(long)]
    single: bool,

    /// Repetitions per scenario in repeated mode
    #[arg(long, default_value_t = DEFAULT_REPETITIONS)]
    repeat: u32,

    /// Stabilization pause before each repetition, in seconds
    #[arg(long, default_value_t = DEFAULT_PAUSE_SECS)]
    pause: u64,

    /// Directory for reports and logs
    #[arg(long, env = config::RESULTS_ENV, default_value = DEFAULT_RESULTS_DIR)]
    results: PathBuf,

    /// Thread/worker count passed to the tools (default: online CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Duration of timed stress-ng/sysbench scenarios, in seconds
    #[arg(long, default_value_t = DEFAULT_STRESS_SECS)]
    duration: u64,

    /// cyclictest loop count
    #[arg(long, default_value_t = DEFAULT_LATENCY_LOOPS)]
    loops: u64,

    /// Fairness fan-out width
    #[arg(long, default_value_t = DEFAULT_FAIRNESS_WORKERS)]
    workers: usize,

    /// Sum-of-squares terms per fairness worker
    #[arg(long, default_value_t = DEFAULT_FAIRNESS_WORK)]
    work: u64,
}

impl RunArgs {
    fn into_config(self) -> Result<BenchConfig> {
        let detection = detect::identify(&KernelSignals::probe(self.scheduler));
        let exe = std::env::current_exe().context("locating own executable for fan-out workers")?;

        let mut cfg = BenchConfig::new(self.suite, detection, &self.results, &exe);
        cfg.mode = if self.single { RunMode::Single } else { RunMode::repeated(self.repeat) };
        cfg.pause = Duration::from_secs(self.pause);
        if let Some(t) = self.threads {
            cfg.threads = t.max(1);
        }
        cfg.stress_secs = self.duration;
        cfg.latency_loops = self.loops;
        cfg.fairness_workers = self.workers;
        cfg.fairness_work = self.work;
        Ok(cfg)
    }
}

pub fn run_suite(args: RunArgs, shutdown: &AtomicBool) -> Result<()> {
    let cfg = args.into_config()?;

    println!("BOREBENCH v{}", env!("CARGO_PKG_VERSION"));
    println!("SUITE:           {}", cfg.suite);
    println!("SCHEDULER:       {} (via {})", cfg.label(), cfg.detection.method);
    println!("MODE:            {}", match cfg.mode {
        RunMode::Single => "SINGLE PASS".to_string(),
        RunMode::Repeated(n) => format!("REPEATED x{} ({}s PAUSE)", n, cfg.pause.as_secs()),
    });
    println!("THREADS:         {}", cfg.threads);
    println!("RESULTS:         {}", cfg.results_dir.display());
    println!();

    if cfg.suite == Suite::Responsiveness && !is_root() {
        status(Status::Warn, "NOT ROOT: cyclictest cannot use RT priority, latencies will be pessimistic");
    }

    let mut runner = Runner::new(&cfg, SystemExecutor, shutdown);
    let summary = runner.run()?;

    println!();
    for o in &summary.outcomes {
        let msg = format!("TEST {}: {}/{} ITERATIONS SUCCEEDED", o.number, o.successes, o.attempts);
        if o.successes == o.attempts {
            status(Status::Ok, &msg);
        } else if o.successes > 0 {
            status(Status::Warn, &msg);
        } else {
            status(Status::Fail, &msg);
        }
    }
    println!();
    println!("REPORT:          {}", summary.report_path.display());
    println!("LOG:             {}", summary.log_path.display());
    Ok(())
}
