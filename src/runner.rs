// BOREBENCH RUNNER
// EXECUTES A SUITE'S SCENARIOS IN ORDER AND APPENDS ONE "TEST <n>:" BLOCK
// PER SCENARIO TO THE REPORT. RAW TOOL OUTPUT GOES TO THE DIAGNOSTIC LOG.
//
// SINGLE MODE:   ONE PASS, FIRST FAILING SCENARIO ABORTS THE RUN.
// REPEATED MODE: N PASSES WITH A STABILIZATION PAUSE BEFORE EACH; FAILED
//                ITERATIONS ARE SKIPPED AND EXCLUDED FROM THE AVERAGES.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};

use crate::artifact::Artifact;
use crate::config::{BenchConfig, RunMode};
use crate::metrics::MetricKind;
use crate::process::ProcGuard;
use crate::stats::{self, Spread};
use crate::suite::{FanoutPlan, Scenario, ToolCommand, Workload};

// COMBINED OUTPUT AND TIMING OF ONE FOREGROUND COMMAND
#[derive(Clone, Debug)]
pub struct Captured {
    pub success: bool,
    pub code: Option<i32>,
    pub output: String,
    pub elapsed: Duration,
}

// BACKGROUND LOAD, KILLED WHEN DROPPED
pub struct Background {
    _guard: Option<ProcGuard>,
}

impl Background {
    pub fn new(guard: ProcGuard) -> Self {
        Self { _guard: Some(guard) }
    }

    pub fn none() -> Self {
        Self { _guard: None }
    }
}

// THE SEAM BETWEEN SCENARIO LOGIC AND THE HOST. SystemExecutor IN
// process.rs RUNS REAL BINARIES; TESTS SCRIPT THEIR OWN.
pub trait Executor {
    fn has_tool(&self, program: &str) -> bool;
    fn run(&mut self, cmd: &ToolCommand) -> Result<Captured>;
    fn start_background(&mut self, cmd: &ToolCommand) -> Result<Background>;
    fn fanout(&mut self, worker_exe: &Path, plan: &FanoutPlan, iteration: u32) -> Result<Vec<f64>>;
    fn settle(&mut self, pause: Duration);
}

pub fn install_hint(tool: &str) -> &'static str {
    match tool {
        "cyclictest" => "install rt-tests (e.g. pacman -S rt-tests / apt install rt-tests)",
        "hackbench" => "install rt-tests (hackbench ships with it on most distributions)",
        "stress-ng" => "install stress-ng (e.g. pacman -S stress-ng / apt install stress-ng)",
        "sysbench" => "install sysbench (e.g. pacman -S sysbench / apt install sysbench)",
        _ => "install it with your package manager",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioOutcome {
    pub number: u32,
    pub attempts: u32,
    pub successes: u32,
}

#[derive(Debug)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub log_path: PathBuf,
    pub outcomes: Vec<ScenarioOutcome>,
}

struct Iteration {
    metrics: Vec<(MetricKind, f64)>,
    wall: Duration,
    worker_times: Vec<f64>,
}

pub struct Runner<'a, E: Executor> {
    cfg: &'a BenchConfig,
    exec: E,
    shutdown: &'a AtomicBool,
}

impl<'a, E: Executor> Runner<'a, E> {
    pub fn new(cfg: &'a BenchConfig, exec: E, shutdown: &'a AtomicBool) -> Self {
        Self { cfg, exec, shutdown }
    }

    // EVERY REQUIRED TOOL MUST BE PRESENT BEFORE ANY ARTIFACT EXISTS
    pub fn preflight(&self) -> Result<()> {
        let missing: Vec<&str> = self
            .cfg
            .suite
            .required_tools()
            .iter()
            .copied()
            .filter(|t| !self.exec.has_tool(t))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        for t in &missing {
            log::error!("MISSING TOOL {}: {}", t, install_hint(t));
        }
        bail!("MISSING REQUIRED TOOLS: {}", missing.join(", "))
    }

    pub fn run(&mut self) -> Result<RunSummary> {
        self.preflight()?;

        let cfg = self.cfg;
        let mut art = Artifact::create(&cfg.report_path(), &cfg.log_path())?;
        log::info!("WRITING {}", art.report_path().display());

        art.line(&"=".repeat(60))?;
        art.line(&format!("BOREBENCH {} BENCHMARK", cfg.suite.category().to_uppercase()))?;
        art.line(&"=".repeat(60))?;
        art.line(&format!("Scheduler: {}", cfg.label()))?;
        art.line(&format!("Detected via: {}", cfg.detection.method))?;
        art.line(&format!("Timestamp: {}", cfg.timestamp))?;
        art.line(&format!("CPUs: {}", cfg.threads))?;
        art.line(&match cfg.mode {
            RunMode::Single => "Mode: single pass".to_string(),
            RunMode::Repeated(_) => format!(
                "Mode: repeated ({} iterations, {}s pause)",
                cfg.mode.iterations(),
                cfg.pause.as_secs()
            ),
        })?;
        art.line("")?;

        let mut outcomes = Vec::new();
        for scenario in cfg.suite.plan(cfg) {
            self.check_shutdown()?;
            println!("TEST {}: {}", scenario.decl.number, scenario.decl.title);
            outcomes.push(self.run_scenario(&mut art, &scenario)?);
        }

        art.line(&"=".repeat(60))?;
        Ok(RunSummary {
            report_path: art.report_path().to_path_buf(),
            log_path: art.log_path().to_path_buf(),
            outcomes,
        })
    }

    fn check_shutdown(&self) -> Result<()> {
        if self.shutdown.load(Ordering::Relaxed) {
            bail!("INTERRUPTED");
        }
        Ok(())
    }

    fn run_scenario(&mut self, art: &mut Artifact, scenario: &Scenario) -> Result<ScenarioOutcome> {
        let decl = scenario.decl;
        let mode = self.cfg.mode;
        art.section(decl.number, decl.title)?;
        match &scenario.workload {
            Workload::Tool { command, background, .. } => {
                art.line(&format!("Command: {}", command))?;
                if let Some(bg) = background {
                    art.line(&format!("Background load: {}", bg))?;
                }
            }
            Workload::Fanout(plan) => {
                art.line(&format!(
                    "Command: {} worker x{} (sum of squares, {} terms)",
                    self.cfg.worker_exe.display(),
                    plan.workers,
                    plan.work
                ))?;
            }
        }

        let attempts = mode.iterations();
        let mut done: Vec<Iteration> = Vec::new();
        for i in 1..=attempts {
            self.check_shutdown()?;
            if mode.is_repeated() {
                self.exec.settle(self.cfg.pause);
            }
            art.log(&format!("=== TEST {} ITERATION {}/{} ===", decl.number, i, attempts))?;
            let result = self.iterate(art, &scenario.workload, i);
            self.check_shutdown()?;
            match result {
                Ok(it) => {
                    println!("  ITERATION {}/{}: OK ({:.2}s)", i, attempts, it.wall.as_secs_f64());
                    done.push(it);
                }
                Err(e) => {
                    println!("  ITERATION {}/{}: FAILED", i, attempts);
                    art.log(&format!("FAILED: {:#}", e))?;
                    if mode == RunMode::Single {
                        art.line(&format!("Status: FAILED ({:#})", e))?;
                        art.line("")?;
                        return Err(e.context(format!("TEST {} FAILED", decl.number)));
                    }
                    log::warn!("TEST {} ITERATION {} SKIPPED: {:#}", decl.number, i, e);
                }
            }
        }

        write_results(art, mode, &done, attempts)?;
        Ok(ScenarioOutcome {
            number: decl.number,
            attempts,
            successes: done.len() as u32,
        })
    }

    fn iterate(&mut self, art: &mut Artifact, workload: &Workload, i: u32) -> Result<Iteration> {
        match workload {
            Workload::Tool { command, probe, background } => {
                let bg = match background {
                    Some(b) => self.exec.start_background(b)?,
                    None => Background::none(),
                };
                let captured = self.exec.run(command);
                // STOP THE LOAD BEFORE ANYTHING ELSE
                drop(bg);
                let captured = captured?;

                art.log(&format!("$ {}", command))?;
                art.log(&format!("EXIT: {:?}  ELAPSED: {:.3}s", captured.code, captured.elapsed.as_secs_f64()))?;
                art.log(captured.output.trim_end())?;

                if !captured.success {
                    return Err(anyhow!(
                        "{} exited with {}",
                        command.program,
                        captured.code.map_or("signal".to_string(), |c| c.to_string())
                    ));
                }

                let metrics = probe.extract(&captured.output);
                if metrics.is_empty() {
                    log::warn!("COULD NOT EXTRACT METRICS FROM {} OUTPUT", command.program);
                    art.log("WARNING: no metric marker found in output")?;
                }
                Ok(Iteration { metrics, wall: captured.elapsed, worker_times: Vec::new() })
            }
            Workload::Fanout(plan) => {
                let start = std::time::Instant::now();
                let times = self.exec.fanout(&self.cfg.worker_exe, plan, i)?;
                let wall = start.elapsed();
                let spread = Spread::of(&times).ok_or_else(|| anyhow!("fan-out returned no times"))?;
                for (id, t) in times.iter().enumerate() {
                    art.log(&format!("WORKER {} ELAPSED {:.6}", id, t))?;
                }
                Ok(Iteration {
                    metrics: vec![
                        (MetricKind::CompletionMean, spread.mean),
                        (MetricKind::CompletionStddev, spread.stddev),
                        (MetricKind::CompletionCv, spread.cv_pct),
                    ],
                    wall,
                    worker_times: times,
                })
            }
        }
    }
}

// GROUP VALUES BY METRIC, KEEPING FIRST-SEEN ORDER
fn collect_metrics(done: &[Iteration]) -> Vec<(MetricKind, Vec<f64>)> {
    let mut out: Vec<(MetricKind, Vec<f64>)> = Vec::new();
    for it in done {
        for &(kind, v) in &it.metrics {
            match out.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, vals)) => vals.push(v),
                None => out.push((kind, vec![v])),
            }
        }
    }
    out
}

fn write_results(art: &mut Artifact, mode: RunMode, done: &[Iteration], attempts: u32) -> Result<()> {
    let repeated = mode.is_repeated();
    if repeated {
        art.line(&format!("Successful iterations: {}/{}", done.len(), attempts))?;
    }
    if done.is_empty() {
        art.line("Status: FAILED")?;
        art.line("")?;
        return Ok(());
    }

    // METRIC LINES FIRST: THE COMPARATOR ONLY READS A BOUNDED WINDOW
    for (kind, vals) in collect_metrics(done) {
        if let Some(m) = stats::mean(&vals) {
            art.line(&kind.report_line(m, repeated))?;
        }
    }
    let walls: Vec<f64> = done.iter().map(|it| it.wall.as_secs_f64()).collect();
    if let Some(m) = stats::mean(&walls) {
        art.line(&MetricKind::WallTime.report_line(m, repeated))?;
    }
    if !repeated {
        for (id, t) in done[0].worker_times.iter().enumerate() {
            art.line(&format!("Worker {}: {:.6}s", id + 1, t))?;
        }
    }
    art.line("Status: OK")?;
    art.line("")?;
    Ok(())
}
