// BOREBENCH RUN CONFIGURATION
// BUILT ONCE AT STARTUP, NEVER MUTATED, PASSED BY REFERENCE TO EVERY STAGE.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::artifact::ArtifactName;
use crate::detect::{Detection, SchedulerLabel};
use crate::suite::Suite;

pub const RESULTS_ENV: &str = "BOREBENCH_RESULTS";
pub const DEFAULT_RESULTS_DIR: &str = "results";

pub const DEFAULT_REPETITIONS: u32 = 5;
pub const DEFAULT_PAUSE_SECS: u64 = 3;
pub const DEFAULT_STRESS_SECS: u64 = 30;
pub const DEFAULT_LATENCY_LOOPS: u64 = 10_000;
pub const DEFAULT_FAIRNESS_WORKERS: usize = 8;
// SUM-OF-SQUARES TERMS PER FAIRNESS WORKER (~1S ON A MODERN CORE)
pub const DEFAULT_FAIRNESS_WORK: u64 = 400_000_000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunMode {
    // EACH SCENARIO ONCE; FIRST FAILURE ABORTS THE RUN
    Single,
    // EACH SCENARIO N TIMES; FAILED ITERATIONS ARE SKIPPED
    Repeated(u32),
}

impl RunMode {
    // AT LEAST ONE ITERATION
    pub fn repeated(n: u32) -> Self {
        Self::Repeated(n.max(1))
    }

    pub fn iterations(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Repeated(n) => n.max(1),
        }
    }

    pub fn is_repeated(self) -> bool {
        matches!(self, Self::Repeated(_))
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub suite: Suite,
    pub detection: Detection,
    pub timestamp: String,
    pub results_dir: PathBuf,
    pub mode: RunMode,
    pub pause: Duration,
    pub threads: usize,
    pub stress_secs: u64,
    pub latency_loops: u64,
    pub fairness_workers: usize,
    pub fairness_work: u64,
    // BINARY THAT SERVES THE HIDDEN `worker` SUBCOMMAND
    pub worker_exe: PathBuf,
}

impl BenchConfig {
    // DEFAULTS FOR THE GIVEN SUITE/LABEL; CALLERS OVERRIDE FIELDS BEFORE USE
    pub fn new(suite: Suite, detection: Detection, results_dir: &Path, worker_exe: &Path) -> Self {
        Self {
            suite,
            detection,
            timestamp: timestamp_now(),
            results_dir: results_dir.to_path_buf(),
            mode: RunMode::Repeated(DEFAULT_REPETITIONS),
            pause: Duration::from_secs(DEFAULT_PAUSE_SECS),
            threads: online_cpus(),
            stress_secs: DEFAULT_STRESS_SECS,
            latency_loops: DEFAULT_LATENCY_LOOPS,
            fairness_workers: DEFAULT_FAIRNESS_WORKERS,
            fairness_work: DEFAULT_FAIRNESS_WORK,
            worker_exe: worker_exe.to_path_buf(),
        }
    }

    pub fn label(&self) -> SchedulerLabel {
        self.detection.label
    }

    pub fn artifact_name(&self) -> ArtifactName {
        ArtifactName {
            suite: self.suite,
            label: self.label(),
            timestamp: self.timestamp.clone(),
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.results_dir.join(self.artifact_name().report_file())
    }

    pub fn log_path(&self) -> PathBuf {
        self.results_dir.join(self.artifact_name().log_file())
    }
}

pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn online_cpus() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
