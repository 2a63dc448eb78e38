// BOREBENCH SUITES
// STATIC SCENARIO DECLARATIONS (NUMBER, TITLE, REPORTED METRICS) PLUS
// THE CONCRETE WORKLOAD EACH ONE RUNS FOR A GIVEN CONFIGURATION.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::BenchConfig;
use crate::metrics::MetricKind;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Suite {
    Throughput,
    Responsiveness,
}

impl Suite {
    pub const ALL: [Suite; 2] = [Suite::Throughput, Suite::Responsiveness];

    pub fn category(self) -> &'static str {
        match self {
            Self::Throughput => "throughput",
            Self::Responsiveness => "responsiveness",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|suite| suite.category().eq_ignore_ascii_case(s.trim()))
    }

    // CATEGORY IS INFERRED FROM A FILENAME SUBSTRING
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|suite| lower.contains(suite.category()))
    }

    pub fn scenarios(self) -> &'static [ScenarioDecl] {
        match self {
            Self::Throughput => &THROUGHPUT,
            Self::Responsiveness => &RESPONSIVENESS,
        }
    }

    // EXTERNAL PROGRAMS THIS SUITE NEEDS ON PATH
    pub fn required_tools(self) -> &'static [&'static str] {
        match self {
            Self::Throughput => &["hackbench", "stress-ng", "sysbench"],
            Self::Responsiveness => &["cyclictest", "stress-ng", "hackbench"],
        }
    }

    // BUILD THE CONCRETE WORKLOADS, IN DECLARATION ORDER
    pub fn plan(self, cfg: &BenchConfig) -> Vec<Scenario> {
        self.scenarios()
            .iter()
            .map(|decl| Scenario { decl, workload: workload_for(self, decl.number, cfg) })
            .collect()
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

pub struct ScenarioDecl {
    pub number: u32,
    pub title: &'static str,
    // METRICS THE COMPARATOR LOOKS FOR IN THIS SECTION
    pub metrics: &'static [MetricKind],
}

const LATENCY: &[MetricKind] = &[MetricKind::LatencyMin, MetricKind::LatencyAvg, MetricKind::LatencyMax];

static THROUGHPUT: [ScenarioDecl; 5] = [
    ScenarioDecl {
        number: 1,
        title: "Fairness (equal CPU-bound workers)",
        metrics: &[MetricKind::CompletionMean, MetricKind::CompletionStddev],
    },
    ScenarioDecl {
        number: 2,
        title: "hackbench (50 groups / 1000 loops / 512-byte messages, pipes)",
        metrics: &[MetricKind::Elapsed],
    },
    ScenarioDecl {
        number: 3,
        title: "CPU stress (stress-ng matrixprod)",
        metrics: &[MetricKind::BogoOps],
    },
    ScenarioDecl {
        number: 4,
        title: "Sustained CPU throughput (sysbench cpu)",
        metrics: &[MetricKind::EventsPerSec],
    },
    ScenarioDecl {
        number: 5,
        title: "Context switching (stress-ng switch)",
        metrics: &[MetricKind::BogoOps],
    },
];

static RESPONSIVENESS: [ScenarioDecl; 4] = [
    ScenarioDecl { number: 1, title: "Wake-up latency, idle system (cyclictest)", metrics: LATENCY },
    ScenarioDecl { number: 2, title: "Wake-up latency under CPU load (cyclictest + stress-ng)", metrics: LATENCY },
    ScenarioDecl {
        number: 3,
        title: "Interactive completion under CPU load (hackbench + stress-ng)",
        metrics: &[MetricKind::Elapsed],
    },
    ScenarioDecl { number: 4, title: "Wake-up latency under IPC load (cyclictest + hackbench)", metrics: LATENCY },
];

// ONE EXTERNAL COMMAND LINE
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { program: program.to_string(), args: args.into_iter().map(Into::into).collect() }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {}", a)?;
        }
        Ok(())
    }
}

// EQUAL CPU-BOUND WORKERS LAUNCHED TOGETHER
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FanoutPlan {
    pub workers: usize,
    pub work: u64,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Workload {
    Tool {
        command: ToolCommand,
        probe: Probe,
        background: Option<ToolCommand>,
    },
    Fanout(FanoutPlan),
}

pub struct Scenario {
    pub decl: &'static ScenarioDecl,
    pub workload: Workload,
}

fn cyclictest(cfg: &BenchConfig) -> ToolCommand {
    ToolCommand::new("cyclictest", [
        "-t".to_string(), cfg.threads.to_string(),
        "-p".to_string(), "80".to_string(),
        "-i".to_string(), "1000".to_string(),
        "-l".to_string(), cfg.latency_loops.to_string(),
        "-m".to_string(),
        "-q".to_string(),
    ])
}

fn cpu_load(cfg: &BenchConfig) -> ToolCommand {
    ToolCommand::new("stress-ng", [
        "--cpu".to_string(), cfg.threads.to_string(),
        "--timeout".to_string(), "600s".to_string(),
    ])
}

fn workload_for(suite: Suite, number: u32, cfg: &BenchConfig) -> Workload {
    let n = cfg.threads.to_string();
    let secs = format!("{}s", cfg.stress_secs);
    let tool = |command, probe| Workload::Tool { command, probe, background: None };

    match (suite, number) {
        (Suite::Throughput, 1) => Workload::Fanout(FanoutPlan {
            workers: cfg.fairness_workers,
            work: cfg.fairness_work,
        }),
        (Suite::Throughput, 2) => tool(
            ToolCommand::new("hackbench", ["-g", "50", "-l", "1000", "-s", "512", "-p"]),
            Probe::Hackbench,
        ),
        (Suite::Throughput, 3) => tool(
            ToolCommand::new("stress-ng", [
                "--cpu", n.as_str(), "--cpu-load", "100", "--cpu-method", "matrixprod",
                "--timeout", secs.as_str(), "--metrics-brief",
            ]),
            Probe::StressNg("cpu"),
        ),
        (Suite::Throughput, 4) => tool(
            ToolCommand::new("sysbench", [
                "cpu".to_string(),
                format!("--threads={}", n),
                "--cpu-max-prime=20000".to_string(),
                format!("--time={}", cfg.stress_secs),
                "run".to_string(),
            ]),
            Probe::Sysbench,
        ),
        (Suite::Throughput, _) => tool(
            ToolCommand::new("stress-ng", ["--switch", n.as_str(), "--timeout", secs.as_str(), "--metrics-brief"]),
            Probe::StressNg("switch"),
        ),
        (Suite::Responsiveness, 1) => tool(cyclictest(cfg), Probe::Cyclictest),
        (Suite::Responsiveness, 2) => Workload::Tool {
            command: cyclictest(cfg),
            probe: Probe::Cyclictest,
            background: Some(cpu_load(cfg)),
        },
        (Suite::Responsiveness, 3) => Workload::Tool {
            command: ToolCommand::new("hackbench", ["-g", "10", "-l", "500", "-s", "128", "-p"]),
            probe: Probe::Hackbench,
            background: Some(cpu_load(cfg)),
        },
        (Suite::Responsiveness, _) => Workload::Tool {
            command: cyclictest(cfg),
            probe: Probe::Cyclictest,
            background: Some(ToolCommand::new("hackbench", ["-g", "20", "-l", "1000000", "-s", "100", "-p"])),
        },
    }
}

// ---------------------------------------------------------------------------
// RAW TOOL OUTPUT PARSERS
// ---------------------------------------------------------------------------

static HACKBENCH_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Time:\s*([0-9]+(?:\.[0-9]+)?)").expect("static regex"));
static SYSBENCH_EPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"events per second:\s*([0-9]+(?:\.[0-9]+)?)").expect("static regex"));
static CYCLICTEST_THREAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Min:\s*(\d+)\s+Act:\s*\d+\s+Avg:\s*(\d+)\s+Max:\s*(\d+)").expect("static regex")
});

// HOW TO PULL METRICS OUT OF ONE TOOL'S COMBINED OUTPUT
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Probe {
    Hackbench,
    StressNg(&'static str),
    Sysbench,
    Cyclictest,
}

impl Probe {
    // EMPTY RESULT MEANS THE MARKER LINE WAS NOT FOUND
    pub fn extract(self, output: &str) -> Vec<(MetricKind, f64)> {
        match self {
            Self::Hackbench => capture_f64(&HACKBENCH_TIME, output)
                .map(|v| vec![(MetricKind::Elapsed, v)])
                .unwrap_or_default(),
            Self::Sysbench => capture_f64(&SYSBENCH_EPS, output)
                .map(|v| vec![(MetricKind::EventsPerSec, v)])
                .unwrap_or_default(),
            Self::StressNg(stressor) => stress_ng_bogo_ops(stressor, output)
                .map(|v| vec![(MetricKind::BogoOps, v)])
                .unwrap_or_default(),
            Self::Cyclictest => cyclictest_latency(output),
        }
    }
}

fn capture_f64(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

// stress-ng --metrics-brief ROW:
//   stress-ng: metrc: [PID] <stressor> <bogo ops> <real> <usr> <sys> <bogo ops/s real> <bogo ops/s usr+sys>
fn stress_ng_bogo_ops(stressor: &str, output: &str) -> Option<f64> {
    let pattern = format!(
        r"(?m)\]\s+{}\s+\d+\s+[0-9.]+\s+[0-9.]+\s+[0-9.]+\s+([0-9]+(?:\.[0-9]+)?)",
        regex::escape(stressor)
    );
    let re = Regex::new(&pattern).ok()?;
    capture_f64(&re, output)
}

// ONE LINE PER MEASUREMENT THREAD. MIN OF MINS, MEAN OF AVGS, MAX OF MAXES.
fn cyclictest_latency(output: &str) -> Vec<(MetricKind, f64)> {
    let mut mins = Vec::new();
    let mut avgs = Vec::new();
    let mut maxs = Vec::new();
    for c in CYCLICTEST_THREAD.captures_iter(output) {
        let field = |i: usize| c[i].parse::<f64>().ok();
        if let (Some(mn), Some(av), Some(mx)) = (field(1), field(2), field(3)) {
            mins.push(mn);
            avgs.push(av);
            maxs.push(mx);
        }
    }
    let Some(avg) = crate::stats::mean(&avgs) else {
        return Vec::new();
    };
    let min = mins.iter().copied().fold(f64::INFINITY, f64::min);
    let max = maxs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    vec![
        (MetricKind::LatencyMin, min),
        (MetricKind::LatencyAvg, avg),
        (MetricKind::LatencyMax, max),
    ]
}
