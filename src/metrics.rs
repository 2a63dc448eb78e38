// BOREBENCH METRIC TABLE
// ONE ROW PER METRIC: REPORT LABELS, POLARITY, EXTRACTION PATTERNS.
// THE RUNNER WRITES THE LABELS, THE COMPARATOR READS THEM BACK WITH THE
// PATTERNS. ADDING A METRIC IS A TABLE CHANGE, NOT NEW CONTROL FLOW.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

impl Polarity {
    pub fn describe(self) -> &'static str {
        match self {
            Self::HigherIsBetter => "higher is better",
            Self::LowerIsBetter => "lower is better",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum MetricKind {
    Elapsed,
    BogoOps,
    EventsPerSec,
    LatencyMin,
    LatencyAvg,
    LatencyMax,
    CompletionMean,
    CompletionStddev,
    CompletionCv,
    WallTime,
}

pub struct MetricDef {
    pub kind: MetricKind,
    pub name: &'static str,
    pub polarity: Polarity,
    // LABEL WRITTEN IN SINGLE-PASS MODE
    pub single: &'static str,
    // LABEL WRITTEN IN REPEATED MODE
    pub repeated: &'static str,
    pub unit: &'static str,
    pub precision: usize,
    // TRIED IN ORDER, FIRST MATCH WINS. GROUP 1 IS THE VALUE.
    pub patterns: &'static [&'static str],
}

pub static METRICS: &[MetricDef] = &[
    MetricDef {
        kind: MetricKind::Elapsed,
        name: "elapsed time",
        polarity: Polarity::LowerIsBetter,
        single: "Time",
        repeated: "Average time",
        unit: "s",
        precision: 3,
        patterns: &[
            r"(?m)^Average time:\s*([0-9]+(?:\.[0-9]+)?)",
            r"(?m)^Time:\s*([0-9]+(?:\.[0-9]+)?)",
        ],
    },
    MetricDef {
        kind: MetricKind::BogoOps,
        name: "bogo ops/s",
        polarity: Polarity::HigherIsBetter,
        single: "Bogo ops/s",
        repeated: "Average bogo ops/s",
        unit: "",
        precision: 2,
        patterns: &[
            r"(?m)^Average bogo ops/s:\s*([0-9]+(?:\.[0-9]+)?)",
            r"(?m)^Bogo ops/s:\s*([0-9]+(?:\.[0-9]+)?)",
            // RAW stress-ng --metrics-brief ROW: bogo ops/s (real time) COLUMN
            r"(?m)\]\s+[a-z-]+\s+\d+\s+[0-9.]+\s+[0-9.]+\s+[0-9.]+\s+([0-9]+(?:\.[0-9]+)?)",
        ],
    },
    MetricDef {
        kind: MetricKind::EventsPerSec,
        name: "events per second",
        polarity: Polarity::HigherIsBetter,
        single: "Events per second",
        repeated: "Average events per second",
        unit: "",
        precision: 2,
        patterns: &[
            r"(?m)^Average events per second:\s*([0-9]+(?:\.[0-9]+)?)",
            r"(?mi)^\s*events per second:\s*([0-9]+(?:\.[0-9]+)?)",
        ],
    },
    MetricDef {
        kind: MetricKind::LatencyMin,
        name: "min wake-up latency",
        polarity: Polarity::LowerIsBetter,
        single: "Min latency",
        repeated: "Average min latency",
        unit: " us",
        precision: 2,
        patterns: &[
            r"(?m)^Average min latency:\s*([0-9]+(?:\.[0-9]+)?)",
            r"(?m)^Min latency:\s*([0-9]+(?:\.[0-9]+)?)",
        ],
    },
    MetricDef {
        kind: MetricKind::LatencyAvg,
        name: "avg wake-up latency",
        polarity: Polarity::LowerIsBetter,
        single: "Avg latency",
        repeated: "Average avg latency",
        unit: " us",
        precision: 2,
        patterns: &[
            r"(?m)^Average avg latency:\s*([0-9]+(?:\.[0-9]+)?)",
            r"(?m)^Avg latency:\s*([0-9]+(?:\.[0-9]+)?)",
        ],
    },
    MetricDef {
        kind: MetricKind::LatencyMax,
        name: "max wake-up latency",
        polarity: Polarity::LowerIsBetter,
        single: "Max latency",
        repeated: "Average max latency",
        unit: " us",
        precision: 2,
        patterns: &[
            r"(?m)^Average max latency:\s*([0-9]+(?:\.[0-9]+)?)",
            r"(?m)^Max latency:\s*([0-9]+(?:\.[0-9]+)?)",
        ],
    },
    MetricDef {
        kind: MetricKind::CompletionMean,
        name: "mean completion time",
        polarity: Polarity::LowerIsBetter,
        single: "Average execution time",
        repeated: "Average execution time",
        unit: "s",
        precision: 6,
        patterns: &[r"(?m)^Average execution time:\s*([0-9]+(?:\.[0-9]+)?)"],
    },
    MetricDef {
        kind: MetricKind::CompletionStddev,
        name: "completion time std deviation",
        polarity: Polarity::LowerIsBetter,
        single: "Standard deviation",
        repeated: "Standard deviation",
        unit: "s",
        precision: 6,
        patterns: &[r"(?m)^Standard deviation:\s*([0-9]+(?:\.[0-9]+)?)"],
    },
    MetricDef {
        kind: MetricKind::CompletionCv,
        name: "coefficient of variation",
        polarity: Polarity::LowerIsBetter,
        single: "Coefficient of variation",
        repeated: "Coefficient of variation",
        unit: "%",
        precision: 2,
        patterns: &[r"(?m)^Coefficient of variation:\s*([0-9]+(?:\.[0-9]+)?)"],
    },
    MetricDef {
        kind: MetricKind::WallTime,
        name: "wall time",
        polarity: Polarity::LowerIsBetter,
        single: "Wall time",
        repeated: "Average wall time",
        unit: "s",
        precision: 3,
        patterns: &[
            r"(?m)^Average wall time:\s*([0-9]+(?:\.[0-9]+)?)",
            r"(?m)^Wall time:\s*([0-9]+(?:\.[0-9]+)?)",
        ],
    },
];

// COMPILED ONCE, SAME ORDER AS METRICS
static COMPILED: LazyLock<Vec<Vec<Regex>>> = LazyLock::new(|| {
    METRICS
        .iter()
        .map(|d| {
            d.patterns
                .iter()
                .map(|p| Regex::new(p).expect("static metric pattern"))
                .collect()
        })
        .collect()
});

impl MetricKind {
    pub fn def(self) -> &'static MetricDef {
        // EVERY VARIANT HAS EXACTLY ONE ROW
        METRICS
            .iter()
            .find(|d| d.kind == self)
            .unwrap_or_else(|| unreachable!("metric {:?} missing from table", self))
    }

    pub fn polarity(self) -> Polarity {
        self.def().polarity
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    // FORMAT ONE REPORT LINE FOR THIS METRIC
    pub fn report_line(self, value: f64, repeated: bool) -> String {
        let d = self.def();
        let label = if repeated { d.repeated } else { d.single };
        format!("{}: {:.*}{}", label, d.precision, value, d.unit)
    }

    // FIRST MATCHING PATTERN WINS; LATER PATTERNS ARE NOT CONSULTED
    pub fn extract(self, text: &str) -> Option<f64> {
        let idx = METRICS.iter().position(|d| d.kind == self)?;
        COMPILED[idx]
            .iter()
            .find_map(|re| re.captures(text))
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    }
}

// WHICH SIDE WINS, FROM RAW VALUES ONLY
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Winner {
    Candidate,
    Baseline,
    Tie,
}

pub fn winner(polarity: Polarity, candidate: f64, baseline: f64) -> Winner {
    if candidate == baseline {
        return Winner::Tie;
    }
    let candidate_higher = candidate > baseline;
    match (polarity, candidate_higher) {
        (Polarity::HigherIsBetter, true) | (Polarity::LowerIsBetter, false) => Winner::Candidate,
        _ => Winner::Baseline,
    }
}
