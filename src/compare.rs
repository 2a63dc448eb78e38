// BOREBENCH COMPARATOR
// PURE FUNCTION OVER TWO REPORTS: LOCATE EACH "TEST <n>:" SECTION BY ITS
// MARKER TEXT, EXTRACT THE SECTION'S METRICS, DIFF THEM.
//
// DIFF = (CANDIDATE - BASELINE) / BASELINE * 100, ROUNDED TO 2 DECIMALS.
// THE WINNER IS DECIDED FROM THE RAW VALUES AND THE METRIC'S POLARITY,
// NEVER FROM THE SIGN OF THE ROUNDED PERCENTAGE.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;

use crate::artifact::{label_from_filename, section_marker, ArtifactName};
use crate::detect::SchedulerLabel;
use crate::metrics::{winner, MetricKind, Winner};
use crate::stats::percent_diff;
use crate::suite::Suite;

// MAX LINES SCANNED AFTER A SECTION MARKER
pub const SECTION_WINDOW: usize = 40;

static ANY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TEST \d+:").expect("static regex"));

// BODY OF SECTION `number`: UP TO SECTION_WINDOW LINES AFTER ITS MARKER,
// CUT SHORT AT THE NEXT MARKER. None IF THE MARKER IS ABSENT.
pub fn section(text: &str, number: u32) -> Option<String> {
    let marker = section_marker(number);
    let mut lines = text.lines();
    lines.find(|l| l.trim_start().starts_with(&marker))?;
    let body: Vec<&str> = lines
        .take(SECTION_WINDOW)
        .take_while(|l| !ANY_MARKER.is_match(l.trim_start()))
        .collect();
    Some(body.join("\n"))
}

pub fn extract(text: &str, number: u32, kind: MetricKind) -> Option<f64> {
    kind.extract(&section(text, number)?)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Baseline,
    Candidate,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    Compared {
        test: u32,
        kind: MetricKind,
        baseline: f64,
        candidate: f64,
        percent: Option<f64>,
        winner: Winner,
    },
    Missing {
        test: u32,
        kind: MetricKind,
        sides: Vec<Side>,
    },
}

// EVERY METRIC OF EVERY DECLARED SCENARIO. A MISSING VALUE ONLY AFFECTS ITS OWN ROW.
pub fn compare_texts(suite: Suite, baseline: &str, candidate: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    for decl in suite.scenarios() {
        for &kind in decl.metrics {
            let b = extract(baseline, decl.number, kind);
            let c = extract(candidate, decl.number, kind);
            rows.push(match (b, c) {
                (Some(b), Some(c)) => Row::Compared {
                    test: decl.number,
                    kind,
                    baseline: b,
                    candidate: c,
                    percent: percent_diff(c, b),
                    winner: winner(kind.polarity(), c, b),
                },
                _ => {
                    let mut sides = Vec::new();
                    if b.is_none() {
                        sides.push(Side::Baseline);
                    }
                    if c.is_none() {
                        sides.push(Side::Candidate);
                    }
                    Row::Missing { test: decl.number, kind, sides }
                }
            });
        }
    }
    rows
}

#[derive(Clone, Debug)]
pub struct Input {
    pub path: PathBuf,
    pub label: Option<SchedulerLabel>,
}

impl Input {
    pub fn name(&self) -> String {
        match self.label {
            Some(l) => l.as_str().to_string(),
            None => self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Comparison {
    pub suite: Suite,
    pub baseline: Input,
    pub candidate: Input,
    pub rows: Vec<Row>,
}

impl Comparison {
    fn missing_message(&self, kind: MetricKind, sides: &[Side]) -> String {
        let names: Vec<String> = sides
            .iter()
            .map(|s| match s {
                Side::Baseline => self.baseline.name(),
                Side::Candidate => self.candidate.name(),
            })
            .collect();
        format!("could not extract {} from {}", kind.name(), names.join(" and "))
    }

    // ONE LINE PER METRIC MISSING FROM EITHER SIDE, IN ROW ORDER
    pub fn warnings(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                Row::Missing { test, kind, sides } => {
                    Some(format!("TEST {}: {}", test, self.missing_message(*kind, sides)))
                }
                Row::Compared { .. } => None,
            })
            .collect()
    }
}

pub fn category_of(path: &Path) -> Result<Suite> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Suite::from_filename(&name)
        .with_context(|| format!("CANNOT INFER BENCHMARK CATEGORY FROM {}", path.display()))
}

// VALIDATE, ORIENT (DEFAULT IS THE BASELINE WHEN LABELS DIFFER), COMPARE
pub fn compare_files(first: &Path, second: &Path) -> Result<Comparison> {
    for p in [first, second] {
        if !p.is_file() {
            bail!("FILE NOT FOUND: {}", p.display());
        }
    }
    let suite = category_of(first)?;
    let other = category_of(second)?;
    if suite != other {
        bail!(
            "CATEGORY MISMATCH: {} is {}, {} is {}",
            first.display(), suite, second.display(), other
        );
    }

    let a = Input { path: first.to_path_buf(), label: label_from_filename(first) };
    let b = Input { path: second.to_path_buf(), label: label_from_filename(second) };
    let (baseline, candidate) = match (a.label, b.label) {
        (Some(SchedulerLabel::Bore), Some(SchedulerLabel::Default)) => (b, a),
        _ => (a, b),
    };

    let read = |i: &Input| {
        std::fs::read_to_string(&i.path).with_context(|| format!("reading {}", i.path.display()))
    };
    let rows = compare_texts(suite, &read(&baseline)?, &read(&candidate)?);
    Ok(Comparison { suite, baseline, candidate, rows })
}

fn fmt_value(kind: MetricKind, v: f64) -> String {
    format!("{:.*}{}", kind.def().precision, v, kind.def().unit)
}

// DETERMINISTIC TEXT RENDERING. NO CLOCKS, NO ENVIRONMENT.
pub fn render(cmp: &Comparison) -> String {
    let b = cmp.baseline.name();
    let c = cmp.candidate.name();
    let mut out = Vec::new();
    out.push("=".repeat(60));
    out.push(format!("BOREBENCH COMPARISON: {}", cmp.suite.category().to_uppercase()));
    out.push("=".repeat(60));
    out.push(format!("BASELINE:  {:<8} {}", b, cmp.baseline.path.display()));
    out.push(format!("CANDIDATE: {:<8} {}", c, cmp.candidate.path.display()));
    out.push(format!("DIFF = ({} - {}) / {} * 100", c, b, b));

    let mut wins = (0usize, 0usize, 0usize);
    for decl in cmp.suite.scenarios() {
        out.push(String::new());
        out.push(format!("{} {}", section_marker(decl.number), decl.title));
        for row in cmp.rows.iter() {
            match row {
                Row::Compared { test, kind, baseline, candidate, percent, winner }
                    if *test == decl.number =>
                {
                    let verdict = match winner {
                        Winner::Candidate => {
                            wins.0 += 1;
                            format!("{} BETTER", c)
                        }
                        Winner::Baseline => {
                            wins.1 += 1;
                            format!("{} BETTER", b)
                        }
                        Winner::Tie => {
                            wins.2 += 1;
                            "EQUAL".to_string()
                        }
                    };
                    let pct = percent.map_or("n/a".to_string(), |p| format!("{:+.2}%", p));
                    out.push(format!("  {} ({})", kind.name(), kind.polarity().describe()));
                    out.push(format!(
                        "    {}: {}  {}: {}  DIFF: {}  -> {}",
                        b, fmt_value(*kind, *baseline),
                        c, fmt_value(*kind, *candidate),
                        pct, verdict
                    ));
                }
                Row::Missing { test, kind, sides } if *test == decl.number => {
                    out.push(format!("  WARNING: {}", cmp.missing_message(*kind, sides)));
                }
                _ => {}
            }
        }
    }

    out.push(String::new());
    out.push("=".repeat(60));
    out.push(format!(
        "SUMMARY: {} BETTER IN {}, {} BETTER IN {}, EQUAL IN {}",
        c, wins.0, b, wins.1, wins.2
    ));
    out.push("=".repeat(60));
    out.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// INPUT RESOLUTION
// ---------------------------------------------------------------------------

// NEWEST REPORT FOR (suite, label) BY THE TIMESTAMP IN ITS NAME
pub fn latest(dir: &Path, suite: Suite, label: SchedulerLabel) -> Result<Option<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("RESULTS DIRECTORY NOT READABLE: {}", dir.display()))?;
    let mut best: Option<(String, PathBuf)> = None;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(parsed) = ArtifactName::parse(&name) else {
            continue;
        };
        if parsed.suite != suite || parsed.label != label {
            continue;
        }
        let key = format!("{}|{}", parsed.timestamp, name);
        if best.as_ref().map_or(true, |(k, _)| key > *k) {
            best = Some((key, entry.path()));
        }
    }
    Ok(best.map(|(_, p)| p))
}

fn latest_pair(dir: &Path, suite: Suite) -> Result<Option<(PathBuf, PathBuf)>> {
    let d = latest(dir, suite, SchedulerLabel::Default)?;
    let b = latest(dir, suite, SchedulerLabel::Bore)?;
    Ok(d.zip(b))
}

// MAP 0/1/2 POSITIONAL ARGUMENTS TO THE PAIRS TO COMPARE
pub fn resolve(args: &[String], dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    match args {
        [] => {
            let mut pairs = Vec::new();
            for suite in Suite::ALL {
                if let Some(p) = latest_pair(dir, suite)? {
                    pairs.push(p);
                }
            }
            if pairs.is_empty() {
                bail!("NO BORE/DEFAULT RESULT PAIRS FOUND IN {}", dir.display());
            }
            Ok(pairs)
        }
        [one] => {
            if let Some(suite) = Suite::from_keyword(one) {
                return match latest_pair(dir, suite)? {
                    Some(p) => Ok(vec![p]),
                    None => bail!(
                        "NEED ONE BORE AND ONE DEFAULT {} RESULT IN {}",
                        suite, dir.display()
                    ),
                };
            }
            let path = PathBuf::from(one);
            if !path.is_file() {
                bail!("FILE NOT FOUND: {}", path.display());
            }
            let suite = category_of(&path)?;
            let label = label_from_filename(&path)
                .with_context(|| format!("CANNOT INFER SCHEDULER LABEL FROM {}", path.display()))?;
            let other = latest(dir, suite, label.opposite())?.with_context(|| {
                format!("NO {} {} RESULT IN {} TO COMPARE AGAINST", label.opposite(), suite, dir.display())
            })?;
            Ok(vec![(path, other)])
        }
        [a, b] => Ok(vec![(PathBuf::from(a), PathBuf::from(b))]),
        _ => bail!("EXPECTED AT MOST TWO ARGUMENTS"),
    }
}
