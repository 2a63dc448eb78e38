// BOREBENCH SCHEDULER IDENTIFIER
// ORDERED, FIRST-MATCH-WINS CLASSIFICATION OF THE RUNNING SCHEDULER.
//
//   1. EXPLICIT OVERRIDE (SCHEDULER ENV / --scheduler)
//   2. KERNEL BUILD CONFIG (/boot/config-<release>, /proc/config.gz)
//   3. KERNEL RELEASE STRING
//   4. FALLBACK: DEFAULT
//
// NOTHING HERE IS FATAL. A MISSING OR UNREADABLE SOURCE IS A NON-MATCH.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

pub const OVERRIDE_ENV: &str = "SCHEDULER";

const OSRELEASE_PATH: &str = "/proc/sys/kernel/osrelease";
const PROC_CONFIG_GZ: &str = "/proc/config.gz";

// SUBSTRINGS OF THE KERNEL RELEASE THAT SHIP BORE
const BORE_RELEASE_MARKERS: [&str; 2] = ["bore", "cachyos"];

static CONFIG_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^CONFIG_SCHED_(BORE|EEVDF)=y\b").expect("static regex")
});

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum SchedulerLabel {
    Bore,
    Default,
}

impl SchedulerLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bore => "BORE",
            Self::Default => "DEFAULT",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Bore => Self::Default,
            Self::Default => Self::Bore,
        }
    }

    // NORMALIZE AN OVERRIDE STRING. UNRECOGNIZED VALUES ARE None.
    pub fn from_override(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BORE" | "BORE_SCHEDULER" => Some(Self::Bore),
            "DEFAULT" | "EEVDF" | "CFS" => Some(Self::Default),
            _ => None,
        }
    }
}

impl fmt::Display for SchedulerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// WHICH RULE PRODUCED THE LABEL
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Method {
    Override(String),
    KernelConfig(PathBuf),
    KernelRelease(String),
    Fallback,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override(v) => write!(f, "override ({}={})", OVERRIDE_ENV, v),
            Self::KernelConfig(p) => write!(f, "kernel config ({})", p.display()),
            Self::KernelRelease(r) => write!(f, "kernel release ({})", r),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Detection {
    pub label: SchedulerLabel,
    pub method: Method,
}

// ONE KERNEL BUILD-CONFIG SOURCE, ALREADY DECODED
#[derive(Clone, Debug)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub contents: String,
}

// RAW KERNEL SIGNALS, GATHERED ONCE. EVERY FIELD IS OPTIONAL.
#[derive(Clone, Debug, Default)]
pub struct KernelSignals {
    pub override_value: Option<String>,
    pub configs: Vec<ConfigSource>,
    pub release: Option<String>,
}

impl KernelSignals {
    // READ THE LIVE SYSTEM. override_value COMES FROM THE CALLER (CLI/ENV).
    pub fn probe(override_value: Option<String>) -> Self {
        let release = std::fs::read_to_string(OSRELEASE_PATH)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut configs = Vec::new();
        if let Some(rel) = &release {
            let boot = PathBuf::from(format!("/boot/config-{}", rel));
            if let Ok(contents) = std::fs::read_to_string(&boot) {
                configs.push(ConfigSource { path: boot, contents });
            }
        }
        if let Some(contents) = read_gz(Path::new(PROC_CONFIG_GZ)) {
            configs.push(ConfigSource { path: PathBuf::from(PROC_CONFIG_GZ), contents });
        }

        Self { override_value, configs, release }
    }
}

fn read_gz(path: &Path) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    let mut decoder = flate2::read::GzDecoder::new(file);
    let mut out = String::new();
    decoder.read_to_string(&mut out).ok()?;
    Some(out)
}

// FIRST CONFIG LINE ENABLING BORE OR EEVDF, CASE-INSENSITIVE
pub fn scan_config(contents: &str) -> Option<SchedulerLabel> {
    contents.lines().find_map(|line| {
        CONFIG_MARKER.captures(line.trim()).map(|c| {
            if c[1].eq_ignore_ascii_case("bore") {
                SchedulerLabel::Bore
            } else {
                SchedulerLabel::Default
            }
        })
    })
}

pub fn release_mentions_bore(release: &str) -> bool {
    let lower = release.to_ascii_lowercase();
    BORE_RELEASE_MARKERS.iter().any(|m| lower.contains(m))
}

pub fn identify(signals: &KernelSignals) -> Detection {
    if let Some(raw) = &signals.override_value {
        if let Some(label) = SchedulerLabel::from_override(raw) {
            return Detection { label, method: Method::Override(raw.trim().to_string()) };
        }
        log::warn!("IGNORING UNRECOGNIZED {} VALUE {:?}", OVERRIDE_ENV, raw);
    }

    for cfg in &signals.configs {
        if let Some(label) = scan_config(&cfg.contents) {
            return Detection { label, method: Method::KernelConfig(cfg.path.clone()) };
        }
    }

    if let Some(rel) = &signals.release {
        if release_mentions_bore(rel) {
            return Detection {
                label: SchedulerLabel::Bore,
                method: Method::KernelRelease(rel.clone()),
            };
        }
    }

    Detection { label: SchedulerLabel::Default, method: Method::Fallback }
}
