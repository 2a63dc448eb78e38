// BOREBENCH RESULT ARTIFACTS
// <category>_<LABEL>_<YYYYmmdd_HHMMSS>.txt   REPORT (PARSED BY `compare`)
// <category>_<LABEL>_<YYYYmmdd_HHMMSS>.log   DIAGNOSTIC LOG (RAW TOOL OUTPUT)
//
// REPORT SECTIONS START WITH THE LITERAL "TEST <n>:" MARKER.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::detect::SchedulerLabel;
use crate::suite::Suite;

pub const REPORT_EXT: &str = "txt";
pub const LOG_EXT: &str = "log";

pub fn section_marker(number: u32) -> String {
    format!("TEST {}:", number)
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ArtifactName {
    pub suite: Suite,
    pub label: SchedulerLabel,
    pub timestamp: String,
}

impl ArtifactName {
    pub fn stem(&self) -> String {
        format!("{}_{}_{}", self.suite.category(), self.label, self.timestamp)
    }

    pub fn report_file(&self) -> String {
        format!("{}.{}", self.stem(), REPORT_EXT)
    }

    pub fn log_file(&self) -> String {
        format!("{}.{}", self.stem(), LOG_EXT)
    }

    // STRICT PARSE OF A REPORT FILENAME. USED FOR AUTO-SELECTION.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(&format!(".{}", REPORT_EXT))?;
        let (category, rest) = stem.split_once('_')?;
        let suite = Suite::from_keyword(category)?;
        let (label, timestamp) = rest.split_once('_')?;
        let label = match label {
            "BORE" => SchedulerLabel::Bore,
            "DEFAULT" => SchedulerLabel::Default,
            _ => return None,
        };
        if timestamp.is_empty() {
            return None;
        }
        Some(Self { suite, label, timestamp: timestamp.to_string() })
    }
}

// LABEL FROM AN ARBITRARY PATH (SUBSTRING MATCH, FOR HAND-NAMED FILES)
pub fn label_from_filename(path: &Path) -> Option<SchedulerLabel> {
    let name = path.file_name()?.to_string_lossy().to_ascii_uppercase();
    if name.contains("_BORE_") || name.starts_with("BORE_") {
        Some(SchedulerLabel::Bore)
    } else if name.contains("_DEFAULT_") || name.starts_with("DEFAULT_") {
        Some(SchedulerLabel::Default)
    } else {
        None
    }
}

// REPORT PLUS DIAGNOSTIC LOG FOR ONE RUN. BOTH FILES ARE NEW PER RUN.
pub struct Artifact {
    report_path: PathBuf,
    log_path: PathBuf,
    report: File,
    log: File,
}

impl Artifact {
    pub fn create(report_path: &Path, log_path: &Path) -> Result<Self> {
        if let Some(dir) = report_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating results directory {}", dir.display()))?;
        }
        // NEVER APPEND TO AN EARLIER RUN'S FILES
        let open = |p: &Path| -> Result<File> {
            match OpenOptions::new().write(true).create_new(true).open(p) {
                Ok(f) => Ok(f),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    bail!("ARTIFACT ALREADY EXISTS: {}", p.display())
                }
                Err(e) => Err(e).with_context(|| format!("creating {}", p.display())),
            }
        };
        Ok(Self {
            report: open(report_path)?,
            log: open(log_path)?,
            report_path: report_path.to_path_buf(),
            log_path: log_path.to_path_buf(),
        })
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.report, "{}", text)
            .with_context(|| format!("writing {}", self.report_path.display()))
    }

    pub fn section(&mut self, number: u32, title: &str) -> Result<()> {
        self.line(&format!("{} {}", section_marker(number), title))
    }

    pub fn log(&mut self, text: &str) -> Result<()> {
        writeln!(self.log, "{}", text)
            .with_context(|| format!("writing {}", self.log_path.display()))
    }
}
