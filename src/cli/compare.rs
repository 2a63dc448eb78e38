// BOREBENCH COMPARE -- RESOLVE INPUTS, PRINT ONE COMPARISON PER PAIR

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use borebench::compare;
use borebench::config::{RESULTS_ENV, DEFAULT_RESULTS_DIR};

use super::{status, Status};

#[derive(Args)]
pub struct CompareArgs {
    /// Category keyword, a report path, or two report paths
    #[arg(num_args = 0..=2)]
    inputs: Vec<String>,

    /// Directory searched for the newest reports
    #[arg(long, env = RESULTS_ENV, default_value = DEFAULT_RESULTS_DIR)]
    results: PathBuf,
}

pub fn run_compare(args: CompareArgs) -> Result<()> {
    let pairs = compare::resolve(&args.inputs, &args.results)?;
    for (first, second) in pairs {
        let cmp = compare::compare_files(&first, &second)?;
        print!("{}", compare::render(&cmp));
        let warnings = cmp.warnings();
        for w in &warnings {
            log::warn!("{}", w);
        }
        if !warnings.is_empty() {
            status(Status::Warn, &format!("{} METRIC(S) COULD NOT BE EXTRACTED", warnings.len()));
        }
        println!();
    }
    Ok(())
}
