// BOREBENCH -- BORE VS DEFAULT SCHEDULER BENCHMARK DRIVER
// RUNS THROUGHPUT/RESPONSIVENESS SUITES, WRITES REPORTS, COMPARES THEM.

mod cli;

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::{Parser, Subcommand};

use cli::Status;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

#[derive(Parser)]
#[command(name = "borebench")]
#[command(version)]
#[command(about = "BOREBENCH -- BORE VS DEFAULT SCHEDULER BENCHMARKS")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a benchmark suite and write a timestamped report
    Run(cli::run::RunArgs),

    /// Compare a BORE report against a DEFAULT report
    ///
    /// With no arguments, compares the newest pair of every category in
    /// the results directory. With a category keyword, the newest pair of
    /// that category. With one path, that report against the newest report
    /// of the opposite scheduler. With two paths, exactly those reports.
    #[command(verbatim_doc_comment)]
    Compare(cli::compare::CompareArgs),

    /// Show how the active scheduler is identified
    Detect(cli::detect::DetectArgs),

    /// Check that benchmark tools and kernel features are available
    Check,

    // FAIRNESS FAN-OUT CHILD, SPAWNED BY `run`
    #[command(hide = true)]
    Worker(cli::worker::WorkerArgs),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let parsed = Cli::parse();
    if let Err(e) = dispatch(parsed) {
        cli::status(Status::Fail, &format!("{:#}", e));
        std::process::exit(1);
    }
}

fn dispatch(parsed: Cli) -> Result<()> {
    match parsed.command {
        Command::Worker(args) => cli::worker::run_worker(args),
        Command::Run(args) => {
            ctrlc::set_handler(move || {
                SHUTDOWN.store(true, Ordering::Relaxed);
            })?;
            cli::run::run_suite(args, &SHUTDOWN)
        }
        Command::Compare(args) => cli::compare::run_compare(args),
        Command::Detect(args) => cli::detect::run_detect(args),
        Command::Check => cli::check::run_check(),
    }
}
