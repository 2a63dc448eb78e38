// FAIRNESS WORKER -- ONE CPU-BOUND CHILD OF THE FAN-OUT
// COMPUTES A FIXED SUM OF SQUARES AND APPENDS ITS OWN ELAPSED TIME TO --out

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct WorkerArgs {
    #[arg(long)]
    id: usize,

    #[arg(long)]
    work: u64,

    #[arg(long)]
    out: PathBuf,
}

pub fn run_worker(args: WorkerArgs) -> Result<()> {
    borebench::fanout::run_worker(args.id, args.work, &args.out)
}
