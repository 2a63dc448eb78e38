// BOREBENCH -- BORE VS DEFAULT (EEVDF/CFS) SCHEDULER BENCHMARKS
//
// THREE STAGES, NO SHARED STATE BETWEEN THEM BEYOND THE FILESYSTEM:
//   detect   WHICH SCHEDULER IS RUNNING
//   runner   RUN A SUITE, WRITE <category>_<LABEL>_<timestamp>.{txt,log}
//   compare  DIFF TWO REPORTS METRIC BY METRIC

pub mod artifact;
pub mod compare;
pub mod config;
pub mod detect;
pub mod fanout;
pub mod metrics;
pub mod process;
pub mod runner;
pub mod stats;
pub mod suite;
