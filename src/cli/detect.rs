// BOREBENCH DETECT -- DIAGNOSTIC VIEW OF SCHEDULER IDENTIFICATION
// PRINTS EVERY SIGNAL, INCLUDING PROBES THE RUNNER NEVER CONSULTS
// (BOOT MESSAGES, SYSCTL, DEBUGFS). INFORMATIONAL ONLY.

use std::path::Path;
use std::process::Command;

use anyhow::Result;
use clap::Args;

use borebench::detect::{self, KernelSignals, OVERRIDE_ENV};

const BORE_SYSCTL: &str = "/proc/sys/kernel/sched_bore";
const SCHED_FEATURES: &str = "/sys/kernel/debug/sched/features";

#[derive(Args)]
pub struct DetectArgs {
    /// Override value to evaluate instead of the environment
    #[arg(long, env = OVERRIDE_ENV)]
    scheduler: Option<String>,
}

fn dmesg_bore_lines() -> Option<Vec<String>> {
    let out = Command::new("dmesg").output().ok()?;
    if !out.status.success() {
        return None;
    }
    Some(
        String::from_utf8_lossy(&out.stdout)
            .lines()
            .filter(|l| l.to_ascii_lowercase().contains("bore"))
            .take(3)
            .map(|l| l.trim().to_string())
            .collect(),
    )
}

pub fn run_detect(args: DetectArgs) -> Result<()> {
    let signals = KernelSignals::probe(args.scheduler);

    println!("BOREBENCH SCHEDULER DETECTION");
    println!("{}", "=".repeat(60));

    match &signals.override_value {
        Some(v) => match detect::SchedulerLabel::from_override(v) {
            Some(l) => println!("  {:<22}{} -> {}", OVERRIDE_ENV, v, l),
            None => println!("  {:<22}{} (UNRECOGNIZED, IGNORED)", OVERRIDE_ENV, v),
        },
        None => println!("  {:<22}NOT SET", OVERRIDE_ENV),
    }

    if signals.configs.is_empty() {
        println!("  {:<22}NOT FOUND", "KERNEL CONFIG");
    }
    for cfg in &signals.configs {
        let verdict = match detect::scan_config(&cfg.contents) {
            Some(l) => format!("MARKER -> {}", l),
            None => "NO BORE/EEVDF MARKER".to_string(),
        };
        println!("  {:<22}{}", cfg.path.display(), verdict);
    }

    match &signals.release {
        Some(r) if detect::release_mentions_bore(r) => println!("  {:<22}{} (BORE VARIANT)", "KERNEL RELEASE", r),
        Some(r) => println!("  {:<22}{}", "KERNEL RELEASE", r),
        None => println!("  {:<22}UNREADABLE", "KERNEL RELEASE"),
    }

    match dmesg_bore_lines() {
        None => println!("  {:<22}UNAVAILABLE (try as root)", "DMESG"),
        Some(lines) if lines.is_empty() => println!("  {:<22}NO BORE MESSAGES", "DMESG"),
        Some(lines) => {
            for l in lines {
                println!("  {:<22}{}", "DMESG", l);
            }
        }
    }

    if Path::new(BORE_SYSCTL).exists() {
        let v = std::fs::read_to_string(BORE_SYSCTL).unwrap_or_default();
        println!("  {:<22}PRESENT (value {})", "SYSCTL sched_bore", v.trim());
    } else {
        println!("  {:<22}ABSENT", "SYSCTL sched_bore");
    }

    match std::fs::read_to_string(SCHED_FEATURES) {
        Ok(f) => {
            let bore: Vec<&str> = f
                .split_whitespace()
                .filter(|t| t.to_ascii_uppercase().contains("BORE"))
                .collect();
            if bore.is_empty() {
                println!("  {:<22}NO BORE FEATURES", "DEBUGFS FEATURES");
            } else {
                println!("  {:<22}{}", "DEBUGFS FEATURES", bore.join(" "));
            }
        }
        Err(_) => println!("  {:<22}UNAVAILABLE (mount debugfs, run as root)", "DEBUGFS FEATURES"),
    }

    let d = detect::identify(&signals);
    println!();
    println!("SCHEDULER:             {}", d.label);
    println!("DECIDED BY:            {}", d.method);
    Ok(())
}
