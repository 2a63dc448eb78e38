use std::path::Path;

use anyhow::{bail, Result};

use borebench::detect::{self, KernelSignals};
use borebench::process::{check_tool, is_root};
use borebench::runner::install_hint;
use borebench::suite::Suite;

const PACKAGE_MANAGERS: [(&str, &str); 4] = [
    ("pacman", "sudo pacman -S --needed stress-ng rt-tests sysbench"),
    ("apt-get", "sudo apt-get install -y stress-ng rt-tests sysbench"),
    ("dnf", "sudo dnf install -y stress-ng rt-tests sysbench"),
    ("zypper", "sudo zypper install -y stress-ng rt-tests sysbench"),
];

fn detect_package_manager() -> Option<(&'static str, &'static str)> {
    PACKAGE_MANAGERS.iter().copied().find(|(pm, _)| check_tool(pm))
}

pub fn run_check() -> Result<()> {
    println!("BOREBENCH DEPENDENCY CHECK");
    println!();

    let mut ok = true;
    let mut tools: Vec<&str> = Vec::new();
    for suite in Suite::ALL {
        for t in suite.required_tools() {
            if !tools.contains(t) {
                tools.push(*t);
            }
        }
    }
    let mut missing = Vec::new();
    for tool in &tools {
        if check_tool(tool) {
            println!("  {:<24}OK", tool);
        } else {
            println!("  {:<24}MISSING ({})", tool, install_hint(tool));
            missing.push(*tool);
            ok = false;
        }
    }
    println!();

    println!("KERNEL:");
    let signals = KernelSignals::probe(None);
    if signals.configs.is_empty() {
        println!("  kernel config         NOT FOUND (SKIPPED)");
    }
    for cfg in &signals.configs {
        match detect::scan_config(&cfg.contents) {
            Some(l) => println!("  {:<22}{} MARKER", cfg.path.display(), l),
            None => println!("  {:<22}NO SCHEDULER MARKER", cfg.path.display()),
        }
    }
    let d = detect::identify(&signals);
    println!("  active scheduler      {} (via {})", d.label, d.method);
    println!("  root                  {}", if is_root() { "YES" } else { "NO (cyclictest and cache drop need root)" });
    if !Path::new("/proc/sys/vm/drop_caches").exists() {
        println!("  drop_caches           NOT AVAILABLE");
    }
    println!();

    let pm = detect_package_manager();
    match pm {
        Some((name, _)) => println!("  package manager       {}", name),
        None => {
            println!("  package manager       NOT DETECTED");
            ok = false;
        }
    }
    println!();

    if ok {
        println!("ALL CHECKS PASSED");
        return Ok(());
    }

    println!("SOME CHECKS FAILED");
    if !missing.is_empty() {
        match pm {
            Some((_, install)) => println!("  Install tools: {}", install),
            None => println!("  Install {} with your distribution's tools", missing.join(", ")),
        }
    }
    bail!("DEPENDENCY CHECK FAILED")
}
