// BOREBENCH PROCESS PLUMBING
// TOOL LOOKUP, FOREGROUND CAPTURE, BACKGROUND LOAD, STABILIZATION PAUSE.
// EVERY CHILD WE DO NOT WAIT ON LIVES IN ITS OWN PROCESS GROUP UNDER A
// ProcGuard, WHICH KILLS THE WHOLE GROUP WHEN DROPPED.

use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::fanout;
use crate::runner::{Background, Captured, Executor};
use crate::suite::{FanoutPlan, ToolCommand};

const DROP_CACHES: &str = "/proc/sys/vm/drop_caches";

pub fn check_tool(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

pub struct ProcGuard {
    child: Option<Child>,
    pgid: i32,
}

impl ProcGuard {
    // child MUST HAVE BEEN SPAWNED WITH process_group(0)
    pub fn new(child: Child) -> Self {
        let pgid = child.id() as i32;
        Self { child: Some(child), pgid }
    }

    pub fn id(&self) -> i32 {
        self.pgid
    }

    // BLOCK UNTIL THE CHILD EXITS. THE GUARD IS DISARMED EITHER WAY.
    pub fn wait(mut self) -> std::io::Result<ExitStatus> {
        match self.child.take() {
            Some(mut c) => c.wait(),
            None => Err(std::io::Error::other("child already reaped")),
        }
    }

    pub fn stop(&mut self) {
        let child = match self.child.as_mut() {
            Some(c) => c,
            None => return,
        };
        if let Ok(Some(_)) = child.try_wait() {
            self.child = None;
            return;
        }
        unsafe { libc::killpg(self.pgid, libc::SIGINT); }
        let deadline = Instant::now() + Duration::from_millis(500);
        loop {
            match child.try_wait() {
                Ok(Some(_)) => {
                    self.child = None;
                    return;
                }
                Ok(None) if Instant::now() >= deadline => break,
                Ok(None) => std::thread::sleep(Duration::from_millis(50)),
                Err(_) => break,
            }
        }
        unsafe { libc::killpg(self.pgid, libc::SIGKILL); }
        let _ = child.wait();
        self.child = None;
    }
}

impl Drop for ProcGuard {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.stop();
        }
    }
}

// RUNS REAL BINARIES ON THE HOST
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn has_tool(&self, program: &str) -> bool {
        check_tool(program)
    }

    fn run(&mut self, cmd: &ToolCommand) -> Result<Captured> {
        let start = Instant::now();
        let out = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("running {}", cmd))?;
        let elapsed = start.elapsed();

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));
        Ok(Captured {
            success: out.status.success(),
            code: out.status.code(),
            output,
            elapsed,
        })
    }

    fn start_background(&mut self, cmd: &ToolCommand) -> Result<Background> {
        let child = Command::new(&cmd.program)
            .args(&cmd.args)
            .process_group(0)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("starting background load {}", cmd))?;
        let guard = ProcGuard::new(child);
        log::debug!("BACKGROUND LOAD PGID {}: {}", guard.id(), cmd);
        // LET THE LOAD RAMP UP BEFORE MEASURING
        std::thread::sleep(Duration::from_secs(1));
        Ok(Background::new(guard))
    }

    fn fanout(&mut self, worker_exe: &Path, plan: &FanoutPlan, iteration: u32) -> Result<Vec<f64>> {
        fanout::run_fanout(worker_exe, plan, iteration)
    }

    // FLUSH, REST, DROP PAGE CACHE IF PRIVILEGED. NEVER FATAL.
    fn settle(&mut self, pause: Duration) {
        unsafe { libc::sync(); }
        std::thread::sleep(pause);
        if is_root() {
            if let Err(e) = std::fs::write(DROP_CACHES, "3") {
                log::warn!("COULD NOT DROP CACHES: {}", e);
            }
        }
    }
}
