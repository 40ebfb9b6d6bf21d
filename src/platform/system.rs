//! Host implementation of the process control port

use std::ffi::OsStr;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use sysinfo::{ProcessesToUpdate, System};

use super::ProcessControl;

/// Process control backed by the host OS.
///
/// Liveness and termination enumerate processes by exact name from a fresh
/// snapshot on every query; no liveness state is cached between calls.
/// Children spawned by [`ProcessControl::start`] are retained until their
/// exit status is collected, so an exited child cannot linger as a zombie
/// and satisfy a later liveness check.
///
/// Window focus requires a windowing capability this backend does not
/// have: `focus` emits an advisory diagnostic and `is_foreground` reports
/// `false`, which callers treat as "keep trying".
pub struct SystemProcessControl {
    children: Mutex<Vec<Child>>,
}

impl SystemProcessControl {
    pub fn new() -> Self {
        Self {
            children: Mutex::new(Vec::new()),
        }
    }

    /// Collect exit statuses of children that have terminated.
    fn reap(&self) {
        if let Ok(mut children) = self.children.lock() {
            children.retain_mut(|child| match child.try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!(pid = child.id(), %status, "reaped exited child");
                    false
                }
                Ok(None) => true,
                Err(_) => false,
            });
        }
    }
}

impl Default for SystemProcessControl {
    fn default() -> Self {
        Self::new()
    }
}

/// All PIDs whose process name matches `name` exactly.
fn pids_by_name(name: &str) -> Vec<u32> {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    system
        .processes()
        .values()
        .filter(|process| process.name() == OsStr::new(name))
        .map(|process| process.pid().as_u32())
        .collect()
}

impl ProcessControl for SystemProcessControl {
    fn is_running(&self, name: &str) -> bool {
        self.reap();
        !pids_by_name(name).is_empty()
    }

    fn start(&self, exe: &str, args: &str) {
        self.reap();

        let resolved = match which::which(exe) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(exe, %err, "failed to start process: executable not found");
                return;
            }
        };

        let mut command = Command::new(resolved);
        let args = args.trim();
        if !args.is_empty() {
            command.args(args.split_whitespace());
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match command.spawn() {
            Ok(child) => {
                tracing::info!(exe, pid = child.id(), "started process");
                if let Ok(mut children) = self.children.lock() {
                    children.push(child);
                }
            }
            Err(err) => {
                tracing::warn!(exe, %err, "failed to start process");
            }
        }
    }

    fn terminate(&self, name: &str) {
        let pids = pids_by_name(name);
        if pids.is_empty() {
            tracing::warn!(name, "no running process found to terminate");
            return;
        }

        for pid in pids {
            let raw = match i32::try_from(pid) {
                Ok(raw) => raw,
                Err(_) => continue,
            };
            match kill(Pid::from_raw(raw), Signal::SIGTERM) {
                Ok(()) => tracing::info!(name, pid, "sent SIGTERM"),
                Err(err) => tracing::warn!(name, pid, %err, "failed to signal process"),
            }
        }
        self.reap();
    }

    fn focus(&self, name: &str) {
        tracing::debug!(name, "window focus is not available on this platform");
    }

    fn is_foreground(&self, _name: &str) -> bool {
        false
    }
}
