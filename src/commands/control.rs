//! Single-shot process control commands
//!
//! Direct pass-throughs to the process control port. They carry none of
//! the supervision loop's invariants: a running supervisor will restart a
//! monitored process killed here on its next sweep.

use anyhow::Result;
use colored::Colorize;

use crate::platform::{ProcessControl, SystemProcessControl};

/// Report whether a process with the given name is running.
pub fn check(name: &str) -> Result<()> {
    let control = SystemProcessControl::new();
    if control.is_running(name) {
        println!("{} {} is running", "✓".green().bold(), name);
    } else {
        println!("{} {} is not running", "✗".red().bold(), name);
    }
    Ok(())
}

/// Start an executable without supervising it.
pub fn start(exe: &str, args: &str) -> Result<()> {
    let control = SystemProcessControl::new();
    control.start(exe, args);
    println!("{} Start requested for {}", "→".cyan().bold(), exe);
    Ok(())
}

/// Terminate all processes with the given name.
pub fn kill(name: &str) -> Result<()> {
    let control = SystemProcessControl::new();
    if !control.is_running(name) {
        println!("{} {} is not running. Nothing to kill.", "─".dimmed(), name);
        return Ok(());
    }
    control.terminate(name);
    println!("{} Termination requested for {}", "→".cyan().bold(), name);
    Ok(())
}

/// Bring a process to the foreground.
pub fn focus(name: &str) -> Result<()> {
    let control = SystemProcessControl::new();
    control.focus(name);
    println!("{} Focus requested for {}", "→".cyan().bold(), name);
    Ok(())
}
