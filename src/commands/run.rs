//! Run command - the supervision loop

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{ConfigSource, FileConfigSource};
use crate::events::TracingSink;
use crate::platform::SystemProcessControl;
use crate::supervisor::{StopHandle, Supervisor, SupervisorConfig};

/// Execute the supervision loop until interrupted.
/// Usage: warden run [--config <path>] [--interval <secs>] [--once]
pub fn execute(config_path: PathBuf, interval_secs: Option<u64>, once: bool) -> Result<()> {
    let source = FileConfigSource::load(&config_path);
    let state = source.current_state();

    println!(
        "{} Supervising {} process(es) from {}",
        "→".cyan().bold(),
        state.processes.len(),
        config_path.display()
    );
    for spec in &state.processes {
        if spec.args.is_empty() {
            println!("  - {}", spec.name);
        } else {
            println!("  - {} {}", spec.name, spec.args.dimmed());
        }
    }
    if !state.foreground.is_empty() {
        println!("{} Foreground app: {}", "→".cyan().bold(), state.foreground);
    }

    let config = SupervisorConfig {
        poll_interval: interval_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| SupervisorConfig::default().poll_interval),
    };

    let mut supervisor = Supervisor::new(config, source, SystemProcessControl::new(), TracingSink);

    if once {
        supervisor.reconcile();
        println!("{} Single reconcile pass complete", "✓".green().bold());
        return Ok(());
    }

    let stop = StopHandle::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.request_stop())
        .context("Failed to install Ctrl-C handler")?;

    println!(
        "{} Press Ctrl-C to stop (takes effect within one poll interval)",
        "→".cyan().bold()
    );
    supervisor.run_until_stopped(&stop);

    println!("{} Supervisor stopped", "✓".green().bold());
    Ok(())
}
