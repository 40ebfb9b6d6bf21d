use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::{fmt, EnvFilter};

use warden::commands::{control, run};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Keeps configured processes alive and one of them focused", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Supervise the processes listed in the config file
    Run {
        /// Path to the JSON config file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Seconds between reconcile iterations
        #[arg(short, long)]
        interval: Option<u64>,

        /// Perform a single reconcile pass and exit
        #[arg(long)]
        once: bool,
    },

    /// Check whether a process with the given name is running
    Check {
        /// Process name to look for
        name: String,
    },

    /// Start an executable without supervising it
    Start {
        /// Executable to launch (resolved on PATH)
        exe: String,

        /// Launch arguments, passed as one opaque string
        #[arg(default_value = "")]
        args: String,
    },

    /// Terminate all processes with the given name
    Kill {
        /// Process name to terminate
        name: String,
    },

    /// Bring a process to the foreground
    Focus {
        /// Process name to focus
        name: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            interval,
            once,
        } => run::execute(config, interval, once),
        Commands::Check { name } => control::check(&name),
        Commands::Start { exe, args } => control::start(&exe, &args),
        Commands::Kill { name } => control::kill(&name),
        Commands::Focus { name } => control::focus(&name),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "warden", &mut io::stdout());
            Ok(())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(env_filter).try_init();
}
