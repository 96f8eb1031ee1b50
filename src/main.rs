use anyhow::Result;
use clap::{Parser, Subcommand};
use postzephir::commands::{process, verify};
use postzephir::config::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding a tracing filter, e.g. `postzephir=debug`
const LOG_ENV: &str = "POSTZEPHIR_LOG";

#[derive(Parser)]
#[command(name = "postzephir")]
#[command(about = "Verify and drive the post-Zephir catalog pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to $POSTZEPHIR_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify pipeline outputs for one run date, or for every journaled date
    Verify {
        /// Run date to verify (YYYYMMDD or YYYY-MM-DD, defaults to today)
        #[arg(conflicts_with = "journal")]
        date: Option<String>,

        /// Verify the dates recorded by the last process run
        #[arg(long)]
        journal: bool,
    },

    /// Run pipeline scripts for every export date missing since the cycle start
    Process {
        /// Print the scripts that would run without running them
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Verify { date, journal } => {
            verify::execute(&config, verify::Target::from_args(date.as_deref(), journal)?)
        }
        Commands::Process { dry_run } => process::execute(&config, dry_run),
    }
}
