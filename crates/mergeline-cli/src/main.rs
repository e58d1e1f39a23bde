//! mergeline - Reconcile bibliometric source records into a canonical store
//!
//! Each configured connector pulls records from its source export and
//! reconciles them into the shared canonical collections (works,
//! sources, affiliations, publishers, person, subjects).

use std::io::IsTerminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::MultiProgress;

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "mergeline")]
#[command(about = "Reconcile bibliometric source records into a canonical store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./mergeline.toml or ~/.config/mergeline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run every configured connector against the canonical store
    Run(cmd::run::RunArgs),
    /// Show canonical collection counts
    Stats(cmd::stats::StatsArgs),
    /// Export one canonical collection as JSONL
    Export(cmd::export::ExportArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // TTY gets progress bars and quiet logs; non-TTY gets logs only
    let is_tty = std::io::stderr().is_terminal();
    let multi = is_tty.then(MultiProgress::new);

    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    let verbosity = if cli.debug { 2 } else { config.max_verbosity() };
    mergeline_core::init_logging(verbosity, multi.as_ref());

    install_signal_handler()?;

    match cli.command {
        Command::Run(args) => cmd::run::run(args, &config, multi.as_ref()),
        Command::Stats(args) => cmd::stats::run(args, &config),
        Command::Export(args) => cmd::export::run(args, &config),
        Command::Config => {
            cmd::show_config(&config);
            Ok(())
        }
    }
}

/// SIGINT/SIGTERM request a graceful stop: workers finish their current
/// record and the run reports what was done.
fn install_signal_handler() -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            log::warn!("received signal {signal}, finishing current records...");
            mergeline_core::request_shutdown();
        }
    });
    Ok(())
}
