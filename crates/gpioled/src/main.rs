//! gpioled — drive a status LED on a Linux GPIO line.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

mod cli;

/// Shared shutdown flag — set by Ctrl+C handler.
pub static RUNNING: AtomicBool = AtomicBool::new(true);

#[derive(Parser)]
#[command(
    name = "gpioled",
    version,
    about = "Drive a status LED on a Linux GPIO line"
)]
struct Args {
    /// Output as JSON (for config, blink)
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    line: cli::LineArgs,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    ctrlc::set_handler(move || {
        RUNNING.store(false, Ordering::SeqCst);
    })
    .ok();

    if let Err(e) = cli::run(args.command, args.json, &args.line, args.config.as_deref()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
