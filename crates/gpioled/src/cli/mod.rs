//! CLI subcommands — light, pattern, timed blink, configuration.

mod blink;
mod config_cmd;
mod on;
mod pattern;

use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use clap::{Args, Subcommand};
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use gpioled_lib::LedError;
pub(super) use gpioled_lib::config::Config;
pub(super) use gpioled_lib::error::Result;
pub(super) use gpioled_lib::led::{BlinkPattern, LedDevice, Polarity};

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

// ── Line selection overrides ──

/// Command-line overrides for the configured line.
#[derive(Args, Debug, Default, Clone)]
pub struct LineArgs {
    /// GPIO character device (e.g. /dev/gpiochip0)
    #[arg(long, global = true)]
    pub chip: Option<String>,

    /// Line offset on the chip
    #[arg(long, global = true)]
    pub line: Option<u32>,

    /// Legacy BCM pin number (0-30) on the default chip
    #[arg(long, global = true, conflicts_with_all = ["chip", "line"])]
    pub pin: Option<u8>,

    /// LED polarity: active-high or active-low
    #[arg(long, global = true)]
    pub polarity: Option<Polarity>,
}

impl LineArgs {
    /// Apply overrides on top of a loaded config.
    pub(super) fn apply(&self, config: &mut Config) {
        if let Some(ref chip) = self.chip {
            config.chip = chip.clone();
            config.legacy_pin = None;
        }
        if let Some(line) = self.line {
            config.line = line;
            config.legacy_pin = None;
        }
        if let Some(pin) = self.pin {
            config.legacy_pin = Some(pin);
        }
        if let Some(polarity) = self.polarity {
            config.polarity = polarity;
        }
    }
}

/// Load config from `custom_path` if given, else from the platform path.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    match custom_path {
        Some(path) => {
            let (config, warnings) = Config::load_from(path);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    }
}

/// Load config, apply overrides and validate.
pub(super) fn resolve_config(line: &LineArgs, custom_path: Option<&Path>) -> Result<Config> {
    let mut config = load_config(custom_path);
    line.apply(&mut config);
    config.validate().map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        LedError::Config(msgs.join("; "))
    })?;
    Ok(config)
}

/// Build the LED described by `config` and request its line.
pub(super) fn open_led(config: &Config) -> Result<LedDevice> {
    let mut led = LedDevice::with_platform(config.address(), config.polarity)
        .with_consumer(config.consumer.clone());
    led.begin()?;
    log::debug!(
        "[led] {} ({}, consumer {})",
        led.address(),
        led.polarity(),
        led.consumer()
    );
    Ok(led)
}

/// Sleep in short slices until `hold` elapses or Ctrl+C is pressed.
/// Returns `false` if interrupted.
pub(super) fn wait_while_running(hold: Option<Duration>) -> bool {
    let deadline = hold.map(|d| Instant::now() + d);
    while RUNNING.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub address: String,
    pub settings: Config,
}

#[derive(Serialize)]
pub(super) struct BlinkOutput {
    pub address: String,
    pub polarity: String,
    pub duration_ms: u64,
    pub cycles: u32,
    pub half_period_ms: Option<f64>,
    pub blocking: bool,
    pub completed: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Turn the LED on and hold it until Ctrl+C (or --hold-ms)
    On {
        /// Turn off and exit after this many milliseconds
        #[arg(long)]
        hold_ms: Option<u64>,
    },

    /// Run a fixed status pattern (warning, init, exit)
    Pattern {
        /// Pattern name
        name: BlinkPattern,
    },

    /// Blink a number of cycles within a duration
    Blink {
        /// Total duration of the sequence in milliseconds
        #[arg(long, default_value_t = 1000)]
        duration_ms: u64,
        /// Number of on/off cycles
        #[arg(long, default_value_t = 5)]
        cycles: u32,
        /// Sleep through the sequence instead of polling it
        #[arg(long)]
        blocking: bool,
    },

    /// Show current configuration and file paths
    Config {
        /// Write the effective configuration (file + overrides) to the config file
        #[arg(long)]
        init: bool,
        /// Replace an existing config file when used with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool, line: &LineArgs, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::On { hold_ms } => {
            if json {
                warn_json_unsupported("on");
            }
            on::cmd_on(line, config_path, hold_ms)
        }
        Command::Pattern { name } => {
            if json {
                warn_json_unsupported("pattern");
            }
            pattern::cmd_pattern(line, config_path, name)
        }
        Command::Blink {
            duration_ms,
            cycles,
            blocking,
        } => blink::cmd_blink(line, config_path, duration_ms, cycles, blocking, json),
        Command::Config { init, force } => {
            if init {
                config_cmd::cmd_config_init(line, config_path, force)?;
            }
            config_cmd::cmd_config(line, config_path, json)
        }
    }
}
