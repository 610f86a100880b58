//! `config` subcommand — show current configuration and file paths, or
//! write it out with `--init`.

use std::path::Path;

use super::{Config, ConfigOutput, LedError, LineArgs, Result, kv, kv_indent, kv_width};

pub(super) fn cmd_config(line: &LineArgs, custom_path: Option<&Path>, json: bool) -> Result<()> {
    let mut config = super::load_config(custom_path);
    line.apply(&mut config);
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().map(|p| p.exists()).unwrap_or(false);
    let problems = config.validate().err().unwrap_or_default();

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            address: config.address().to_string(),
            settings: config,
        };
        let text = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        println!("{text}");
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:", "Line:"],
        &[
            "chip:",
            "line:",
            "legacy_pin:",
            "polarity:",
            "consumer:",
            "poll_interval_ms:",
        ],
    );

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    kv("Line:", config.address(), w);
    println!();

    println!("Settings:");
    kv_indent("chip:", &config.chip, w);
    kv_indent("line:", config.line, w);
    match config.legacy_pin {
        Some(pin) => kv_indent("legacy_pin:", pin, w),
        None => kv_indent("legacy_pin:", "(unset)", w),
    }
    kv_indent("polarity:", config.polarity, w);
    kv_indent("consumer:", &config.consumer, w);
    kv_indent("poll_interval_ms:", config.poll_interval_ms, w);

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  {p}");
        }
    }
    Ok(())
}

/// Persist the effective configuration (loaded file plus overrides).
///
/// Refuses to replace an existing file unless `force` is set.
pub(super) fn cmd_config_init(
    line: &LineArgs,
    custom_path: Option<&Path>,
    force: bool,
) -> Result<()> {
    let config = super::resolve_config(line, custom_path)?;
    let Some(path) = custom_path.map(|p| p.to_path_buf()).or_else(Config::path) else {
        return Err(LedError::Config("No config directory".into()));
    };
    if path.exists() && !force {
        return Err(LedError::Config(format!(
            "{} already exists (use --force to replace it)",
            path.display()
        )));
    }
    config.save_to(&path)?;
    log::debug!("[config] wrote {}", path.display());
    eprintln!("Wrote {}", path.display());
    Ok(())
}
