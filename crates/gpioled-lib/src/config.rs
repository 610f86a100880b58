//! Application configuration — TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::gpio::{DEFAULT_CHIP, LineAddress, MAX_LEGACY_PIN};
use crate::led::{DEFAULT_CONSUMER, Polarity};

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str = "# gpioled configuration, written by `gpioled config --init`.\n\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// GPIO character device. Default: "/dev/gpiochip0".
    #[serde(default = "default_chip")]
    pub chip: String,

    /// Line offset on `chip`. Default: 27.
    #[serde(default = "default_line")]
    pub line: u32,

    /// Legacy BCM pin number (0-30) on the default chip. Overrides `chip`/`line` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_pin: Option<u8>,

    /// "active-high" (line high lights the LED) or "active-low".
    #[serde(default)]
    pub polarity: Polarity,

    /// Consumer label attached to the line request.
    #[serde(default = "default_consumer")]
    pub consumer: String,

    /// How often the non-blocking blink loop polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_chip() -> String {
    DEFAULT_CHIP.into()
}
fn default_line() -> u32 {
    27
}
fn default_consumer() -> String {
    DEFAULT_CONSUMER.into()
}
fn default_poll_interval_ms() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chip: default_chip(),
            line: default_line(),
            legacy_pin: None,
            polarity: Polarity::default(),
            consumer: default_consumer(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The `chip` field is empty or whitespace-only.
    EmptyChip,
    /// The `legacy_pin` field is above the supported range.
    LegacyPinOutOfRange(u8),
    /// The `consumer` field is empty or whitespace-only.
    EmptyConsumer,
    /// The `poll_interval_ms` field is zero.
    ZeroPollInterval,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyChip => write!(f, "Chip path cannot be empty"),
            ValidationError::LegacyPinOutOfRange(pin) => write!(
                f,
                "Invalid legacy_pin: {pin} is out of range (0-{MAX_LEGACY_PIN})"
            ),
            ValidationError::EmptyConsumer => write!(f, "Consumer label cannot be empty"),
            ValidationError::ZeroPollInterval => {
                write!(f, "poll_interval_ms must be greater than zero")
            }
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gpioled"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    ///
    /// A header comment naming the command that wrote the file is prepended.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Line address described by this config. `legacy_pin` wins when set.
    pub fn address(&self) -> LineAddress {
        match self.legacy_pin {
            Some(pin) => LineAddress::Legacy(pin),
            None => LineAddress::chip(self.chip.trim(), self.line),
        }
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        match self.legacy_pin {
            Some(pin) if pin > MAX_LEGACY_PIN => {
                errors.push(ValidationError::LegacyPinOutOfRange(pin));
            }
            Some(_) => {}
            None => {
                if self.chip.trim().is_empty() {
                    errors.push(ValidationError::EmptyChip);
                }
            }
        }

        if self.consumer.trim().is_empty() {
            errors.push(ValidationError::EmptyConsumer);
        }

        if self.poll_interval_ms == 0 {
            errors.push(ValidationError::ZeroPollInterval);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
