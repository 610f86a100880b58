//! Active-high / active-low mapping between "logically on" and the raw line level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which raw level lights the LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    /// LED lights when the line is driven low.
    ActiveLow,
    /// LED lights when the line is driven high.
    #[default]
    ActiveHigh,
}

impl Polarity {
    /// Map a numeric mode: `0` is active-low, anything else is active-high.
    pub fn from_mode(mode: u8) -> Self {
        if mode == 0 {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        }
    }

    /// Raw level that means "illuminated".
    pub fn on_value(self) -> bool {
        self == Polarity::ActiveHigh
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::ActiveLow => write!(f, "active-low"),
            Polarity::ActiveHigh => write!(f, "active-high"),
        }
    }
}

/// Parse a polarity string.
///
/// Accepts `active-high`/`high`/`1` and `active-low`/`low`/`0`, case-insensitive.
impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active-high" | "high" | "1" => Ok(Polarity::ActiveHigh),
            "active-low" | "low" | "0" => Ok(Polarity::ActiveLow),
            other => Err(format!(
                "Invalid polarity: {other} (use active-high or active-low)"
            )),
        }
    }
}
