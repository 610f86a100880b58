//! Fixed blocking status patterns.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Parameterless blink patterns used as status cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPattern {
    /// 5 × (on 100 ms, off 100 ms).
    Warning,
    /// 1 × (on 100 ms, off 100 ms).
    Init,
    /// 2 × (on 50 ms, off 100 ms).
    Exit,
}

/// One pattern expressed as `repetitions` of (on for `on_time`, off for `off_time`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternSteps {
    pub repetitions: u32,
    pub on_time: Duration,
    pub off_time: Duration,
}

impl PatternSteps {
    /// Wall time the pattern occupies the caller.
    pub fn total(&self) -> Duration {
        (self.on_time + self.off_time) * self.repetitions
    }
}

impl BlinkPattern {
    pub fn steps(self) -> PatternSteps {
        let ms = Duration::from_millis;
        match self {
            BlinkPattern::Warning => PatternSteps {
                repetitions: 5,
                on_time: ms(100),
                off_time: ms(100),
            },
            BlinkPattern::Init => PatternSteps {
                repetitions: 1,
                on_time: ms(100),
                off_time: ms(100),
            },
            BlinkPattern::Exit => PatternSteps {
                repetitions: 2,
                on_time: ms(50),
                off_time: ms(100),
            },
        }
    }
}

impl fmt::Display for BlinkPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlinkPattern::Warning => write!(f, "warning"),
            BlinkPattern::Init => write!(f, "init"),
            BlinkPattern::Exit => write!(f, "exit"),
        }
    }
}

impl FromStr for BlinkPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warning" | "warn" => Ok(BlinkPattern::Warning),
            "init" => Ok(BlinkPattern::Init),
            "exit" => Ok(BlinkPattern::Exit),
            other => Err(format!(
                "Unknown pattern: {other} (use warning, init or exit)"
            )),
        }
    }
}
