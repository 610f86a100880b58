//! LED control — polarity, fixed patterns, timed blink sequencing.

mod device;
mod pattern;
mod polarity;
mod sequence;

pub use device::{DEFAULT_CONSUMER, LedDevice};
pub use pattern::{BlinkPattern, PatternSteps};
pub use polarity::Polarity;
pub use sequence::{BlinkSequence, SequenceStep, half_period};
