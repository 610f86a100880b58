//! gpioled — status LED sequencer for a single Linux GPIO line.

pub mod clock;
pub mod config;
pub mod error;
pub mod gpio;
pub mod led;

pub use error::LedError;
