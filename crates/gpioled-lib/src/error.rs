//! Unified error type for the gpioled-lib crate.
//!
//! [`LedError`] wraps the GPIO module error (`GpioError`) and the
//! domain-specific error kinds (`Io`, `Config`).
//! `From` impls allow `?` to propagate across module boundaries seamlessly.

use std::fmt;

use crate::gpio::GpioError;

/// Unified error type for gpioled-lib operations.
#[derive(Debug)]
pub enum LedError {
    /// GPIO line error (request, read/write, release).
    Gpio(GpioError),
    /// Standard I/O error (config persistence).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedError::Gpio(e) => write!(f, "{e}"),
            LedError::Io(e) => write!(f, "I/O error: {e}"),
            LedError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for LedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedError::Gpio(e) => Some(e),
            LedError::Io(e) => Some(e),
            LedError::Config(_) => None,
        }
    }
}

impl From<GpioError> for LedError {
    fn from(e: GpioError) -> Self {
        LedError::Gpio(e)
    }
}

impl From<std::io::Error> for LedError {
    fn from(e: std::io::Error) -> Self {
        LedError::Io(e)
    }
}

/// Crate-level Result alias using [`LedError`].
pub type Result<T> = std::result::Result<T, LedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_gpio_error() {
        let e: LedError = GpioError::NotInitialized.into();
        assert!(matches!(e, LedError::Gpio(GpioError::NotInitialized)));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: LedError = io_err.into();
        assert!(matches!(e, LedError::Io(_)));
    }

    #[test]
    fn display_gpio_error_is_transparent() {
        let e = LedError::Gpio(GpioError::ChipOpen("/dev/gpiochip0: denied".into()));
        assert_eq!(e.to_string(), "Failed to open GPIO chip: /dev/gpiochip0: denied");
    }

    #[test]
    fn display_config_error() {
        let e = LedError::Config("invalid input".into());
        assert_eq!(e.to_string(), "Config error: invalid input");
    }

    #[test]
    fn source_chains_gpio_error() {
        let e = LedError::Gpio(GpioError::ReadFailed("line 27: busy".into()));
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("busy"));
    }

    #[test]
    fn source_chains_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e = LedError::Io(io_err);
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("denied"));
    }

    #[test]
    fn source_none_for_config() {
        let e = LedError::Config("test".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_gpio_to_led() {
        fn inner() -> crate::gpio::Result<()> {
            Err(GpioError::Unsupported)
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, LedError::Gpio(GpioError::Unsupported)));
    }
}
