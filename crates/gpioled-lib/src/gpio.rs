//! GPIO line access — capability traits + Linux character-device backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chip used when a line is addressed by its legacy BCM pin number.
pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";

/// Highest BCM pin number accepted in legacy addressing.
pub const MAX_LEGACY_PIN: u8 = 30;

// ── Error type ──

/// GPIO errors.
///
/// String payloads follow the convention **"context: details"** where *context*
/// identifies the chip/line involved and *details* is the underlying error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioError {
    InvalidAddress(String),
    ChipOpen(String),
    LineLookup(String),
    RequestFailed(String),
    WriteFailed(String),
    ReadFailed(String),
    ReleaseFailed(String),
    NotInitialized,
    Unsupported,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::InvalidAddress(e) => write!(f, "Invalid line address: {e}"),
            GpioError::ChipOpen(e) => write!(f, "Failed to open GPIO chip: {e}"),
            GpioError::LineLookup(e) => write!(f, "Failed to get GPIO line: {e}"),
            GpioError::RequestFailed(e) => write!(f, "Failed to request line as output: {e}"),
            GpioError::WriteFailed(e) => write!(f, "Failed to set line value: {e}"),
            GpioError::ReadFailed(e) => write!(f, "Failed to read line value: {e}"),
            GpioError::ReleaseFailed(e) => write!(f, "Failed to release line: {e}"),
            GpioError::NotInitialized => write!(f, "LED is not initialized (call begin first)"),
            GpioError::Unsupported => {
                write!(f, "GPIO character devices are not supported on this platform")
            }
        }
    }
}

impl std::error::Error for GpioError {}

pub type Result<T> = std::result::Result<T, GpioError>;

// ── Line address ──

/// Where the LED is wired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineAddress {
    /// Character device path plus line offset, e.g. `/dev/gpiochip0` line 27.
    Chip { path: String, offset: u32 },
    /// BCM pin number on [`DEFAULT_CHIP`].
    Legacy(u8),
}

impl LineAddress {
    pub fn chip(path: impl Into<String>, offset: u32) -> Self {
        LineAddress::Chip {
            path: path.into(),
            offset,
        }
    }

    /// Resolve to `(chip path, line offset)`, validating legacy pin range.
    pub fn resolve(&self) -> Result<(&str, u32)> {
        match self {
            LineAddress::Chip { path, .. } if path.trim().is_empty() => Err(
                GpioError::InvalidAddress("chip path is empty".into()),
            ),
            LineAddress::Chip { path, offset } => Ok((path.as_str(), *offset)),
            LineAddress::Legacy(pin) if *pin > MAX_LEGACY_PIN => {
                Err(GpioError::InvalidAddress(format!(
                    "pin {pin}: pin configuration is in wrong range (0-{MAX_LEGACY_PIN})"
                )))
            }
            LineAddress::Legacy(pin) => Ok((DEFAULT_CHIP, u32::from(*pin))),
        }
    }
}

impl fmt::Display for LineAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineAddress::Chip { path, offset } => write!(f, "{path}:{offset}"),
            LineAddress::Legacy(pin) => write!(f, "{DEFAULT_CHIP}:{pin} (legacy pin)"),
        }
    }
}

// ── Traits ──

/// An output line that has been requested from the kernel.
pub trait GpioLine {
    /// Drive the raw electrical level (`true` = high).
    fn set_value(&mut self, value: bool) -> Result<()>;
    /// Read back the raw electrical level.
    fn value(&self) -> Result<bool>;
    /// Give the line back. Consumes the handle, so a line is released once.
    fn release(self);
}

/// Factory for [`GpioLine`]s.
pub trait GpioBackend {
    type Line: GpioLine;

    /// Open the chip, look up the line and request it as an output at `initial`.
    fn request_output(
        &self,
        address: &LineAddress,
        consumer: &str,
        initial: bool,
    ) -> Result<Self::Line>;

    /// Request the line as a plain input and release it again, leaving the
    /// pin in a non-driving state for other consumers.
    fn park_input(&self, address: &LineAddress, consumer: &str) -> Result<()>;
}

// ── Linux implementation ──

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;

    use gpiocdev::Request;
    use gpiocdev::chip::Chip;
    use gpiocdev::line::Value;

    fn to_value(level: bool) -> Value {
        if level { Value::Active } else { Value::Inactive }
    }

    /// GPIO access through the Linux GPIO character device (`/dev/gpiochipN`).
    #[derive(Debug, Default, Clone, Copy)]
    pub struct CdevGpio;

    pub struct CdevLine {
        request: Request,
        offset: u32,
    }

    impl GpioBackend for CdevGpio {
        type Line = CdevLine;

        fn request_output(
            &self,
            address: &LineAddress,
            consumer: &str,
            initial: bool,
        ) -> Result<CdevLine> {
            let (path, offset) = address.resolve()?;

            let chip =
                Chip::from_path(path).map_err(|e| GpioError::ChipOpen(format!("{path}: {e}")))?;
            chip.line_info(offset)
                .map_err(|e| GpioError::LineLookup(format!("{path} line {offset}: {e}")))?;
            drop(chip);

            let request = Request::builder()
                .on_chip(path)
                .with_consumer(consumer)
                .with_line(offset)
                .as_output(to_value(initial))
                .request()
                .map_err(|e| GpioError::RequestFailed(format!("{path} line {offset}: {e}")))?;

            log::debug!("requested {path} line {offset} as output ({consumer})");
            Ok(CdevLine { request, offset })
        }

        fn park_input(&self, address: &LineAddress, consumer: &str) -> Result<()> {
            let (path, offset) = address.resolve()?;
            let request = Request::builder()
                .on_chip(path)
                .with_consumer(consumer)
                .with_line(offset)
                .as_input()
                .request()
                .map_err(|e| {
                    GpioError::ReleaseFailed(format!("input request {path} line {offset}: {e}"))
                })?;
            drop(request);
            Ok(())
        }
    }

    impl GpioLine for CdevLine {
        fn set_value(&mut self, value: bool) -> Result<()> {
            self.request
                .set_value(self.offset, to_value(value))
                .map(|_| ())
                .map_err(|e| GpioError::WriteFailed(format!("line {}: {e}", self.offset)))
        }

        fn value(&self) -> Result<bool> {
            self.request
                .value(self.offset)
                .map(|v| v == Value::Active)
                .map_err(|e| GpioError::ReadFailed(format!("line {}: {e}", self.offset)))
        }

        fn release(self) {
            // Dropping the request closes its file descriptor.
            drop(self.request);
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux_impl::{CdevGpio, CdevLine};

// ── Stub backend for unsupported platforms ──

/// Placeholder backend whose requests always fail with `Unsupported`.
/// Enables compilation and `cargo test` on non-Linux hosts.
#[cfg(not(target_os = "linux"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct StubGpio;

#[cfg(not(target_os = "linux"))]
pub struct StubLine;

#[cfg(not(target_os = "linux"))]
impl GpioLine for StubLine {
    fn set_value(&mut self, _value: bool) -> Result<()> {
        Err(GpioError::Unsupported)
    }
    fn value(&self) -> Result<bool> {
        Err(GpioError::Unsupported)
    }
    fn release(self) {}
}

#[cfg(not(target_os = "linux"))]
impl GpioBackend for StubGpio {
    type Line = StubLine;

    fn request_output(&self, _: &LineAddress, _: &str, _: bool) -> Result<StubLine> {
        Err(GpioError::Unsupported)
    }
    fn park_input(&self, _: &LineAddress, _: &str) -> Result<()> {
        Err(GpioError::Unsupported)
    }
}

/// Concrete backend for the current platform.
#[cfg(target_os = "linux")]
pub type PlatformGpio = CdevGpio;
#[cfg(not(target_os = "linux"))]
pub type PlatformGpio = StubGpio;

// ── Mock backend for testing ──

/// In-memory GPIO backend for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// State shared between a [`MockGpio`] and the lines it hands out, so a
    /// test can keep a clone of the backend and inspect the line after the
    /// LED has taken ownership of it.
    #[derive(Debug, Default)]
    pub struct MockShared {
        /// Current raw level of the line.
        pub level: Cell<bool>,
        /// True while an output request is held.
        pub requested: Cell<bool>,
        /// Every raw level written, including the initial request value.
        pub writes: RefCell<Vec<bool>>,
        /// Consumer label of the last request.
        pub consumer: RefCell<Option<String>>,
        pub requests: Cell<u32>,
        pub releases: Cell<u32>,
        pub parks: Cell<u32>,
        /// Failure injection.
        pub fail_open: Cell<bool>,
        pub fail_lookup: Cell<bool>,
        pub fail_request: Cell<bool>,
        pub fail_read: Cell<bool>,
        pub fail_write: Cell<bool>,
        pub fail_park: Cell<bool>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct MockGpio {
        pub shared: Rc<MockShared>,
    }

    impl MockGpio {
        pub fn new() -> Self {
            Self::default()
        }

        /// Current raw level.
        pub fn level(&self) -> bool {
            self.shared.level.get()
        }

        /// Number of level changes among recorded writes.
        pub fn transitions(&self) -> usize {
            self.shared
                .writes
                .borrow()
                .windows(2)
                .filter(|w| w[0] != w[1])
                .count()
        }
    }

    #[derive(Debug)]
    pub struct MockLine {
        shared: Rc<MockShared>,
    }

    impl GpioBackend for MockGpio {
        type Line = MockLine;

        fn request_output(
            &self,
            address: &LineAddress,
            consumer: &str,
            initial: bool,
        ) -> Result<MockLine> {
            let (path, offset) = address.resolve()?;
            let s = &self.shared;
            if s.fail_open.get() {
                return Err(GpioError::ChipOpen(format!("{path}: mock failure injected")));
            }
            if s.fail_lookup.get() {
                return Err(GpioError::LineLookup(format!(
                    "{path} line {offset}: mock failure injected"
                )));
            }
            if s.fail_request.get() {
                return Err(GpioError::RequestFailed(format!(
                    "{path} line {offset}: mock failure injected"
                )));
            }
            s.requests.set(s.requests.get() + 1);
            s.requested.set(true);
            s.level.set(initial);
            s.writes.borrow_mut().push(initial);
            *s.consumer.borrow_mut() = Some(consumer.to_string());
            Ok(MockLine {
                shared: Rc::clone(&self.shared),
            })
        }

        fn park_input(&self, address: &LineAddress, _consumer: &str) -> Result<()> {
            let (path, offset) = address.resolve()?;
            if self.shared.fail_park.get() {
                return Err(GpioError::ReleaseFailed(format!(
                    "input request {path} line {offset}: mock failure injected"
                )));
            }
            self.shared.parks.set(self.shared.parks.get() + 1);
            Ok(())
        }
    }

    impl GpioLine for MockLine {
        fn set_value(&mut self, value: bool) -> Result<()> {
            if self.shared.fail_write.get() {
                return Err(GpioError::WriteFailed("mock failure injected".into()));
            }
            self.shared.level.set(value);
            self.shared.writes.borrow_mut().push(value);
            Ok(())
        }

        fn value(&self) -> Result<bool> {
            if self.shared.fail_read.get() {
                return Err(GpioError::ReadFailed("mock failure injected".into()));
            }
            Ok(self.shared.level.get())
        }

        fn release(self) {
            self.shared.requested.set(false);
            self.shared.releases.set(self.shared.releases.get() + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockGpio;
    use super::*;

    // ── LineAddress ──

    #[test]
    fn resolve_chip_address() {
        let addr = LineAddress::chip("/dev/gpiochip1", 17);
        assert_eq!(addr.resolve().unwrap(), ("/dev/gpiochip1", 17));
    }

    #[test]
    fn resolve_legacy_pin_uses_default_chip() {
        let addr = LineAddress::Legacy(27);
        assert_eq!(addr.resolve().unwrap(), (DEFAULT_CHIP, 27));
    }

    #[test]
    fn resolve_legacy_pin_at_upper_bound() {
        assert!(LineAddress::Legacy(MAX_LEGACY_PIN).resolve().is_ok());
    }

    #[test]
    fn resolve_legacy_pin_out_of_range() {
        let err = LineAddress::Legacy(31).resolve().unwrap_err();
        assert!(matches!(err, GpioError::InvalidAddress(_)));
        assert!(err.to_string().contains("wrong range"));
    }

    #[test]
    fn resolve_empty_chip_path() {
        let err = LineAddress::chip("  ", 3).resolve().unwrap_err();
        assert!(matches!(err, GpioError::InvalidAddress(_)));
    }

    #[test]
    fn address_display() {
        assert_eq!(
            LineAddress::chip("/dev/gpiochip0", 27).to_string(),
            "/dev/gpiochip0:27"
        );
        assert_eq!(
            LineAddress::Legacy(4).to_string(),
            "/dev/gpiochip0:4 (legacy pin)"
        );
    }

    #[test]
    fn address_serializes_kebab_case() {
        let json = serde_json::to_string(&LineAddress::chip("/dev/gpiochip0", 5)).unwrap();
        assert!(json.contains("\"chip\""), "got {json}");
        assert!(json.contains("\"offset\":5"), "got {json}");
    }

    // ── Display ──

    #[test]
    fn display_not_initialized() {
        assert_eq!(
            GpioError::NotInitialized.to_string(),
            "LED is not initialized (call begin first)"
        );
    }

    #[test]
    fn display_chip_open_includes_context() {
        let e = GpioError::ChipOpen("/dev/gpiochip9: No such file or directory".into());
        assert_eq!(
            e.to_string(),
            "Failed to open GPIO chip: /dev/gpiochip9: No such file or directory"
        );
    }

    // ── Mock backend ──

    #[test]
    fn mock_request_sets_initial_level() {
        let gpio = MockGpio::new();
        let _line = gpio
            .request_output(&LineAddress::Legacy(27), "test", true)
            .unwrap();
        assert!(gpio.level());
        assert!(gpio.shared.requested.get());
        assert_eq!(gpio.shared.consumer.borrow().as_deref(), Some("test"));
    }

    #[test]
    fn mock_line_write_and_read() {
        let gpio = MockGpio::new();
        let mut line = gpio
            .request_output(&LineAddress::Legacy(27), "test", false)
            .unwrap();
        line.set_value(true).unwrap();
        assert!(line.value().unwrap());
        line.set_value(false).unwrap();
        assert!(!line.value().unwrap());
        assert_eq!(gpio.transitions(), 2);
    }

    #[test]
    fn mock_release_clears_request() {
        let gpio = MockGpio::new();
        let line = gpio
            .request_output(&LineAddress::Legacy(27), "test", false)
            .unwrap();
        line.release();
        assert!(!gpio.shared.requested.get());
        assert_eq!(gpio.shared.releases.get(), 1);
    }

    #[test]
    fn mock_injected_failures_map_to_steps() {
        let gpio = MockGpio::new();
        let addr = LineAddress::Legacy(27);

        gpio.shared.fail_open.set(true);
        assert!(matches!(
            gpio.request_output(&addr, "t", false),
            Err(GpioError::ChipOpen(_))
        ));
        gpio.shared.fail_open.set(false);

        gpio.shared.fail_lookup.set(true);
        assert!(matches!(
            gpio.request_output(&addr, "t", false),
            Err(GpioError::LineLookup(_))
        ));
        gpio.shared.fail_lookup.set(false);

        gpio.shared.fail_request.set(true);
        assert!(matches!(
            gpio.request_output(&addr, "t", false),
            Err(GpioError::RequestFailed(_))
        ));
        assert_eq!(gpio.shared.requests.get(), 0);
    }

    #[test]
    fn mock_rejects_invalid_address_before_opening() {
        let gpio = MockGpio::new();
        let err = gpio
            .request_output(&LineAddress::Legacy(200), "t", false)
            .unwrap_err();
        assert!(matches!(err, GpioError::InvalidAddress(_)));
        assert_eq!(gpio.shared.requests.get(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn cdev_missing_chip_reports_chip_open() {
        let gpio = CdevGpio;
        let addr = LineAddress::chip("/dev/gpiochip-does-not-exist", 0);
        match gpio.request_output(&addr, "test", false) {
            Err(GpioError::ChipOpen(msg)) => assert!(msg.contains("gpiochip-does-not-exist")),
            Err(other) => panic!("expected ChipOpen, got {other}"),
            Ok(_) => panic!("request on a missing chip should fail"),
        }
    }
}
