//! LED device — line lifecycle, immediate controls and blink sequences.

use std::time::Duration;

use crate::clock::{Clock, MonotonicClock};
use crate::gpio::{GpioBackend, GpioError, GpioLine, LineAddress, PlatformGpio, Result};

use super::pattern::BlinkPattern;
use super::polarity::Polarity;
use super::sequence::{self, BlinkSequence, SequenceStep};

/// Consumer label attached to line requests unless overridden.
pub const DEFAULT_CONSUMER: &str = "gpioled";

/// One LED on one GPIO line.
///
/// Constructing a device touches no hardware; [`begin`](Self::begin)
/// requests the line and [`clean`](Self::clean) (or drop) gives it back.
/// Not thread-safe: drive it from a single loop.
pub struct LedDevice<G: GpioBackend = PlatformGpio, C: Clock = MonotonicClock> {
    backend: G,
    clock: C,
    address: LineAddress,
    consumer: String,
    polarity: Polarity,
    on_value: bool,
    /// Present exactly while the device is initialized.
    line: Option<G::Line>,
    sequence: BlinkSequence,
}

impl LedDevice {
    /// Device on the platform GPIO backend with a real monotonic clock.
    pub fn with_platform(address: LineAddress, polarity: Polarity) -> Self {
        Self::new(address, polarity, PlatformGpio::default(), MonotonicClock::new())
    }
}

impl<G: GpioBackend, C: Clock> LedDevice<G, C> {
    pub fn new(address: LineAddress, polarity: Polarity, backend: G, clock: C) -> Self {
        Self {
            backend,
            clock,
            address,
            consumer: DEFAULT_CONSUMER.to_string(),
            polarity,
            on_value: polarity.on_value(),
            line: None,
            sequence: BlinkSequence::default(),
        }
    }

    /// Override the consumer label shown by `gpioinfo`.
    pub fn with_consumer(mut self, consumer: impl Into<String>) -> Self {
        self.consumer = consumer.into();
        self
    }

    pub fn address(&self) -> &LineAddress {
        &self.address
    }

    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Raw level that lights the LED.
    pub fn on_value(&self) -> bool {
        self.on_value
    }

    pub fn is_initialized(&self) -> bool {
        self.line.is_some()
    }

    /// Borrow the owned line handle, if initialized.
    pub fn line(&self) -> Option<&G::Line> {
        self.line.as_ref()
    }

    // ── Lifecycle ──

    /// Request the line as an output, driven off.
    ///
    /// On failure nothing is held and the device stays uninitialized.
    /// Calling `begin` on an initialized device does nothing.
    pub fn begin(&mut self) -> Result<()> {
        if self.line.is_some() {
            return Ok(());
        }
        let line = self
            .backend
            .request_output(&self.address, &self.consumer, !self.on_value)?;
        self.line = Some(line);
        self.sequence = BlinkSequence::default();
        log::debug!("LED on {} initialized ({})", self.address, self.polarity);
        Ok(())
    }

    /// Release the line and park it as an input.
    ///
    /// The device is uninitialized afterwards even if parking fails; the
    /// error is still returned. Safe to call repeatedly.
    pub fn clean(&mut self) -> Result<()> {
        self.sequence.stop();
        let Some(line) = self.line.take() else {
            return Ok(());
        };
        line.release();

        match self.backend.park_input(&self.address, &self.consumer) {
            Ok(()) => {
                log::debug!("LED on {} released", self.address);
                Ok(())
            }
            Err(e @ GpioError::ReleaseFailed(_)) => Err(e),
            Err(e) => Err(GpioError::ReleaseFailed(e.to_string())),
        }
    }

    // ── Immediate controls ──

    fn write(&mut self, value: bool) -> Result<()> {
        let line = self.line.as_mut().ok_or(GpioError::NotInitialized)?;
        line.set_value(value)
    }

    pub fn turn_on(&mut self) -> Result<()> {
        self.write(self.on_value)
    }

    pub fn turn_off(&mut self) -> Result<()> {
        self.write(!self.on_value)
    }

    /// Whether the LED is currently lit, read back from the line.
    pub fn is_on(&self) -> Result<bool> {
        let line = self.line.as_ref().ok_or(GpioError::NotInitialized)?;
        Ok(line.value()? == self.on_value)
    }

    /// Invert the current line level.
    ///
    /// Best effort: if the level cannot be read (or the device is not
    /// initialized) nothing happens.
    pub fn toggle(&mut self) {
        let Some(line) = self.line.as_mut() else {
            return;
        };
        match line.value() {
            Ok(current) => {
                if let Err(e) = line.set_value(!current) {
                    log::debug!("toggle on {} ignored: {e}", self.address);
                }
            }
            Err(e) => log::debug!("toggle on {} ignored: {e}", self.address),
        }
    }

    // ── Blocking patterns ──

    /// Run a fixed pattern, blocking until it completes. Leaves the LED off.
    pub fn run_pattern(&mut self, pattern: BlinkPattern) -> Result<()> {
        let steps = pattern.steps();
        log::debug!("running {pattern} pattern on {}", self.address);
        self.blink_blocking(steps.repetitions, steps.on_time, steps.off_time)
    }

    /// 5 × (on 100 ms, off 100 ms).
    pub fn blink_warning(&mut self) -> Result<()> {
        self.run_pattern(BlinkPattern::Warning)
    }

    /// 1 × (on 100 ms, off 100 ms).
    pub fn blink_init(&mut self) -> Result<()> {
        self.run_pattern(BlinkPattern::Init)
    }

    /// 2 × (on 50 ms, off 100 ms).
    pub fn blink_exit(&mut self) -> Result<()> {
        self.run_pattern(BlinkPattern::Exit)
    }

    fn blink_blocking(
        &mut self,
        repetitions: u32,
        on_time: Duration,
        off_time: Duration,
    ) -> Result<()> {
        for _ in 0..repetitions {
            self.turn_on()?;
            self.clock.sleep(on_time);
            self.turn_off()?;
            self.clock.sleep(off_time);
        }
        Ok(())
    }

    // ── Timed blink ──

    /// Blink `cycles` times within `duration_ms`.
    ///
    /// - Not initialized: does nothing.
    /// - `duration_ms == 0` or `cycles == 0`: stops any running sequence and
    ///   turns the LED off.
    /// - `blocking`: runs the whole sequence on the calling thread.
    /// - Otherwise turns the LED on, then arms the sequence and returns at once;
    ///   call [`blink_update`](Self::blink_update) from your loop to advance it.
    pub fn blink(&mut self, duration_ms: u64, cycles: u32, blocking: bool) -> Result<()> {
        if !self.is_initialized() {
            return Ok(());
        }
        let Some(half) = sequence::half_period(duration_ms, cycles) else {
            self.sequence.stop();
            return self.turn_off();
        };

        if blocking {
            self.sequence.stop();
            return self.blink_blocking(cycles, half, half);
        }

        self.turn_on()?;
        self.sequence.start(self.clock.now(), half, cycles);
        log::debug!(
            "blink armed on {}: {cycles} cycles, half-period {half:?}",
            self.address
        );
        Ok(())
    }

    /// Advance a non-blocking sequence using the device clock.
    pub fn blink_update(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.blink_update_at(now)
    }

    /// Advance a non-blocking sequence as of `now`.
    ///
    /// No-op when no sequence is running, when `now` is not past the last
    /// toggle, or when less than a half-period has elapsed since it.
    pub fn blink_update_at(&mut self, now: Duration) -> Result<()> {
        match self.sequence.poll(now) {
            SequenceStep::Toggle => {
                self.toggle();
                Ok(())
            }
            SequenceStep::Finish => {
                log::debug!("blink on {} finished", self.address);
                self.turn_off()
            }
            SequenceStep::NoChange => Ok(()),
        }
    }

    pub fn is_blinking(&self) -> bool {
        self.sequence.is_active()
    }

    /// Progress of the current (or last) sequence.
    pub fn sequence(&self) -> &BlinkSequence {
        &self.sequence
    }
}

impl<G: GpioBackend, C: Clock> Drop for LedDevice<G, C> {
    fn drop(&mut self) {
        if let Err(e) = self.clean() {
            log::warn!("LED cleanup on {} failed: {e}", self.address);
        }
    }
}
