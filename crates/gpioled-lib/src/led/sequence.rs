//! Non-blocking blink state machine — timing logic decoupled from line I/O.
//!
//! [`BlinkSequence`] only decides *when* the line should change. The owning
//! [`LedDevice`](super::LedDevice) feeds it timestamps and performs the
//! writes dictated by the returned [`SequenceStep`].

use std::time::Duration;

/// What the caller should do after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    /// Flip the line.
    Toggle,
    /// Sequence completed: force the line off.
    Finish,
    /// Nothing to do yet (or no sequence running).
    NoChange,
}

/// Progress of one timed blink sequence.
#[derive(Debug, Clone, Default)]
pub struct BlinkSequence {
    active: bool,
    /// Time of the last level change; the next half-period is measured from here.
    reference: Duration,
    half_period: Duration,
    cycles: u32,
    toggle_count: u64,
}

/// Time between consecutive level changes so that `cycles` full on/off
/// cycles fit in `duration_ms`. Returns `None` when either is zero.
pub fn half_period(duration_ms: u64, cycles: u32) -> Option<Duration> {
    if duration_ms == 0 || cycles == 0 {
        return None;
    }
    let nanos = Duration::from_millis(duration_ms).as_nanos() / (2 * u128::from(cycles));
    Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
}

impl BlinkSequence {
    /// Arm a new sequence starting at `now`. Resets progress.
    pub fn start(&mut self, now: Duration, half_period: Duration, cycles: u32) {
        self.active = true;
        self.reference = now;
        self.half_period = half_period;
        self.cycles = cycles;
        self.toggle_count = 0;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn half_period(&self) -> Duration {
        self.half_period
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Half-period boundaries crossed since the sequence started.
    pub fn toggle_count(&self) -> u64 {
        self.toggle_count
    }

    /// Advance the sequence to `now`.
    ///
    /// The reference time moves to `now` on every toggle, so a late poll
    /// delays all following toggles instead of being caught up later.
    pub fn poll(&mut self, now: Duration) -> SequenceStep {
        if !self.active || now <= self.reference {
            return SequenceStep::NoChange;
        }
        if now - self.reference < self.half_period {
            return SequenceStep::NoChange;
        }

        self.toggle_count += 1;
        if self.toggle_count >= 2 * u64::from(self.cycles) {
            self.active = false;
            return SequenceStep::Finish;
        }
        self.reference = now;
        SequenceStep::Toggle
    }
}
