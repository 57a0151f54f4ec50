//! Simulated time for running the line handler off-target. Busy waits and
//! GPIO writes advance a shared nanosecond clock instead of burning CPU, so
//! the waveform they produce can be decoded with exact timestamps.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::machine::generic::encoder::{GpioMask, LumaLevel, PinPair};
use crate::machine::generic::vsync::Delay;

#[derive(Clone, Debug, Default)]
pub struct SimClock(Arc<AtomicU64>);

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn advance(&self, ns: u64) {
        self.0.fetch_add(ns, Ordering::Relaxed);
    }

    /// Move the clock forward to `ns`. Never moves it back: a handler that
    /// overran its period keeps the time it actually took.
    pub fn set_at_least(&self, ns: u64) {
        self.0.fetch_max(ns, Ordering::Relaxed);
    }
}

/// [`Delay`] against a [`SimClock`].
#[derive(Clone, Debug)]
pub struct SimDelay {
    clock: SimClock,
}

impl SimDelay {
    pub fn new(clock: SimClock) -> Self {
        Self { clock }
    }
}

impl Delay for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(ns as u64);
    }
}

/// Receives the signal as a series of level changes.
pub trait WaveformSink {
    fn level_changed(&mut self, at_ns: u64, level: LumaLevel);
}

impl<S: WaveformSink + ?Sized> WaveformSink for Box<S> {
    fn level_changed(&mut self, at_ns: u64, level: LumaLevel) {
        (**self).level_changed(at_ns, level);
    }
}

/// Records every change, for tests.
impl WaveformSink for Vec<(u64, LumaLevel)> {
    fn level_changed(&mut self, at_ns: u64, level: LumaLevel) {
        self.push((at_ns, level));
    }
}

/// A GPIO output register where each write takes `write_cost_ns` of simulated
/// time. Changes on the video pins are reported to the sink as they happen.
pub struct SimGpio<S> {
    clock: SimClock,
    write_cost_ns: u32,
    pins: PinPair,
    out: u32,
    level: Option<LumaLevel>,
    sink: S,
}

impl<S: WaveformSink> SimGpio<S> {
    pub fn new(clock: SimClock, write_cost_ns: u32, pins: PinPair, sink: S) -> Self {
        Self {
            clock,
            write_cost_ns,
            pins,
            out: 0,
            level: None,
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: WaveformSink> GpioMask for SimGpio<S> {
    fn put_masked(&mut self, mask: u32, value: u32) {
        self.out = (self.out & !mask) | (value & mask);
        let level = self.pins.decode(self.out);
        if self.level != Some(level) {
            self.level = Some(level);
            self.sink.level_changed(self.clock.now(), level);
        }
        self.clock.advance(self.write_cost_ns as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::generic::encoder::{LumaEncoder, SignalPins};

    #[test]
    fn test_clock_never_runs_backwards() {
        let clock = SimClock::new();
        clock.advance(500);
        clock.set_at_least(300);
        assert_eq!(clock.now(), 500);
        clock.set_at_least(64_000);
        assert_eq!(clock.now(), 64_000);
    }

    #[test]
    fn test_delay_advances_clock() {
        let clock = SimClock::new();
        let mut delay = SimDelay::new(clock.clone());
        delay.delay_us(5);
        delay.delay_ns(7);
        assert_eq!(clock.now(), 5_007);
    }

    #[test]
    fn test_writes_cost_time_and_report_changes() {
        let clock = SimClock::new();
        let gpio = SimGpio::new(clock.clone(), 200, PinPair::default(), Vec::new());
        let mut encoder = LumaEncoder::new(gpio, PinPair::default());
        encoder.emit(LumaLevel::Sync);
        encoder.emit(LumaLevel::Black);
        encoder.emit(LumaLevel::Black);
        encoder.emit(LumaLevel::White);
        assert_eq!(clock.now(), 800);
        assert_eq!(
            encoder.gpio().sink()[..],
            [
                (0, LumaLevel::Sync),
                (200, LumaLevel::Black),
                (600, LumaLevel::White)
            ]
        );
    }
}
