//! Host stand-ins for the line-rate interrupt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use crate::host::clock::SimClock;
use crate::machine::generic::vsync::TIMING_NTSC_262;
use crate::machine::ntsc::LineTimer;

const FRAME_LINES: u64 = TIMING_NTSC_262.total_lines as u64;
const WARN_INTERVAL: Duration = Duration::from_secs(1);

/// Fires the handler from a background thread, in bursts that keep pace with
/// real time on average. Before each call the simulated clock is moved to the
/// line's scheduled start, as the hardware timer would.
#[derive(Clone, Debug)]
pub struct ThreadLineTimer {
    clock: SimClock,
    stop: Arc<AtomicBool>,
}

impl ThreadLineTimer {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask the timer thread to exit after its current burst.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl LineTimer for ThreadLineTimer {
    fn install<F: FnMut() + Send + 'static>(self, period_ns: u32, mut handler: F) {
        let period = period_ns.max(1) as u64;
        thread::spawn(move || {
            let start = Instant::now();
            let mut fired: u64 = 0;
            let mut last_warn: Option<Instant> = None;
            while !self.stop.load(Ordering::Relaxed) {
                let due = start.elapsed().as_nanos() as u64 / period + 1;
                if due.saturating_sub(fired) > FRAME_LINES {
                    if last_warn.is_none_or(|t| t.elapsed() > WARN_INTERVAL) {
                        warn!(
                            "Line timer is {} lines behind, skipping ahead",
                            due - fired
                        );
                        last_warn = Some(Instant::now());
                    }
                    fired = due - FRAME_LINES;
                }
                while fired < due {
                    self.clock.set_at_least(fired * period);
                    handler();
                    fired += 1;
                }
                thread::sleep(Duration::from_millis(1));
            }
            trace!("Line timer thread exited after {fired} lines");
        });
    }
}

type Handler = Box<dyn FnMut() + Send>;

struct Installed {
    period: u64,
    fired: u64,
    handler: Handler,
}

/// A timer driven by hand: each [`StepTimer::step`] fires the handler for
/// that many lines back to back, with the simulated clock on schedule.
#[derive(Clone)]
pub struct StepTimer {
    clock: SimClock,
    installed: Arc<Mutex<Option<Installed>>>,
}

impl StepTimer {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            installed: Default::default(),
        }
    }

    /// Run `lines` line interrupts. Returns false if nothing is installed.
    pub fn step(&self, lines: u64) -> bool {
        let mut installed = self
            .installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(installed) = installed.as_mut() else {
            return false;
        };
        for _ in 0..lines {
            self.clock.set_at_least(installed.fired * installed.period);
            (installed.handler)();
            installed.fired += 1;
        }
        true
    }

    pub fn fired(&self) -> u64 {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |installed| installed.fired)
    }
}

impl LineTimer for StepTimer {
    fn install<F: FnMut() + Send + 'static>(self, period_ns: u32, handler: F) {
        *self
            .installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Installed {
            period: period_ns as u64,
            fired: 0,
            handler: Box::new(handler),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_step_timer_schedules_clock() {
        let clock = SimClock::new();
        let timer = StepTimer::new(clock.clone());
        assert!(!timer.step(1));

        let starts = Arc::new(Mutex::new(Vec::new()));
        let starts_clone = starts.clone();
        let handler_clock = clock.clone();
        timer.clone().install(64_000, move || {
            starts_clone.lock().unwrap().push(handler_clock.now());
            // A handler that overruns pushes the next line back
            handler_clock.advance(if handler_clock.now() == 64_000 { 70_000 } else { 1_000 });
        });
        assert!(timer.step(4));
        assert_eq!(timer.fired(), 4);
        assert_eq!(*starts.lock().unwrap(), [0, 64_000, 134_000, 192_000]);
    }

    #[test]
    fn test_thread_timer_fires_at_line_rate() {
        let clock = SimClock::new();
        let timer = ThreadLineTimer::new(clock.clone());
        let count = Arc::new(AtomicU64::new(0));
        let count_clone = count.clone();
        timer.clone().install(64_000, move || {
            count_clone.fetch_add(1, Ordering::Relaxed);
        });
        thread::sleep(Duration::from_millis(50));
        timer.stop();
        let fired = count.load(Ordering::Relaxed);
        println!("Runs: {fired}");
        // 50ms is ~781 lines; leave room for a slow scheduler
        assert!(fired > 100, "only {fired} lines in 50ms");
        assert!(clock.now() >= (fired - 1) * 64_000);
    }
}
