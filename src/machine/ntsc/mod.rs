//! Composite NTSC output: profile selection and bring-up.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::machine::generic::encoder::SignalPins;
use crate::machine::generic::font::FONT_8X8;
use crate::machine::generic::framebuffer::FrameBuffer;
use crate::machine::generic::raster::{PixelRaster, TextRaster};
use crate::machine::generic::vsync::{Delay, VideoEngine};

pub mod profiles;

pub use profiles::{ConfigError, LineKind, ModeConfig, ModeKind};

/// A periodic interrupt source. `install` arms the timer so that `handler`
/// runs once every `period_ns`, for as long as the system is up.
pub trait LineTimer {
    fn install<F: FnMut() + Send + 'static>(self, period_ns: u32, handler: F);
}

/// What the application loop gets back from [`start`].
#[derive(Clone, Debug)]
pub struct VideoStatus {
    mode: &'static str,
    frames: Arc<AtomicU64>,
}

impl VideoStatus {
    pub fn mode(&self) -> &'static str {
        self.mode
    }

    /// Completed frames since start.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

/// Validate `mode`, build the line handler for it and hand it to `timer`.
/// After this returns the application only ever touches `fb`.
pub fn start<P, D, T>(
    mode: &ModeConfig,
    fb: Arc<FrameBuffer>,
    pins: P,
    delay: D,
    timer: T,
) -> Result<VideoStatus, ConfigError>
where
    P: SignalPins + Send + 'static,
    D: Delay + Send + 'static,
    T: LineTimer,
{
    mode.validate()?;
    mode.check_buffer(&fb)?;

    let timing = mode.timing();
    let frames = Arc::new(AtomicU64::new(0));
    info!(
        "Starting {} video: {}x{} {:?}, lines {}..{}",
        mode.name,
        mode.width,
        mode.height,
        mode.kind,
        timing.v_active_start,
        timing.v_active_end()
    );
    for kind in [LineKind::VSync, LineKind::Blank, LineKind::Active] {
        let budget = mode.line_budget(kind);
        debug!(
            "{kind:?} line: busy {}ns, idle {}ns of {}ns",
            budget.busy_ns(),
            budget.idle_ns,
            timing.line_period_ns
        );
    }

    match mode.kind {
        ModeKind::Text => {
            let raster = TextRaster::new(&FONT_8X8, mode.stretch);
            let mut engine = VideoEngine::new(timing, fb, raster, pins, delay)
                .with_frame_counter(frames.clone());
            timer.install(timing.line_period_ns, move || engine.horizontal_line());
        }
        ModeKind::Graphics => {
            let mut engine = VideoEngine::new(timing, fb, PixelRaster, pins, delay)
                .with_frame_counter(frames.clone());
            timer.install(timing.line_period_ns, move || engine.horizontal_line());
        }
    }

    Ok(VideoStatus {
        mode: mode.name,
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::generic::encoder::LumaLevel;
    use super::profiles::{GRAPHICS_256X192, TEXT_20X20, TEXT_30X28};
    use std::sync::Mutex;

    type Handler = Box<dyn FnMut() + Send>;

    #[derive(Clone, Default)]
    struct CapturedTimer(Arc<Mutex<Option<(u32, Handler)>>>);

    impl LineTimer for CapturedTimer {
        fn install<F: FnMut() + Send + 'static>(self, period_ns: u32, handler: F) {
            *self.0.lock().unwrap() = Some((period_ns, Box::new(handler)));
        }
    }

    impl CapturedTimer {
        fn fire(&self, times: usize) {
            let mut slot = self.0.lock().unwrap();
            let (_, handler) = slot.as_mut().expect("timer not installed");
            for _ in 0..times {
                (*handler)();
            }
        }
    }

    #[derive(Clone, Default)]
    struct CountingPins(Arc<Mutex<Vec<LumaLevel>>>);

    impl SignalPins for CountingPins {
        fn emit(&mut self, level: LumaLevel) {
            self.0.lock().unwrap().push(level);
        }
    }

    struct NoDelay;

    impl Delay for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_start_installs_line_handler() {
        let fb = Arc::new(TEXT_20X20.frame_buffer());
        let timer = CapturedTimer::default();
        let status = start(
            &TEXT_20X20,
            fb.clone(),
            CountingPins::default(),
            NoDelay,
            timer.clone(),
        )
        .unwrap();
        assert_eq!(timer.0.lock().unwrap().as_ref().unwrap().0, 64_000);
        assert_eq!(status.mode(), "text-20x20");
        assert_eq!(status.frames(), 0);
        timer.fire(262 * 2);
        assert_eq!(status.frames(), 2);
    }

    #[test]
    fn test_start_rejects_wrong_buffer() {
        let fb = Arc::new(FrameBuffer::new(20, 20));
        let timer = CapturedTimer::default();
        let err = start(&TEXT_30X28, fb, CountingPins::default(), NoDelay, timer.clone())
            .unwrap_err();
        assert!(matches!(err, ConfigError::BufferMismatch { .. }));
        assert!(timer.0.lock().unwrap().is_none());
    }

    #[test]
    fn test_start_rejects_invalid_mode() {
        let mode = ModeConfig {
            active_start: 4,
            ..GRAPHICS_256X192
        };
        let fb = Arc::new(mode.frame_buffer());
        let err = start(&mode, fb, CountingPins::default(), NoDelay, CapturedTimer::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::ActiveOverlapsVsync { .. }));
    }

    #[test]
    fn test_graphics_mode_emits_buffer_tags() {
        let fb = Arc::new(GRAPHICS_256X192.frame_buffer());
        for x in 0..256 {
            fb.write(x, 0, (x % 3) as u8);
        }
        let pins = CountingPins::default();
        let timer = CapturedTimer::default();
        start(&GRAPHICS_256X192, fb, pins.clone(), NoDelay, timer.clone()).unwrap();

        // Lines 1..=47 are blanking or sync
        timer.fire(47);
        pins.0.lock().unwrap().clear();
        timer.fire(1);
        let emitted = pins.0.lock().unwrap();
        // sync, back porch, left margin, 256 pixels, right margin
        assert_eq!(emitted.len(), 260);
        let pixels = &emitted[3..259];
        assert_eq!(pixels[0], LumaLevel::Black);
        assert_eq!(pixels[1], LumaLevel::White);
        assert_eq!(pixels[2], LumaLevel::Gray);
        assert_eq!(pixels.iter().filter(|l| **l == LumaLevel::Gray).count(), 85);
    }
}
