//! Line-rate video timing. The handler runs once per scanline from a periodic
//! timer interrupt, emits that line's waveform with calibrated busy waits,
//! and advances the line counter.
//!
//! There is no pixel clock: inside the active window each decision stays on
//! the wire for as long as it takes to produce and emit the next one, so the
//! per-emission cost is part of the timing just like the waits are.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::encoder::{LumaLevel, SignalPins};
use super::framebuffer::FrameBuffer;
use super::raster::Rasterizer;

/// System clock feeding the line timer (Hz)
pub const LINE_TIMER_CLOCK_HZ: u64 = 125_000_000;
/// Line timer wrap value; the timer fires every `WRAP + 1` clocks
pub const LINE_TIMER_WRAP: u64 = 7999;

pub const TIMING_NTSC_262: Timing = Timing {
    total_lines: 262,
    line_period_ns: ((LINE_TIMER_WRAP + 1) * 1_000_000_000 / LINE_TIMER_CLOCK_HZ) as u32, // 64us
    h_sync_ns: 5_000,
    h_bp_ns: 7_000,
    v_sync_first: 3,
    v_sync_last: 5,
    v_pulse_ns: 25_000,
    v_serration_ns: 5_000,
    v_active_start: 40,
    v_active: 160,
    cell_height: 8,
    h_left_ns: 0,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Lines per frame, numbered from 1
    pub total_lines: u16,
    pub line_period_ns: u32,

    pub h_sync_ns: u32,
    pub h_bp_ns: u32,

    pub v_sync_first: u16,
    pub v_sync_last: u16, // inclusive
    /// Broad pulse: two per vertical sync line, each followed by a serration
    pub v_pulse_ns: u32,
    pub v_serration_ns: u32,

    pub v_active_start: u16,
    pub v_active: u16,
    /// Scanlines per frame buffer row
    pub cell_height: u16,

    /// Wait between the back porch and the first pixel. The right margin
    /// runs until the next interrupt.
    pub h_left_ns: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePhase {
    VSync(u16),
    /// Blanking between vertical sync and the active window
    BackPorch(u16),
    Active { row: u16, sub_row: u16 },
    /// Blanking after the active window, wrapping round to the lines before
    /// vertical sync
    FrontPorch(u16),
}

impl Timing {
    /// First line past the active window. Saturates rather than wrapping
    /// for windows that would run past `u16::MAX`.
    pub fn v_active_end(&self) -> u16 {
        self.v_active_start.saturating_add(self.v_active)
    }

    pub fn phase(&self, line: u16) -> LinePhase {
        // vsync -> bp -> active -> fp -> (wrap) -> fp -> vsync
        if line >= self.v_sync_first && line <= self.v_sync_last {
            LinePhase::VSync(line - self.v_sync_first)
        } else if line > self.v_sync_last && line < self.v_active_start {
            LinePhase::BackPorch(line - self.v_sync_last - 1)
        } else if line >= self.v_active_start && line < self.v_active_end() {
            let cell_height = self.cell_height.max(1);
            LinePhase::Active {
                row: (line - self.v_active_start) / cell_height,
                sub_row: line % cell_height,
            }
        } else if line >= self.v_active_end() {
            LinePhase::FrontPorch(line - self.v_active_end())
        } else {
            LinePhase::FrontPorch(self.total_lines.saturating_sub(self.v_active_end()) + line)
        }
    }
}

/// Calibrated busy wait. Implementations spin; they never yield.
pub trait Delay {
    fn delay_ns(&mut self, ns: u32);

    fn delay_us(&mut self, us: u32) {
        self.delay_ns(us.saturating_mul(1000));
    }
}

/// Scanline counter cycling through `1..=total`.
#[derive(Clone, Copy, Debug)]
pub struct LineCounter {
    line: u16,
    total: u16,
}

impl LineCounter {
    pub fn new(total: u16) -> Self {
        Self {
            line: 1,
            total: total.max(1),
        }
    }

    pub fn current(&self) -> u16 {
        self.line
    }

    /// Move to the next line. Returns true when the frame wrapped.
    pub fn advance(&mut self) -> bool {
        if self.line >= self.total {
            self.line = 1;
            true
        } else {
            self.line += 1;
            false
        }
    }
}

/// Everything the line handler needs between interrupts.
pub struct VideoEngine<P, D, R> {
    timing: Timing,
    pins: P,
    delay: D,
    raster: R,
    fb: Arc<FrameBuffer>,
    counter: LineCounter,
    frames: Arc<AtomicU64>,
}

impl<P: SignalPins, D: Delay, R: Rasterizer> VideoEngine<P, D, R> {
    pub fn new(timing: Timing, fb: Arc<FrameBuffer>, raster: R, pins: P, delay: D) -> Self {
        Self {
            timing,
            pins,
            delay,
            raster,
            fb,
            counter: LineCounter::new(timing.total_lines),
            frames: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Share the completed-frame count with another context.
    pub fn with_frame_counter(mut self, frames: Arc<AtomicU64>) -> Self {
        self.frames = frames;
        self
    }

    pub fn line(&self) -> u16 {
        self.counter.current()
    }

    pub fn phase(&self) -> LinePhase {
        self.timing.phase(self.counter.current())
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// The line interrupt body: emit the current line, then advance.
    pub fn horizontal_line(&mut self) {
        match self.phase() {
            LinePhase::VSync(_) => self.vsync(),
            LinePhase::Active { row, sub_row } => self.active_line(row, sub_row),
            LinePhase::BackPorch(_) | LinePhase::FrontPorch(_) => self.blank_line(),
        }
        if self.counter.advance() {
            self.frames.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn hsync(&mut self) {
        self.pins.emit(LumaLevel::Sync);
        self.delay.delay_ns(self.timing.h_sync_ns);
        self.pins.emit(LumaLevel::Black);
        self.delay.delay_ns(self.timing.h_bp_ns);
    }

    fn vsync(&mut self) {
        for _ in 0..2 {
            self.pins.emit(LumaLevel::Sync);
            self.delay.delay_ns(self.timing.v_pulse_ns);
            self.pins.emit(LumaLevel::Black);
            self.delay.delay_ns(self.timing.v_serration_ns);
        }
    }

    fn blank_line(&mut self) {
        self.hsync();
        self.pins.emit(LumaLevel::Black);
    }

    fn active_line(&mut self, row: u16, sub_row: u16) {
        self.hsync();
        // Left margin
        self.pins.emit(LumaLevel::Black);
        self.delay.delay_ns(self.timing.h_left_ns);

        // No per-pixel wait: each decision's dwell is the cost of the next emit
        for level in self
            .raster
            .rasterize_row(&self.fb, row as usize, sub_row as usize)
        {
            self.pins.emit(level);
        }

        // Right margin runs until the next interrupt
        self.pins.emit(LumaLevel::Black);
    }
}
