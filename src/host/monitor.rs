//! A crude composite monitor. It separates sync by pulse width, counts
//! scanlines from the end of vertical sync, and samples each active line at
//! the centre of every pixel the mode emits.
//!
//! The monitor is fed from inside the line handler, so it never blocks:
//! finished frames are handed over with `try_lock`, and dropped if the
//! reader happens to hold the slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::host::clock::WaveformSink;
use crate::machine::generic::encoder::LumaLevel;
use crate::machine::ntsc::ModeConfig;

/// Sync pulses at least this long are vertical (broad) pulses.
pub const BROAD_PULSE_NS: u64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonitorGeometry {
    /// From the falling edge of horizontal sync to the first pixel
    pub first_pixel_ns: u64,
    pub pixel_ns: u64,
    pub pixels: usize,
    /// Scanlines between the end of vertical sync and the first active line
    pub skip_lines: usize,
    pub lines: usize,
}

impl MonitorGeometry {
    pub fn for_mode(mode: &ModeConfig) -> Self {
        Self {
            first_pixel_ns: mode.first_pixel_offset_ns() as u64,
            pixel_ns: mode.emit_ns.max(1) as u64,
            pixels: mode.row_len(),
            skip_lines: mode.active_start.saturating_sub(mode.sync.v_sync_last + 1) as usize,
            lines: mode.active_lines() as usize,
        }
    }
}

/// One decoded picture.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    /// Active lines only, top to bottom
    pub lines: Vec<Vec<LumaLevel>>,
    /// Horizontal lines seen between the two vertical syncs
    pub scanlines: usize,
}

impl Frame {
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Level at `(x, y)`, black where nothing was sampled.
    pub fn level(&self, x: usize, y: usize) -> LumaLevel {
        self.lines
            .get(y)
            .and_then(|line| line.get(x))
            .copied()
            .unwrap_or(LumaLevel::Black)
    }

    /// Plain text rendering, keeping every `x_step`th pixel of every
    /// `y_step`th line.
    pub fn to_ascii(&self, x_step: usize, y_step: usize) -> String {
        let mut out = String::new();
        for y in (0..self.height()).step_by(y_step.max(1)) {
            for x in (0..self.width).step_by(x_step.max(1)) {
                out.push(match self.level(x, y) {
                    LumaLevel::Sync => '!',
                    LumaLevel::Black => ' ',
                    LumaLevel::Gray => '+',
                    LumaLevel::White => '#',
                });
            }
            out.push('\n');
        }
        out
    }
}

/// Reader side of a [`Monitor`].
#[derive(Clone, Debug)]
pub struct MonitorView {
    slot: Arc<Mutex<Option<Frame>>>,
    published: Arc<AtomicU64>,
}

impl MonitorView {
    /// The most recently completed frame.
    pub fn latest(&self) -> Option<Frame> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Frames decoded so far, including any dropped on contention.
    pub fn frames(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

pub struct Monitor {
    geometry: MonitorGeometry,
    slot: Arc<Mutex<Option<Frame>>>,
    published: Arc<AtomicU64>,

    level: LumaLevel,
    pulse_start: u64,
    line_start: Option<u64>,
    transitions: Vec<(u64, LumaLevel)>,

    locked: bool,
    in_vsync: bool,
    scanline: usize,
    lines: Vec<Vec<LumaLevel>>,
}

impl Monitor {
    pub fn new(geometry: MonitorGeometry) -> Self {
        Self {
            geometry,
            slot: Default::default(),
            published: Default::default(),
            level: LumaLevel::Black,
            pulse_start: 0,
            line_start: None,
            transitions: Vec::new(),
            locked: false,
            in_vsync: false,
            scanline: 0,
            lines: Vec::with_capacity(geometry.lines),
        }
    }

    pub fn view(&self) -> MonitorView {
        MonitorView {
            slot: self.slot.clone(),
            published: self.published.clone(),
        }
    }

    fn vertical_sync(&mut self) {
        // Every broad pulse after the first in a sync group is a no-op
        if self.in_vsync {
            return;
        }
        self.in_vsync = true;
        if self.locked {
            self.publish();
        } else {
            debug!("Monitor locked to vertical sync");
            self.locked = true;
        }
        self.scanline = 0;
        self.lines.clear();
    }

    fn finish_line(&mut self, start: u64, end: u64) {
        if !self.locked {
            return;
        }
        let index = self.scanline;
        self.scanline += 1;
        let g = self.geometry;
        if index < g.skip_lines || index >= g.skip_lines + g.lines {
            return;
        }

        let mut line = Vec::with_capacity(g.pixels);
        let mut current = LumaLevel::Sync;
        let mut transitions = self.transitions.iter().peekable();
        for k in 0..g.pixels as u64 {
            let t = start + g.first_pixel_ns + k * g.pixel_ns + g.pixel_ns / 2;
            if t >= end {
                break;
            }
            while let Some((_, level)) = transitions.next_if(|(at, _)| *at <= t) {
                current = *level;
            }
            line.push(current);
        }
        self.lines.push(line);
    }

    fn publish(&mut self) {
        let frame = Frame {
            width: self.geometry.pixels,
            lines: std::mem::take(&mut self.lines),
            scanlines: self.scanline,
        };
        if frame.height() < self.geometry.lines {
            debug!(
                "Short frame: {} of {} active lines ({} scanlines)",
                frame.height(),
                self.geometry.lines,
                frame.scanlines
            );
        }
        match self.slot.try_lock() {
            Ok(mut slot) => *slot = Some(frame),
            Err(_) => trace!("Frame dropped, reader holds the slot"),
        }
        self.published.fetch_add(1, Ordering::Relaxed);
    }
}

impl WaveformSink for Monitor {
    fn level_changed(&mut self, at_ns: u64, level: LumaLevel) {
        let was = std::mem::replace(&mut self.level, level);
        if level == LumaLevel::Sync {
            // Falling edge: the previous line (if any) is complete
            if let Some(start) = self.line_start.take() {
                self.finish_line(start, at_ns);
            }
            self.pulse_start = at_ns;
            self.transitions.clear();
        } else if was == LumaLevel::Sync {
            if at_ns - self.pulse_start >= BROAD_PULSE_NS {
                self.vertical_sync();
            } else {
                self.in_vsync = false;
                self.line_start = Some(self.pulse_start);
            }
        }
        self.transitions.push((at_ns, level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::clock::{SimClock, SimDelay, SimGpio};
    use crate::machine::generic::encoder::{LumaEncoder, PinPair, TAG_GRAY, TAG_WHITE};
    use crate::machine::generic::font::FONT_8X8;
    use crate::machine::generic::framebuffer::FrameBuffer;
    use crate::machine::generic::raster::{PixelRaster, Rasterizer, TextRaster};
    use crate::machine::generic::vsync::VideoEngine;
    use crate::machine::ntsc::profiles::{GRAPHICS_256X192, TEXT_20X20};

    fn drive<R: Rasterizer>(
        mode: &ModeConfig,
        fb: Arc<FrameBuffer>,
        raster: R,
        lines: u64,
    ) -> MonitorView {
        let clock = SimClock::new();
        let monitor = Monitor::new(MonitorGeometry::for_mode(mode));
        let view = monitor.view();
        let gpio = SimGpio::new(clock.clone(), mode.emit_ns, PinPair::default(), monitor);
        let mut engine = VideoEngine::new(
            mode.timing(),
            fb,
            raster,
            LumaEncoder::new(gpio, PinPair::default()),
            SimDelay::new(clock.clone()),
        );
        let period = mode.sync.line_period_ns as u64;
        for n in 0..lines {
            clock.set_at_least(n * period);
            engine.horizontal_line();
        }
        view
    }

    #[test]
    fn test_decodes_hi_from_waveform() {
        let fb = Arc::new(TEXT_20X20.frame_buffer());
        fb.blit_string(0, 0, "HI");
        // One frame to lock, then through the next vertical sync
        let view = drive(&TEXT_20X20, fb, TextRaster::new(&FONT_8X8, 2), 262 + 3);
        assert_eq!(view.frames(), 1);
        let frame = view.latest().expect("no frame decoded");
        assert_eq!(frame.scanlines, 259);
        assert_eq!(frame.height(), 160);
        assert_eq!(frame.width, 320);

        for (i, c) in [b'H', b'I'].into_iter().enumerate() {
            for sub_row in 0..8 {
                let bits = FONT_8X8.row(c, sub_row);
                for w in 0..8 {
                    let expected = if bits & (1 << w) != 0 {
                        LumaLevel::White
                    } else {
                        LumaLevel::Black
                    };
                    for s in 0..2 {
                        let x = (i * 8 + w) * 2 + s;
                        assert_eq!(
                            frame.level(x, sub_row),
                            expected,
                            "{} ({x}, {sub_row})",
                            c as char
                        );
                    }
                }
            }
        }
        // Everything else is black
        assert!(frame.lines[8..].iter().flatten().all(|l| *l == LumaLevel::Black));
        assert!(
            frame.lines[..8]
                .iter()
                .all(|line| line[32..].iter().all(|l| *l == LumaLevel::Black))
        );
    }

    #[test]
    fn test_decodes_graphics_tags() {
        let fb = Arc::new(GRAPHICS_256X192.frame_buffer());
        fb.write(0, 0, TAG_WHITE);
        fb.write(255, 191, TAG_GRAY);
        fb.write(128, 96, TAG_WHITE);
        // Lock on the first vertical sync, publish at the next two
        let view = drive(&GRAPHICS_256X192, fb, PixelRaster, 262 * 2 + 3);
        assert_eq!(view.frames(), 2);
        let frame = view.latest().unwrap();
        assert_eq!(frame.height(), 192);
        assert_eq!(frame.level(0, 0), LumaLevel::White);
        assert_eq!(frame.level(1, 0), LumaLevel::Black);
        assert_eq!(frame.level(255, 191), LumaLevel::Gray);
        assert_eq!(frame.level(128, 96), LumaLevel::White);
        let lit = frame
            .lines
            .iter()
            .flatten()
            .filter(|l| **l != LumaLevel::Black)
            .count();
        assert_eq!(lit, 3);
    }

    #[test]
    fn test_no_frame_before_lock() {
        let fb = Arc::new(TEXT_20X20.frame_buffer());
        let view = drive(&TEXT_20X20, fb, TextRaster::new(&FONT_8X8, 2), 262);
        assert_eq!(view.frames(), 0);
        assert_eq!(view.latest(), None);
    }

    #[test]
    fn test_ascii_rendering() {
        let frame = Frame {
            width: 3,
            lines: vec![
                vec![LumaLevel::White, LumaLevel::Black, LumaLevel::Gray],
                vec![LumaLevel::Black; 3],
            ],
            scanlines: 2,
        };
        assert_eq!(frame.to_ascii(1, 1), "# +\n   \n");
        assert_eq!(frame.to_ascii(2, 2), "#+\n");
    }
}
