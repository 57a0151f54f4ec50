//! Display mode profiles: the grid shape, how cells are interpreted, where
//! the active window sits, and the calibration constants that make an active
//! line add up to one line period.

use thiserror::Error;

use crate::machine::generic::font::{GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::machine::generic::framebuffer::FrameBuffer;
use crate::machine::generic::vsync::{TIMING_NTSC_262, Timing};

/// Allowed deviation of a modeled active line from the line period, in
/// parts per thousand.
pub const ACTIVE_TOLERANCE_PERMILLE: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    /// Cells hold character codes rendered through the 8x8 font
    Text,
    /// Cells hold 2-bit luma tags, one per pixel
    Graphics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    VSync,
    Blank,
    Active,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("mode {mode}: empty {width}x{height} grid")]
    EmptyGrid {
        mode: &'static str,
        width: usize,
        height: usize,
    },

    #[error("mode {mode}: active video starts at line {start}, inside vertical sync (lines ..={vsync_last})")]
    ActiveOverlapsVsync {
        mode: &'static str,
        start: u16,
        vsync_last: u16,
    },

    #[error("mode {mode}: active video ends at line {end}, past the last line {total}")]
    ActivePastLastLine {
        mode: &'static str,
        end: u32,
        total: u16,
    },

    #[error("mode {mode}: text start line {start} is not a multiple of the cell height {cell_height}")]
    MisalignedTextStart {
        mode: &'static str,
        start: u16,
        cell_height: u16,
    },

    #[error("mode {mode}: frame buffer is {actual:?}, mode needs {expected:?}")]
    BufferMismatch {
        mode: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("mode {mode}: {kind:?} line is busy for {busy_ns}ns, longer than the {period_ns}ns period")]
    LineOverBudget {
        mode: &'static str,
        kind: LineKind,
        busy_ns: u64,
        period_ns: u32,
    },

    #[error("mode {mode}: active line totals {total_ns}ns, more than 2% off the {period_ns}ns period")]
    ActiveOffBudget {
        mode: &'static str,
        total_ns: u64,
        period_ns: u32,
    },
}

/// Modeled cost of one scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBudget {
    /// Sum of the fixed busy waits
    pub waits_ns: u64,
    /// Encoder writes issued by the handler
    pub emissions: u64,
    pub emit_ns: u32,
    /// Configured idle tail (only the active right margin)
    pub idle_ns: u64,
}

impl LineBudget {
    pub fn busy_ns(&self) -> u64 {
        self.waits_ns + self.emissions * self.emit_ns as u64
    }

    pub fn total_ns(&self) -> u64 {
        self.busy_ns() + self.idle_ns
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    pub name: &'static str,
    pub kind: ModeKind,
    /// Grid columns
    pub width: usize,
    /// Grid rows
    pub height: usize,
    /// Horizontal repeat of each glyph bit (text modes)
    pub stretch: u8,
    /// First active scanline
    pub active_start: u16,
    pub left_margin_ns: u32,
    /// Front porch after the last pixel
    pub right_margin_ns: u32,
    /// Wall-clock cost of one encoder write, ie: the dwell of every pixel
    pub emit_ns: u32,
    pub sync: Timing,
}

pub const TEXT_20X20: ModeConfig = ModeConfig {
    name: "text-20x20",
    kind: ModeKind::Text,
    width: 20,
    height: 20,
    stretch: 2,
    active_start: 40,
    left_margin_ns: 2_000,
    right_margin_ns: 1_500,
    emit_ns: 150,
    sync: TIMING_NTSC_262,
};

pub const TEXT_30X28: ModeConfig = ModeConfig {
    name: "text-30x28",
    kind: ModeKind::Text,
    width: 30,
    height: 28,
    stretch: 1,
    active_start: 24,
    left_margin_ns: 1_500,
    right_margin_ns: 1_500,
    emit_ns: 200,
    sync: TIMING_NTSC_262,
};

pub const GRAPHICS_256X192: ModeConfig = ModeConfig {
    name: "graphics-256x192",
    kind: ModeKind::Graphics,
    width: 256,
    height: 192,
    stretch: 1,
    active_start: 48,
    left_margin_ns: 1_000,
    right_margin_ns: 1_500,
    emit_ns: 190,
    sync: TIMING_NTSC_262,
};

pub const GRAPHICS_WALL: ModeConfig = ModeConfig {
    name: "graphics-wall",
    active_start: 40,
    ..GRAPHICS_256X192
};

pub const PROFILES: [ModeConfig; 4] = [TEXT_20X20, TEXT_30X28, GRAPHICS_256X192, GRAPHICS_WALL];

impl ModeConfig {
    /// Scanlines per grid row.
    pub fn cell_height(&self) -> u16 {
        match self.kind {
            ModeKind::Text => GLYPH_HEIGHT as u16,
            ModeKind::Graphics => 1,
        }
    }

    /// Luma decisions per active line.
    pub fn row_len(&self) -> usize {
        match self.kind {
            ModeKind::Text => self.width * GLYPH_WIDTH * self.stretch.max(1) as usize,
            ModeKind::Graphics => self.width,
        }
    }

    pub fn active_lines(&self) -> u32 {
        self.height as u32 * self.cell_height() as u32
    }

    /// The full line timing for this mode: shared sync plus this mode's
    /// active window and left margin.
    pub fn timing(&self) -> Timing {
        Timing {
            v_active_start: self.active_start,
            v_active: self.active_lines().min(u16::MAX as u32) as u16,
            cell_height: self.cell_height(),
            h_left_ns: self.left_margin_ns,
            ..self.sync
        }
    }

    /// Nanoseconds from the falling edge of horizontal sync to the start of
    /// the first pixel.
    pub fn first_pixel_offset_ns(&self) -> u32 {
        // sync, back porch and left margin writes precede the first pixel
        self.sync.h_sync_ns + self.sync.h_bp_ns + self.left_margin_ns + 3 * self.emit_ns
    }

    pub fn line_budget(&self, kind: LineKind) -> LineBudget {
        let s = &self.sync;
        let hsync = (s.h_sync_ns + s.h_bp_ns) as u64;
        let (waits_ns, emissions, idle_ns) = match kind {
            LineKind::VSync => (2 * (s.v_pulse_ns + s.v_serration_ns) as u64, 4, 0),
            LineKind::Blank => (hsync, 3, 0),
            LineKind::Active => (
                hsync + self.left_margin_ns as u64,
                self.row_len() as u64 + 4,
                self.right_margin_ns as u64,
            ),
        };
        let mut budget = LineBudget {
            waits_ns,
            emissions,
            emit_ns: self.emit_ns,
            idle_ns,
        };
        if kind != LineKind::Active {
            budget.idle_ns = (s.line_period_ns as u64).saturating_sub(budget.busy_ns());
        }
        budget
    }

    /// Check that the profile describes a frame the engine can produce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mode = self.name;
        let s = &self.sync;
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                mode,
                width: self.width,
                height: self.height,
            });
        }
        if self.active_start <= s.v_sync_last {
            return Err(ConfigError::ActiveOverlapsVsync {
                mode,
                start: self.active_start,
                vsync_last: s.v_sync_last,
            });
        }
        // The window is half-open, so the last active line is end - 1
        let end = self.active_start as u32 + self.active_lines();
        if end > s.total_lines as u32 + 1 {
            return Err(ConfigError::ActivePastLastLine {
                mode,
                end,
                total: s.total_lines,
            });
        }
        if self.active_start % self.cell_height() != 0 {
            return Err(ConfigError::MisalignedTextStart {
                mode,
                start: self.active_start,
                cell_height: self.cell_height(),
            });
        }

        for kind in [LineKind::VSync, LineKind::Blank, LineKind::Active] {
            let busy_ns = self.line_budget(kind).busy_ns();
            if busy_ns > s.line_period_ns as u64 {
                return Err(ConfigError::LineOverBudget {
                    mode,
                    kind,
                    busy_ns,
                    period_ns: s.line_period_ns,
                });
            }
        }

        let total_ns = self.line_budget(LineKind::Active).total_ns();
        let period = s.line_period_ns as u64;
        if total_ns.abs_diff(period) * 1000 > period * ACTIVE_TOLERANCE_PERMILLE {
            return Err(ConfigError::ActiveOffBudget {
                mode,
                total_ns,
                period_ns: s.line_period_ns,
            });
        }
        Ok(())
    }

    /// Check that `fb` has the grid dimensions this mode renders.
    pub fn check_buffer(&self, fb: &FrameBuffer) -> Result<(), ConfigError> {
        if (fb.width(), fb.height()) != (self.width, self.height) {
            return Err(ConfigError::BufferMismatch {
                mode: self.name,
                expected: (self.width, self.height),
                actual: (fb.width(), fb.height()),
            });
        }
        Ok(())
    }

    /// A frame buffer sized for this mode.
    pub fn frame_buffer(&self) -> FrameBuffer {
        FrameBuffer::new(self.width, self.height)
    }
}
