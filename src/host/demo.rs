//! Small applications that draw through the frame buffer API only.

use std::f64::consts::PI;

use crate::machine::generic::encoder::{TAG_GRAY, TAG_WHITE};
use crate::machine::generic::font::{FONT_8X8, GLYPH_WIDTH};
use crate::machine::generic::framebuffer::FrameBuffer;

pub trait Demo {
    /// Called once per displayed frame.
    fn update(&mut self, fb: &FrameBuffer, frame: u64);
}

const BAR_MAX: i32 = 20;
/// Frames between bar steps
const BAR_PERIOD: u64 = 2;

/// A bar that grows one cell per step up to [`BAR_MAX`], then shrinks back.
#[derive(Debug)]
struct Bar {
    len: i32,
    growing: bool,
}

impl Default for Bar {
    fn default() -> Self {
        Self {
            len: 0,
            growing: true,
        }
    }
}

impl Bar {
    /// Advance one step. Returns the cell to change and whether it is now set.
    fn step(&mut self) -> (i32, bool) {
        if self.growing {
            let cell = self.len;
            self.len += 1;
            if self.len == BAR_MAX {
                self.growing = false;
            }
            (cell, true)
        } else {
            self.len -= 1;
            if self.len == 0 {
                self.growing = true;
            }
            (self.len, false)
        }
    }
}

const GREETING: [(i32, &str); 6] = [
    (1, "Hello, world!"),
    (4, "This is a demo"),
    (5, "of NTSC signal"),
    (6, "generation."),
    (9, "0123456789+-/*"),
    (10, "@[]<>!%$#&()\\"),
];

/// Text modes: a greeting and a bouncing bar of `#`.
#[derive(Debug)]
pub struct HelloDemo {
    bar_row: i32,
    bar: Bar,
    drawn: bool,
}

impl HelloDemo {
    pub fn new(bar_row: i32) -> Self {
        Self {
            bar_row,
            bar: Bar::default(),
            drawn: false,
        }
    }
}

impl Default for HelloDemo {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Demo for HelloDemo {
    fn update(&mut self, fb: &FrameBuffer, frame: u64) {
        if !self.drawn {
            fb.clear();
            for (row, text) in GREETING {
                fb.blit_string(0, row, text);
            }
            self.drawn = true;
        }
        if frame % BAR_PERIOD == 0 {
            let (x, set) = self.bar.step();
            fb.write(x, self.bar_row, if set { b'#' } else { b' ' });
        }
    }
}

/// Graphics modes: one period of sine and cosine with labels, and a bar of
/// gray `#` glyphs.
#[derive(Debug)]
pub struct CurveDemo {
    bar: Bar,
    drawn: bool,
}

impl Default for CurveDemo {
    fn default() -> Self {
        Self {
            bar: Bar::default(),
            drawn: false,
        }
    }
}

impl CurveDemo {
    fn plot(fb: &FrameBuffer) {
        let w = fb.width() as f64;
        let half = (fb.height() / 2) as f64;
        for x in 0..fb.width() {
            let phase = 2.0 * PI / w * x as f64;
            fb.write(x as i32, (phase.sin() * half + half) as i32, TAG_WHITE);
            fb.write(x as i32, (phase.cos() * half + half) as i32, TAG_GRAY);
        }
        fb.blit_glyphs(10, 10, "SIN curve", TAG_WHITE, &FONT_8X8);
        fb.blit_glyphs(10, 20, "COS curve", TAG_GRAY, &FONT_8X8);
    }
}

impl Demo for CurveDemo {
    fn update(&mut self, fb: &FrameBuffer, frame: u64) {
        if !self.drawn {
            fb.clear();
            Self::plot(fb);
            self.drawn = true;
        }
        if frame % BAR_PERIOD == 0 {
            let (i, set) = self.bar.step();
            let code = if set { b'#' } else { b' ' };
            fb.put_glyph(i * GLYPH_WIDTH as i32, 50, code, TAG_GRAY, &FONT_8X8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::generic::encoder::TAG_BLACK;

    fn bar_cells(fb: &FrameBuffer, row: i32) -> usize {
        (0..fb.width() as i32)
            .filter(|x| fb.read(*x, row) == b'#')
            .count()
    }

    #[test]
    fn test_bar_bounces() {
        let mut bar = Bar::default();
        let mut len = 0;
        let mut lens = Vec::new();
        for _ in 0..(BAR_MAX * 2 + 3) {
            let (_, set) = bar.step();
            len += if set { 1 } else { -1 };
            lens.push(len);
        }
        assert_eq!(*lens.iter().max().unwrap(), BAR_MAX);
        assert_eq!(lens[BAR_MAX as usize * 2 - 1], 0);
        assert!(lens.iter().all(|l| (0..=BAR_MAX).contains(l)));
    }

    #[test]
    fn test_hello_demo() {
        let fb = FrameBuffer::new(20, 20);
        let mut demo = HelloDemo::default();
        for frame in 0..(BAR_MAX as u64 * BAR_PERIOD) {
            demo.update(&fb, frame);
        }
        assert_eq!(fb.read(0, 1), b'H');
        assert_eq!(fb.read(12, 1), b'!');
        assert_eq!(fb.read(12, 10), b'\\');
        assert_eq!(bar_cells(&fb, 16), BAR_MAX as usize);
        for frame in 0..(BAR_MAX as u64 * BAR_PERIOD) {
            demo.update(&fb, frame);
        }
        assert_eq!(bar_cells(&fb, 16), 0);
    }

    #[test]
    fn test_curve_demo() {
        let fb = FrameBuffer::new(256, 192);
        let mut demo = CurveDemo::default();
        demo.update(&fb, 0);
        // sin(0) sits on the centre line, cos(0) would be at 192 and is dropped
        assert_eq!(fb.read(0, 96), TAG_WHITE);
        assert_eq!(fb.read(64, 96), TAG_GRAY);
        assert_eq!(fb.read(128, 96), TAG_WHITE);
        assert_eq!(fb.read(128, 0), TAG_GRAY);
        // The bar's first glyph, '#' has 34 bits set
        let bar: usize = (0..8)
            .flat_map(|x| (50..58).map(move |y| (x, y)))
            .filter(|(x, y)| fb.read(*x, *y) == TAG_GRAY)
            .count();
        assert_eq!(bar, 34);
        assert_eq!(fb.read(200, 150), TAG_BLACK);
    }
}
