//! Turns one frame buffer row into the sequence of luma decisions for a
//! scanline. Rows are produced lazily so the line handler can push each
//! decision to the pins as soon as it is known.

use std::iter;

use super::encoder::LumaLevel;
use super::font::{Font, GLYPH_WIDTH};
use super::framebuffer::FrameBuffer;

pub trait Rasterizer {
    /// Number of decisions produced for every row of `fb`.
    fn row_len(&self, fb: &FrameBuffer) -> usize;

    /// Decisions for buffer row `cell_row` at glyph line `sub_row`.
    fn rasterize_row<'a>(
        &'a self,
        fb: &'a FrameBuffer,
        cell_row: usize,
        sub_row: usize,
    ) -> impl Iterator<Item = LumaLevel> + 'a;
}

/// Character cells expanded through a bitmap font. Each glyph bit is emitted
/// `stretch` times to widen the picture.
#[derive(Clone, Copy)]
pub struct TextRaster {
    font: &'static Font,
    stretch: usize,
}

impl TextRaster {
    pub fn new(font: &'static Font, stretch: u8) -> Self {
        Self {
            font,
            stretch: stretch.max(1) as usize,
        }
    }
}

impl Rasterizer for TextRaster {
    fn row_len(&self, fb: &FrameBuffer) -> usize {
        fb.width() * GLYPH_WIDTH * self.stretch
    }

    fn rasterize_row<'a>(
        &'a self,
        fb: &'a FrameBuffer,
        cell_row: usize,
        sub_row: usize,
    ) -> impl Iterator<Item = LumaLevel> + 'a {
        let font = self.font;
        let stretch = self.stretch;
        (0..fb.width()).flat_map(move |x| {
            let bits = font.row(fb.cell(x, cell_row), sub_row);
            (0..GLYPH_WIDTH).flat_map(move |w| {
                let level = if bits & (1 << w) != 0 {
                    LumaLevel::White
                } else {
                    LumaLevel::Black
                };
                iter::repeat_n(level, stretch)
            })
        })
    }
}

/// Pixel cells holding 2-bit luma tags, passed straight through.
#[derive(Clone, Copy, Default)]
pub struct PixelRaster;

impl Rasterizer for PixelRaster {
    fn row_len(&self, fb: &FrameBuffer) -> usize {
        fb.width()
    }

    fn rasterize_row<'a>(
        &'a self,
        fb: &'a FrameBuffer,
        cell_row: usize,
        _sub_row: usize,
    ) -> impl Iterator<Item = LumaLevel> + 'a {
        (0..fb.width()).map(move |x| LumaLevel::from_pixel_tag(fb.cell(x, cell_row)))
    }
}
