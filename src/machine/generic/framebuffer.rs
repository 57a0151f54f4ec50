//! The frame buffer shared between the application loop and the line
//! handler. Cells are individually atomic bytes: the renderer may observe a
//! buffer mid-update (a one-frame tear), but never a torn cell or an
//! out-of-bounds access. No locks, so the line handler can never stall.

use std::sync::atomic::{AtomicU8, Ordering};

use super::font::{Font, GLYPH_WIDTH};

/// Value of a cleared cell, and of reads outside the buffer.
pub const BLANK: u8 = 0;

pub struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Box<[AtomicU8]>,
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let cells = (0..width * height).map(|_| AtomicU8::new(BLANK)).collect();
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn clear(&self) {
        self.fill(BLANK);
    }

    pub fn fill(&self, value: u8) {
        for cell in self.cells.iter() {
            cell.store(value, Ordering::Relaxed);
        }
    }

    /// Store `value` at `(x, y)`. Writes outside the buffer are dropped.
    #[inline]
    pub fn write(&self, x: i32, y: i32, value: u8) {
        if let Some(index) = self.index(x, y) {
            self.cells[index].store(value, Ordering::Relaxed);
        }
    }

    /// Read `(x, y)`, or [`BLANK`] outside the buffer.
    #[inline]
    pub fn read(&self, x: i32, y: i32) -> u8 {
        match self.index(x, y) {
            Some(index) => self.cells[index].load(Ordering::Relaxed),
            None => BLANK,
        }
    }

    /// Renderer-side read by unsigned coordinates.
    #[inline(always)]
    pub(crate) fn cell(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return BLANK;
        }
        self.cells[y * self.width + x].load(Ordering::Relaxed)
    }

    /// Copy the bytes of `text` into consecutive cells of row `y`, starting at
    /// column `x`. Nothing is written unless `(x, y)` is inside the buffer, and
    /// the copy stops (without wrapping) at the right edge. Returns the number
    /// of cells written.
    pub fn blit_string(&self, x: i32, y: i32, text: impl AsRef<[u8]>) -> usize {
        if self.index(x, y).is_none() {
            return 0;
        }
        let mut written = 0;
        for (i, c) in text.as_ref().iter().enumerate() {
            let cx = x as usize + i;
            if cx >= self.width {
                break;
            }
            self.cells[y as usize * self.width + cx].store(*c, Ordering::Relaxed);
            written += 1;
        }
        written
    }

    /// Draw one glyph into a pixel-mode buffer with its top-left corner at
    /// `(x, y)`. Set bits take `tag`, clear bits are painted black. Pixels
    /// falling outside the buffer are dropped.
    pub fn put_glyph(&self, x: i32, y: i32, code: u8, tag: u8, font: &Font) {
        for (dy, row) in font.glyph(code).iter().enumerate() {
            for dx in 0..GLYPH_WIDTH {
                let value = if row & (1 << dx) != 0 { tag } else { BLANK };
                self.write(x.saturating_add(dx as i32), y.saturating_add(dy as i32), value);
            }
        }
    }

    /// Pixel-mode counterpart of [`FrameBuffer::blit_string`]: draws glyphs
    /// [`GLYPH_WIDTH`] pixels apart, stopping at the first glyph whose origin
    /// is past the right edge. Returns the number of glyphs drawn.
    pub fn blit_glyphs(
        &self,
        x: i32,
        y: i32,
        text: impl AsRef<[u8]>,
        tag: u8,
        font: &Font,
    ) -> usize {
        if self.index(x, y).is_none() {
            return 0;
        }
        let mut drawn = 0;
        for (i, c) in text.as_ref().iter().enumerate() {
            let gx = x as usize + i * GLYPH_WIDTH;
            if gx >= self.width {
                break;
            }
            self.put_glyph(gx as i32, y, *c, tag, font);
            drawn += 1;
        }
        drawn
    }
}
