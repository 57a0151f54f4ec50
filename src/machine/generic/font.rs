//! 8x8 bitmap font. Bit 0 of each row is the leftmost pixel. Printable ASCII
//! is the public domain `font8x8_basic` set; a handful of control-code slots
//! carry the tiles used by the games.

use hex_literal::hex;

pub const GLYPH_WIDTH: usize = 8;
pub const GLYPH_HEIGHT: usize = 8;

pub type Glyph = [u8; GLYPH_HEIGHT];

/// Solid tile, used for live cells and walls
pub const CHAR_BOX: u8 = 0x07;
pub const CHAR_HEART: u8 = 0x08;
pub const CHAR_SHIP: u8 = 0x09;
pub const CHAR_METEOR: u8 = 0x0a;

pub struct Font {
    glyphs: [Glyph; 256],
}

impl Font {
    #[inline(always)]
    pub fn row(&self, code: u8, sub_row: usize) -> u8 {
        self.glyphs[code as usize][sub_row % GLYPH_HEIGHT]
    }

    pub fn glyph(&self, code: u8) -> &Glyph {
        &self.glyphs[code as usize]
    }

    const fn build() -> Self {
        let mut glyphs = [[0; GLYPH_HEIGHT]; 256];
        let mut i = 0;
        while i < BASIC.len() {
            glyphs[0x20 + i] = BASIC[i];
            i += 1;
        }
        glyphs[CHAR_BOX as usize] = hex!("FF FF FF FF FF FF FF FF");
        glyphs[CHAR_HEART as usize] = hex!("36 7F 7F 7F 3E 1C 08 00");
        glyphs[CHAR_SHIP as usize] = hex!("18 18 3C 7E FF FF 24 00");
        glyphs[CHAR_METEOR as usize] = hex!("3C 5E EF F7 FB 7E 3C 00");
        Self { glyphs }
    }
}

pub static FONT_8X8: Font = Font::build();

/// U+0020 through U+007F
const BASIC: [Glyph; 96] = [
    hex!("00 00 00 00 00 00 00 00"), // ' '
    hex!("18 3C 3C 18 18 00 18 00"), // '!'
    hex!("36 36 00 00 00 00 00 00"), // '"'
    hex!("36 36 7F 36 7F 36 36 00"), // '#'
    hex!("0C 3E 03 1E 30 1F 0C 00"), // '$'
    hex!("00 63 33 18 0C 66 63 00"), // '%'
    hex!("1C 36 1C 6E 3B 33 6E 00"), // '&'
    hex!("06 06 03 00 00 00 00 00"), // '\''
    hex!("18 0C 06 06 06 0C 18 00"), // '('
    hex!("06 0C 18 18 18 0C 06 00"), // ')'
    hex!("00 66 3C FF 3C 66 00 00"), // '*'
    hex!("00 0C 0C 3F 0C 0C 00 00"), // '+'
    hex!("00 00 00 00 00 0C 0C 06"), // ','
    hex!("00 00 00 3F 00 00 00 00"), // '-'
    hex!("00 00 00 00 00 0C 0C 00"), // '.'
    hex!("60 30 18 0C 06 03 01 00"), // '/'
    hex!("3E 63 73 7B 6F 67 3E 00"), // '0'
    hex!("0C 0E 0C 0C 0C 0C 3F 00"), // '1'
    hex!("1E 33 30 1C 06 33 3F 00"), // '2'
    hex!("1E 33 30 1C 30 33 1E 00"), // '3'
    hex!("38 3C 36 33 7F 30 78 00"), // '4'
    hex!("3F 03 1F 30 30 33 1E 00"), // '5'
    hex!("1C 06 03 1F 33 33 1E 00"), // '6'
    hex!("3F 33 30 18 0C 0C 0C 00"), // '7'
    hex!("1E 33 33 1E 33 33 1E 00"), // '8'
    hex!("1E 33 33 3E 30 18 0E 00"), // '9'
    hex!("00 0C 0C 00 00 0C 0C 00"), // ':'
    hex!("00 0C 0C 00 00 0C 0C 06"), // ';'
    hex!("18 0C 06 03 06 0C 18 00"), // '<'
    hex!("00 00 3F 00 00 3F 00 00"), // '='
    hex!("06 0C 18 30 18 0C 06 00"), // '>'
    hex!("1E 33 30 18 0C 00 0C 00"), // '?'
    hex!("3E 63 7B 7B 7B 03 1E 00"), // '@'
    hex!("0C 1E 33 33 3F 33 33 00"), // 'A'
    hex!("3F 66 66 3E 66 66 3F 00"), // 'B'
    hex!("3C 66 03 03 03 66 3C 00"), // 'C'
    hex!("1F 36 66 66 66 36 1F 00"), // 'D'
    hex!("7F 46 16 1E 16 46 7F 00"), // 'E'
    hex!("7F 46 16 1E 16 06 0F 00"), // 'F'
    hex!("3C 66 03 03 73 66 7C 00"), // 'G'
    hex!("33 33 33 3F 33 33 33 00"), // 'H'
    hex!("1E 0C 0C 0C 0C 0C 1E 00"), // 'I'
    hex!("78 30 30 30 33 33 1E 00"), // 'J'
    hex!("67 66 36 1E 36 66 67 00"), // 'K'
    hex!("0F 06 06 06 46 66 7F 00"), // 'L'
    hex!("63 77 7F 7F 6B 63 63 00"), // 'M'
    hex!("63 67 6F 7B 73 63 63 00"), // 'N'
    hex!("1C 36 63 63 63 36 1C 00"), // 'O'
    hex!("3F 66 66 3E 06 06 0F 00"), // 'P'
    hex!("1E 33 33 33 3B 1E 38 00"), // 'Q'
    hex!("3F 66 66 3E 36 66 67 00"), // 'R'
    hex!("1E 33 07 0E 38 33 1E 00"), // 'S'
    hex!("3F 2D 0C 0C 0C 0C 1E 00"), // 'T'
    hex!("33 33 33 33 33 33 3F 00"), // 'U'
    hex!("33 33 33 33 33 1E 0C 00"), // 'V'
    hex!("63 63 63 6B 7F 77 63 00"), // 'W'
    hex!("63 63 36 1C 1C 36 63 00"), // 'X'
    hex!("33 33 33 1E 0C 0C 1E 00"), // 'Y'
    hex!("7F 63 31 18 4C 66 7F 00"), // 'Z'
    hex!("1E 06 06 06 06 06 1E 00"), // '['
    hex!("03 06 0C 18 30 60 40 00"), // '\\'
    hex!("1E 18 18 18 18 18 1E 00"), // ']'
    hex!("08 1C 36 63 00 00 00 00"), // '^'
    hex!("00 00 00 00 00 00 00 FF"), // '_'
    hex!("0C 0C 18 00 00 00 00 00"), // '`'
    hex!("00 00 1E 30 3E 33 6E 00"), // 'a'
    hex!("07 06 06 3E 66 66 3B 00"), // 'b'
    hex!("00 00 1E 33 03 33 1E 00"), // 'c'
    hex!("38 30 30 3E 33 33 6E 00"), // 'd'
    hex!("00 00 1E 33 3F 03 1E 00"), // 'e'
    hex!("1C 36 06 0F 06 06 0F 00"), // 'f'
    hex!("00 00 6E 33 33 3E 30 1F"), // 'g'
    hex!("07 06 36 6E 66 66 67 00"), // 'h'
    hex!("0C 00 0E 0C 0C 0C 1E 00"), // 'i'
    hex!("30 00 30 30 30 33 33 1E"), // 'j'
    hex!("07 06 66 36 1E 36 67 00"), // 'k'
    hex!("0E 0C 0C 0C 0C 0C 1E 00"), // 'l'
    hex!("00 00 33 7F 7F 6B 63 00"), // 'm'
    hex!("00 00 1F 33 33 33 33 00"), // 'n'
    hex!("00 00 1E 33 33 33 1E 00"), // 'o'
    hex!("00 00 3B 66 66 3E 06 0F"), // 'p'
    hex!("00 00 6E 33 33 3E 30 78"), // 'q'
    hex!("00 00 3B 6E 66 06 0F 00"), // 'r'
    hex!("00 00 3E 03 1E 30 1F 00"), // 's'
    hex!("08 0C 3E 0C 0C 2C 18 00"), // 't'
    hex!("00 00 33 33 33 33 6E 00"), // 'u'
    hex!("00 00 33 33 33 1E 0C 00"), // 'v'
    hex!("00 00 63 6B 7F 7F 36 00"), // 'w'
    hex!("00 00 63 36 1C 36 63 00"), // 'x'
    hex!("00 00 33 33 33 3E 30 1F"), // 'y'
    hex!("00 00 3F 19 0C 26 3F 00"), // 'z'
    hex!("38 0C 0C 07 0C 0C 38 00"), // '{'
    hex!("18 18 18 00 18 18 18 00"), // '|'
    hex!("07 0C 0C 38 0C 0C 07 00"), // '}'
    hex!("6E 3B 00 00 00 00 00 00"), // '~'
    hex!("00 00 00 00 00 00 00 00"), // DEL
];
