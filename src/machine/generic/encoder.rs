//! Two-pin luma encoder. The two output pins drive the RCA centre conductor
//! through a 330Ω and a 1kΩ resistor, forming a crude 2-bit DAC into the
//! display's 75Ω termination.

/// GPIO connected to RCA+ via 330Ω
pub const GP_STRONG: u8 = 14;
/// GPIO connected to RCA+ via 1kΩ
pub const GP_WEAK: u8 = 15;

/// Abstract signal level, ordered by increasing amplitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LumaLevel {
    Sync,
    #[default]
    Black,
    Gray,
    White,
}

/// 2-bit pixel tags stored in a graphics-mode frame buffer.
pub const TAG_BLACK: u8 = 0;
pub const TAG_WHITE: u8 = 1;
pub const TAG_GRAY: u8 = 2;

impl LumaLevel {
    /// Decode a graphics-mode cell. Undefined codes fall back to black.
    #[inline(always)]
    pub fn from_pixel_tag(tag: u8) -> Self {
        match tag {
            TAG_WHITE => LumaLevel::White,
            TAG_GRAY => LumaLevel::Gray,
            _ => LumaLevel::Black,
        }
    }
}

/// Masked write access to a bank of GPIO outputs, ie: `gpio_put_masked`.
pub trait GpioMask {
    fn put_masked(&mut self, mask: u32, value: u32);
}

/// Anything that can put a luma level on the wire. Must not block.
pub trait SignalPins {
    fn emit(&mut self, level: LumaLevel);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinPair {
    /// Pin behind the low-value (330Ω) resistor
    pub strong: u8,
    /// Pin behind the high-value (1kΩ) resistor
    pub weak: u8,
}

impl Default for PinPair {
    fn default() -> Self {
        Self {
            strong: GP_STRONG,
            weak: GP_WEAK,
        }
    }
}

const STRONG_OHMS: u32 = 330;
const WEAK_OHMS: u32 = 1000;
const LOAD_OHMS: u32 = 75;
const DRIVE_MILLIVOLTS: u32 = 3300;

impl PinPair {
    pub fn mask(&self) -> u32 {
        (1 << self.strong) | (1 << self.weak)
    }

    /// Pin pattern for a level:
    ///
    /// | level | strong | weak |
    /// |-------|--------|------|
    /// | Sync  | L      | L    |
    /// | Black | L      | H    |
    /// | Gray  | H      | L    |
    /// | White | H      | H    |
    #[inline(always)]
    pub fn pattern(&self, level: LumaLevel) -> u32 {
        match level {
            LumaLevel::Sync => 0,
            LumaLevel::Black => 1 << self.weak,
            LumaLevel::Gray => 1 << self.strong,
            LumaLevel::White => self.mask(),
        }
    }

    /// Inverse of [`PinPair::pattern`] over the bits of a GPIO output register.
    pub fn decode(&self, value: u32) -> LumaLevel {
        let strong = value & (1 << self.strong) != 0;
        let weak = value & (1 << self.weak) != 0;
        match (strong, weak) {
            (false, false) => LumaLevel::Sync,
            (false, true) => LumaLevel::Black,
            (true, false) => LumaLevel::Gray,
            (true, true) => LumaLevel::White,
        }
    }

    /// Nominal voltage at a terminated input for a level, from Millman's
    /// theorem over the two source resistors and the 75Ω load.
    pub fn output_millivolts(&self, level: LumaLevel) -> u32 {
        let pattern = self.pattern(level);
        // Work in conductance units of 1/(330*1000*75) S to stay integral
        let scale = STRONG_OHMS * WEAK_OHMS * LOAD_OHMS;
        let g_strong = scale / STRONG_OHMS;
        let g_weak = scale / WEAK_OHMS;
        let g_load = scale / LOAD_OHMS;
        let mut driven = 0;
        if pattern & (1 << self.strong) != 0 {
            driven += g_strong;
        }
        if pattern & (1 << self.weak) != 0 {
            driven += g_weak;
        }
        (DRIVE_MILLIVOLTS as u64 * driven as u64 / (g_strong + g_weak + g_load) as u64) as u32
    }
}

/// The signal level encoder: a [`GpioMask`] plus the pin assignment.
#[derive(Debug)]
pub struct LumaEncoder<G> {
    gpio: G,
    pins: PinPair,
}

impl<G: GpioMask> LumaEncoder<G> {
    pub fn new(gpio: G, pins: PinPair) -> Self {
        Self { gpio, pins }
    }

    pub fn pins(&self) -> PinPair {
        self.pins
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }
}

impl<G: GpioMask> SignalPins for LumaEncoder<G> {
    #[inline(always)]
    fn emit(&mut self, level: LumaLevel) {
        self.gpio.put_masked(self.pins.mask(), self.pins.pattern(level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Port {
        out: u32,
        writes: usize,
    }

    impl GpioMask for Port {
        fn put_masked(&mut self, mask: u32, value: u32) {
            self.out = (self.out & !mask) | (value & mask);
            self.writes += 1;
        }
    }

    #[test]
    fn test_pin_patterns() {
        let pins = PinPair::default();
        assert_eq!(pins.pattern(LumaLevel::Sync), 0);
        assert_eq!(pins.pattern(LumaLevel::Black), 1 << 15);
        assert_eq!(pins.pattern(LumaLevel::Gray), 1 << 14);
        assert_eq!(pins.pattern(LumaLevel::White), (1 << 14) | (1 << 15));
    }

    #[test]
    fn test_emit_leaves_other_pins_alone() {
        let mut encoder = LumaEncoder::new(
            Port {
                out: 1 << 25,
                writes: 0,
            },
            PinPair::default(),
        );
        for level in [
            LumaLevel::White,
            LumaLevel::Sync,
            LumaLevel::Gray,
            LumaLevel::Black,
        ] {
            encoder.emit(level);
            let out = encoder.gpio().out;
            assert_eq!(out & (1 << 25), 1 << 25, "LED pin clobbered");
            assert_eq!(encoder.pins().decode(out), level);
        }
        assert_eq!(encoder.gpio().writes, 4);
    }

    #[test]
    fn test_decode_round_trips_every_level() {
        let pins = PinPair { strong: 3, weak: 9 };
        for level in [
            LumaLevel::Sync,
            LumaLevel::Black,
            LumaLevel::Gray,
            LumaLevel::White,
        ] {
            assert_eq!(pins.decode(pins.pattern(level)), level);
        }
    }

    #[test]
    fn test_dac_is_monotonic() {
        let pins = PinPair::default();
        let sync = pins.output_millivolts(LumaLevel::Sync);
        let black = pins.output_millivolts(LumaLevel::Black);
        let gray = pins.output_millivolts(LumaLevel::Gray);
        let white = pins.output_millivolts(LumaLevel::White);
        println!("sync={sync}mV black={black}mV gray={gray}mV white={white}mV");
        assert_eq!(sync, 0);
        assert!(sync < black && black < gray && gray < white);
        // Peak white must stay under the 1V composite ceiling
        assert!(white < 1000);
    }

    #[test]
    fn test_pixel_tags() {
        assert_eq!(LumaLevel::from_pixel_tag(TAG_BLACK), LumaLevel::Black);
        assert_eq!(LumaLevel::from_pixel_tag(TAG_WHITE), LumaLevel::White);
        assert_eq!(LumaLevel::from_pixel_tag(TAG_GRAY), LumaLevel::Gray);
        assert_eq!(LumaLevel::from_pixel_tag(3), LumaLevel::Black);
        assert_eq!(LumaLevel::from_pixel_tag(0xff), LumaLevel::Black);
    }
}
