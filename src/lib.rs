//! A software composite video generator. A line-rate interrupt bit-bangs a
//! two-pin resistor DAC to produce 262-line monochrome NTSC from a shared
//! frame buffer of character codes or 2-bit luma tags.

pub mod host;
pub mod machine;
