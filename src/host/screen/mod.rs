use crate::machine::ntsc::{ModeConfig, ModeKind};

pub mod headless;

#[cfg(feature = "tui")]
pub mod ratatui;

/// Horizontal decimation that brings a mode's row back to one sample per
/// source pixel.
pub fn x_step(mode: &ModeConfig) -> usize {
    match mode.kind {
        ModeKind::Text => mode.stretch.max(1) as usize,
        ModeKind::Graphics => 1,
    }
}
