//! Off-target harness: simulated pins and time, a decoding monitor, line
//! timers, demo applications and screens that show what the monitor sees.

use std::sync::Arc;

use crate::machine::generic::encoder::{LumaEncoder, PinPair};
use crate::machine::generic::framebuffer::FrameBuffer;
use crate::machine::ntsc::{self, ConfigError, LineTimer, ModeConfig, VideoStatus};

pub mod clock;
pub mod demo;
pub mod logging;
pub mod monitor;
pub mod screen;
pub mod timer;

use clock::{SimClock, SimDelay, SimGpio};
use monitor::{Monitor, MonitorGeometry, MonitorView};

/// A running video pipeline wired to a [`Monitor`].
pub struct Attached {
    pub fb: Arc<FrameBuffer>,
    pub status: VideoStatus,
    pub view: MonitorView,
}

/// Start `mode` on simulated pins driven by `timer`, with a monitor decoding
/// the output.
pub fn attach<T: LineTimer>(
    mode: &ModeConfig,
    clock: SimClock,
    timer: T,
) -> Result<Attached, ConfigError> {
    let fb = Arc::new(mode.frame_buffer());
    let monitor = Monitor::new(MonitorGeometry::for_mode(mode));
    let view = monitor.view();
    let pins = PinPair::default();
    let gpio = SimGpio::new(clock.clone(), mode.emit_ns, pins, monitor);
    let status = ntsc::start(
        mode,
        fb.clone(),
        LumaEncoder::new(gpio, pins),
        SimDelay::new(clock),
        timer,
    )?;
    Ok(Attached { fb, status, view })
}
