use tracing::{info, warn};

use crate::host::clock::SimClock;
use crate::host::demo::Demo;
use crate::host::monitor::Frame;
use crate::host::timer::StepTimer;
use crate::host::{Attached, attach};
use crate::machine::ntsc::{ConfigError, ModeConfig};

/// Run `demo` against `mode` for `frames` frames as fast as possible, and
/// return the last picture the monitor decoded.
pub fn run(
    mode: &ModeConfig,
    demo: &mut dyn Demo,
    frames: u64,
) -> Result<Option<Frame>, ConfigError> {
    let clock = SimClock::new();
    let timer = StepTimer::new(clock.clone());
    let Attached { fb, status, view } = attach(mode, clock.clone(), timer.clone())?;

    let lines = mode.sync.total_lines as u64;
    for frame in 0..frames {
        demo.update(&fb, frame);
        timer.step(lines);
    }
    // Run into the next vertical sync so the last frame is published
    timer.step(mode.sync.v_sync_first as u64);

    info!(
        "{}: {} frames, {} lines, {:.3}s of signal, {} frames decoded",
        status.mode(),
        status.frames(),
        timer.fired(),
        clock.now() as f64 / 1e9,
        view.frames()
    );
    let frame = view.latest();
    if frame.is_none() {
        warn!("Monitor never locked, run for at least two frames");
    }
    Ok(frame)
}

/// Render a decoded frame as text, one character per source pixel
/// horizontally and per two scanlines vertically.
pub fn render(mode: &ModeConfig, frame: &Frame) -> String {
    frame.to_ascii(super::x_step(mode), 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::demo::HelloDemo;
    use crate::machine::ntsc::profiles::{TEXT_20X20, TEXT_30X28};

    #[test]
    fn test_headless_hello() {
        let mut demo = HelloDemo::default();
        let frame = run(&TEXT_20X20, &mut demo, 3).unwrap().unwrap();
        let text = render(&TEXT_20X20, &frame);
        println!("{text}");
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 80);
        assert!(rows.iter().all(|r| r.chars().count() == 160));
        // Rows 0..4 are text row 0, which is empty
        assert!(rows[..4].iter().all(|r| r.trim().is_empty()));
        assert!(rows[4..8].iter().any(|r| r.contains('#')));
    }

    #[test]
    fn test_headless_no_full_frame() {
        let mut demo = HelloDemo::default();
        assert_eq!(run(&TEXT_30X28, &mut demo, 0).unwrap(), None);
    }
}
