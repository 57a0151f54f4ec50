use std::io;
use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::crossterm;
use ratatui::crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::prelude::CrosstermBackend;
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::Widget;
use tracing::info;

use crate::host::attach;
use crate::host::clock::SimClock;
use crate::host::demo::Demo;
use crate::host::monitor::Frame;
use crate::host::timer::ThreadLineTimer;
use crate::machine::generic::encoder::LumaLevel;
use crate::machine::ntsc::ModeConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A decoded frame drawn with upper half blocks: each terminal cell shows two
/// scanlines, the top one as foreground and the bottom one as background.
pub struct Screen<'a> {
    frame: &'a Frame,
    x_step: usize,
}

impl<'a> Screen<'a> {
    pub fn new(frame: &'a Frame) -> Self {
        Self { frame, x_step: 1 }
    }

    pub fn x_step(mut self, x_step: usize) -> Self {
        self.x_step = x_step.max(1);
        self
    }
}

fn color(level: LumaLevel) -> Color {
    match level {
        LumaLevel::Sync => Color::Red,
        LumaLevel::Black => Color::Black,
        LumaLevel::Gray => Color::DarkGray,
        LumaLevel::White => Color::White,
    }
}

impl<'a> Widget for Screen<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns = (self.frame.width / self.x_step).min(area.width as usize);
        let rows = self.frame.height().div_ceil(2).min(area.height as usize);
        for row in 0..rows {
            for col in 0..columns {
                let x = col * self.x_step;
                let top = self.frame.level(x, row * 2);
                let bottom = self.frame.level(x, row * 2 + 1);
                let pos = (area.left() + col as u16, area.top() + row as u16);
                if let Some(cell) = buf.cell_mut(pos) {
                    cell.set_char('▀').set_fg(color(top)).set_bg(color(bottom));
                }
            }
        }
    }
}

/// Run `demo` in real time and show the monitor's picture until `q` or
/// Ctrl-C.
pub fn run(mode: &ModeConfig, demo: &mut dyn Demo) -> Result<u64, BoxError> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    crossterm::execute!(
        io::stdout(),
        crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
    )?;

    let res = run_inner(mode, demo);

    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    res
}

fn run_inner(mode: &ModeConfig, demo: &mut dyn Demo) -> Result<u64, BoxError> {
    let clock = SimClock::new();
    let timer = ThreadLineTimer::new(clock.clone());
    let attached = attach(mode, clock, timer.clone())?;
    let mut terminal = ratatui::Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let x_step = super::x_step(mode);

    let mut last_frame = None;
    loop {
        if crossterm::event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = crossterm::event::read()? {
                let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c');
                let quit = key.code == KeyCode::Char('q') || ctrl_c;
                if key.kind == KeyEventKind::Press && quit {
                    break;
                }
            }
        }

        let frames = attached.status.frames();
        if last_frame == Some(frames) {
            continue;
        }
        last_frame = Some(frames);
        demo.update(&attached.fb, frames);

        if let Some(frame) = attached.view.latest() {
            terminal.draw(|f| {
                f.render_widget(Screen::new(&frame).x_step(x_step), f.area());
                let status = Span::styled(
                    format!("{} frame {frames}", attached.status.mode()),
                    Style::default().fg(Color::LightBlue),
                );
                f.render_widget(status.into_right_aligned_line(), f.area());
            })?;
        }
    }

    timer.stop();
    let frames = attached.status.frames();
    info!("Stopped after {frames} frames");
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::generic::encoder::LumaLevel::{Black as B, Gray as G, White as W};

    #[test]
    fn test_screen_half_blocks() {
        let frame = Frame {
            width: 4,
            lines: vec![
                vec![W, W, B, B],
                vec![G, B, G, B],
                vec![W; 4],
            ],
            scanlines: 3,
        };
        let area = Rect::new(0, 0, 4, 3);
        let mut buf = Buffer::empty(area);
        Screen::new(&frame).x_step(2).render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::White);
        assert_eq!(cell.bg, Color::DarkGray);
        let cell = &buf[(1, 0)];
        assert_eq!(cell.fg, Color::Black);
        assert_eq!(cell.bg, Color::DarkGray);
        // Odd height: the last row's bottom half is black
        let cell = &buf[(0, 1)];
        assert_eq!(cell.fg, Color::White);
        assert_eq!(cell.bg, Color::Black);
        // Nothing drawn past the decimated width or the frame height
        assert_eq!(buf[(2, 0)].symbol(), " ");
        assert_eq!(buf[(0, 2)].symbol(), " ");
    }
}
