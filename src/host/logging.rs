use std::fs::File;
use std::io::{IsTerminal, stdout};

use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log to `ntsc-luma.log` in the temp directory, for when the terminal view
/// owns stdout.
pub fn setup_logging_file(level: tracing::Level) -> std::io::Result<()> {
    let logfile = std::env::temp_dir().join("ntsc-luma.log");

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(File::create(logfile)?)
        .log_internal_errors(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(logging_targets(level))
        .init();
    Ok(())
}

pub fn setup_logging_stdio(level: tracing::Level) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .with_line_number(false)
        .with_level(false)
        .without_time();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(stdout().is_terminal())
        .event_format(format)
        .log_internal_errors(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(logging_targets(level))
        .init();
}

fn logging_targets(level: tracing::Level) -> Targets {
    let level = LevelFilter::from_level(level);
    // Dropped frames are traced from the line handler
    Targets::new()
        .with_target("ntsc_luma::host::monitor", level.min(LevelFilter::DEBUG))
        .with_default(level)
}
