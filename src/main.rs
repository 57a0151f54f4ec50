use clap::{Parser, ValueEnum};
use tracing::{Level, info};

use ntsc_luma::host::demo::{CurveDemo, Demo, HelloDemo};
use ntsc_luma::host::logging::setup_logging_stdio;
use ntsc_luma::host::screen::headless;
use ntsc_luma::machine::ntsc::profiles::{
    GRAPHICS_256X192, GRAPHICS_WALL, TEXT_20X20, TEXT_30X28,
};
use ntsc_luma::machine::ntsc::{LineKind, ModeConfig, ModeKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Profile {
    #[value(name = "text-20x20")]
    Text20x20,
    #[value(name = "text-30x28")]
    Text30x28,
    #[value(name = "graphics-256x192")]
    Graphics256x192,
    #[value(name = "graphics-wall")]
    GraphicsWall,
}

impl Profile {
    fn mode(self) -> &'static ModeConfig {
        match self {
            Profile::Text20x20 => &TEXT_20X20,
            Profile::Text30x28 => &TEXT_30X28,
            Profile::Graphics256x192 => &GRAPHICS_256X192,
            Profile::GraphicsWall => &GRAPHICS_WALL,
        }
    }
}

/// Composite video generator
/// Runs the line handler against simulated pins and decodes what a monitor
/// would show
#[derive(Parser)]
#[command(name = "ntsc-luma")]
#[command(about = "A two-pin NTSC luma generator running on simulated pins")]
struct Args {
    /// Display mode profile
    #[arg(long, value_enum, default_value_t = Profile::Text20x20)]
    profile: Profile,

    /// Show the decoded picture live in the terminal
    #[arg(long)]
    display: bool,

    /// Frames to run without a display
    #[arg(long, default_value_t = 120, conflicts_with = "display")]
    frames: u64,

    /// Print the modeled line budgets and exit
    #[arg(long)]
    budget: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn print_budget(mode: &ModeConfig) {
    println!("{} ({:?}, {}x{})", mode.name, mode.kind, mode.width, mode.height);
    for kind in [LineKind::VSync, LineKind::Blank, LineKind::Active] {
        let budget = mode.line_budget(kind);
        println!(
            "  {kind:?}: waits {}ns + {} x {}ns emits = busy {}ns, idle {}ns, total {}ns",
            budget.waits_ns,
            budget.emissions,
            budget.emit_ns,
            budget.busy_ns(),
            budget.idle_ns,
            budget.total_ns()
        );
    }
    match mode.validate() {
        Ok(()) => println!("  ok"),
        Err(e) => println!("  {e}"),
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    run(Args::parse())
}

fn run(args: Args) -> Result<(), BoxError> {
    let level = if args.verbose {
        Level::TRACE
    } else {
        Level::INFO
    };
    let mode = args.profile.mode();

    if args.budget {
        print_budget(mode);
        return Ok(());
    }

    let mut demo: Box<dyn Demo> = match mode.kind {
        ModeKind::Text => Box::new(HelloDemo::default()),
        ModeKind::Graphics => Box::new(CurveDemo::default()),
    };

    if args.display {
        #[cfg(feature = "tui")]
        {
            ntsc_luma::host::logging::setup_logging_file(level)?;
            info!("Starting {} on the terminal", mode.name);
            ntsc_luma::host::screen::ratatui::run(mode, demo.as_mut())?;
            return Ok(());
        }
        #[cfg(not(feature = "tui"))]
        {
            return Err("built without the tui feature".into());
        }
    }

    setup_logging_stdio(level);
    info!("Running {} for {} frames", mode.name, args.frames);
    match headless::run(mode, demo.as_mut(), args.frames)? {
        Some(frame) => print!("{}", headless::render(mode, &frame)),
        None => info!("No frame decoded"),
    }
    Ok(())
}
