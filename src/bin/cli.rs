//! hexaphonic CLI - headless playback and WAV export.
//!
//! Usage:
//!   cargo run --bin hx-cli -- path/to/show.toml
//!   cargo run --bin hx-cli -- path/to/show.toml --wav output.wav

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use hx_master::{Controller, ProgramSource, SnapshotView};
use tracing::{error, Level};

/// Sample rate for offline renders.
const WAV_RATE: u32 = 44_100;
/// Longest offline render when no limit is given.
const MAX_RENDER_SECONDS: f64 = 600.0;

#[derive(Parser)]
#[command(version, about = "Headless spatial cue player")]
struct Args {
    /// Show file (TOML).
    show: PathBuf,
    /// Program track to play instead of the one named in the show.
    #[arg(long)]
    program: Option<PathBuf>,
    /// Render offline to this WAV file instead of playing.
    #[arg(long)]
    wav: Option<PathBuf>,
    /// Stop after this many seconds.
    #[arg(long)]
    seconds: Option<f64>,
    /// Playback speed (0.25 to 4). Live playback only.
    #[arg(long, default_value_t = 1.0)]
    rate: f64,
    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), hx_master::ControlError> {
    let mut ctrl = Controller::new();
    ctrl.load_show(&args.show)?;
    if let Some(program) = &args.program {
        ctrl.load_program(program)?;
    }
    ctrl.set_playback_rate(args.rate)?;
    print_summary(&ctrl);

    match &args.wav {
        Some(wav) => render_to_wav(&ctrl, wav, args.seconds),
        None => play_audio(&mut ctrl, args.seconds),
    }
}

fn print_summary(ctrl: &Controller) {
    let (Some(show), Some(program)) = (ctrl.show(), ctrl.program()) else {
        return;
    };
    println!("Title:    {}", show.title);
    println!("Speakers: {}", show.layout.count());
    println!("Cues:     {}", show.schedule.len());
    println!("Patterns: {}", show.schedule.patterns().len());
    println!("Length:   {:.2}s", program.duration().unwrap_or(0.0));
    println!();
}

fn play_audio(ctrl: &mut Controller, seconds: Option<f64>) -> Result<(), hx_master::ControlError> {
    ctrl.play()?;
    println!("Playing...");
    println!();

    let limit = seconds.unwrap_or(f64::INFINITY);
    while ctrl.is_playing() {
        ctrl.pump();
        let Some(frame) = ctrl.animation_frame() else { break };
        let time = frame.playback_time();
        let cue = frame.active_cue.map_or(0, |c| c + 1);
        let gains: Vec<String> = frame.gains.iter().map(|g| format!("{g:.2}")).collect();
        print!("\rCue: {cue:02} | {time:>7.2}s | [{}]", gains.join(" "));
        let _ = std::io::stdout().flush();
        if time >= limit {
            ctrl.stop();
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("\rDone.{:60}", "");
    Ok(())
}

fn render_to_wav(ctrl: &Controller, path: &Path, seconds: Option<f64>) -> Result<(), hx_master::ControlError> {
    println!("Rendering to {} at {} Hz...", path.display(), WAV_RATE);

    let wav = ctrl.render_to_wav(WAV_RATE, seconds.unwrap_or(MAX_RENDER_SECONDS))?;
    println!("Rendered {} bytes", wav.len());

    std::fs::write(path, &wav).map_err(write_error)?;
    println!("Done.");
    Ok(())
}

fn write_error(e: std::io::Error) -> hx_master::ControlError {
    hx_master::FormatError::from(e).into()
}
