use anyhow::Result;
use clap::Parser;
use tracing::info;

mod audio;
mod config;
mod error;

use audio::{CaptureScheduler, CaptureState};
use config::Config;

#[derive(Parser, Debug)]
#[command(name = "barspec")]
#[command(author, version, about = "Real-time audio spectrum bars in the terminal")]
pub struct Args {
    /// Input device name (substring match, default input device if omitted)
    #[arg(short, long)]
    device: Option<String>,

    /// Number of frequency bars
    #[arg(short, long)]
    bars: Option<usize>,

    /// Sensitivity: linear gain applied to magnitudes
    #[arg(short, long)]
    sensitivity: Option<f32>,

    /// Smoothing factor in [0, 1), higher = smoother
    #[arg(long)]
    smoothing: Option<f32>,

    /// Config file path
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// List input-capable devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they don't fight the meter on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("barspec=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list_devices {
        for device in audio::list_input_devices()? {
            if device.is_default {
                println!("{} (default)", device.name);
            } else {
                println!("{}", device.name);
            }
        }
        return Ok(());
    }

    if args.init_config {
        let path = Config::init_default_config()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_default_path().unwrap_or_default(),
    };
    config.merge_args(&args);

    info!(
        bars = config.capture.bars,
        sensitivity = config.capture.sensitivity,
        smoothing = config.capture.smoothing,
        "starting capture session"
    );

    let mut scheduler = CaptureScheduler::new();
    let mut frames = scheduler.frames();
    let mut states = scheduler.state_changes();
    scheduler.start(&config.capture)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping capture");
                break;
            }
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                draw_meter(&frame.bands)?;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                if let CaptureState::Failed(err) = state {
                    println!();
                    return Err(err.into());
                }
            }
        }
    }

    scheduler.stop();
    println!();
    Ok(())
}

/// Redraw the single-row bar meter in place.
fn draw_meter(bands: &[f32]) -> Result<()> {
    const BLOCKS: [char; 9] = [' ', '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}', '\u{2588}'];

    let mut line = String::with_capacity(bands.len() * 3);
    for &value in bands {
        let index = (value * (BLOCKS.len() - 1) as f32).round() as usize;
        line.push(BLOCKS[index.min(BLOCKS.len() - 1)]);
    }

    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::cursor::MoveToColumn(0),
        crossterm::terminal::Clear(crossterm::terminal::ClearType::CurrentLine),
        crossterm::style::Print(line),
    )?;
    Ok(())
}
