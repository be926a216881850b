//! WaveGrid - audio-reactive grid demo
//!
//! Runs the feature-reactive grid and the ambient color morph against a
//! synthetic analyzer feed and prints the published channels once a second.
//!
//! # Usage
//!
//! ```bash
//! wavegrid
//! wavegrid --config wavegrid.toml --duration 30
//! wavegrid --seed 7 --bpm 174
//! ```

mod feed;
mod logging_setup;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use wavegrid_control::{
    spawn_ticker, AmbientColorMorph, Emitter, FeatureReactiveGrid, MediaHandle, ScriptedAnalyzer,
};
use wavegrid_core::{AppConfig, MemorySurface};

/// Animation frame cadence (~60 Hz)
const TICK_PERIOD: Duration = Duration::from_millis(16);
const REPORT_PERIOD: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "wavegrid")]
#[command(
    author,
    version,
    about = "WaveGrid - audio-reactive grid and ambient color morph"
)]
struct Args {
    /// TOML configuration file (defaults apply to missing sections)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Stop after this many seconds (runs until Ctrl-C otherwise)
    #[arg(long, short = 'd')]
    duration: Option<u64>,

    /// Seed for reproducible palettes, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Tempo of the synthetic feed
    #[arg(long, default_value = "120")]
    bpm: f32,
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => AppConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.color_morph.seed = Some(seed);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn report(surface: &MemorySurface) {
    let line = surface
        .values()
        .iter()
        .map(|(channel, value)| format!("{}={}", channel, value))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", line);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if !(args.bpm.is_finite() && args.bpm > 0.0) {
        bail!("--bpm must be a positive number, got {}", args.bpm);
    }

    let config = load_config(&args)?;
    let _log_guard = logging_setup::init(&config.log)?;

    info!("==========================================");
    info!("===      WaveGrid Session Started      ===");
    info!("==========================================");

    let emitter = Emitter::new();
    let media = MediaHandle::new("synthetic");
    let analyzer = ScriptedAnalyzer::new(&media);
    let surface = MemorySurface::new();

    let mut grid = FeatureReactiveGrid::initialize(
        config.grid.clone(),
        Some(Box::new(surface.clone())),
        media.clone(),
        Box::new(analyzer.clone()),
        &emitter,
    )
    .context("Failed to start grid")?;
    let mut morph = AmbientColorMorph::start(config.color_morph.clone(), Box::new(surface.clone()))
        .context("Failed to start color morph")?;

    let ticker = spawn_ticker(emitter.clone(), TICK_PERIOD);
    let feed = feed::spawn(
        analyzer,
        feed::FeedConfig {
            bpm: args.bpm,
            ..feed::FeedConfig::default()
        },
    );
    media.play();

    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut report_interval = tokio::time::interval(REPORT_PERIOD);

    info!("--- Entering Main Loop ---");
    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!("Duration elapsed, shutting down");
                break;
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Interrupted, shutting down");
                break;
            }
            _ = report_interval.tick() => report(&surface),
        }
    }

    media.end();
    feed.abort();
    ticker.abort();
    grid.dispose().await;
    morph.dispose().await;

    info!("=== WaveGrid Session Ended ===");
    Ok(())
}
