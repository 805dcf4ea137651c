// Entry point: renders the sequencer offline from a config and optional patch.
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hivewalk::app::run_headless;
use hivewalk::cli::Args;
use hivewalk::config::AppConfig;
use hivewalk::engine::hive::HiveEngine;
use hivewalk::error::HiveError;
use hivewalk::state::HiveState;

const NUM_PORTS: usize = 4;

fn run(args: Args) -> Result<(), HiveError> {
    let mut config = AppConfig::load_or_default(&args.config);
    if let Some(seconds) = args.seconds {
        config.render.seconds = seconds;
    }
    if let Some(hz) = args.clock_hz {
        config.render.clock_hz = hz;
    }
    if args.seed.is_some() {
        config.grid.seed = args.seed;
    }
    if let Some(radius) = args.radius {
        config.grid.radius = radius;
    }

    let mut engine = HiveEngine::<NUM_PORTS>::from_config(&config);
    if let Some(path) = &args.state {
        HiveState::load(Path::new(path))?.apply(&mut engine);
    }
    if let Some(radius) = args.radius {
        engine.resize(radius);
    }
    if args.randomize || args.certainty {
        engine.randomize(!args.certainty);
    }

    let summary = run_headless(&mut engine, &config.render, args.wav.as_deref())?;
    if let Some(frames) = summary.wav_frames {
        info!("wrote {frames} frames to {}", args.wav.as_deref().unwrap_or_default());
    }

    if let Some(path) = &args.save_state {
        HiveState::capture(&engine).save(Path::new(path))?;
        info!("state saved to {path}");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
