//! Headless entry point for SimSims.
//!
//! Stands in for the windowed game loop: it takes a surface size and a save
//! directory, restores the newest save (or builds a starting town), drives
//! the economy at a fixed frame rate for a bounded number of frames, then
//! pauses and writes a new save.
//!
//! # Startup
//!
//! ```text
//! args --> config file --> logging --> runtime --> economy --> tick loop --> save
//! ```

mod args;
mod demo;
mod error;

use simsims_core::economy::{Economy, TickReport};
use simsims_data::{SaveStore, SimsConfig, find_config, load_config};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::Args;
use crate::error::HeadlessError;

/// How often the tick loop logs a progress line, in frames.
const REPORT_EVERY: u64 = 60;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("simsims-headless: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve the configuration: the file named on the command line, or
/// `simsims.*` in the working directory, overridden by positional
/// arguments.
fn resolve_config(args: &Args) -> Result<SimsConfig, HeadlessError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => find_config(Path::new("."))?,
    };
    if let Some((width, height)) = args.surface {
        config.surface.width = width;
        config.surface.height = height;
    }
    if let Some(dir) = &args.save_dir {
        config.save_dir = dir.clone();
    }
    if let Some(frames) = args.frames {
        config.frames = frames;
    }
    Ok(config)
}

fn run() -> Result<(), HeadlessError> {
    let args = Args::parse(std::env::args().skip(1))?;
    let config = resolve_config(&args)?;

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_target(true)
        .init();

    info!(
        width = config.surface.width,
        height = config.surface.height,
        save_dir = %config.save_dir.display(),
        framerate = config.framerate,
        frames = config.frames,
        "simsims-headless starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("simsims-cycle")
        .build()?;
    let mut economy = Economy::new(&config.economy, runtime.handle().clone());

    let store = SaveStore::new(&config.save_dir);
    match store.load_latest()? {
        Some(data) => {
            economy.load_save_data(&data)?;
            info!(places = economy.place_count(), "restored newest save");
        }
        None => {
            demo::build_town(&mut economy, config.surface);
            info!(places = economy.place_count(), "no save found, built starting town");
        }
    }

    let totals = drive(&mut economy, &config);
    info!(
        ticks = economy.tick_count(),
        started = totals.started,
        finished = totals.finished,
        delivered = totals.delivered,
        produced = totals.cycles.produced,
        born = totals.cycles.born,
        lost = totals.cycles.lost,
        "run finished"
    );

    economy.pause();
    let path = store.save(&economy.to_save_data())?;
    info!(file = %path.display(), "run saved");
    Ok(())
}

/// Tick `economy` once per frame for `config.frames` frames, sleeping off
/// whatever is left of each frame.
fn drive(economy: &mut Economy, config: &SimsConfig) -> TickReport {
    let frame = config.frame_duration();
    let mut totals = TickReport::default();

    for n in 1..=config.frames {
        let start = Instant::now();
        totals.merge(&economy.tick());

        if n % REPORT_EVERY == 0 {
            let working = economy.in_flight();
            info!(frame = n, working, produced = totals.cycles.produced, "progress");
        }

        let spent = start.elapsed();
        match frame.checked_sub(spent) {
            Some(rest) => std::thread::sleep(rest),
            None if !frame.is_zero() => {
                warn!(frame = n, spent_ms = spent.as_millis() as u64, "frame overran");
            }
            None => {}
        }
    }
    totals
}
