//! drive_recorder - run the steering recorder against the synthetic host
//!
//! This binary:
//! 1. Loads configuration (file, environment, then command line)
//! 2. Builds the synthetic camera, display, keyboard, and vehicle
//! 3. Runs the per-tick controller until the simulation ends or Ctrl-C
//! 4. Writes the steering CSV next to the recorded snapshots

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use drive_recorder::{sim, Controller, RecorderConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (TOML, or JSON with a .json extension).
    #[arg(long, env = "DRIVE_RECORDER_CONFIG")]
    config: Option<PathBuf>,
    /// End the simulation after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Key script replayed by the synthetic keyboard, e.g. "right*10 none*40".
    #[arg(long)]
    key_script: Option<String>,
    /// Snapshot and CSV output directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Seed for synthetic camera noise.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = RecorderConfig::load_from(args.config.as_deref())?;
    if let Some(ticks) = args.max_ticks {
        cfg.sim.max_ticks = Some(ticks);
    }
    if let Some(script) = args.key_script {
        cfg.sim.key_script = script;
    }
    if let Some(dir) = args.output_dir {
        cfg.output_dir = dir;
    }
    if let Some(seed) = args.seed {
        cfg.sim.seed = seed;
    }
    cfg.validate()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let devices = sim::synthetic_devices(&cfg.sim, Some(shutdown))?;
    let controller = Controller::new(devices, &cfg)?;

    log::info!("drive_recorder running. writing to {}", cfg.output_dir.display());
    log::info!(
        "snapshot countdown={} policy={:?} max_ticks={:?}",
        cfg.recording.snapshot_interval,
        cfg.recording.collision_policy,
        cfg.sim.max_ticks
    );
    if cfg.sim.max_ticks.is_none() {
        log::info!("no tick limit set, waiting for shutdown signal (Ctrl-C)...");
    }

    let summary = controller.run()?;
    log::info!(
        "run finished: ticks={} snapshots={} steering={:.4} speed={} km/h csv={}",
        summary.ticks,
        summary.snapshots,
        summary.steering_angle,
        summary.speed_kmh,
        summary.csv_path.display()
    );
    Ok(())
}
