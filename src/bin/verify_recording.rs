//! verify_recording - check a recording directory against its steering CSV

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use drive_recorder::verify_recording;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Recording directory holding the snapshots and the CSV.
    #[arg(default_value = "recorded_images")]
    dir: PathBuf,
    /// CSV file name inside the directory.
    #[arg(long, default_value = "steering_data.csv")]
    csv: String,
    /// Largest accepted absolute steering angle (radians).
    #[arg(long, default_value_t = 0.5)]
    max_angle: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let report = verify_recording(&args.dir, &args.csv, args.max_angle)?;
    println!("entries: {}", report.entries);
    if let Some((width, height)) = report.image_size {
        println!("image size: {}x{}", width, height);
    }
    for name in &report.missing_images {
        println!("MISSING   {}", name);
    }
    for name in &report.undecodable_images {
        println!("CORRUPT   {}", name);
    }
    for name in &report.size_mismatches {
        println!("SIZE      {}", name);
    }
    for (name, steering) in &report.bad_steering {
        println!("STEERING  {} {}", name, steering);
    }

    if !report.is_clean() {
        return Err(anyhow!("recording in {} failed verification", args.dir.display()));
    }
    println!("OK");
    Ok(())
}
