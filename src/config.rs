use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::recording::{CollisionPolicy, DEFAULT_SNAPSHOT_INTERVAL};
use crate::speed::SpeedSettings;
use crate::steering::{is_whole_milli, SteeringSettings};

const DEFAULT_OUTPUT_DIR: &str = "recorded_images";
const DEFAULT_CSV_FILE_NAME: &str = "steering_data.csv";
const DEFAULT_SIM_WIDTH: u32 = 256;
const DEFAULT_SIM_HEIGHT: u32 = 128;
const DEFAULT_SIM_TIME_STEP_MS: u32 = 32;
const DEFAULT_SIM_NOISE: u8 = 6;

#[derive(Debug, Deserialize, Default)]
struct RecorderConfigFile {
    output_dir: Option<PathBuf>,
    csv_file_name: Option<String>,
    recording: Option<RecordingConfigFile>,
    steering: Option<SteeringConfigFile>,
    speed: Option<SpeedConfigFile>,
    sim: Option<SimConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct RecordingConfigFile {
    snapshot_interval: Option<u32>,
    collision_policy: Option<CollisionPolicy>,
}

#[derive(Debug, Deserialize, Default)]
struct SteeringConfigFile {
    step: Option<f64>,
    limit: Option<f64>,
    wheel_ratio: Option<f64>,
    max_rate: Option<f64>,
    max_angle: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct SpeedConfigFile {
    initial: Option<f64>,
    step: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct SimConfigFile {
    width: Option<u32>,
    height: Option<u32>,
    time_step_ms: Option<u32>,
    max_ticks: Option<u64>,
    seed: Option<u64>,
    noise: Option<u8>,
    key_script: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Snapshot directory; the CSV is written inside it.
    pub output_dir: PathBuf,
    pub csv_file_name: String,
    pub recording: RecordingSettings,
    pub steering: SteeringSettings,
    pub speed: SpeedSettings,
    pub sim: SimSettings,
}

#[derive(Debug, Clone)]
pub struct RecordingSettings {
    /// Countdown reset value. The effective period is one tick longer.
    pub snapshot_interval: u32,
    pub collision_policy: CollisionPolicy,
}

/// Synthetic host settings.
#[derive(Debug, Clone)]
pub struct SimSettings {
    pub width: u32,
    pub height: u32,
    pub time_step_ms: u32,
    pub max_ticks: Option<u64>,
    pub seed: u64,
    pub noise: u8,
    pub key_script: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self::from_file(RecorderConfigFile::default())
    }
}

impl RecorderConfig {
    /// Defaults, then the file named by `DRIVE_RECORDER_CONFIG`, then env overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("DRIVE_RECORDER_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Like `load()`, with an explicit config file path.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.csv_file_name)
    }

    fn from_file(file: RecorderConfigFile) -> Self {
        let recording = file.recording.unwrap_or_default();
        let steering = file.steering.unwrap_or_default();
        let speed = file.speed.unwrap_or_default();
        let sim = file.sim.unwrap_or_default();
        let steering_defaults = SteeringSettings::default();
        let speed_defaults = SpeedSettings::default();

        Self {
            output_dir: file
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            csv_file_name: file
                .csv_file_name
                .unwrap_or_else(|| DEFAULT_CSV_FILE_NAME.to_string()),
            recording: RecordingSettings {
                snapshot_interval: recording
                    .snapshot_interval
                    .unwrap_or(DEFAULT_SNAPSHOT_INTERVAL),
                collision_policy: recording.collision_policy.unwrap_or_default(),
            },
            steering: SteeringSettings {
                step: steering.step.unwrap_or(steering_defaults.step),
                limit: steering.limit.unwrap_or(steering_defaults.limit),
                wheel_ratio: steering.wheel_ratio.unwrap_or(steering_defaults.wheel_ratio),
                max_rate: steering.max_rate.unwrap_or(steering_defaults.max_rate),
                max_angle: steering.max_angle.unwrap_or(steering_defaults.max_angle),
            },
            speed: SpeedSettings {
                initial: speed.initial.unwrap_or(speed_defaults.initial),
                step: speed.step.unwrap_or(speed_defaults.step),
                min: speed.min.unwrap_or(speed_defaults.min),
                max: speed.max.unwrap_or(speed_defaults.max),
            },
            sim: SimSettings {
                width: sim.width.unwrap_or(DEFAULT_SIM_WIDTH),
                height: sim.height.unwrap_or(DEFAULT_SIM_HEIGHT),
                time_step_ms: sim.time_step_ms.unwrap_or(DEFAULT_SIM_TIME_STEP_MS),
                max_ticks: sim.max_ticks,
                seed: sim.seed.unwrap_or(0),
                noise: sim.noise.unwrap_or(DEFAULT_SIM_NOISE),
                key_script: sim.key_script.unwrap_or_default(),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("DRIVE_RECORDER_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(interval) = std::env::var("DRIVE_RECORDER_SNAPSHOT_INTERVAL") {
            self.recording.snapshot_interval = interval.trim().parse().map_err(|_| {
                anyhow!("DRIVE_RECORDER_SNAPSHOT_INTERVAL must be a positive integer")
            })?;
        }
        if let Ok(policy) = std::env::var("DRIVE_RECORDER_COLLISION_POLICY") {
            if !policy.trim().is_empty() {
                self.recording.collision_policy = policy.parse()?;
            }
        }
        if let Ok(ticks) = std::env::var("DRIVE_RECORDER_MAX_TICKS") {
            let ticks: u64 = ticks
                .trim()
                .parse()
                .map_err(|_| anyhow!("DRIVE_RECORDER_MAX_TICKS must be an integer"))?;
            self.sim.max_ticks = Some(ticks);
        }
        if let Ok(script) = std::env::var("DRIVE_RECORDER_KEY_SCRIPT") {
            self.sim.key_script = script;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.recording.snapshot_interval == 0 {
            return Err(anyhow!("snapshot_interval must be greater than zero"));
        }
        if self.csv_file_name.trim().is_empty() {
            return Err(anyhow!("csv_file_name must not be empty"));
        }
        let steering = &self.steering;
        if !(is_whole_milli(steering.step) && is_whole_milli(steering.limit)) {
            return Err(anyhow!(
                "steering step ({}) and limit ({}) must be positive multiples of 0.001",
                steering.step,
                steering.limit
            ));
        }
        if steering.limit < steering.step {
            return Err(anyhow!("steering step must not exceed the limit"));
        }
        if !(steering.max_rate > 0.0 && steering.max_angle > 0.0 && steering.wheel_ratio > 0.0) {
            return Err(anyhow!(
                "steering max_rate, max_angle and wheel_ratio must be positive"
            ));
        }
        let speed = &self.speed;
        if speed.min > speed.max {
            return Err(anyhow!(
                "speed min ({}) exceeds max ({})",
                speed.min,
                speed.max
            ));
        }
        if speed.step <= 0.0 {
            return Err(anyhow!("speed step must be positive"));
        }
        if self.sim.width == 0 || self.sim.height == 0 {
            return Err(anyhow!("sim width and height must be non-zero"));
        }
        if self.sim.time_step_ms == 0 {
            return Err(anyhow!("sim time_step_ms must be non-zero"));
        }
        crate::sim::KeyScript::parse(&self.sim.key_script)?;
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<RecorderConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let cfg = if is_json {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        toml::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
