//! Snapshot scheduling.
//!
//! A countdown starts at the snapshot interval and is decremented on every tick.
//! When it reads zero the scheduler:
//! 1. writes the current frame to `<output dir>/<YYYY-MM-DD HH-MM-SS>.png`
//! 2. appends `{file name, vehicle steering angle}` to the dataset log
//! 3. pushes the governor angle and target speed to the vehicle
//! 4. resets the countdown
//!
//! The decrement also runs on the reset tick, so with an interval of 30 a
//! snapshot lands on every 31st tick.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::dataset::LogEntry;
use crate::device::Vehicle;
use crate::frame::FrameBuffer;

pub const DEFAULT_SNAPSHOT_INTERVAL: u32 = 30;
pub const SNAPSHOT_TIME_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

/// What to do when a snapshot name already exists on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Replace the existing file.
    Overwrite,
    /// Append `-1`, `-2`, ... to the stem until the name is free.
    #[default]
    Suffix,
}

impl FromStr for CollisionPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "suffix" => Ok(CollisionPolicy::Suffix),
            other => Err(anyhow!(
                "unknown collision policy '{}'; expected overwrite or suffix",
                other
            )),
        }
    }
}

/// Countdown to the next snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordingCounter {
    remaining: u32,
    reset_to: u32,
}

impl RecordingCounter {
    pub fn new(interval: u32) -> Self {
        Self {
            remaining: interval,
            reset_to: interval,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_due(&self) -> bool {
        self.remaining == 0
    }

    pub fn reset(&mut self) {
        self.remaining = self.reset_to;
    }

    /// Unconditional end-of-tick decrement.
    pub fn advance(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Commands pushed to the vehicle on a snapshot tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActuatorCommand {
    pub steering_angle: f64,
    pub cruising_speed: f64,
}

/// Writes PNG snapshots into one directory.
#[derive(Clone, Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
    policy: CollisionPolicy,
}

impl SnapshotWriter {
    /// Create the writer, creating `dir` if it does not exist.
    pub fn create(dir: impl Into<PathBuf>, policy: CollisionPolicy) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create image directory {}", dir.display()))?;
        Ok(Self { dir, policy })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pick the file name for a snapshot taken at `now`.
    pub fn file_name(&self, now: NaiveDateTime) -> String {
        let stamp = snapshot_stamp(now);
        let plain = format!("{}.png", stamp);
        if self.policy == CollisionPolicy::Overwrite || !self.dir.join(&plain).exists() {
            return plain;
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{}-{}.png", stamp, n);
            if !self.dir.join(&candidate).exists() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Write the frame and return the file name used.
    pub fn write(&self, frame: &FrameBuffer, now: NaiveDateTime) -> Result<String> {
        let name = self.file_name(now);
        let path = self.dir.join(&name);
        if self.policy == CollisionPolicy::Overwrite && path.exists() {
            log::warn!("overwriting snapshot {}", path.display());
        }
        log::info!("saving image to {}", path.display());
        frame.save_png(&path)?;
        Ok(name)
    }
}

pub fn snapshot_stamp(now: NaiveDateTime) -> String {
    now.format(SNAPSHOT_TIME_FORMAT).to_string()
}

/// Snapshot side of the per-tick loop.
#[derive(Clone, Debug)]
pub struct RecordingScheduler {
    writer: SnapshotWriter,
}

impl RecordingScheduler {
    pub fn new(writer: SnapshotWriter) -> Self {
        Self { writer }
    }

    /// Run the scheduler for one tick. Returns the entry recorded this tick, if any.
    pub fn on_tick<V: Vehicle + ?Sized>(
        &self,
        counter: &mut RecordingCounter,
        log: &mut Vec<LogEntry>,
        frame: &FrameBuffer,
        vehicle: &mut V,
        command: ActuatorCommand,
        now: NaiveDateTime,
    ) -> Result<Option<LogEntry>> {
        let mut recorded = None;
        if counter.is_due() {
            let name = self.writer.write(frame, now)?;
            let entry = LogEntry::from_angle(name, vehicle.steering_angle());
            log.push(entry.clone());
            recorded = Some(entry);

            vehicle.set_steering_angle(command.steering_angle);
            vehicle.set_cruising_speed(command.cruising_speed);
            counter.reset();
        }
        counter.advance();
        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SyntheticVehicle, VehicleConfig};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid time")
    }

    fn frame() -> FrameBuffer {
        FrameBuffer::from_bgra(vec![10, 20, 30, 255, 40, 50, 60, 255], 2, 1).expect("frame")
    }

    #[test]
    fn counter_period_is_interval_plus_one() {
        let mut counter = RecordingCounter::new(30);
        let mut due_ticks = Vec::new();
        for tick in 0..100 {
            if counter.is_due() {
                due_ticks.push(tick);
                counter.reset();
            }
            counter.advance();
        }
        assert_eq!(due_ticks, vec![30, 61, 92]);
    }

    #[test]
    fn stamp_has_second_resolution() {
        assert_eq!(snapshot_stamp(at(9, 5, 7)), "2026-10-16 09-05-07");
    }

    #[test]
    fn suffix_policy_avoids_overwrites() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let writer = SnapshotWriter::create(dir.path(), CollisionPolicy::Suffix)?;
        let first = writer.write(&frame(), at(12, 0, 0))?;
        let second = writer.write(&frame(), at(12, 0, 0))?;
        let third = writer.write(&frame(), at(12, 0, 0))?;
        assert_eq!(first, "2026-10-16 12-00-00.png");
        assert_eq!(second, "2026-10-16 12-00-00-1.png");
        assert_eq!(third, "2026-10-16 12-00-00-2.png");
        Ok(())
    }

    #[test]
    fn overwrite_policy_reuses_name() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let writer = SnapshotWriter::create(dir.path(), CollisionPolicy::Overwrite)?;
        let first = writer.write(&frame(), at(12, 0, 0))?;
        let second = writer.write(&frame(), at(12, 0, 0))?;
        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn writer_creates_missing_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("recorded_images");
        let writer = SnapshotWriter::create(&nested, CollisionPolicy::default())?;
        assert!(writer.dir().is_dir());
        Ok(())
    }

    #[test]
    fn due_tick_records_and_actuates() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let scheduler =
            RecordingScheduler::new(SnapshotWriter::create(dir.path(), CollisionPolicy::Suffix)?);
        let mut vehicle = SyntheticVehicle::new(VehicleConfig::default());
        let mut counter = RecordingCounter::new(1);
        let mut log = Vec::new();
        let command = ActuatorCommand {
            steering_angle: 0.25,
            cruising_speed: 40.0,
        };

        let first = scheduler.on_tick(
            &mut counter,
            &mut log,
            &frame(),
            &mut vehicle,
            command,
            at(8, 0, 0),
        )?;
        assert!(first.is_none());
        assert_eq!(vehicle.commanded_speed(), None);

        let second = scheduler
            .on_tick(&mut counter, &mut log, &frame(), &mut vehicle, command, at(8, 0, 1))?
            .expect("snapshot on second tick");
        assert_eq!(second.name_image(), "2026-10-16 08-00-01.png");
        // The entry carries the angle applied before this tick's command.
        assert_eq!(second.steering(), "0.0");
        assert_eq!(vehicle.steering_angle(), 0.25);
        assert_eq!(vehicle.commanded_speed(), Some(40.0));
        assert_eq!(log, vec![second]);
        assert!(dir.path().join("2026-10-16 08-00-01.png").is_file());
        Ok(())
    }

    #[test]
    fn collision_policy_parses() -> Result<()> {
        assert_eq!("Overwrite".parse::<CollisionPolicy>()?, CollisionPolicy::Overwrite);
        assert_eq!(" suffix ".parse::<CollisionPolicy>()?, CollisionPolicy::Suffix);
        assert!("rename".parse::<CollisionPolicy>().is_err());
        Ok(())
    }
}
