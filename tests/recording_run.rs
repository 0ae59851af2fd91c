//! End-to-end runs of the controller against the synthetic host.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use drive_recorder::dataset;
use drive_recorder::sim::{self, SyntheticCamera, SyntheticDevices};
use drive_recorder::{
    verify_recording, Camera, Controller, Devices, RecorderConfig, StepOutcome, Vehicle,
};

fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|d| d.and_hms_opt(14, 30, 0))
        .expect("valid time")
}

fn test_config(dir: &Path, max_ticks: u64, script: &str) -> RecorderConfig {
    let mut cfg = RecorderConfig::default();
    cfg.output_dir = dir.join("recorded_images");
    cfg.sim.width = 32;
    cfg.sim.height = 16;
    cfg.sim.max_ticks = Some(max_ticks);
    cfg.sim.key_script = script.to_string();
    cfg
}

fn devices(cfg: &RecorderConfig) -> SyntheticDevices {
    sim::synthetic_devices(&cfg.sim, None).expect("synthetic devices")
}

#[test]
fn snapshot_count_follows_31_tick_period() -> Result<()> {
    for ticks in [0u64, 30, 31, 61, 62, 200, 311] {
        let dir = tempfile::tempdir()?;
        let cfg = test_config(dir.path(), ticks, "");
        let summary = Controller::new(devices(&cfg), &cfg)?
            .with_clock(fixed_clock)
            .run()?;

        assert_eq!(summary.ticks, ticks);
        assert_eq!(summary.snapshots as u64, ticks / 31, "ticks={}", ticks);
        let entries = dataset::read_entries(&summary.csv_path)?;
        assert_eq!(entries.len(), summary.snapshots);
    }
    Ok(())
}

#[test]
fn recording_verifies_and_keeps_tick_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = test_config(dir.path(), 200, "right*60 none*100 left*40");
    let summary = Controller::new(devices(&cfg), &cfg)?
        .with_clock(fixed_clock)
        .run()?;
    assert_eq!(summary.snapshots, 6);

    let entries = dataset::read_entries(&summary.csv_path)?;
    let names: Vec<&str> = entries.iter().map(|e| e.name_image()).collect();
    assert_eq!(
        names,
        vec![
            "2026-10-16 14-30-00.png",
            "2026-10-16 14-30-00-1.png",
            "2026-10-16 14-30-00-2.png",
            "2026-10-16 14-30-00-3.png",
            "2026-10-16 14-30-00-4.png",
            "2026-10-16 14-30-00-5.png",
        ]
    );

    let report = verify_recording(&cfg.output_dir, &cfg.csv_file_name, 0.5)?;
    assert!(report.is_clean(), "{:?}", report);
    assert_eq!(report.image_size, Some((32, 16)));
    Ok(())
}

#[test]
fn logged_steering_lags_one_snapshot() -> Result<()> {
    let dir = tempfile::tempdir()?;
    // Hold right for the whole run so the governor angle keeps growing.
    let cfg = test_config(dir.path(), 93, "right*93");
    let summary = Controller::new(devices(&cfg), &cfg)?
        .with_clock(fixed_clock)
        .run()?;
    let entries = dataset::read_entries(&summary.csv_path)?;
    let angles: Vec<f64> = entries
        .iter()
        .map(|e| e.steering().parse::<f64>())
        .collect::<std::result::Result<_, _>>()?;

    assert_eq!(angles.len(), 3);
    // Snapshot on tick 31 records the untouched actuator.
    assert_eq!(angles[0], 0.0);
    // Tick 62 records the angle pushed on tick 31 (31 right nudges).
    assert!((angles[1] - 31.0 * 0.1 * 0.02).abs() < 1e-9);
    assert!((angles[2] - 62.0 * 0.1 * 0.02).abs() < 1e-9);
    Ok(())
}

struct BrokenCamera;

impl Camera for BrokenCamera {
    fn enable(&mut self, _sampling_period_ms: u32) {}

    fn is_enabled(&self) -> bool {
        true
    }

    fn width(&self) -> u32 {
        4
    }

    fn height(&self) -> u32 {
        4
    }

    fn image(&mut self) -> Result<Vec<u8>> {
        Ok(vec![0; 10])
    }
}

#[test]
fn malformed_camera_buffer_is_fatal() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = test_config(dir.path(), 5, "");
    let synthetic = devices(&cfg);
    let devices = Devices {
        camera: BrokenCamera,
        display: synthetic.display,
        keyboard: synthetic.keyboard,
        vehicle: synthetic.vehicle,
    };
    let err = Controller::new(devices, &cfg)?.run().unwrap_err();
    assert!(err.to_string().contains("length mismatch"), "{}", err);
    // The run aborted before shutdown, so no CSV was written.
    assert!(!cfg.csv_path().exists());
    Ok(())
}

#[test]
fn vehicle_receives_commands_on_snapshot_ticks() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = test_config(dir.path(), 31, "up*3 right*5");
    let mut controller = Controller::new(devices(&cfg), &cfg)?.with_clock(fixed_clock);
    for _ in 0..30 {
        controller.tick()?;
        assert_eq!(controller.devices().vehicle.commanded_speed(), None);
    }
    let report = controller.tick()?;
    assert!(report.snapshot.is_some());

    let vehicle = &controller.devices().vehicle;
    assert_eq!(vehicle.commanded_speed(), Some(45.0));
    // Five nudges right, then five no-key ticks bring it back to center.
    assert_eq!(vehicle.steering_angle(), 0.0);
    Ok(())
}

#[test]
fn synthetic_vehicle_ends_the_loop() {
    let cfg = {
        let mut cfg = RecorderConfig::default();
        cfg.sim.max_ticks = Some(2);
        cfg
    };
    let mut devices = devices(&cfg);
    assert_eq!(devices.vehicle.step(), StepOutcome::Continue);
    assert_eq!(devices.vehicle.step(), StepOutcome::Continue);
    assert_eq!(devices.vehicle.step(), StepOutcome::End);
}

/// Camera that raises the shutdown flag after a fixed number of frames, the
/// way a Ctrl-C handler would mid-run.
struct InterruptingCamera {
    inner: SyntheticCamera,
    frames_left: u32,
    shutdown: Arc<AtomicBool>,
}

impl Camera for InterruptingCamera {
    fn enable(&mut self, sampling_period_ms: u32) {
        self.inner.enable(sampling_period_ms);
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn image(&mut self) -> Result<Vec<u8>> {
        self.frames_left = self.frames_left.saturating_sub(1);
        if self.frames_left == 0 {
            self.shutdown.store(true, Ordering::SeqCst);
        }
        self.inner.image()
    }
}

#[test]
fn shutdown_flag_ends_run_and_flushes_csv() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut cfg = test_config(dir.path(), 0, "right*10");
    cfg.sim.max_ticks = None;
    let shutdown = Arc::new(AtomicBool::new(false));
    let synthetic = sim::synthetic_devices(&cfg.sim, Some(shutdown.clone()))?;
    let devices = Devices {
        camera: InterruptingCamera {
            inner: synthetic.camera,
            frames_left: 70,
            shutdown: shutdown.clone(),
        },
        display: synthetic.display,
        keyboard: synthetic.keyboard,
        vehicle: synthetic.vehicle,
    };

    let summary = Controller::new(devices, &cfg)?
        .with_clock(fixed_clock)
        .run()?;
    assert!(shutdown.load(Ordering::SeqCst));
    assert_eq!(summary.ticks, 70);
    assert_eq!(summary.snapshots, 2);

    let csv = std::fs::read_to_string(cfg.csv_path())?;
    assert_eq!(csv.lines().next(), Some("name_image,steering"));
    let entries = dataset::read_entries(&cfg.csv_path())?;
    assert_eq!(entries.len(), summary.snapshots);
    Ok(())
}

#[test]
fn shutdown_before_first_step_still_writes_header() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut cfg = test_config(dir.path(), 0, "");
    cfg.sim.max_ticks = None;
    let shutdown = Arc::new(AtomicBool::new(true));
    let devices = sim::synthetic_devices(&cfg.sim, Some(shutdown))?;

    let summary = Controller::new(devices, &cfg)?.run()?;
    assert_eq!(summary.ticks, 0);
    assert_eq!(summary.snapshots, 0);
    let csv = std::fs::read_to_string(cfg.csv_path())?;
    assert_eq!(csv.trim_end(), "name_image,steering");
    Ok(())
}
