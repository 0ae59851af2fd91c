//! Per-tick control loop.
//!
//! Each simulation step:
//! 1. pull the camera frame (`frame::acquire`)
//! 2. greyscale it and paste it on the display
//! 3. read one key and map it to an action
//! 4. update target speed or steering (auto-centering when no steering key)
//! 5. run the snapshot scheduler
//!
//! The loop stops when the vehicle reports `StepOutcome::End`; the steering log
//! is then flushed to CSV exactly once.

use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::PathBuf;

use crate::config::RecorderConfig;
use crate::dataset::{self, LogEntry};
use crate::device::{Camera, DisplaySurface, Keyboard, StepOutcome, Vehicle};
use crate::display;
use crate::frame::{self, to_greyscale};
use crate::input::{map_key, Action};
use crate::recording::{ActuatorCommand, RecordingCounter, RecordingScheduler, SnapshotWriter};
use crate::speed::{SpeedSettings, SpeedState};
use crate::steering::{SteerInput, SteeringGovernor, SteeringState};

/// Mutable loop state, owned by the controller and passed by `&mut` into each tick.
#[derive(Clone, Debug)]
pub struct ControllerState {
    pub steering: SteeringState,
    pub speed: SpeedState,
    pub counter: RecordingCounter,
    pub log: Vec<LogEntry>,
    pub ticks: u64,
}

impl ControllerState {
    pub fn new(speed: &SpeedSettings, snapshot_interval: u32) -> Self {
        Self {
            steering: SteeringState::default(),
            speed: SpeedState::new(speed),
            counter: RecordingCounter::new(snapshot_interval),
            log: Vec::new(),
            ticks: 0,
        }
    }
}

/// Host devices driven by the controller.
pub struct Devices<C, D, K, V> {
    pub camera: C,
    pub display: D,
    pub keyboard: K,
    pub vehicle: V,
}

/// What happened during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub action: Action,
    pub snapshot: Option<LogEntry>,
}

/// Summary of a finished run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub ticks: u64,
    pub snapshots: usize,
    pub csv_path: PathBuf,
    pub steering_angle: f64,
    pub speed_kmh: f64,
}

pub struct Controller<C, D, K, V> {
    devices: Devices<C, D, K, V>,
    governor: SteeringGovernor,
    speed_settings: SpeedSettings,
    scheduler: RecordingScheduler,
    csv_path: PathBuf,
    state: ControllerState,
    clock: fn() -> NaiveDateTime,
}

impl<C, D, K, V> Controller<C, D, K, V>
where
    C: Camera,
    D: DisplaySurface,
    K: Keyboard,
    V: Vehicle,
{
    /// Enable the sampled devices and prepare the output directory.
    pub fn new(mut devices: Devices<C, D, K, V>, cfg: &RecorderConfig) -> Result<Self> {
        let time_step = devices.vehicle.basic_time_step();
        devices.camera.enable(time_step);
        devices.keyboard.enable(time_step);

        let writer = SnapshotWriter::create(&cfg.output_dir, cfg.recording.collision_policy)?;
        Ok(Self {
            devices,
            governor: SteeringGovernor::new(cfg.steering.clone()),
            speed_settings: cfg.speed.clone(),
            scheduler: RecordingScheduler::new(writer),
            csv_path: cfg.csv_path(),
            state: ControllerState::new(&cfg.speed, cfg.recording.snapshot_interval),
            clock: local_now,
        })
    }

    /// Replace the wall clock used to name snapshots.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn devices(&self) -> &Devices<C, D, K, V> {
        &self.devices
    }

    /// Run one tick against the current simulation step.
    pub fn tick(&mut self) -> Result<TickReport> {
        let Self {
            devices,
            governor,
            speed_settings,
            scheduler,
            state,
            clock,
            ..
        } = self;

        let frame = frame::acquire(&mut devices.camera)?;
        display::render(&mut devices.display, &to_greyscale(&frame))?;

        let action = map_key(devices.keyboard.get_key());
        if action != Action::None {
            log::debug!("key: {}", action.name());
        }
        if state.speed.apply(action, speed_settings) {
            log::debug!("target speed {} km/h", state.speed.kmh());
        }
        if let Some(report) = governor.apply(&mut state.steering, SteerInput::from(action)) {
            log::info!("{}", report);
        }

        let command = ActuatorCommand {
            steering_angle: state.steering.angle(),
            cruising_speed: state.speed.kmh(),
        };
        let snapshot = scheduler.on_tick(
            &mut state.counter,
            &mut state.log,
            &frame,
            &mut devices.vehicle,
            command,
            (*clock)(),
        )?;
        state.ticks += 1;

        Ok(TickReport { action, snapshot })
    }

    /// Step until the host ends the simulation, then flush the steering CSV.
    pub fn run(mut self) -> Result<RunSummary> {
        while self.devices.vehicle.step() != StepOutcome::End {
            self.tick()?;
        }
        self.finish()
    }

    fn finish(self) -> Result<RunSummary> {
        log::info!(
            "writing {} entries to {}",
            self.state.log.len(),
            self.csv_path.display()
        );
        dataset::flush(&self.csv_path, &self.state.log)?;
        Ok(RunSummary {
            ticks: self.state.ticks,
            snapshots: self.state.log.len(),
            csv_path: self.csv_path,
            steering_angle: self.state.steering.steering_angle(),
            speed_kmh: self.state.speed.kmh(),
        })
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
