use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::device::{StepOutcome, Vehicle};

/// Configuration for a synthetic vehicle.
#[derive(Clone, Debug)]
pub struct VehicleConfig {
    /// Basic time step in milliseconds.
    pub time_step_ms: u32,
    /// End the simulation after this many steps. `None` runs until shutdown.
    pub max_ticks: Option<u64>,
    /// Front/rear axle distance in meters (bicycle model).
    pub wheelbase_m: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            time_step_ms: 32,
            max_ticks: None,
            wheelbase_m: 2.995,
        }
    }
}

/// Planar pose of the vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

/// Step clock plus actuator state. Steering and speed take effect immediately.
pub struct SyntheticVehicle {
    config: VehicleConfig,
    steps: u64,
    steering_angle: f64,
    cruising_speed: Option<f64>,
    pose: Pose,
    shutdown: Option<Arc<AtomicBool>>,
}

impl SyntheticVehicle {
    pub fn new(config: VehicleConfig) -> Self {
        Self {
            config,
            steps: 0,
            steering_angle: 0.0,
            cruising_speed: None,
            pose: Pose::default(),
            shutdown: None,
        }
    }

    /// End the simulation at the next step once `flag` is set.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn commanded_speed(&self) -> Option<f64> {
        self.cruising_speed
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    fn integrate(&mut self) {
        let speed_ms = self.cruising_speed.unwrap_or(0.0) / 3.6;
        let dt = self.config.time_step_ms as f64 / 1000.0;
        let yaw_rate = if self.config.wheelbase_m > 0.0 {
            speed_ms * self.steering_angle.tan() / self.config.wheelbase_m
        } else {
            0.0
        };
        self.pose.heading += yaw_rate * dt;
        self.pose.x += speed_ms * self.pose.heading.cos() * dt;
        self.pose.y += speed_ms * self.pose.heading.sin() * dt;
    }
}

impl Vehicle for SyntheticVehicle {
    fn basic_time_step(&self) -> u32 {
        self.config.time_step_ms
    }

    fn step(&mut self) -> StepOutcome {
        if let Some(flag) = &self.shutdown {
            if flag.load(Ordering::SeqCst) {
                log::info!("SyntheticVehicle: shutdown requested after {} steps", self.steps);
                return StepOutcome::End;
            }
        }
        if let Some(max) = self.config.max_ticks {
            if self.steps >= max {
                return StepOutcome::End;
            }
        }
        self.steps += 1;
        self.integrate();
        StepOutcome::Continue
    }

    fn steering_angle(&self) -> f64 {
        self.steering_angle
    }

    fn set_steering_angle(&mut self, angle: f64) {
        self.steering_angle = angle;
    }

    fn set_cruising_speed(&mut self, kmh: f64) {
        self.cruising_speed = Some(kmh);
    }
}
