//! In-process synthetic host.
//!
//! This module provides stand-ins for the simulator devices:
//! - `SyntheticCamera`: deterministic road scene with seeded sensor noise
//! - `MemoryDisplay`: keeps the last pasted image
//! - `ScriptedKeyboard`: replays a key script
//! - `SyntheticVehicle`: step clock with a kinematic pose and actuator readback
//!
//! They let the controller loop run end to end without a simulator process, and
//! back the integration tests.

mod camera;
mod display;
mod keyboard;
mod vehicle;

pub use camera::{CameraConfig, SyntheticCamera};
pub use display::{MemoryDisplay, Paste};
pub use keyboard::{KeyScript, ScriptedKeyboard};
pub use vehicle::{Pose, SyntheticVehicle, VehicleConfig};

use anyhow::Result;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::config::SimSettings;
use crate::controller::Devices;

/// Device set backed entirely by the synthetic host.
pub type SyntheticDevices =
    Devices<SyntheticCamera, MemoryDisplay, ScriptedKeyboard, SyntheticVehicle>;

/// Build the synthetic devices described by `settings`.
pub fn synthetic_devices(
    settings: &SimSettings,
    shutdown: Option<Arc<AtomicBool>>,
) -> Result<SyntheticDevices> {
    let script = KeyScript::parse(&settings.key_script)?;
    let mut vehicle = SyntheticVehicle::new(VehicleConfig {
        time_step_ms: settings.time_step_ms,
        max_ticks: settings.max_ticks,
        ..VehicleConfig::default()
    });
    if let Some(flag) = shutdown {
        vehicle = vehicle.with_shutdown(flag);
    }
    Ok(Devices {
        camera: SyntheticCamera::new(CameraConfig {
            width: settings.width,
            height: settings.height,
            seed: settings.seed,
            noise: settings.noise,
        }),
        display: MemoryDisplay::new(settings.width, settings.height),
        keyboard: ScriptedKeyboard::new(script),
        vehicle,
    })
}
