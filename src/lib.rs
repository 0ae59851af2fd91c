//! Drive Recorder
//!
//! A tick-driven vehicle controller that records a steering dataset while a
//! human drives in a simulator.
//!
//! # Architecture
//!
//! Every simulation step runs one synchronous pass:
//!
//! 1. **Frame acquisition**: pull a BGRA frame from the host camera.
//! 2. **Image transform**: greyscale it.
//! 3. **Display sink**: show the greyscale frame on the host display.
//! 4. **Input mapping**: turn the one key seen this tick into an action.
//! 5. **Steering governor**: integrate, rate-limit and clamp the steering angle;
//!    decay to center when no steering key is held.
//! 6. **Recording scheduler**: on a fixed countdown, write a PNG snapshot and log
//!    `(file name, steering angle)`.
//!
//! When the host ends the simulation the log is written as CSV.
//!
//! # Module Structure
//!
//! - `device`: host device traits (camera, display, keyboard, vehicle)
//! - `frame`, `display`: frame buffers, greyscale, display sink
//! - `input`, `steering`, `speed`: driver input and its effect on the vehicle
//! - `recording`, `dataset`: snapshot scheduling and the CSV log
//! - `controller`: the per-tick loop and its explicit state
//! - `sim`: in-process synthetic host
//! - `config`, `verify`: configuration loading and recording checks

pub mod config;
pub mod controller;
pub mod dataset;
pub mod device;
pub mod display;
pub mod frame;
pub mod input;
pub mod recording;
pub mod sim;
pub mod speed;
pub mod steering;
pub mod verify;

pub use config::RecorderConfig;
pub use controller::{Controller, ControllerState, Devices, RunSummary, TickReport};
pub use dataset::LogEntry;
pub use device::{Camera, DisplaySurface, Key, Keyboard, StepOutcome, Vehicle};
pub use frame::{acquire, to_greyscale, FrameBuffer, GreyBuffer};
pub use input::{map_key, Action};
pub use recording::{CollisionPolicy, RecordingCounter, RecordingScheduler, SnapshotWriter};
pub use speed::{SpeedSettings, SpeedState};
pub use steering::{
    DirectionReport, SteerInput, SteerState, SteeringGovernor, SteeringSettings, SteeringState,
};
pub use verify::{verify_recording, VerifyReport};
