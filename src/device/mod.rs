//! Host device interfaces.
//!
//! The simulator owns the camera, display, keyboard, and vehicle actuator. The
//! controller only talks to them through these traits, so any host (a simulator
//! binding or the in-process `sim` host) can drive the loop.
//!
//! Device precondition violations (reading a camera that was never enabled,
//! malformed buffers) surface as `Err` and end the run.

use anyhow::Result;

/// Camera producing interleaved BGRA frames.
pub trait Camera {
    /// Start sampling every `sampling_period_ms`. Must be called before `image()`.
    fn enable(&mut self, sampling_period_ms: u32);

    fn is_enabled(&self) -> bool;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Raw BGRA bytes of the current image, `height * width * 4` long.
    fn image(&mut self) -> Result<Vec<u8>>;
}

/// Display surface accepting packed RGB images.
pub trait DisplaySurface {
    /// Paste an RGB image with its top-left corner at (`x`, `y`).
    fn paste_rgb(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
        x: u32,
        y: u32,
        blend: bool,
    ) -> Result<()>;
}

/// Discrete key codes the controller reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Any other key code reported by the host.
    Other(i32),
}

/// Keyboard reporting at most one key per tick.
pub trait Keyboard {
    fn enable(&mut self, sampling_period_ms: u32);

    /// Key pressed during the last step, if any.
    fn get_key(&mut self) -> Option<Key>;
}

/// Result of advancing the simulation by one basic time step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// The host ended the simulation; the controller must shut down.
    End,
}

/// Vehicle actuator and simulation clock.
pub trait Vehicle {
    /// Basic simulation time step in milliseconds.
    fn basic_time_step(&self) -> u32;

    fn step(&mut self) -> StepOutcome;

    /// Steering angle currently applied to the wheels (radians).
    fn steering_angle(&self) -> f64;

    fn set_steering_angle(&mut self, angle: f64);

    /// Target cruising speed in km/h.
    fn set_cruising_speed(&mut self, kmh: f64);
}
