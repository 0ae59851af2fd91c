//! Steering governor.
//!
//! Manual steering is integrated into an accumulator, scaled into a wheel angle,
//! rate-limited against the previous tick and clamped to the mechanical range:
//!
//! - accumulator: bounded to `[-limit, +limit]`; a nudge that would leave the
//!   range is dropped for that tick (not an error)
//! - wheel angle: `accumulator * wheel_ratio`
//! - steering angle: moves at most `max_rate` per tick, then clamped to
//!   `[-max_angle, +max_angle]`
//!
//! With no steering key held the accumulator decays toward zero by one step per
//! tick and stops exactly at zero.
//!
//! The accumulator is kept in fixed-point thousandths so repeated `±0.1` steps
//! never drift off the grid.

use std::fmt;

use crate::input::Action;

const MILLI: f64 = 1000.0;

/// Steering constants.
#[derive(Clone, Debug, PartialEq)]
pub struct SteeringSettings {
    /// Accumulator change per nudge or per auto-centering tick.
    pub step: f64,
    /// Accumulator bound (symmetric).
    pub limit: f64,
    /// Accumulator to wheel-angle scale.
    pub wheel_ratio: f64,
    /// Maximum steering angle change per tick (radians).
    pub max_rate: f64,
    /// Mechanical steering bound (radians, symmetric).
    pub max_angle: f64,
}

impl Default for SteeringSettings {
    fn default() -> Self {
        Self {
            step: 0.1,
            limit: 25.0,
            wheel_ratio: 0.02,
            max_rate: 0.1,
            max_angle: 0.5,
        }
    }
}

/// Which way the accumulator currently leans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteerState {
    Left,
    Centered,
    Right,
}

/// Steering input for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteerInput {
    /// Add one step in the given direction (+1 right, -1 left).
    Nudge(i8),
    /// No steering key: decay toward center.
    Release,
    /// A non-steering key was handled this tick; steering is left alone.
    Hold,
}

impl From<Action> for SteerInput {
    fn from(action: Action) -> Self {
        match action {
            Action::SteerRight => SteerInput::Nudge(1),
            Action::SteerLeft => SteerInput::Nudge(-1),
            Action::SpeedUp | Action::SpeedDown => SteerInput::Hold,
            Action::None => SteerInput::Release,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Human-readable direction line emitted when the governor was asked to move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DirectionReport {
    Straight,
    Turning { angle: f64, side: Side },
}

impl fmt::Display for DirectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionReport::Straight => write!(f, "going straight"),
            DirectionReport::Turning { angle, side } => {
                write!(f, "turning {} rad {}", angle, side.as_str())
            }
        }
    }
}

/// Steering state carried from tick to tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringState {
    manual_milli: i32,
    steering_angle: f64,
    angle: f64,
}

impl Default for SteeringState {
    fn default() -> Self {
        Self {
            manual_milli: 0,
            steering_angle: 0.0,
            angle: 0.0,
        }
    }
}

impl SteeringState {
    /// Manual steering accumulator.
    pub fn manual_steering(&self) -> f64 {
        self.manual_milli as f64 / MILLI
    }

    /// Rate-limited, clamped steering angle.
    pub fn steering_angle(&self) -> f64 {
        self.steering_angle
    }

    /// Angle to push to the actuator on the next snapshot.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn steer_state(&self) -> SteerState {
        match self.manual_milli.signum() {
            -1 => SteerState::Left,
            1 => SteerState::Right,
            _ => SteerState::Centered,
        }
    }
}

/// Outcome of one governor tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub state: SteeringState,
    pub steer: SteerState,
    /// Set whenever the governor was asked to move, even if the nudge was rejected.
    pub report: Option<DirectionReport>,
}

#[derive(Clone, Debug)]
pub struct SteeringGovernor {
    settings: SteeringSettings,
    step_milli: i32,
    limit_milli: i32,
}

impl SteeringGovernor {
    pub fn new(settings: SteeringSettings) -> Self {
        let step_milli = to_milli(settings.step).max(1);
        let limit_milli = to_milli(settings.limit).max(0);
        Self {
            settings,
            step_milli,
            limit_milli,
        }
    }

    /// Build a state with the accumulator preset (clamped into range).
    pub fn state_with_manual(&self, manual_steering: f64) -> SteeringState {
        let manual_milli = to_milli(manual_steering).clamp(-self.limit_milli, self.limit_milli);
        let angle = self.clamp_angle(self.wheel_angle(manual_milli));
        SteeringState {
            manual_milli,
            steering_angle: angle,
            angle,
        }
    }

    /// Compute the next state for one tick of input.
    pub fn transition(&self, state: &SteeringState, input: SteerInput) -> Transition {
        let toward_center = self.step_milli.min(state.manual_milli.abs());
        let delta = match (input, state.steer_state()) {
            (SteerInput::Hold, steer) | (SteerInput::Release, steer @ SteerState::Centered) => {
                return Transition {
                    state: *state,
                    steer,
                    report: None,
                }
            }
            (SteerInput::Nudge(direction), _) => self.step_milli * direction.signum() as i32,
            (SteerInput::Release, SteerState::Right) => -toward_center,
            (SteerInput::Release, SteerState::Left) => toward_center,
        };

        let mut next = *state;
        let candidate = state.manual_milli.saturating_add(delta);
        if (-self.limit_milli..=self.limit_milli).contains(&candidate) {
            next.manual_milli = candidate;
            let angle = self.limit_rate(self.wheel_angle(candidate), state.steering_angle);
            next.steering_angle = angle;
            next.angle = angle;
        }

        Transition {
            state: next,
            steer: next.steer_state(),
            report: Some(report_for(&next)),
        }
    }

    /// Apply one tick of input in place and return the emitted report.
    pub fn apply(&self, state: &mut SteeringState, input: SteerInput) -> Option<DirectionReport> {
        let transition = self.transition(state, input);
        *state = transition.state;
        transition.report
    }

    fn wheel_angle(&self, manual_milli: i32) -> f64 {
        manual_milli as f64 / MILLI * self.settings.wheel_ratio
    }

    fn limit_rate(&self, wheel_angle: f64, previous: f64) -> f64 {
        let max_rate = self.settings.max_rate;
        let limited = if wheel_angle - previous > max_rate {
            previous + max_rate
        } else if wheel_angle - previous < -max_rate {
            previous - max_rate
        } else {
            wheel_angle
        };
        self.clamp_angle(limited)
    }

    fn clamp_angle(&self, angle: f64) -> f64 {
        angle.clamp(-self.settings.max_angle, self.settings.max_angle)
    }
}

impl Default for SteeringGovernor {
    fn default() -> Self {
        Self::new(SteeringSettings::default())
    }
}

fn report_for(state: &SteeringState) -> DirectionReport {
    if state.manual_milli == 0 {
        return DirectionReport::Straight;
    }
    let side = if state.steering_angle < 0.0 {
        Side::Left
    } else {
        Side::Right
    };
    DirectionReport::Turning {
        angle: state.steering_angle,
        side,
    }
}

fn to_milli(value: f64) -> i32 {
    (value * MILLI).round() as i32
}

/// True when `value` is a positive whole number of thousandths, the only
/// accumulator quantities the governor can hold exactly.
pub fn is_whole_milli(value: f64) -> bool {
    let scaled = value * MILLI;
    scaled.is_finite() && scaled.round() >= 1.0 && (scaled.round() - scaled).abs() < 1e-9
}
