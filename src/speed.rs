use crate::input::Action;

/// Cruising speed limits and increments (km/h).
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedSettings {
    pub initial: f64,
    pub step: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            initial: 30.0,
            step: 5.0,
            min: 0.0,
            max: 250.0,
        }
    }
}

/// Target cruising speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedState {
    kmh: f64,
}

impl SpeedState {
    pub fn new(settings: &SpeedSettings) -> Self {
        Self {
            kmh: settings.initial.clamp(settings.min, settings.max),
        }
    }

    pub fn kmh(&self) -> f64 {
        self.kmh
    }

    /// Adjust for a speed action; returns true if the action was a speed action.
    /// Requests outside `[min, max]` are clamped.
    pub fn apply(&mut self, action: Action, settings: &SpeedSettings) -> bool {
        let delta = match action {
            Action::SpeedUp => settings.step,
            Action::SpeedDown => -settings.step,
            _ => return false,
        };
        self.kmh = (self.kmh + delta).clamp(settings.min, settings.max);
        true
    }
}
