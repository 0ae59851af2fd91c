use crate::device::Key;

/// What the driver asked for this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    SpeedUp,
    SpeedDown,
    SteerRight,
    SteerLeft,
    None,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::SpeedUp => "up",
            Action::SpeedDown => "down",
            Action::SteerRight => "right",
            Action::SteerLeft => "left",
            Action::None => "none",
        }
    }
}

/// Map the single key observed this tick to an action.
pub fn map_key(key: Option<Key>) -> Action {
    match key {
        Some(Key::Up) => Action::SpeedUp,
        Some(Key::Down) => Action::SpeedDown,
        Some(Key::Right) => Action::SteerRight,
        Some(Key::Left) => Action::SteerLeft,
        Some(Key::Other(_)) | None => Action::None,
    }
}
