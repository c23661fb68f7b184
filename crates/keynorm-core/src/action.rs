// Keynorm Key Transitions
// Down / Up / Repeat as carried in the evdev value field

use std::fmt;

/// Key transition. Discriminants are the evdev `EV_KEY` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl Action {
    /// Parse an evdev value; anything but 0, 1 or 2 is not a transition
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Action::Release),
            1 => Some(Action::Press),
            2 => Some(Action::Repeat),
            _ => None,
        }
    }

    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Release => "up",
            Action::Press => "down",
            Action::Repeat => "repeat",
        })
    }
}
