// Keynorm Key Classification
// Static tables partitioning key codes into groups

use strum_macros::{AsRefStr, Display, EnumIter};

use crate::Key;

/// Category a key code belongs to.
///
/// The groups are disjoint. A code outside every group is an "extra" key
/// (media, vendor or OEM keys) and is a candidate for function-key remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, AsRefStr)]
pub enum KeyGroup {
    Letter,
    Digit,
    Punctuation,
    Modifier,
    Navigation,
    Control,
    Function,
    Numpad,
    System,
}

pub const LETTERS: &[Key] = &[
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
    Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
    Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
];

pub const DIGITS: &[Key] = &[
    Key::KEY_0, Key::KEY_1, Key::KEY_2, Key::KEY_3, Key::KEY_4,
    Key::KEY_5, Key::KEY_6, Key::KEY_7, Key::KEY_8, Key::KEY_9,
];

pub const PUNCTUATION: &[Key] = &[
    Key::MINUS, Key::EQUAL, Key::LEFT_BRACE, Key::RIGHT_BRACE, Key::SEMICOLON,
    Key::APOSTROPHE, Key::GRAVE, Key::BACKSLASH, Key::COMMA, Key::DOT,
    Key::SLASH, Key::KEY_102ND,
];

pub const MODIFIERS: &[Key] = &[
    Key::LEFT_SHIFT, Key::RIGHT_SHIFT, Key::LEFT_CTRL, Key::RIGHT_CTRL,
    Key::LEFT_ALT, Key::RIGHT_ALT, Key::LEFT_META, Key::RIGHT_META,
    Key::CAPSLOCK,
];

pub const NAVIGATION: &[Key] = &[
    Key::UP, Key::DOWN, Key::LEFT, Key::RIGHT, Key::HOME, Key::END,
    Key::PAGE_UP, Key::PAGE_DOWN, Key::INSERT, Key::DELETE,
];

/// Common controls: Escape, Backspace, Tab, Enter, Space.
pub const CONTROLS: &[Key] = &[Key::ESC, Key::BACKSPACE, Key::TAB, Key::ENTER, Key::SPACE];

pub const FUNCTION_KEYS: &[Key] = &[
    Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6, Key::F7, Key::F8,
    Key::F9, Key::F10, Key::F11, Key::F12, Key::F13, Key::F14, Key::F15,
    Key::F16, Key::F17, Key::F18, Key::F19, Key::F20, Key::F21, Key::F22,
    Key::F23, Key::F24,
];

pub const NUMPAD: &[Key] = &[
    Key::KP0, Key::KP1, Key::KP2, Key::KP3, Key::KP4, Key::KP5, Key::KP6,
    Key::KP7, Key::KP8, Key::KP9, Key::KPDOT, Key::KPPLUS, Key::KPMINUS,
    Key::KPASTERISK, Key::KPSLASH, Key::KPENTER, Key::KPEQUAL, Key::NUMLOCK,
];

pub const SYSTEM: &[Key] = &[Key::SYSRQ, Key::SCROLLLOCK, Key::PAUSE, Key::COMPOSE];

/// Target slots for extra keys, F1 through F12 in order.
pub const FUNCTION_SLOTS: [Key; 12] = [
    Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
    Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
];

impl KeyGroup {
    /// Every key code in this group
    pub fn keys(self) -> &'static [Key] {
        match self {
            KeyGroup::Letter => LETTERS,
            KeyGroup::Digit => DIGITS,
            KeyGroup::Punctuation => PUNCTUATION,
            KeyGroup::Modifier => MODIFIERS,
            KeyGroup::Navigation => NAVIGATION,
            KeyGroup::Control => CONTROLS,
            KeyGroup::Function => FUNCTION_KEYS,
            KeyGroup::Numpad => NUMPAD,
            KeyGroup::System => SYSTEM,
        }
    }

    /// Letters, digits and punctuation produce a different character with Shift
    pub fn is_shiftable(self) -> bool {
        matches!(self, KeyGroup::Letter | KeyGroup::Digit | KeyGroup::Punctuation)
    }

    pub fn contains(self, key: Key) -> bool {
        self.keys().contains(&key)
    }
}

/// Find the group a key belongs to, `None` for extra keys.
pub fn group_of(key: Key) -> Option<KeyGroup> {
    use strum::IntoEnumIterator;

    KeyGroup::iter().find(|group| group.contains(key))
}

pub fn is_letter(key: Key) -> bool {
    KeyGroup::Letter.contains(key)
}

/// Either physical Shift key
pub fn is_shift(key: Key) -> bool {
    key == Key::LEFT_SHIFT || key == Key::RIGHT_SHIFT
}

pub fn is_shiftable(key: Key) -> bool {
    group_of(key).is_some_and(KeyGroup::is_shiftable)
}

/// Whether the engine already understands this key (not a remap candidate)
pub fn is_known(key: Key) -> bool {
    group_of(key).is_some()
}
