// Keynorm Key Type
// Represents a single key code from Linux input-event-codes.h

use std::fmt;
use std::str::FromStr;

/// Represents a single keyboard key code.
///
/// This is a newtype wrapper around u16 for type safety.
/// The numeric values match Linux input-event-codes.h definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

macro_rules! define_keys {
    ($($name:ident = $code:expr),* $(,)?) => {
        impl Key {
            $(pub const $name: Key = Key($code);)*
        }

        /// Canonical (code, name) pairs for every named key.
        const KEY_NAMES: &[(u16, &str)] = &[$(($code, stringify!($name))),*];
    };
}

define_keys! {
    RESERVED = 0,
    ESC = 1,
    KEY_1 = 2,
    KEY_2 = 3,
    KEY_3 = 4,
    KEY_4 = 5,
    KEY_5 = 6,
    KEY_6 = 7,
    KEY_7 = 8,
    KEY_8 = 9,
    KEY_9 = 10,
    KEY_0 = 11,
    MINUS = 12,
    EQUAL = 13,
    BACKSPACE = 14,
    TAB = 15,
    Q = 16,
    W = 17,
    E = 18,
    R = 19,
    T = 20,
    Y = 21,
    U = 22,
    I = 23,
    O = 24,
    P = 25,
    LEFT_BRACE = 26,
    RIGHT_BRACE = 27,
    ENTER = 28,
    LEFT_CTRL = 29,
    A = 30,
    S = 31,
    D = 32,
    F = 33,
    G = 34,
    H = 35,
    J = 36,
    K = 37,
    L = 38,
    SEMICOLON = 39,
    APOSTROPHE = 40,
    GRAVE = 41,
    LEFT_SHIFT = 42,
    BACKSLASH = 43,
    Z = 44,
    X = 45,
    C = 46,
    V = 47,
    B = 48,
    N = 49,
    M = 50,
    COMMA = 51,
    DOT = 52,
    SLASH = 53,
    RIGHT_SHIFT = 54,
    KPASTERISK = 55,
    LEFT_ALT = 56,
    SPACE = 57,
    CAPSLOCK = 58,
    F1 = 59,
    F2 = 60,
    F3 = 61,
    F4 = 62,
    F5 = 63,
    F6 = 64,
    F7 = 65,
    F8 = 66,
    F9 = 67,
    F10 = 68,
    NUMLOCK = 69,
    SCROLLLOCK = 70,
    KP7 = 71,
    KP8 = 72,
    KP9 = 73,
    KPMINUS = 74,
    KP4 = 75,
    KP5 = 76,
    KP6 = 77,
    KPPLUS = 78,
    KP1 = 79,
    KP2 = 80,
    KP3 = 81,
    KP0 = 82,
    KPDOT = 83,
    KEY_102ND = 86,
    F11 = 87,
    F12 = 88,
    KPENTER = 96,
    RIGHT_CTRL = 97,
    KPSLASH = 98,
    SYSRQ = 99,
    RIGHT_ALT = 100,
    HOME = 102,
    UP = 103,
    PAGE_UP = 104,
    LEFT = 105,
    RIGHT = 106,
    END = 107,
    DOWN = 108,
    PAGE_DOWN = 109,
    INSERT = 110,
    DELETE = 111,
    MUTE = 113,
    VOLUMEDOWN = 114,
    VOLUMEUP = 115,
    POWER = 116,
    KPEQUAL = 117,
    PAUSE = 119,
    LEFT_META = 125,
    RIGHT_META = 126,
    COMPOSE = 127,
    CALC = 140,
    MAIL = 155,
    BACK = 158,
    FORWARD = 159,
    NEXTSONG = 163,
    PLAYPAUSE = 164,
    PREVIOUSSONG = 165,
    STOPCD = 166,
    HOMEPAGE = 172,
    F13 = 183,
    F14 = 184,
    F15 = 185,
    F16 = 186,
    F17 = 187,
    F18 = 188,
    F19 = 189,
    F20 = 190,
    F21 = 191,
    F22 = 192,
    F23 = 193,
    F24 = 194,
    SEARCH = 217,
    BRIGHTNESSDOWN = 224,
    BRIGHTNESSUP = 225,
    MICMUTE = 248,
}

/// Extra spellings accepted by [`key_from_name`].
const KEY_ALIASES: &[(&str, Key)] = &[
    ("ESCAPE", Key::ESC),
    ("1", Key::KEY_1),
    ("2", Key::KEY_2),
    ("3", Key::KEY_3),
    ("4", Key::KEY_4),
    ("5", Key::KEY_5),
    ("6", Key::KEY_6),
    ("7", Key::KEY_7),
    ("8", Key::KEY_8),
    ("9", Key::KEY_9),
    ("0", Key::KEY_0),
    ("SHIFT", Key::LEFT_SHIFT),
    ("CTRL", Key::LEFT_CTRL),
    ("ALT", Key::LEFT_ALT),
    ("META", Key::LEFT_META),
    ("CAPS", Key::CAPSLOCK),
    ("PRINT", Key::SYSRQ),
    ("PGUP", Key::PAGE_UP),
    ("PGDN", Key::PAGE_DOWN),
    ("MENU", Key::COMPOSE),
];

impl Key {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the name of this key
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    KEY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or("UNKNOWN")
}

/// Try to parse a key name to a key code.
///
/// Matching is case-insensitive and tolerates a `KEY_` prefix, so `a`,
/// `A` and `KEY_A` all resolve to the same key.
pub fn key_from_name(name: &str) -> Option<Key> {
    let upper = name.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }

    let lookup = |candidate: &str| {
        KEY_NAMES
            .iter()
            .find(|(_, n)| *n == candidate)
            .map(|(code, _)| Key(*code))
            .or_else(|| {
                KEY_ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == candidate)
                    .map(|(_, key)| *key)
            })
    };

    lookup(&upper).or_else(|| upper.strip_prefix("KEY_").and_then(lookup))
}
