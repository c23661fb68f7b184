// Keynorm Core Library
// Keyboard event normalization: classification, tap/hold state machine, host loop

pub mod action;
pub mod classify;
pub mod double_tap;
pub mod event;
pub mod extra_keys;
pub mod input;
pub mod key;
pub mod output;
pub mod processor;
pub mod session;
pub mod settings;

pub use action::Action;
pub use classify::{group_of, is_known, is_letter, is_shift, is_shiftable, KeyGroup, FUNCTION_SLOTS};
pub use double_tap::DoubleTapDetector;
pub use event::{merge_chronological, now_seconds, EventKind, OutputEvent, RawKeyEvent};
pub use extra_keys::{build_extra_key_map, ExtraKeyMap};
pub use input::{is_keyboard, is_virtual_device, matches_device_filter, DeviceCapabilities};
pub use key::{key_from_name, key_name, Key};
pub use processor::{
    KeyEventProcessor, ProcessorConfig, ProcessorSnapshot, Timings, LONG_PRESS_ESCAPE_KEY,
    SYNTHETIC_SHIFT,
};
pub use session::{KeySink, KeySource, Session, SessionError, SessionResult, MAX_POLL_INTERVAL};
pub use settings::{Settings, SettingsError};

#[cfg(feature = "pure-rust")]
pub use event::{DeviceInfo, EvdevSource};
#[cfg(feature = "pure-rust")]
pub use output::{UInputError, VirtualKeyboard};
