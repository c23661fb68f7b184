// Keynorm Settings Module
// User-tunable thresholds, key choices and device selection

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::extra_keys::ExtraKeyMap;
use crate::key::key_from_name;
use crate::processor::{ProcessorConfig, Timings};
use crate::session::{DEFAULT_SUSPEND_DOUBLE_TAP, MAX_POLL_INTERVAL};
use crate::Key;

/// Loaded and validated settings.
///
/// Read from a TOML file (default: ~/.config/keynorm/settings.toml):
///
/// ```toml
/// [timing]
/// shift_tap_ms = 300
/// escape_hold_ms = 1000
/// key_long_press_ms = 400
/// double_tap_ms = 400
/// poll_interval_ms = 100
///
/// [keys]
/// caps_lock = "CAPSLOCK"
/// suspend = "PAUSE"
///
/// [devices]
/// only = ["/dev/input/event3"]
/// grab = true
/// extra_keys = true
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub timings: Timings,
    /// Maximum gap between the two taps of the suspend key, in seconds
    pub double_tap: f64,
    pub poll_interval: Duration,
    pub caps_lock_key: Key,
    pub suspend_key: Option<Key>,
    /// Device names or paths to open; empty means autodetect keyboards
    pub devices: Vec<String>,
    pub grab: bool,
    /// Remap extra device keys onto function-key slots
    pub extra_keys: bool,
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),

    #[error("Unknown key name for {field}: {name}")]
    UnknownKey { field: &'static str, name: String },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    #[serde(default)]
    timing: TimingToml,

    #[serde(default)]
    keys: KeysToml,

    #[serde(default)]
    devices: DevicesToml,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TimingToml {
    shift_tap_ms: u64,
    escape_hold_ms: u64,
    key_long_press_ms: u64,
    double_tap_ms: u64,
    poll_interval_ms: u64,
}

impl Default for TimingToml {
    fn default() -> Self {
        Self {
            shift_tap_ms: 300,
            escape_hold_ms: 1000,
            key_long_press_ms: 400,
            double_tap_ms: (DEFAULT_SUSPEND_DOUBLE_TAP * 1000.0) as u64,
            poll_interval_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct KeysToml {
    caps_lock: Option<String>,
    suspend: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DevicesToml {
    only: Vec<String>,
    grab: bool,
    extra_keys: bool,
}

impl Default for DevicesToml {
    fn default() -> Self {
        Self {
            only: Vec::new(),
            grab: true,
            extra_keys: true,
        }
    }
}

impl Settings {
    /// Default settings, as if loaded from an empty file
    pub fn new() -> Self {
        Self {
            timings: Timings::default(),
            double_tap: DEFAULT_SUSPEND_DOUBLE_TAP,
            poll_interval: Duration::from_millis(100),
            caps_lock_key: Key::CAPSLOCK,
            suspend_key: None,
            devices: Vec::new(),
            grab: true,
            extra_keys: true,
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let raw: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let timing = raw.timing;
        let timings = Timings {
            shift_tap: positive_seconds("timing.shift_tap_ms", timing.shift_tap_ms)?,
            escape_hold: positive_seconds("timing.escape_hold_ms", timing.escape_hold_ms)?,
            key_long_press: positive_seconds("timing.key_long_press_ms", timing.key_long_press_ms)?,
        };

        let max_poll = MAX_POLL_INTERVAL.as_millis() as u64;
        if timing.poll_interval_ms == 0 || timing.poll_interval_ms > max_poll {
            return Err(SettingsError::InvalidValue(format!(
                "timing.poll_interval_ms must be between 1 and {}, got {}",
                max_poll, timing.poll_interval_ms
            )));
        }

        let caps_lock_key = match raw.keys.caps_lock {
            Some(name) => resolve_key("keys.caps_lock", &name)?,
            None => Key::CAPSLOCK,
        };
        let suspend_key = raw
            .keys
            .suspend
            .map(|name| resolve_key("keys.suspend", &name))
            .transpose()?;

        Ok(Self {
            timings,
            double_tap: timing.double_tap_ms as f64 / 1000.0,
            poll_interval: Duration::from_millis(timing.poll_interval_ms),
            caps_lock_key,
            suspend_key,
            devices: raw.devices.only,
            grab: raw.devices.grab,
            extra_keys: raw.devices.extra_keys,
            source_path: None,
        })
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keynorm").join("settings.toml"))
    }

    /// Load from default location (~/.config/keynorm/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        log::debug!("no settings file found, using defaults");
        Ok(Self::new())
    }

    /// Load an explicit file, or fall back to the default location
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load_default(),
        }
    }

    /// Path the settings were loaded from, if any
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Processor construction parameters for these settings
    pub fn processor_config(&self, extra_keys: ExtraKeyMap) -> ProcessorConfig {
        ProcessorConfig {
            extra_keys,
            caps_lock_key: self.caps_lock_key,
            timings: self.timings,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

fn positive_seconds(field: &str, ms: u64) -> Result<f64, SettingsError> {
    if ms == 0 {
        return Err(SettingsError::InvalidValue(format!("{} must be greater than 0", field)));
    }
    Ok(ms as f64 / 1000.0)
}

fn resolve_key(field: &'static str, name: &str) -> Result<Key, SettingsError> {
    key_from_name(name).ok_or_else(|| SettingsError::UnknownKey {
        field,
        name: name.to_string(),
    })
}
