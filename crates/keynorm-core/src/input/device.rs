// Keynorm Input Layer - Device Detection
// Capability analysis for telling keyboards apart from other input devices

use std::collections::BTreeSet;

use crate::classify::is_known;
use crate::Key;

/// Name of the virtual keyboard we create; never read it back as input
pub const VIRTUAL_DEVICE_NAME: &str = "Keynorm (virtual) Keyboard";

/// Key capabilities of one input device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceCapabilities {
    /// Whether the device reports EV_KEY events at all
    pub has_ev_key: bool,
    pub supported_keys: BTreeSet<Key>,
}

impl DeviceCapabilities {
    pub fn new(has_ev_key: bool, supported_keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            has_ev_key,
            supported_keys: supported_keys.into_iter().collect(),
        }
    }

    pub fn supports_key(&self, key: Key) -> bool {
        self.supported_keys.contains(&key)
    }

    /// Supported keys outside every classification group
    pub fn extra_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.supported_keys.iter().copied().filter(|key| !is_known(*key))
    }

    /// Fold another device's capabilities into this one
    pub fn merge(&mut self, other: &DeviceCapabilities) {
        self.has_ev_key |= other.has_ev_key;
        self.supported_keys.extend(other.supported_keys.iter().copied());
    }
}

const QWERTY: [Key; 6] = [Key::Q, Key::W, Key::E, Key::R, Key::T, Key::Y];
const A_Z_SPACE: [Key; 3] = [Key::SPACE, Key::A, Key::Z];

/// A device is a keyboard when it has EV_KEY, the whole QWERTY row,
/// and A, Z and SPACE.
pub fn is_keyboard(capabilities: &DeviceCapabilities) -> bool {
    capabilities.has_ev_key
        && QWERTY.iter().all(|key| capabilities.supports_key(*key))
        && A_Z_SPACE.iter().all(|key| capabilities.supports_key(*key))
}

/// Check if a device name belongs to a virtual device we created.
pub fn is_virtual_device(name: &str, prefix: &str) -> bool {
    name.contains(prefix)
}
