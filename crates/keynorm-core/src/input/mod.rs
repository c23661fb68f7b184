// Keynorm Input Layer
// Keyboard detection and device selection, independent of evdev

mod device;
mod filter;

pub use device::{is_keyboard, is_virtual_device, DeviceCapabilities, VIRTUAL_DEVICE_NAME};
pub use filter::{matches_device_filter, DeviceFilter};
