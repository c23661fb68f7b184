// Keynorm Input Layer - Device Filtering
// Which devices to open: explicit names/paths, or autodetected keyboards

/// Facts about a candidate device needed to decide whether to open it
#[derive(Debug, Clone, Copy)]
pub struct DeviceFilter<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub is_keyboard: bool,
    pub is_virtual: bool,
}

/// Check if a device should be opened.
///
/// With a non-empty `filter_names`, only devices whose path or name matches
/// exactly are used, virtual or not. Otherwise every non-virtual keyboard
/// is used.
pub fn matches_device_filter(device: &DeviceFilter<'_>, filter_names: &[String]) -> bool {
    if !filter_names.is_empty() {
        return filter_names
            .iter()
            .any(|wanted| device.path == wanted || device.name == wanted);
    }

    !device.is_virtual && device.is_keyboard
}
