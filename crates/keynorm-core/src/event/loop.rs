// Keynorm evdev Input Source
// Reads raw key transitions from hardware keyboards

use std::os::unix::io::AsRawFd;
use std::time::Duration;

use evdev::{Device, EventType};

use super::{merge_chronological, raw_event_from_parts, seconds_since_epoch, RawKeyEvent};
use crate::input::{
    is_keyboard, is_virtual_device, matches_device_filter, DeviceCapabilities, DeviceFilter,
    VIRTUAL_DEVICE_NAME,
};
use crate::session::{KeySource, SessionError, SessionResult};
use crate::Key;

/// Device information for listing devices
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub path: Option<String>,
    pub is_keyboard: bool,
}

/// Hardware keyboards polled together as one source.
///
/// Grabbed devices are released again when the source is dropped, also
/// while unwinding, so a crash never leaves the keyboard dead.
pub struct EvdevSource {
    devices: Vec<Device>,
    names: Vec<String>,
    poll_fds: Vec<libc::pollfd>,
    grabbed: bool,
}

impl EvdevSource {
    /// Open keyboards matching `filter_names` (empty: autodetect), optionally
    /// taking exclusive access.
    pub fn open(filter_names: &[String], grab: bool) -> SessionResult<Self> {
        let (mut devices, names) = find_keyboards(filter_names)?;

        if grab {
            for (device, name) in devices.iter_mut().zip(&names) {
                // A previous instance may have died holding the grab
                let _ = device.ungrab();
                device
                    .grab()
                    .map_err(|e| SessionError::Source(format!("cannot grab {}: {}", name, e)))?;
            }
        }

        for name in &names {
            log::info!("using input device: {}{}", name, if grab { " (grabbed)" } else { "" });
        }

        let poll_fds = devices
            .iter()
            .map(|d| libc::pollfd {
                fd: d.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();

        Ok(Self {
            devices,
            names,
            poll_fds,
            grabbed: grab,
        })
    }

    /// List every input device that reports key events
    pub fn list_devices() -> Vec<DeviceInfo> {
        evdev::enumerate()
            .filter_map(|(path, device)| {
                let caps = device_capabilities(&device);
                caps.has_ev_key.then(|| (path, device, is_keyboard(&caps)))
            })
            .enumerate()
            .map(|(index, (path, device, is_keyboard))| DeviceInfo {
                index,
                name: device.name().unwrap_or("Unknown").to_string(),
                path: path.to_str().map(|s| s.to_string()),
                is_keyboard,
            })
            .collect()
    }

    /// Key capabilities of all opened devices, merged
    pub fn capabilities(&self) -> DeviceCapabilities {
        let mut merged = DeviceCapabilities::default();
        for device in &self.devices {
            merged.merge(&device_capabilities(device));
        }
        merged
    }

    /// Every key code the opened devices can produce
    pub fn available_keys(&self) -> Vec<Key> {
        self.capabilities().supported_keys.into_iter().collect()
    }

    pub fn device_names(&self) -> &[String] {
        &self.names
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    /// Release exclusive access to all devices
    pub fn ungrab_all(&mut self) {
        if self.grabbed {
            for (device, name) in self.devices.iter_mut().zip(&self.names) {
                if let Err(e) = device.ungrab() {
                    log::warn!("failed to ungrab {}: {}", name, e);
                }
            }
            self.grabbed = false;
        }
    }
}

impl KeySource for EvdevSource {
    fn poll(&mut self, timeout: Duration) -> SessionResult<Vec<RawKeyEvent>> {
        let mut runs = Vec::with_capacity(self.devices.len());
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;

        let poll_result = unsafe {
            libc::poll(
                self.poll_fds.as_mut_ptr(),
                self.poll_fds.len() as libc::nfds_t,
                timeout_ms,
            )
        };

        if poll_result < 0 {
            let err = std::io::Error::last_os_error();
            // A delivered signal; the caller checks its running flag
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(SessionError::Io(err));
        }

        if poll_result == 0 {
            return Ok(Vec::new());
        }

        for (i, device) in self.devices.iter_mut().enumerate() {
            let revents = self.poll_fds[i].revents;
            if revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
                return Err(SessionError::Source(format!(
                    "input device {} disconnected",
                    self.names[i]
                )));
            }
            if revents & libc::POLLIN == 0 {
                continue;
            }
            let mut run = Vec::new();
            for event in device.fetch_events()? {
                let timestamp = seconds_since_epoch(event.timestamp());
                // EV_SYN reports and non-transition values such as MSC_SCAN codes are dropped
                if let Some(raw) =
                    raw_event_from_parts(event.event_type().0, event.code(), event.value(), timestamp)
                {
                    run.push(raw);
                }
            }
            runs.push(run);
        }

        // Several keyboards feed one processor: hand it a single timeline
        Ok(merge_chronological(runs))
    }
}

impl Drop for EvdevSource {
    fn drop(&mut self) {
        self.ungrab_all();
    }
}

fn device_capabilities(device: &Device) -> DeviceCapabilities {
    let has_ev_key = device.supported_events().contains(EventType::KEY);
    let keys = device
        .supported_keys()
        .map(|keys| keys.iter().map(|k| Key::from(k.code())).collect::<Vec<_>>())
        .unwrap_or_default();
    DeviceCapabilities::new(has_ev_key, keys)
}

fn find_keyboards(filter_names: &[String]) -> SessionResult<(Vec<Device>, Vec<String>)> {
    let mut devices = Vec::new();
    let mut names = Vec::new();

    for (path, device) in evdev::enumerate() {
        let name = device.name().unwrap_or("Unknown").to_string();
        let candidate = DeviceFilter {
            name: &name,
            path: path.to_str().unwrap_or_default(),
            is_keyboard: is_keyboard(&device_capabilities(&device)),
            is_virtual: is_virtual_device(&name, VIRTUAL_DEVICE_NAME),
        };

        if matches_device_filter(&candidate, filter_names) {
            log::debug!("matched device {} at {}", name, path.display());
            devices.push(device);
            names.push(name);
        }
    }

    if devices.is_empty() {
        let wanted = if filter_names.is_empty() {
            "no keyboard devices found".to_string()
        } else {
            format!("no devices matching {:?}", filter_names)
        };
        return Err(SessionError::Source(wanted));
    }

    Ok((devices, names))
}
