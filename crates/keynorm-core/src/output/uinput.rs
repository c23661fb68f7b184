// Keynorm uinput Output
// Virtual device creation and batch emission

use evdev::uinput::VirtualDeviceBuilder;
use evdev::{AttributeSet, EventType, InputEvent};

use crate::event::OutputEvent;
use crate::input::VIRTUAL_DEVICE_NAME;
use crate::session::{KeySink, SessionError, SessionResult};

/// Highest key code exposed by the virtual keyboard
const MAX_KEY_CODE: u16 = 255;

/// Error types for uinput operations
#[derive(Debug, thiserror::Error)]
pub enum UInputError {
    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("Failed to write event: {0}")]
    WriteError(String),
}

impl From<UInputError> for SessionError {
    fn from(err: UInputError) -> Self {
        SessionError::Sink(err.to_string())
    }
}

/// Virtual uinput keyboard exposing key codes 0..=255
pub struct VirtualKeyboard {
    device: evdev::uinput::VirtualDevice,
}

impl VirtualKeyboard {
    pub fn new() -> Result<Self, UInputError> {
        let mut keys = AttributeSet::new();
        for code in 0..=MAX_KEY_CODE {
            keys.insert(evdev::Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| UInputError::DeviceCreation(e.to_string()))?
            .name(VIRTUAL_DEVICE_NAME)
            .with_keys(&keys)
            .map_err(|e: std::io::Error| UInputError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| UInputError::DeviceCreation(e.to_string()))?;

        log::info!("created virtual keyboard: {}", VIRTUAL_DEVICE_NAME);
        Ok(Self { device })
    }

    /// Write one batch followed by a single SYN_REPORT
    pub fn write_batch(&mut self, events: &[OutputEvent]) -> Result<(), UInputError> {
        if events.is_empty() {
            return Ok(());
        }

        let batch: Vec<InputEvent> = events
            .iter()
            .map(|e| InputEvent::new(EventType(e.kind.type_code()), e.key.code(), e.action.to_i32()))
            .collect();

        // emit() terminates the batch with SYN_REPORT
        self.device
            .emit(&batch)
            .map_err(|e| UInputError::WriteError(e.to_string()))
    }
}

impl KeySink for VirtualKeyboard {
    fn emit(&mut self, events: &[OutputEvent]) -> SessionResult<()> {
        self.write_batch(events)?;
        Ok(())
    }
}
