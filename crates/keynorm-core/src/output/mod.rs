// Keynorm Output Layer
// Virtual keyboard that receives normalized events

#[cfg(feature = "pure-rust")]
mod uinput;

#[cfg(feature = "pure-rust")]
pub use uinput::{UInputError, VirtualKeyboard};
