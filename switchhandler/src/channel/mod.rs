//! Channel layer: prompt detection on the interactive shell.
//!
//! Output is ANSI-stripped into a [`PatternBuffer`] and reads complete when
//! the device prompt shows up at the end of it.

mod buffer;
mod pty;

pub use buffer::PatternBuffer;
pub use pty::PtyChannel;
