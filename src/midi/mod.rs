//! Virtual MIDI keyboard: computer keys and mouse presses to note messages.

pub mod keyboard;
