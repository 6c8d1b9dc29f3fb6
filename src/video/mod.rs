//! Frame-sequence effects and the sequential driver that applies them.
//!
//! Inputs come from [`source::FrameSource`] implementations, effects are described by
//! [`effect::FrameEffect`], and finished sequences go to a [`sink::FrameSink`].

pub mod chroma;
pub mod driver;
pub mod effect;
pub mod sink;
pub mod source;
