//! Sample-buffer generators and post-processing.

pub mod buffer;
pub mod envelope;
pub mod post;
pub mod synth;
