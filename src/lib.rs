//! medialab is a set of buffer transforms for teaching-style media labs.
//!
//! Every transform takes a buffer (pixels or samples), applies a parameterized operation and
//! produces a buffer of the same shape. Video effects are applied frame by frame through a
//! sequential, cancellable, progress-reporting driver.
//!
//! # Overview
//!
//! - [`image`]: RGBA8 [`PixelBuffer`] filters (point ops, histogram stretch, blur, dithering,
//!   edge detection, comic coloring), selected by name through [`parse_filter`].
//! - [`audio`]: mono [`SampleBuffer`] generators ([`Synth`]) and post-processing ([`PostEffect`]).
//! - [`video`]: [`FrameEffect`]s over [`FrameSource`] sequences, applied by a
//!   [`SequentialDriver`] into a [`FrameSink`].
//! - [`midi`]: a two-octave virtual keyboard behind the [`MidiOut`] trait.
//!
//! Parameters are read once through [`ParamSource`] (implemented for JSON objects) and captured
//! into typed values, so nothing re-reads configuration mid-run.
#![forbid(unsafe_code)]

mod foundation;

pub mod audio;
pub mod image;
pub mod midi;
pub mod params;
pub mod video;

pub use audio::buffer::{DEFAULT_SAMPLE_RATE, SampleBuffer, interleave, write_samples_f32le};
pub use audio::envelope::{Adsr, AdsrSecs};
pub use audio::post::{PostEffect, apply_passes, parse_post_chain};
pub use audio::synth::{FmParams, KarplusBase, KarplusDelay, Synth, Waveform};
pub use foundation::core::{BorderMode, Canvas, Fps, FrameIndex, Rgba8};
pub use foundation::error::{MediaLabError, MediaLabResult};
pub use crate::image::buffer::PixelBuffer;
pub use crate::image::{ImageFilter, apply_filter, parse_filter};
pub use midi::keyboard::{MidiEvent, MidiOut, MidiRecorder, PlayMode, VirtualKeyboard};
pub use params::{ParamSource, parse_params};
pub use video::driver::{
    CancelToken, NoProgress, ProgressSink, Run, RunOutcome, RunState, SequentialDriver, Step,
};
pub use video::effect::{ChromaMethod, FrameEffect, PreparedEffect};
pub use video::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use video::source::{FrameSource, ImageDirSource, InMemoryFrames};
