//! Sequential, cancellable, progress-reporting application of a [`FrameEffect`].
//!
//! A [`Run`] renders one output frame per [`Run::step`]: it checks the cancel token, decodes the
//! input frames the effect asks for, renders, stores the result and reports progress. Hosts that
//! drive their own event loop call `step` between other work; [`SequentialDriver::apply`] simply
//! loops it to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::image::buffer::PixelBuffer;
use crate::video::effect::{DecodedFrames, FrameEffect, PreparedEffect};
use crate::video::sink::{FrameSink, SinkConfig};
use crate::video::source::FrameSource;

/// Receives percentage-complete updates in `[0, 100]`.
pub trait ProgressSink {
    fn report(&mut self, percent: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

/// Discards progress updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: f64) {}
}

/// Cooperative cancellation flag shared between a run and whoever wants to stop it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the active run to stop before its next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Read and clear the flag.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Position of a run within its output sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunState {
    /// Next output index to render.
    pub current_index: u64,
    /// Output frames rendered so far.
    pub completed_count: u64,
    pub cancelled: bool,
}

/// Result of one [`Run::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// A frame was rendered and more remain.
    Progress { completed: u64, total: u64 },
    /// Every output frame is rendered.
    Finished { total: u64 },
    /// The cancel token was observed; partial output is discarded.
    Cancelled { completed: u64 },
}

/// How [`SequentialDriver::apply`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The sink received all frames.
    Completed { frames: u64 },
    /// Stopped on request; the sink was never begun.
    Cancelled { completed: u64 },
}

/// Applies effects over whole sequences, one output frame at a time.
#[derive(Debug)]
pub struct SequentialDriver {
    fps: Fps,
    cancel: CancelToken,
}

impl SequentialDriver {
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            cancel: CancelToken::new(),
        }
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Token that cancels whichever run this driver has in flight.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Prepare `effect` and return a run positioned at frame 0.
    ///
    /// The run borrows the driver, so only one can be in flight. A cancel request left over from
    /// an earlier run is cleared.
    pub fn start<'a>(
        &'a mut self,
        effect: &FrameEffect,
        input1: &'a mut dyn FrameSource,
        input2: Option<&'a mut dyn FrameSource>,
    ) -> MediaLabResult<Run<'a>> {
        let prepared = effect.prepare(self.fps, &*input1, input2.as_deref())?;
        self.cancel.take();
        Ok(Run {
            fps: self.fps,
            cancel: &self.cancel,
            prepared,
            input1,
            input2,
            state: RunState::default(),
            outputs: Vec::new(),
            failed: false,
        })
    }

    /// Run `effect` to completion and hand the finished sequence to `sink`.
    ///
    /// A decode failure aborts the run with [`MediaLabError::Decode`] and the sink is never begun.
    #[tracing::instrument(skip_all, fields(effect = effect.name()))]
    pub fn apply(
        &mut self,
        effect: &FrameEffect,
        input1: &mut dyn FrameSource,
        input2: Option<&mut dyn FrameSource>,
        progress: &mut dyn ProgressSink,
        sink: &mut dyn FrameSink,
    ) -> MediaLabResult<RunOutcome> {
        // Reborrow so the source's trait-object lifetime can shrink to this call.
        let input2 = match input2 {
            Some(source) => Some(&mut *source as &mut dyn FrameSource),
            None => None,
        };
        let mut run = self.start(effect, input1, input2)?;
        loop {
            match run.step(progress)? {
                Step::Progress { .. } => {}
                Step::Finished { total } => {
                    run.assemble(sink)?;
                    tracing::info!(frames = total, "run complete");
                    return Ok(RunOutcome::Completed { frames: total });
                }
                Step::Cancelled { completed } => {
                    tracing::info!(completed, "run cancelled");
                    return Ok(RunOutcome::Cancelled { completed });
                }
            }
        }
    }
}

/// One in-flight application of an effect. Owns its state and partial output.
pub struct Run<'a> {
    fps: Fps,
    cancel: &'a CancelToken,
    prepared: PreparedEffect,
    input1: &'a mut dyn FrameSource,
    input2: Option<&'a mut dyn FrameSource>,
    state: RunState,
    outputs: Vec<PixelBuffer>,
    failed: bool,
}

impl std::fmt::Debug for Run<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Run")
            .field("state", &self.state)
            .field("output_length", &self.prepared.output_length())
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl Run<'_> {
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn output_length(&self) -> u64 {
        self.prepared.output_length()
    }

    pub fn is_finished(&self) -> bool {
        self.state.completed_count == self.prepared.output_length()
    }

    /// Render the next output frame, or observe cancellation.
    pub fn step(&mut self, progress: &mut dyn ProgressSink) -> MediaLabResult<Step> {
        if self.failed {
            return Err(MediaLabError::evaluation("run was aborted by an earlier failure"));
        }
        let total = self.prepared.output_length();
        if self.state.cancelled {
            return Ok(Step::Cancelled {
                completed: self.state.completed_count,
            });
        }
        if self.is_finished() {
            return Ok(Step::Finished { total });
        }
        if self.cancel.take() {
            self.state.cancelled = true;
            self.outputs.clear();
            return Ok(Step::Cancelled {
                completed: self.state.completed_count,
            });
        }

        let idx = self.state.current_index;
        self.state.current_index += 1;
        let frame = match self.render(idx) {
            Ok(frame) => frame,
            Err(e) => {
                self.failed = true;
                self.outputs.clear();
                tracing::warn!(frame = idx, error = %e, "run aborted");
                return Err(e);
            }
        };
        self.outputs.push(frame);
        self.state.completed_count += 1;

        let completed = self.state.completed_count;
        tracing::debug!(frame = idx, completed, total, "frame rendered");
        progress.report(completed as f64 / total as f64 * 100.0);

        if completed == total {
            Ok(Step::Finished { total })
        } else {
            Ok(Step::Progress { completed, total })
        }
    }

    fn render(&mut self, idx: u64) -> MediaLabResult<PixelBuffer> {
        let request = self.prepared.request(idx)?;
        let canvas = self.prepared.canvas();

        let input1 = match request.input1 {
            Some(i) => Some(decode_checked(&mut *self.input1, i, canvas)?),
            None => None,
        };
        let input2 = match (request.input2, self.input2.as_deref_mut()) {
            (Some(i), Some(src)) => Some(decode_checked(src, i, canvas)?),
            (Some(_), None) => {
                return Err(MediaLabError::evaluation(format!(
                    "output frame {idx} needs a second input"
                )));
            }
            (None, _) => None,
        };

        self.prepared
            .render_frame(idx, DecodedFrames { input1, input2 })
    }

    /// Hand the finished sequence to `sink` in index order.
    pub fn assemble(self, sink: &mut dyn FrameSink) -> MediaLabResult<()> {
        if !self.is_finished() || self.failed || self.state.cancelled {
            return Err(MediaLabError::evaluation(
                "only a finished run can be assembled",
            ));
        }
        let canvas = self.prepared.canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
            frame_count: self.outputs.len() as u64,
        })?;
        for (i, frame) in self.outputs.iter().enumerate() {
            sink.push_frame(FrameIndex(i as u64), frame)?;
        }
        sink.end()
    }

    /// Take the finished sequence without a sink.
    pub fn into_frames(self) -> MediaLabResult<Vec<PixelBuffer>> {
        if !self.is_finished() || self.failed || self.state.cancelled {
            return Err(MediaLabError::evaluation(
                "only a finished run yields frames",
            ));
        }
        Ok(self.outputs)
    }
}

fn decode_checked(
    src: &mut dyn FrameSource,
    index: u64,
    canvas: crate::foundation::core::Canvas,
) -> MediaLabResult<PixelBuffer> {
    let frame = src.decode(index)?;
    if frame.canvas() != canvas {
        return Err(MediaLabError::decode(
            index,
            format!(
                "decoded {}x{} frame, expected {}x{}",
                frame.width(),
                frame.height(),
                canvas.width,
                canvas.height
            ),
        ));
    }
    Ok(frame)
}

#[cfg(test)]
#[path = "../../tests/unit/video/driver.rs"]
mod tests;
