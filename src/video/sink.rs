use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::image::buffer::PixelBuffer;

/// Configuration provided to a [`FrameSink`] before the finished sequence is handed over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub frame_count: u64,
}

/// Artifact assembler for a completed run.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, exactly
/// `frame_count` times, between one `begin` and one `end`. A cancelled or failed run never
/// calls `begin`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MediaLabResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &PixelBuffer) -> MediaLabResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> MediaLabResult<()>;
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, PixelBuffer)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, PixelBuffer)] {
        &self.frames
    }

    /// Whether `end` was called after the last `begin`.
    pub fn is_complete(&self) -> bool {
        self.ended
    }

    /// Take the captured frames, dropping their indices.
    pub fn into_frames(self) -> Vec<PixelBuffer> {
        self.frames.into_iter().map(|(_, f)| f).collect()
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MediaLabResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &PixelBuffer) -> MediaLabResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> MediaLabResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes each frame as `frame_000000.png` into a directory.
#[derive(Debug, Clone)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written since the last `begin`.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> MediaLabResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            MediaLabError::evaluation(format!(
                "failed to create output directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &PixelBuffer) -> MediaLabResult<()> {
        let path = self.dir.join(format!("frame_{:06}.png", idx.0));
        let img = ::image::RgbaImage::try_from(frame.clone())?;
        img.save(&path).map_err(|e| {
            MediaLabError::evaluation(format!("failed to write '{}': {e}", path.display()))
        })?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> MediaLabResult<()> {
        Ok(())
    }
}
