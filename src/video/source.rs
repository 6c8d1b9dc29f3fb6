use std::path::{Path, PathBuf};

use crate::foundation::core::Canvas;
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::image::buffer::PixelBuffer;

/// Decoder for one input frame sequence.
///
/// The driver decodes at most one frame per input before rendering an output frame, and never
/// holds a frame across calls except where an effect keeps a history window.
pub trait FrameSource {
    /// Number of frames in the sequence.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pixel dimensions every decoded frame has.
    fn dimensions(&self) -> Canvas;

    /// Decode frame `index`. Failures are reported as [`MediaLabError::Decode`].
    fn decode(&mut self, index: u64) -> MediaLabResult<PixelBuffer>;
}

/// Frames already held in memory.
#[derive(Clone, Debug)]
pub struct InMemoryFrames {
    canvas: Canvas,
    frames: Vec<PixelBuffer>,
}

impl InMemoryFrames {
    pub fn new(canvas: Canvas, frames: Vec<PixelBuffer>) -> MediaLabResult<Self> {
        for (i, f) in frames.iter().enumerate() {
            if f.canvas() != canvas {
                return Err(MediaLabError::validation(format!(
                    "frame {i} is {}x{}, expected {}x{}",
                    f.width(),
                    f.height(),
                    canvas.width,
                    canvas.height
                )));
            }
        }
        Ok(Self { canvas, frames })
    }

    /// Take the canvas from the first frame.
    pub fn from_frames(frames: Vec<PixelBuffer>) -> MediaLabResult<Self> {
        let canvas = frames
            .first()
            .map(PixelBuffer::canvas)
            .ok_or_else(|| MediaLabError::validation("frame sequence must not be empty"))?;
        Self::new(canvas, frames)
    }

    pub fn frames(&self) -> &[PixelBuffer] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<PixelBuffer> {
        self.frames
    }
}

impl FrameSource for InMemoryFrames {
    fn len(&self) -> u64 {
        self.frames.len() as u64
    }

    fn dimensions(&self) -> Canvas {
        self.canvas
    }

    fn decode(&mut self, index: u64) -> MediaLabResult<PixelBuffer> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.frames.get(i))
            .cloned()
            .ok_or_else(|| MediaLabError::decode(index, "frame index out of range"))
    }
}

/// A directory of still images decoded on demand, ordered by file name.
#[derive(Clone, Debug)]
pub struct ImageDirSource {
    canvas: Canvas,
    paths: Vec<PathBuf>,
}

impl ImageDirSource {
    /// List `*.png`, `*.jpg` and `*.jpeg` files in `dir`. The first image fixes the canvas.
    pub fn open(dir: &Path) -> MediaLabResult<Self> {
        let list_err = |e: std::io::Error| {
            MediaLabError::validation(format!(
                "failed to read frame directory '{}': {e}",
                dir.display()
            ))
        };
        let entries = std::fs::read_dir(dir).map_err(list_err)?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(list_err)?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                .unwrap_or(false);
            if is_image {
                paths.push(path);
            }
        }
        paths.sort();

        let first = paths.first().ok_or_else(|| {
            MediaLabError::validation(format!("no image frames found in '{}'", dir.display()))
        })?;
        let (width, height) = ::image::image_dimensions(first)
            .map_err(|e| MediaLabError::decode(0, format!("'{}': {e}", first.display())))?;

        Ok(Self {
            canvas: Canvas { width, height },
            paths,
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSource for ImageDirSource {
    fn len(&self) -> u64 {
        self.paths.len() as u64
    }

    fn dimensions(&self) -> Canvas {
        self.canvas
    }

    fn decode(&mut self, index: u64) -> MediaLabResult<PixelBuffer> {
        let path = usize::try_from(index)
            .ok()
            .and_then(|i| self.paths.get(i))
            .ok_or_else(|| MediaLabError::decode(index, "frame index out of range"))?;
        let img = ::image::open(path)
            .map_err(|e| MediaLabError::decode(index, format!("'{}': {e}", path.display())))?
            .into_rgba8();
        Ok(PixelBuffer::from(img))
    }
}
