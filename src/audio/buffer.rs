use std::path::Path;

use crate::foundation::error::{MediaLabError, MediaLabResult};

/// Sample rate used by the generators and post-processors unless a caller picks another.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// One channel of floating-point audio samples.
///
/// Samples have no fixed range. Time-based effects use `t = index / sample_rate`.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channel: u16,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channel: u16) -> MediaLabResult<Self> {
        if sample_rate == 0 {
            return Err(MediaLabError::validation("sample rate must be > 0"));
        }
        Ok(Self {
            samples,
            sample_rate,
            channel,
        })
    }

    pub fn silent(len: usize, sample_rate: u32, channel: u16) -> MediaLabResult<Self> {
        Self::new(vec![0.0; len], sample_rate, channel)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel(&self) -> u16 {
        self.channel
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time in seconds of sample `index`.
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / f64::from(self.sample_rate)
    }

    pub fn duration_secs(&self) -> f64 {
        self.time_at(self.samples.len())
    }

    /// Largest absolute sample value; `0.0` for an empty buffer.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }
}

/// Interleave channels into one frame-major vector (`L R L R ...` for stereo).
///
/// All channels must share length and sample rate.
pub fn interleave(channels: &[SampleBuffer]) -> MediaLabResult<Vec<f32>> {
    let Some(first) = channels.first() else {
        return Ok(Vec::new());
    };
    for ch in channels {
        if ch.len() != first.len() || ch.sample_rate != first.sample_rate {
            return Err(MediaLabError::validation(format!(
                "channel {} does not match channel {} in length or sample rate",
                ch.channel, first.channel
            )));
        }
    }

    let mut out = Vec::with_capacity(first.len() * channels.len());
    for i in 0..first.len() {
        out.extend(channels.iter().map(|ch| ch.samples[i]));
    }
    Ok(out)
}

/// Write interleaved samples as raw little-endian `f32` PCM, creating parent directories.
pub fn write_samples_f32le(samples_interleaved: &[f32], out_path: &Path) -> MediaLabResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            MediaLabError::evaluation(format!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        MediaLabError::evaluation(format!(
            "failed to write audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/buffer.rs"]
mod tests;
