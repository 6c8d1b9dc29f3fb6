//! Post-processing over the channels of a generated signal.
//!
//! Effects run channel by channel in place. Boost is the one effect that looks across channels,
//! so that every channel is scaled by the same multiplier.

use std::f64::consts::PI;

use crate::audio::buffer::SampleBuffer;
use crate::audio::envelope::{Adsr, AdsrSecs};
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::params::{ParamSource, number_or};

pub fn reverse(buf: &mut SampleBuffer) {
    buf.samples_mut().reverse();
}

/// Normalize so that the global peak across `channels` becomes `1.0`.
///
/// Returns the multiplier that was applied. Silent (or non-finite) input is left unchanged and
/// reports a multiplier of `1.0`.
pub fn boost(channels: &mut [SampleBuffer]) -> f64 {
    let peak = channels.iter().fold(0.0f32, |m, ch| m.max(ch.peak()));
    if peak == 0.0 || !peak.is_finite() {
        tracing::warn!(peak, "boost peak is degenerate; leaving samples unchanged");
        return 1.0;
    }
    let multiplier = 1.0 / f64::from(peak);
    for ch in channels {
        for s in ch.samples_mut() {
            *s = (f64::from(*s) * multiplier) as f32;
        }
    }
    multiplier
}

pub fn adsr(buf: &mut SampleBuffer, env: &Adsr) {
    let len = buf.len();
    for (i, s) in buf.samples_mut().iter_mut().enumerate() {
        *s = (f64::from(*s) * env.multiplier(i, len)) as f32;
    }
}

/// Amplitude modulation by a raised sine starting at its trough.
pub fn tremolo(buf: &mut SampleBuffer, frequency: f64, wetness: f64) {
    let sr = f64::from(buf.sample_rate());
    for (i, s) in buf.samples_mut().iter_mut().enumerate() {
        let t = i as f64 / sr;
        let lfo = ((2.0 * PI * frequency * t - PI / 2.0).sin() + 1.0) / 2.0;
        let multiplier = lfo * wetness + (1.0 - wetness);
        *s = (f64::from(*s) * multiplier) as f32;
    }
}

/// Longest echo delay accepted when parsing a pass.
pub const MAX_ECHO_DELAY_SECS: f64 = 3600.0;

/// Feedback echo through a circular delay line of `delay_secs * sample_rate` samples.
///
/// A line at least as long as the buffer never feeds back, so that case leaves `buf` untouched.
pub fn echo(buf: &mut SampleBuffer, delay_secs: f64, multiplier: f64) -> MediaLabResult<()> {
    let size = (delay_secs * f64::from(buf.sample_rate())).round();
    if !size.is_finite() || size < 1.0 {
        return Err(MediaLabError::validation(format!(
            "echo delay of {delay_secs}s is shorter than one sample"
        )));
    }
    if size >= buf.len() as f64 {
        return Ok(());
    }
    let mut delay_line = vec![0.0f32; size as usize];
    let size = delay_line.len();
    for (i, s) in buf.samples_mut().iter_mut().enumerate() {
        let slot = &mut delay_line[i % size];
        *s = (f64::from(*s) + f64::from(*slot) * multiplier) as f32;
        *slot = *s;
    }
    Ok(())
}

/// A post-processing step with its parameters captured.
#[derive(Clone, Debug, PartialEq)]
pub enum PostEffect {
    None,
    Reverse,
    Boost,
    Adsr(AdsrSecs),
    Tremolo { frequency: f64, wetness: f64 },
    Echo { delay_secs: f64, multiplier: f64 },
}

impl PostEffect {
    pub fn parse(name: &str, params: &dyn ParamSource) -> MediaLabResult<Self> {
        let kind = name.trim().to_ascii_lowercase();
        match kind.as_str() {
            "" | "no-pp" | "none" => Ok(Self::None),
            "reverse" => Ok(Self::Reverse),
            "boost" => Ok(Self::Boost),
            "adsr" => Ok(Self::Adsr(AdsrSecs::from_params(params, "")?)),
            "tremolo" => {
                let frequency = number_or(params, "frequency", 5.0)?;
                let wetness = number_or(params, "wetness", 0.5)?;
                if frequency < 0.0 {
                    return Err(MediaLabError::validation("tremolo.frequency must be >= 0"));
                }
                if !(0.0..=1.0).contains(&wetness) {
                    return Err(MediaLabError::validation(
                        "tremolo.wetness must be within [0, 1]",
                    ));
                }
                Ok(Self::Tremolo { frequency, wetness })
            }
            "echo" => {
                let delay_secs = number_or(params, "delay_secs", 0.5)?;
                let multiplier = number_or(params, "multiplier", 0.5)?;
                if delay_secs <= 0.0 || delay_secs > MAX_ECHO_DELAY_SECS {
                    return Err(MediaLabError::validation(format!(
                        "echo.delay_secs must be within (0, {MAX_ECHO_DELAY_SECS}], \
                         got {delay_secs}"
                    )));
                }
                Ok(Self::Echo {
                    delay_secs,
                    multiplier,
                })
            }
            _ => Err(MediaLabError::validation(format!(
                "unknown post-processing effect '{kind}'"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "no-pp",
            Self::Reverse => "reverse",
            Self::Boost => "boost",
            Self::Adsr(_) => "adsr",
            Self::Tremolo { .. } => "tremolo",
            Self::Echo { .. } => "echo",
        }
    }

    /// Apply to every channel.
    pub fn apply(&self, channels: &mut [SampleBuffer]) -> MediaLabResult<()> {
        match *self {
            Self::None => {}
            Self::Reverse => channels.iter_mut().for_each(reverse),
            Self::Boost => {
                boost(channels);
            }
            Self::Adsr(secs) => {
                for ch in channels {
                    let env = secs.to_samples(ch.sample_rate())?;
                    adsr(ch, &env);
                }
            }
            Self::Tremolo { frequency, wetness } => {
                for ch in channels {
                    tremolo(ch, frequency, wetness);
                }
            }
            Self::Echo {
                delay_secs,
                multiplier,
            } => {
                for ch in channels {
                    echo(ch, delay_secs, multiplier)?;
                }
            }
        }
        Ok(())
    }
}

/// Parse a chain of passes from a JSON array of objects, each naming its `effect`.
///
/// Parameters for a pass sit next to its `effect` key.
pub fn parse_post_chain(value: &serde_json::Value) -> MediaLabResult<Vec<PostEffect>> {
    let passes = value
        .as_array()
        .ok_or_else(|| MediaLabError::validation("post-processing chain must be a JSON array"))?;
    passes
        .iter()
        .map(|pass| {
            let name = pass.text("effect").ok_or_else(|| {
                MediaLabError::validation("each post-processing pass needs an 'effect' name")
            })?;
            PostEffect::parse(&name, pass)
        })
        .collect()
}

/// Run `passes` in order over `channels`.
#[tracing::instrument(skip_all, fields(passes = passes.len(), channels = channels.len()))]
pub fn apply_passes(channels: &mut [SampleBuffer], passes: &[PostEffect]) -> MediaLabResult<()> {
    for (i, pass) in passes.iter().enumerate() {
        tracing::debug!(pass = i, effect = pass.name(), "post-processing pass");
        pass.apply(channels)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/post.rs"]
mod tests;
