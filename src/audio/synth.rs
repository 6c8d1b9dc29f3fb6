use std::f64::consts::PI;

use crate::audio::buffer::SampleBuffer;
use crate::audio::envelope::{Adsr, AdsrSecs};
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::params::{ParamSource, count_or, number_or, text_or};

/// How many harmonics the customized additive generator exposes.
pub const CUSTOM_HARMONICS: usize = 10;

/// Initial content of the Karplus-Strong delay line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KarplusBase {
    WhiteNoise,
    Sawtooth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KarplusDelay {
    /// Explicit delay in samples.
    Samples(u32),
    /// `floor(sample_rate / frequency)`.
    FromFrequency,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FmParams {
    pub carrier_frequency: f64,
    pub carrier_amplitude: f64,
    pub modulation_frequency: f64,
    pub modulation_amplitude: f64,
    /// Envelope applied to the modulation amplitude only.
    pub adsr: Option<AdsrSecs>,
    /// Treat both frequencies as multipliers of the base frequency.
    pub frequency_ratio: bool,
}

/// Waveform families the generator can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum Waveform {
    SineTime,
    SquareTime,
    SquareAdditive,
    SawtoothTime,
    SawtoothAdditive,
    TriangleAdditive,
    CustomAdditive { weights: [f64; CUSTOM_HARMONICS] },
    WhiteNoise,
    KarplusStrong {
        base: KarplusBase,
        /// Probability that the averaged sample keeps its sign.
        b: f64,
        delay: KarplusDelay,
    },
    Fm(FmParams),
    RepeatingNarrowPulse,
}

impl Waveform {
    /// Parse a generator name (`sine-time`, `karplus-strong`, ...) with its extra parameters.
    pub fn parse(name: &str, params: &dyn ParamSource) -> MediaLabResult<Self> {
        let kind = name.trim().to_ascii_lowercase().replace('_', "-");
        match kind.as_str() {
            "sine-time" | "sine" => Ok(Self::SineTime),
            "square-time" => Ok(Self::SquareTime),
            "square-additive" => Ok(Self::SquareAdditive),
            "sawtooth-time" => Ok(Self::SawtoothTime),
            "sawtooth-additive" => Ok(Self::SawtoothAdditive),
            "triangle-additive" => Ok(Self::TriangleAdditive),
            "customized-additive-synthesis" | "custom-additive" => {
                let mut weights = [0.0; CUSTOM_HARMONICS];
                for (k, w) in weights.iter_mut().enumerate() {
                    // Only the fundamental is on unless asked otherwise.
                    let default = if k == 0 { 1.0 } else { 0.0 };
                    *w = number_or(params, &format!("harmonic_{}", k + 1), default)?;
                }
                Ok(Self::CustomAdditive { weights })
            }
            "white-noise" | "noise" => Ok(Self::WhiteNoise),
            "karplus-strong" => {
                let base = match text_or(params, "base", "white-noise").as_str() {
                    "white-noise" | "white_noise" | "noise" => KarplusBase::WhiteNoise,
                    "sawtooth" => KarplusBase::Sawtooth,
                    other => {
                        return Err(MediaLabError::validation(format!(
                            "unknown karplus-strong base '{other}'"
                        )));
                    }
                };
                let b = number_or(params, "b", 1.0)?;
                if !(0.0..=1.0).contains(&b) {
                    return Err(MediaLabError::validation(
                        "karplus-strong b must be within [0, 1]",
                    ));
                }
                let delay = if params.flag("use_freq").unwrap_or(false) {
                    KarplusDelay::FromFrequency
                } else {
                    let p = count_or(params, "p", 100)?;
                    if p == 0 {
                        return Err(MediaLabError::validation("karplus-strong p must be >= 1"));
                    }
                    KarplusDelay::Samples(p)
                };
                Ok(Self::KarplusStrong { base, b, delay })
            }
            "fm" => {
                let adsr = if params.flag("use_adsr").unwrap_or(false) {
                    Some(AdsrSecs::from_params(params, "adsr_")?)
                } else {
                    None
                };
                Ok(Self::Fm(FmParams {
                    carrier_frequency: number_or(params, "carrier_frequency", 440.0)?,
                    carrier_amplitude: number_or(params, "carrier_amplitude", 1.0)?,
                    modulation_frequency: number_or(params, "modulation_frequency", 110.0)?,
                    modulation_amplitude: number_or(params, "modulation_amplitude", 1.0)?,
                    adsr,
                    frequency_ratio: params.flag("use_freq_multiplier").unwrap_or(false),
                }))
            }
            "repeating-narrow-pulse" | "pulse" => Ok(Self::RepeatingNarrowPulse),
            _ => Err(MediaLabError::validation(format!(
                "unknown waveform '{kind}'"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SineTime => "sine-time",
            Self::SquareTime => "square-time",
            Self::SquareAdditive => "square-additive",
            Self::SawtoothTime => "sawtooth-time",
            Self::SawtoothAdditive => "sawtooth-additive",
            Self::TriangleAdditive => "triangle-additive",
            Self::CustomAdditive { .. } => "customized-additive-synthesis",
            Self::WhiteNoise => "white-noise",
            Self::KarplusStrong { .. } => "karplus-strong",
            Self::Fm(_) => "fm",
            Self::RepeatingNarrowPulse => "repeating-narrow-pulse",
        }
    }
}

/// Waveform generator bound to a sample rate and a random source.
#[derive(Debug)]
pub struct Synth {
    sample_rate: u32,
    rng: fastrand::Rng,
}

impl Synth {
    pub fn new(sample_rate: u32) -> MediaLabResult<Self> {
        Self::build(sample_rate, fastrand::Rng::new())
    }

    /// Reproducible noise, Karplus-Strong seeds and jitter.
    pub fn with_seed(sample_rate: u32, seed: u64) -> MediaLabResult<Self> {
        Self::build(sample_rate, fastrand::Rng::with_seed(seed))
    }

    fn build(sample_rate: u32, rng: fastrand::Rng) -> MediaLabResult<Self> {
        if sample_rate == 0 {
            return Err(MediaLabError::validation("sample rate must be > 0"));
        }
        Ok(Self { sample_rate, rng })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// `floor(sample_rate * duration)`.
    pub fn total_samples(&self, duration_secs: f64) -> MediaLabResult<usize> {
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(MediaLabError::validation(format!(
                "duration must be finite and >= 0, got {duration_secs}"
            )));
        }
        Ok((f64::from(self.sample_rate) * duration_secs).floor() as usize)
    }

    /// Generate a single-channel signal of `floor(sample_rate * duration)` samples.
    #[tracing::instrument(
        skip(self, waveform),
        fields(waveform = waveform.name(), sample_rate = self.sample_rate)
    )]
    pub fn generate(
        &mut self,
        waveform: &Waveform,
        frequency: f64,
        amp: f64,
        duration_secs: f64,
    ) -> MediaLabResult<SampleBuffer> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(MediaLabError::validation(format!(
                "frequency must be finite and > 0, got {frequency}"
            )));
        }
        if !amp.is_finite() {
            return Err(MediaLabError::validation("amplitude must be finite"));
        }
        let total = self.total_samples(duration_secs)?;
        let sr = f64::from(self.sample_rate);
        let nyquist = sr / 2.0;
        let time = |i: usize| i as f64 / sr;

        let samples: Vec<f64> = match waveform {
            Waveform::SineTime => (0..total)
                .map(|i| amp * (2.0 * PI * frequency * time(i)).sin())
                .collect(),
            Waveform::SquareTime => {
                let cycle = sr / frequency;
                let period = whole_cycle(cycle, frequency)?;
                (0..total)
                    .map(|i| {
                        if ((i % period) as f64) < cycle / 2.0 {
                            amp
                        } else {
                            -amp
                        }
                    })
                    .collect()
            }
            Waveform::SawtoothTime => {
                let cycle = sr / frequency;
                let period = whole_cycle(cycle, frequency)?;
                (0..total)
                    .map(|i| sawtooth(amp, (i % period) as f64 / cycle))
                    .collect()
            }
            Waveform::SquareAdditive => (0..total)
                .map(|i| {
                    harmonics(frequency, nyquist, 2, |k| {
                        (amp / k) * phase(k, frequency, time(i)).sin()
                    })
                })
                .collect(),
            Waveform::SawtoothAdditive => (0..total)
                .map(|i| {
                    harmonics(frequency, nyquist, 1, |k| {
                        (amp / k) * phase(k, frequency, time(i)).sin()
                    })
                })
                .collect(),
            Waveform::TriangleAdditive => (0..total)
                .map(|i| {
                    harmonics(frequency, nyquist, 2, |k| {
                        (amp / (k * k)) * phase(k, frequency, time(i)).cos()
                    })
                })
                .collect(),
            Waveform::CustomAdditive { weights } => (0..total)
                .map(|i| {
                    let t = time(i);
                    weights
                        .iter()
                        .enumerate()
                        .map(|(idx, w)| ((idx + 1) as f64, w))
                        .take_while(|(k, _)| k * frequency < nyquist)
                        .map(|(k, w)| amp * w * phase(k, frequency, t).sin())
                        .sum::<f64>()
                })
                .collect(),
            Waveform::WhiteNoise => (0..total)
                .map(|_| (self.rng.f64() * 2.0 - 1.0) * amp)
                .collect(),
            Waveform::KarplusStrong { base, b, delay } => {
                let delay = match *delay {
                    KarplusDelay::Samples(0) => {
                        return Err(MediaLabError::validation("karplus-strong delay must be >= 1"));
                    }
                    KarplusDelay::Samples(p) => p as usize,
                    KarplusDelay::FromFrequency => whole_cycle(sr / frequency, frequency)?,
                };
                self.karplus_strong(total, amp, *base, *b, delay)
            }
            Waveform::Fm(fm) => self.fm(total, frequency, amp, fm)?,
            Waveform::RepeatingNarrowPulse => {
                let cycle = whole_cycle(sr / frequency, frequency)?;
                (0..total)
                    .map(|i| match i % cycle {
                        0 => amp,
                        1 => -amp,
                        _ => 0.0,
                    })
                    .collect()
            }
        };

        tracing::debug!(samples = samples.len(), "waveform generated");
        SampleBuffer::new(
            samples.into_iter().map(|s| s as f32).collect(),
            self.sample_rate,
            0,
        )
    }

    fn karplus_strong(
        &mut self,
        total: usize,
        amp: f64,
        base: KarplusBase,
        b: f64,
        delay: usize,
    ) -> Vec<f64> {
        let mut out = Vec::<f64>::with_capacity(total);
        for i in 0..total {
            let v = if i <= delay {
                match base {
                    KarplusBase::WhiteNoise => amp * (2.0 * self.rng.f64() - 1.0),
                    KarplusBase::Sawtooth => sawtooth(amp, (i % delay) as f64 / delay as f64),
                }
            } else {
                let avg = 0.5 * (out[i - delay] + out[i - delay - 1]);
                if self.rng.f64() <= b { avg } else { -avg }
            };
            out.push(v);
        }
        out
    }

    fn fm(
        &self,
        total: usize,
        frequency: f64,
        amp: f64,
        fm: &FmParams,
    ) -> MediaLabResult<Vec<f64>> {
        let (carrier, modulation) = if fm.frequency_ratio {
            (fm.carrier_frequency * frequency, fm.modulation_frequency * frequency)
        } else {
            (fm.carrier_frequency, fm.modulation_frequency)
        };
        let env: Option<Adsr> = fm
            .adsr
            .map(|secs| secs.to_samples(self.sample_rate))
            .transpose()?;
        let sr = f64::from(self.sample_rate);

        Ok((0..total)
            .map(|i| {
                let t = i as f64 / sr;
                let am = match &env {
                    Some(env) => fm.modulation_amplitude * env.multiplier(i, total),
                    None => fm.modulation_amplitude,
                };
                let modulator = am * (2.0 * PI * modulation * t).sin();
                amp * fm.carrier_amplitude * (2.0 * PI * carrier * t + modulator).sin()
            })
            .collect())
    }
}

fn phase(k: f64, frequency: f64, t: f64) -> f64 {
    2.0 * PI * k * frequency * t
}

/// Sum `term(k)` for `k = 1, 1 + step, ...` while `k * frequency` stays below Nyquist.
fn harmonics(frequency: f64, nyquist: f64, step: usize, term: impl Fn(f64) -> f64) -> f64 {
    (1..)
        .step_by(step)
        .map(|k: u32| f64::from(k))
        .take_while(|k| k * frequency < nyquist)
        .map(term)
        .sum()
}

/// Falling ramp from `amp` to `-amp` over one cycle.
fn sawtooth(amp: f64, fraction: f64) -> f64 {
    2.0 * (amp - amp * fraction) - amp
}

/// Integer cycle length in samples; at least one.
fn whole_cycle(cycle: f64, frequency: f64) -> MediaLabResult<usize> {
    let whole = cycle.floor();
    if !whole.is_finite() || whole < 1.0 {
        return Err(MediaLabError::validation(format!(
            "frequency {frequency} Hz is above the sample rate"
        )));
    }
    Ok(whole as usize)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/synth.rs"]
mod tests;
