use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::params::{ParamSource, number_or};

/// Attack/decay/sustain/release envelope with durations measured in samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adsr {
    pub attack: f64,
    pub decay: f64,
    pub release: f64,
    /// Sustain level in `[0, 1]`.
    pub sustain: f64,
}

impl Adsr {
    pub fn new(attack: f64, decay: f64, release: f64, sustain: f64) -> MediaLabResult<Self> {
        for (name, v) in [("attack", attack), ("decay", decay), ("release", release)] {
            if !v.is_finite() || v < 0.0 {
                return Err(MediaLabError::validation(format!(
                    "adsr {name} duration must be finite and >= 0, got {v}"
                )));
            }
        }
        if !sustain.is_finite() || !(0.0..=1.0).contains(&sustain) {
            return Err(MediaLabError::validation(format!(
                "adsr sustain level must be within [0, 1], got {sustain}"
            )));
        }
        Ok(Self {
            attack,
            decay,
            release,
            sustain,
        })
    }

    /// Multiplier for sample `i` of a `len`-sample signal.
    ///
    /// The release region is the last `release` samples of the signal.
    pub fn multiplier(&self, i: usize, len: usize) -> f64 {
        let i = i as f64;
        let len = len as f64;
        if i < self.attack {
            i / self.attack
        } else if i < self.attack + self.decay {
            let decay_index = i - self.attack;
            1.0 - decay_index / self.decay * (1.0 - self.sustain)
        } else if i < len - self.release {
            self.sustain
        } else {
            let release_index = i - (len - self.release);
            self.sustain * (1.0 - release_index / self.release)
        }
    }
}

/// ADSR as configured in the labs: durations in seconds, sustain as a percentage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdsrSecs {
    pub attack_secs: f64,
    pub decay_secs: f64,
    pub release_secs: f64,
    pub sustain_percent: f64,
}

impl AdsrSecs {
    /// Read `attack_secs`, `decay_secs`, `release_secs` and `sustain_percent`, each optionally
    /// behind `prefix`.
    pub fn from_params(params: &dyn ParamSource, prefix: &str) -> MediaLabResult<Self> {
        let key = |name: &str| format!("{prefix}{name}");
        let adsr = Self {
            attack_secs: number_or(params, &key("attack_secs"), 0.0)?,
            decay_secs: number_or(params, &key("decay_secs"), 0.0)?,
            release_secs: number_or(params, &key("release_secs"), 0.0)?,
            sustain_percent: number_or(params, &key("sustain_percent"), 100.0)?,
        };
        // Fail at parse time rather than on first use.
        adsr.to_samples(1)?;
        Ok(adsr)
    }

    pub fn to_samples(&self, sample_rate: u32) -> MediaLabResult<Adsr> {
        let sr = f64::from(sample_rate);
        Adsr::new(
            self.attack_secs * sr,
            self.decay_secs * sr,
            self.release_secs * sr,
            self.sustain_percent / 100.0,
        )
    }
}
