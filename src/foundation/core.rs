use crate::foundation::error::{MediaLabError, MediaLabResult};

/// Zero-based position of a frame within a sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> MediaLabResult<Self> {
        if den == 0 {
            return Err(MediaLabError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(MediaLabError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert a duration in seconds to a frame count, rounding to the nearest frame.
    pub fn secs_to_frames_round(self, secs: f64) -> MediaLabResult<u64> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(MediaLabError::validation(format!(
                "duration must be finite and >= 0, got {secs}"
            )));
        }
        Ok((secs * self.as_f64()).round() as u64)
    }
}

/// Pixel dimensions of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Simple-average intensity, truncated.
    pub fn gray(self) -> u8 {
        ((u16::from(self.r) + u16::from(self.g) + u16::from(self.b)) / 3) as u8
    }
}

/// Policy for neighborhood lookups that fall outside a pixel buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// Coordinates are clamped to the nearest edge pixel.
    #[default]
    Clamp,
    /// Coordinates wrap around modulo width/height.
    Wrap,
}

impl BorderMode {
    /// Resolve `v` into `[0, len)`. `len` must be non-zero.
    pub fn resolve(self, v: i64, len: u32) -> u32 {
        let len = i64::from(len);
        match self {
            BorderMode::Clamp => v.clamp(0, len - 1) as u32,
            BorderMode::Wrap => v.rem_euclid(len) as u32,
        }
    }
}
