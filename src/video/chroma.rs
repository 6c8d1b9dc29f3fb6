//! Chroma-key compositing of a foreground frame over a background frame.
//!
//! Output alpha is taken from the background.

use crate::foundation::core::{BorderMode, Rgba8};
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::foundation::math::{clamp_round_u8, mix_u8};
use crate::image::buffer::PixelBuffer;
use crate::image::color::{hue_distance, rgb_to_hsv};

/// Side length of the mask smoothing window.
pub const SMOOTH_KERNEL: u32 = 5;
/// Subtracted from the smoothed mask so that thin fringes fall fully to the background.
pub const SMOOTH_BIAS: f64 = 0.1;

/// Treatment of the boundary between kept and keyed pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChromaEdge {
    #[default]
    Hard,
    Smooth,
}

impl ChromaEdge {
    pub fn parse(s: &str) -> MediaLabResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Self::Hard),
            "smooth" | "soft" => Ok(Self::Smooth),
            other => Err(MediaLabError::validation(format!(
                "unknown chroma-key edge '{other}'"
            ))),
        }
    }
}

/// Keep mask: `1.0` where the foreground is kept, `0.0` where its hue is within `threshold` of
/// the key hue.
pub fn hue_mask(fg: &PixelBuffer, key: Rgba8, threshold: f64) -> Vec<f64> {
    let key_hue = rgb_to_hsv(key.r, key.g, key.b).h;
    fg.data()
        .chunks_exact(4)
        .map(|px| {
            let h = rgb_to_hsv(px[0], px[1], px[2]).h;
            if hue_distance(h, key_hue) <= threshold {
                0.0
            } else {
                1.0
            }
        })
        .collect()
}

/// Box-average `mask` over a `SMOOTH_KERNEL` window with clamped borders, minus [`SMOOTH_BIAS`],
/// floored at zero.
pub fn smooth_mask(mask: &[f64], width: u32, height: u32) -> Vec<f64> {
    let bound = i64::from(SMOOTH_KERNEL / 2);
    let area = f64::from(SMOOTH_KERNEL * SMOOTH_KERNEL);
    let mut out = Vec::with_capacity(mask.len());
    for y in 0..i64::from(height) {
        for x in 0..i64::from(width) {
            let mut acc = 0.0;
            for dy in -bound..=bound {
                for dx in -bound..=bound {
                    let sx = BorderMode::Clamp.resolve(x + dx, width) as usize;
                    let sy = BorderMode::Clamp.resolve(y + dy, height) as usize;
                    acc += mask[sy * width as usize + sx];
                }
            }
            out.push((acc / area - SMOOTH_BIAS).max(0.0));
        }
    }
    out
}

/// Hue-distance keying.
pub fn key_by_hue(
    fg: &PixelBuffer,
    bg: &PixelBuffer,
    key: Rgba8,
    threshold: f64,
    edge: ChromaEdge,
) -> MediaLabResult<PixelBuffer> {
    fg.ensure_same_shape(bg, "chroma key")?;
    let mut mask = hue_mask(fg, key, threshold);
    if edge == ChromaEdge::Smooth {
        mask = smooth_mask(&mask, fg.width(), fg.height());
    }

    let mut out = bg.clone();
    for ((dst, src), alpha) in out
        .data_mut()
        .chunks_exact_mut(4)
        .zip(fg.data().chunks_exact(4))
        .zip(mask)
    {
        for c in 0..3 {
            dst[c] = mix_u8(src[c], dst[c], alpha);
        }
    }
    Ok(out)
}

/// Vlahos linear matte: `alpha = 1 - (G - k*B) / (Gkey - k*Bkey)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VlahosMatte {
    key: Rgba8,
    k: f64,
    denominator: f64,
}

impl VlahosMatte {
    pub fn new(key: Rgba8, k: f64) -> MediaLabResult<Self> {
        if !k.is_finite() {
            return Err(MediaLabError::validation("vlahos k must be finite"));
        }
        let denominator = f64::from(key.g) - k * f64::from(key.b);
        if denominator == 0.0 {
            return Err(MediaLabError::validation(format!(
                "vlahos matte is undefined for key #{:02x}{:02x}{:02x} with k = {k}",
                key.r, key.g, key.b
            )));
        }
        Ok(Self {
            key,
            k,
            denominator,
        })
    }

    /// Foreground opacity of a pixel. Not clamped.
    pub fn alpha(&self, px: Rgba8) -> f64 {
        1.0 - (f64::from(px.g) - self.k * f64::from(px.b)) / self.denominator
    }

    /// Composite `fg` over `bg`: `fg - key*(1-alpha) + bg*(1-alpha)` per channel.
    pub fn composite(&self, fg: &PixelBuffer, bg: &PixelBuffer) -> MediaLabResult<PixelBuffer> {
        fg.ensure_same_shape(bg, "vlahos key")?;
        let key = self.key.rgb();
        let mut out = bg.clone();
        for (dst, src) in out.data_mut().chunks_exact_mut(4).zip(fg.data().chunks_exact(4)) {
            let inv = 1.0
                - self.alpha(Rgba8 {
                    r: src[0],
                    g: src[1],
                    b: src[2],
                    a: src[3],
                });
            for c in 0..3 {
                let v = f64::from(src[c]) - f64::from(key[c]) * inv + f64::from(dst[c]) * inv;
                dst[c] = clamp_round_u8(v);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/chroma.rs"]
mod tests;
