use crate::foundation::core::Rgba8;
use crate::foundation::error::{MediaLabError, MediaLabResult};

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;
    let s = if max == 0.0 { 0.0 } else { d / max };

    // achromatic
    if d == 0.0 {
        return Hsv { h: 0.0, s, v: max };
    }

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsv {
        h: h * 60.0,
        s,
        v: max,
    }
}

/// Convert back to RGB channels in `[0, 255]` (unrounded).
pub fn hsv_to_rgb(hsv: Hsv) -> [f64; 3] {
    let h = (hsv.h.rem_euclid(360.0)) / 60.0;
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);

    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match sector as u8 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [r * 255.0, g * 255.0, b * 255.0]
}

/// Circular hue distance normalized to `[0, 1]` (0 = same hue, 1 = opposite).
pub fn hue_distance(h1: f64, h2: f64) -> f64 {
    let d = (h1 - h2).abs();
    if d < 180.0 {
        d / 180.0
    } else {
        (360.0 - d) / 180.0
    }
}

/// Parse `#RRGGBB` (leading `#` optional) into an opaque color.
pub fn parse_hex_rgb(s: &str) -> MediaLabResult<Rgba8> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> MediaLabResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| MediaLabError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if s.len() != 6 || !s.is_ascii() {
        return Err(MediaLabError::validation(
            "hex color must be #RRGGBB (case-insensitive)",
        ));
    }
    Ok(Rgba8::opaque(
        hex_byte(&s[0..2])?,
        hex_byte(&s[2..4])?,
        hex_byte(&s[4..6])?,
    ))
}
