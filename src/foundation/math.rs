/// Round and saturate a channel value into `0..=255`, as a clamped byte store would.
pub(crate) fn clamp_round_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Scale a channel by `mul`, saturating.
pub(crate) fn scale_u8(v: u8, mul: f64) -> u8 {
    clamp_round_u8(f64::from(v) * mul)
}

/// Linear blend `a * t + b * (1 - t)`, saturating.
pub(crate) fn mix_u8(a: u8, b: u8, t: f64) -> u8 {
    clamp_round_u8(f64::from(a) * t + f64::from(b) * (1.0 - t))
}

pub(crate) fn expected_rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
}
