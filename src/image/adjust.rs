//! Point operations: each output pixel depends only on the input pixel at the same position.

use crate::foundation::error::MediaLabResult;
use crate::foundation::math::clamp_round_u8;
use crate::image::buffer::{PixelBuffer, map_rgb};

pub fn negation(input: &PixelBuffer, output: &mut PixelBuffer) -> MediaLabResult<()> {
    map_rgb(input, output, "negation", |px| {
        [255 - px.r, 255 - px.g, 255 - px.b]
    })
}

pub fn grayscale(input: &PixelBuffer, output: &mut PixelBuffer) -> MediaLabResult<()> {
    map_rgb(input, output, "grayscale", |px| {
        let v = px.gray();
        [v, v, v]
    })
}

pub fn brightness(
    input: &PixelBuffer,
    output: &mut PixelBuffer,
    offset: f64,
) -> MediaLabResult<()> {
    map_rgb(input, output, "brightness", |px| {
        px.rgb().map(|c| clamp_round_u8(f64::from(c) + offset))
    })
}

pub fn contrast(input: &PixelBuffer, output: &mut PixelBuffer, factor: f64) -> MediaLabResult<()> {
    map_rgb(input, output, "contrast", |px| {
        px.rgb().map(|c| clamp_round_u8(f64::from(c) * factor))
    })
}

/// Mask keeping the `bits` most significant bits of a byte. `bits` above 8 saturate.
pub fn bit_mask(bits: u8) -> u8 {
    match bits {
        0 => 0,
        b if b >= 8 => 0xff,
        b => !(0xffu8 >> b),
    }
}

pub fn posterize(
    input: &PixelBuffer,
    output: &mut PixelBuffer,
    red_bits: u8,
    green_bits: u8,
    blue_bits: u8,
) -> MediaLabResult<()> {
    let (rm, gm, bm) = (bit_mask(red_bits), bit_mask(green_bits), bit_mask(blue_bits));
    map_rgb(input, output, "posterize", |px| {
        [px.r & rm, px.g & gm, px.b & bm]
    })
}

/// Black below `value`, white at or above it, judged on the simple-average intensity.
pub fn threshold(input: &PixelBuffer, output: &mut PixelBuffer, value: f64) -> MediaLabResult<()> {
    map_rgb(input, output, "threshold", |px| {
        if f64::from(px.gray()) < value {
            [0, 0, 0]
        } else {
            [255, 255, 255]
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/image/adjust.rs"]
mod tests;
