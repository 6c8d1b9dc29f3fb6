use crate::foundation::core::BorderMode;
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::foundation::math::clamp_round_u8;
use crate::image::buffer::PixelBuffer;

/// Box blur: each RGB channel becomes the mean of the `kernel_size x kernel_size` neighborhood.
///
/// `kernel_size` must be odd and >= 1; `1` is the identity. It may not exceed
/// `2 * max(width, height) + 1`, past which the window holds nothing but repeated border pixels.
/// Alpha is copied from the input.
pub fn box_blur(
    input: &PixelBuffer,
    output: &mut PixelBuffer,
    kernel_size: u32,
    border: BorderMode,
) -> MediaLabResult<()> {
    validate_kernel_size(kernel_size)?;
    input.ensure_same_shape(output, "box_blur")?;
    let widest = 2 * u64::from(input.width().max(input.height())) + 1;
    if u64::from(kernel_size) > widest {
        return Err(MediaLabError::validation(format!(
            "blur kernel size {kernel_size} is wider than {widest} for a {}x{} image",
            input.width(),
            input.height()
        )));
    }

    let bound = i64::from(kernel_size / 2);
    let area = f64::from(kernel_size) * f64::from(kernel_size);

    for y in 0..input.height() {
        for x in 0..input.width() {
            let mut acc = [0u64; 3];
            for dy in -bound..=bound {
                for dx in -bound..=bound {
                    let px = input.get_pixel(i64::from(x) + dx, i64::from(y) + dy, border);
                    acc[0] += u64::from(px.r);
                    acc[1] += u64::from(px.g);
                    acc[2] += u64::from(px.b);
                }
            }
            let mut px = input.get_pixel(i64::from(x), i64::from(y), border);
            px.r = clamp_round_u8(acc[0] as f64 / area);
            px.g = clamp_round_u8(acc[1] as f64 / area);
            px.b = clamp_round_u8(acc[2] as f64 / area);
            output.set_pixel(x, y, px);
        }
    }
    Ok(())
}

pub(crate) fn validate_kernel_size(kernel_size: u32) -> MediaLabResult<()> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(MediaLabError::validation(format!(
            "blur kernel size must be odd and >= 1, got {kernel_size}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/image/blur.rs"]
mod tests;
