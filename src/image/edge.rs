use crate::foundation::core::BorderMode;
use crate::foundation::error::MediaLabResult;
use crate::image::buffer::PixelBuffer;

const GX: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const GY: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Sobel edge detection, thresholded independently per RGB channel.
///
/// A channel is white where the gradient magnitude exceeds `threshold`, black elsewhere.
pub fn sobel_edge(
    input: &PixelBuffer,
    output: &mut PixelBuffer,
    threshold: f64,
    border: BorderMode,
) -> MediaLabResult<()> {
    input.ensure_same_shape(output, "sobel_edge")?;

    for y in 0..input.height() {
        for x in 0..input.width() {
            let mut gx = [0i32; 3];
            let mut gy = [0i32; 3];
            for (ky, (row_x, row_y)) in GX.iter().zip(GY.iter()).enumerate() {
                for kx in 0..3 {
                    let px = input.get_pixel(
                        i64::from(x) + kx as i64 - 1,
                        i64::from(y) + ky as i64 - 1,
                        border,
                    );
                    for (c, v) in px.rgb().into_iter().enumerate() {
                        gx[c] += row_x[kx] * i32::from(v);
                        gy[c] += row_y[kx] * i32::from(v);
                    }
                }
            }

            let mut px = input.get_pixel(i64::from(x), i64::from(y), border);
            let edge = |c: usize| {
                if f64::from(gx[c]).hypot(f64::from(gy[c])) > threshold {
                    255
                } else {
                    0
                }
            };
            px.r = edge(0);
            px.g = edge(1);
            px.b = edge(2);
            output.set_pixel(x, y, px);
        }
    }
    Ok(())
}
