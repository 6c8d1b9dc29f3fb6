use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::image::buffer::{PixelBuffer, map_rgb};
use crate::image::color::{hsv_to_rgb, rgb_to_hsv};

/// Fixed comic-book palette the saturated colors are snapped to.
pub const COMIC_PALETTE: [[u8; 3]; 65] = [
    [254, 251, 198],
    [255, 247, 149],
    [255, 240, 1],
    [189, 223, 198],
    [120, 201, 195],
    [0, 166, 192],
    [190, 219, 152],
    [128, 197, 152],
    [0, 163, 154],
    [251, 194, 174],
    [244, 148, 150],
    [234, 31, 112],
    [253, 193, 133],
    [246, 146, 120],
    [235, 38, 91],
    [184, 229, 250],
    [109, 207, 246],
    [0, 173, 239],
    [249, 200, 221],
    [244, 149, 189],
    [233, 3, 137],
    [183, 179, 216],
    [122, 162, 213],
    [0, 140, 209],
    [184, 137, 189],
    [132, 127, 185],
    [0, 111, 182],
    [183, 42, 138],
    [143, 50, 141],
    [56, 58, 141],
    [187, 176, 174],
    [132, 160, 172],
    [0, 137, 169],
    [188, 135, 151],
    [139, 126, 152],
    [1, 110, 151],
    [198, 216, 54],
    [138, 192, 68],
    [0, 160, 84],
    [190, 175, 136],
    [135, 159, 137],
    [0, 137, 139],
    [189, 136, 120],
    [140, 126, 123],
    [0, 110, 125],
    [255, 189, 33],
    [247, 145, 44],
    [236, 42, 50],
    [186, 45, 114],
    [144, 52, 115],
    [59, 59, 121],
    [194, 171, 57],
    [142, 156, 68],
    [0, 135, 79],
    [189, 50, 55],
    [147, 56, 62],
    [61, 60, 65],
    [188, 48, 93],
    [145, 54, 97],
    [61, 60, 102],
    [191, 134, 57],
    [145, 125, 66],
    [0, 108, 72],
    [0, 0, 0],
    [255, 255, 255],
];

/// Nearest palette entry by Euclidean RGB distance. Ties keep the earlier entry.
pub fn nearest_palette_color(rgb: [f64; 3]) -> [u8; 3] {
    let mut best = COMIC_PALETTE[0];
    let mut best_dist = f64::INFINITY;
    for entry in COMIC_PALETTE {
        let dist = (0..3)
            .map(|c| {
                let d = f64::from(entry[c]) - rgb[c];
                d * d
            })
            .sum::<f64>();
        if dist < best_dist {
            best_dist = dist;
            best = entry;
        }
    }
    best
}

/// Boost saturation by `saturation` (clamped to `[0, 1]` after scaling), then snap to
/// [`COMIC_PALETTE`].
pub fn comic_color(
    input: &PixelBuffer,
    output: &mut PixelBuffer,
    saturation: f64,
) -> MediaLabResult<()> {
    if !saturation.is_finite() || saturation < 0.0 {
        return Err(MediaLabError::validation(format!(
            "comic saturation factor must be finite and >= 0, got {saturation}"
        )));
    }
    map_rgb(input, output, "comic_color", |px| {
        let mut hsv = rgb_to_hsv(px.r, px.g, px.b);
        hsv.s = (hsv.s * saturation).clamp(0.0, 1.0);
        nearest_palette_color(hsv_to_rgb(hsv))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/image/comic.rs"]
mod tests;
