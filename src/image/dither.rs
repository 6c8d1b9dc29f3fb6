use crate::foundation::core::BorderMode;
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::image::buffer::PixelBuffer;

/// Ordered-dither threshold pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DitherMatrix {
    Bayer2,
    Bayer4,
    Line,
    Diamond,
}

const BAYER2: [[u8; 4]; 4] = [[1, 3, 0, 0], [4, 2, 0, 0], [0; 4], [0; 4]];
const BAYER4: [[u8; 4]; 4] = [[1, 9, 3, 11], [13, 5, 15, 7], [4, 12, 2, 10], [16, 8, 14, 6]];
const LINE: [[u8; 4]; 4] = [
    [15, 15, 15, 25],
    [15, 15, 25, 15],
    [15, 25, 15, 15],
    [25, 15, 15, 15],
];
const DIAMOND: [[u8; 4]; 4] = [
    [25, 15, 15, 25],
    [15, 25, 25, 15],
    [15, 25, 25, 15],
    [25, 15, 15, 25],
];

impl DitherMatrix {
    pub fn parse(s: &str) -> MediaLabResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bayer2" => Ok(Self::Bayer2),
            "bayer4" => Ok(Self::Bayer4),
            "line" => Ok(Self::Line),
            "diamond" => Ok(Self::Diamond),
            other => Err(MediaLabError::validation(format!(
                "unknown dither matrix '{other}'"
            ))),
        }
    }

    /// Number of intensity levels the grayscale value is normalized to.
    pub fn levels(self) -> f64 {
        match self {
            Self::Bayer2 => 5.0,
            Self::Bayer4 => 17.0,
            Self::Line | Self::Diamond => 100.0,
        }
    }

    pub fn size(self) -> usize {
        match self {
            Self::Bayer2 => 2,
            _ => 4,
        }
    }

    pub fn threshold(self, x: u32, y: u32) -> f64 {
        let n = self.size();
        let m = match self {
            Self::Bayer2 => &BAYER2,
            Self::Bayer4 => &BAYER4,
            Self::Line => &LINE,
            Self::Diamond => &DIAMOND,
        };
        f64::from(m[y as usize % n][x as usize % n])
    }
}

/// Ordered dithering to pure black and white.
pub fn dither(
    input: &PixelBuffer,
    output: &mut PixelBuffer,
    matrix: DitherMatrix,
) -> MediaLabResult<()> {
    input.ensure_same_shape(output, "dither")?;
    let levels = matrix.levels();
    for y in 0..input.height() {
        for x in 0..input.width() {
            let mut px = input.get_pixel(i64::from(x), i64::from(y), BorderMode::Clamp);
            let mean = (f64::from(px.r) + f64::from(px.g) + f64::from(px.b)) / 3.0;
            let value = mean / 255.0 * levels;
            let v = if value < matrix.threshold(x, y) { 0 } else { 255 };
            px.r = v;
            px.g = v;
            px.b = v;
            output.set_pixel(x, y, px);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/image/dither.rs"]
mod tests;
