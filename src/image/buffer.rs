use crate::foundation::core::{BorderMode, Canvas, Rgba8};
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::foundation::math::expected_rgba_len;

/// A fixed-size grid of straight RGBA8 pixels, row-major and tightly packed.
///
/// Invariant: `data.len() == width * height * 4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a transparent-black buffer.
    pub fn new(width: u32, height: u32) -> MediaLabResult<Self> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Allocate a buffer with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> MediaLabResult<Self> {
        let mut out = Self::new(width, height)?;
        for chunk in out.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[px.r, px.g, px.b, px.a]);
        }
        Ok(out)
    }

    /// Wrap existing RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> MediaLabResult<Self> {
        let len = checked_len(width, height)?;
        if data.len() != len {
            return Err(MediaLabError::validation(format!(
                "pixel data length {} does not match {width}x{height}x4",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Allocate a zeroed buffer with the same dimensions as `self`.
    pub fn same_shape(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: vec![0; self.data.len()],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / 4
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Read the pixel at `(x, y)`, resolving out-of-range coordinates with `border`.
    ///
    /// This is the only lookup neighborhood transforms use, so edge pixels are always defined.
    pub fn get_pixel(&self, x: i64, y: i64, border: BorderMode) -> Rgba8 {
        let x = border.resolve(x, self.width);
        let y = border.resolve(y, self.height);
        let i = self.offset(x, y);
        Rgba8 {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        }
    }

    /// Write the pixel at in-range `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgba8) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&[px.r, px.g, px.b, px.a]);
    }

    pub(crate) fn ensure_same_shape(&self, other: &PixelBuffer, what: &str) -> MediaLabResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(MediaLabError::validation(format!(
                "{what}: buffers must share dimensions ({}x{} vs {}x{})",
                self.width, self.height, other.width, other.height
            )));
        }
        Ok(())
    }
}

impl From<::image::RgbaImage> for PixelBuffer {
    fn from(img: ::image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl TryFrom<PixelBuffer> for ::image::RgbaImage {
    type Error = MediaLabError;

    fn try_from(buf: PixelBuffer) -> MediaLabResult<Self> {
        ::image::RgbaImage::from_raw(buf.width, buf.height, buf.data)
            .ok_or_else(|| MediaLabError::evaluation("pixel buffer does not fit an RgbaImage"))
    }
}

fn checked_len(width: u32, height: u32) -> MediaLabResult<usize> {
    if width == 0 || height == 0 {
        return Err(MediaLabError::validation(
            "pixel buffer dimensions must be non-zero",
        ));
    }
    expected_rgba_len(width, height)
        .ok_or_else(|| MediaLabError::validation("pixel buffer size overflow"))
}

/// Apply `f` to every pixel's RGB, preserving the input alpha in the output.
pub(crate) fn map_rgb(
    input: &PixelBuffer,
    output: &mut PixelBuffer,
    what: &str,
    mut f: impl FnMut(Rgba8) -> [u8; 3],
) -> MediaLabResult<()> {
    input.ensure_same_shape(output, what)?;
    for (src, dst) in input
        .data
        .chunks_exact(4)
        .zip(output.data.chunks_exact_mut(4))
    {
        let rgb = f(Rgba8 {
            r: src[0],
            g: src[1],
            b: src[2],
            a: src[3],
        });
        dst[..3].copy_from_slice(&rgb);
        dst[3] = src[3];
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/image/buffer.rs"]
mod tests;
