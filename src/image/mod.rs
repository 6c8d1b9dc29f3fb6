//! Pixel-buffer transforms.
//!
//! Every transform reads an input [`PixelBuffer`] and writes RGB into a pre-allocated output of
//! the same size. Alpha is carried over from the input. Inputs are never mutated.

pub mod adjust;
pub mod blur;
pub mod buffer;
pub mod color;
pub mod comic;
pub mod dither;
pub mod edge;
pub mod histogram;

use crate::foundation::core::BorderMode;
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::params::{ParamSource, count_or, number_or, text_or};

use buffer::PixelBuffer;
use dither::DitherMatrix;
use histogram::AutoContrastMode;

/// A parsed image filter with its parameters captured.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageFilter {
    Negation,
    Grayscale,
    Brightness { offset: f64 },
    Contrast { factor: f64 },
    Posterize { red_bits: u8, green_bits: u8, blue_bits: u8 },
    Threshold { value: f64 },
    AutoContrast { mode: AutoContrastMode, percentage: f64 },
    Blur { kernel_size: u32, border: BorderMode },
    Dither { matrix: DitherMatrix },
    Sobel { threshold: f64 },
    Comic { saturation: f64 },
}

impl ImageFilter {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Negation => "negation",
            Self::Grayscale => "grayscale",
            Self::Brightness { .. } => "brightness",
            Self::Contrast { .. } => "contrast",
            Self::Posterize { .. } => "posterize",
            Self::Threshold { .. } => "threshold",
            Self::AutoContrast { .. } => "auto_contrast",
            Self::Blur { .. } => "blur",
            Self::Dither { .. } => "dither",
            Self::Sobel { .. } => "sobel",
            Self::Comic { .. } => "comic",
        }
    }
}

/// Build an [`ImageFilter`] from its name and a parameter source.
///
/// Missing parameters fall back to the lab defaults; out-of-range values are rejected here so
/// that [`apply_filter`] never fails on parameters.
pub fn parse_filter(name: &str, params: &dyn ParamSource) -> MediaLabResult<ImageFilter> {
    let kind = name.trim().to_ascii_lowercase().replace('-', "_");
    if kind.is_empty() {
        return Err(MediaLabError::validation("image filter name must be non-empty"));
    }

    match kind.as_str() {
        "negation" | "negate" | "invert" => Ok(ImageFilter::Negation),
        "grayscale" | "greyscale" | "gray" => Ok(ImageFilter::Grayscale),
        "brightness" => Ok(ImageFilter::Brightness {
            offset: number_or(params, "offset", 0.0)?,
        }),
        "contrast" => {
            let factor = number_or(params, "factor", 1.0)?;
            if factor < 0.0 {
                return Err(MediaLabError::validation("contrast.factor must be >= 0"));
            }
            Ok(ImageFilter::Contrast { factor })
        }
        "posterize" | "posterization" => Ok(ImageFilter::Posterize {
            red_bits: bits(params, "red_bits")?,
            green_bits: bits(params, "green_bits")?,
            blue_bits: bits(params, "blue_bits")?,
        }),
        "threshold" => Ok(ImageFilter::Threshold {
            value: number_or(params, "value", 128.0)?,
        }),
        "auto_contrast" | "autocontrast" | "histogram" => {
            let mode = AutoContrastMode::parse(&text_or(params, "type", "gray"))?;
            let percentage = number_or(params, "percentage", 0.05)?;
            if !(0.0..=1.0).contains(&percentage) {
                return Err(MediaLabError::validation(
                    "auto_contrast.percentage must be within [0, 1]",
                ));
            }
            Ok(ImageFilter::AutoContrast { mode, percentage })
        }
        "blur" => {
            let kernel_size = count_or(params, "kernel_size", 3)?;
            blur::validate_kernel_size(kernel_size)?;
            let border = match text_or(params, "border", "clamp").as_str() {
                "clamp" => BorderMode::Clamp,
                "wrap" => BorderMode::Wrap,
                other => {
                    return Err(MediaLabError::validation(format!(
                        "unknown blur.border '{other}'"
                    )));
                }
            };
            Ok(ImageFilter::Blur { kernel_size, border })
        }
        "dither" => Ok(ImageFilter::Dither {
            matrix: DitherMatrix::parse(&text_or(params, "matrix", "bayer4"))?,
        }),
        "sobel" | "edge" | "outline" => Ok(ImageFilter::Sobel {
            threshold: number_or(params, "threshold", 100.0)?,
        }),
        "comic" | "comic_color" => {
            let saturation = number_or(params, "saturation", 1.0)?;
            if saturation < 0.0 {
                return Err(MediaLabError::validation("comic.saturation must be >= 0"));
            }
            Ok(ImageFilter::Comic { saturation })
        }
        _ => Err(MediaLabError::validation(format!(
            "unknown image filter '{kind}'"
        ))),
    }
}

fn bits(params: &dyn ParamSource, name: &str) -> MediaLabResult<u8> {
    let v = count_or(params, name, 8)?;
    u8::try_from(v)
        .ok()
        .filter(|b| *b <= 8)
        .ok_or_else(|| MediaLabError::validation(format!("posterize.{name} must be within 0..=8")))
}

/// Run `filter` over `input`, returning a freshly allocated output buffer.
#[tracing::instrument(
    skip(input),
    fields(filter = filter.name(), width = input.width(), height = input.height())
)]
pub fn apply_filter(filter: &ImageFilter, input: &PixelBuffer) -> MediaLabResult<PixelBuffer> {
    let mut output = input.same_shape();
    match *filter {
        ImageFilter::Negation => adjust::negation(input, &mut output)?,
        ImageFilter::Grayscale => adjust::grayscale(input, &mut output)?,
        ImageFilter::Brightness { offset } => adjust::brightness(input, &mut output, offset)?,
        ImageFilter::Contrast { factor } => adjust::contrast(input, &mut output, factor)?,
        ImageFilter::Posterize {
            red_bits,
            green_bits,
            blue_bits,
        } => adjust::posterize(input, &mut output, red_bits, green_bits, blue_bits)?,
        ImageFilter::Threshold { value } => adjust::threshold(input, &mut output, value)?,
        ImageFilter::AutoContrast { mode, percentage } => {
            histogram::auto_contrast(input, &mut output, mode, percentage)?
        }
        ImageFilter::Blur {
            kernel_size,
            border,
        } => blur::box_blur(input, &mut output, kernel_size, border)?,
        ImageFilter::Dither { matrix } => dither::dither(input, &mut output, matrix)?,
        ImageFilter::Sobel { threshold } => {
            edge::sobel_edge(input, &mut output, threshold, BorderMode::Clamp)?
        }
        ImageFilter::Comic { saturation } => comic::comic_color(input, &mut output, saturation)?,
    }
    Ok(output)
}

#[cfg(test)]
#[path = "../../tests/unit/image/filter.rs"]
mod tests;
