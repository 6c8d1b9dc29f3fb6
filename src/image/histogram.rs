use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::foundation::math::clamp_round_u8;
use crate::image::buffer::{PixelBuffer, map_rgb};

/// Which quantity a histogram counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistogramChannel {
    Red,
    Green,
    Blue,
    /// Simple-average intensity.
    Gray,
}

/// How auto-contrast derives its input range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoContrastMode {
    /// One range from the intensity histogram, applied to R, G and B alike.
    Gray,
    /// An independent range per color channel.
    PerChannel,
}

impl AutoContrastMode {
    pub fn parse(s: &str) -> MediaLabResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(Self::Gray),
            "color" | "colour" | "rgb" | "per_channel" => Ok(Self::PerChannel),
            other => Err(MediaLabError::validation(format!(
                "unknown auto-contrast type '{other}'"
            ))),
        }
    }
}

pub type Histogram = [u64; 256];

pub fn build_histogram(input: &PixelBuffer, channel: HistogramChannel) -> Histogram {
    let mut hist = [0u64; 256];
    for px in input.data().chunks_exact(4) {
        let bin = match channel {
            HistogramChannel::Red => px[0],
            HistogramChannel::Green => px[1],
            HistogramChannel::Blue => px[2],
            HistogramChannel::Gray => {
                ((u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2])) / 3) as u8
            }
        };
        hist[bin as usize] += 1;
    }
    hist
}

/// Find the occupied range of `hist` after discarding `pixels_to_ignore` from each end.
///
/// Scanning stops at the first non-empty bin whose count exceeds what is left of the ignore budget.
pub fn find_min_max(hist: &Histogram, pixels_to_ignore: f64) -> (u8, u8) {
    let mut budget = pixels_to_ignore;
    let mut min = 0usize;
    while min < 255 {
        let count = hist[min] as f64;
        if count > 0.0 {
            if count > budget {
                break;
            }
            budget -= count;
        }
        min += 1;
    }

    let mut budget = pixels_to_ignore;
    let mut max = 255usize;
    while max > 0 {
        let count = hist[max] as f64;
        if count > 0.0 {
            if count > budget {
                break;
            }
            budget -= count;
        }
        max -= 1;
    }

    (min as u8, max as u8)
}

/// Stretch the histogram so that `[min, max]` maps onto `[0, 255]`.
///
/// `percentage` (in `[0, 1]`) of the pixels are ignored at each end. A degenerate range
/// (`max <= min`) leaves the affected channel unchanged.
pub fn auto_contrast(
    input: &PixelBuffer,
    output: &mut PixelBuffer,
    mode: AutoContrastMode,
    percentage: f64,
) -> MediaLabResult<()> {
    if !percentage.is_finite() || !(0.0..=1.0).contains(&percentage) {
        return Err(MediaLabError::validation(
            "auto-contrast percentage must be within [0, 1]",
        ));
    }
    let pixels_to_ignore = input.pixel_count() as f64 * percentage;

    let ranges = match mode {
        AutoContrastMode::Gray => {
            let hist = build_histogram(input, HistogramChannel::Gray);
            let range = find_min_max(&hist, pixels_to_ignore);
            [range; 3]
        }
        AutoContrastMode::PerChannel => [
            HistogramChannel::Red,
            HistogramChannel::Green,
            HistogramChannel::Blue,
        ]
        .map(|c| find_min_max(&build_histogram(input, c), pixels_to_ignore)),
    };

    for (c, (min, max)) in ranges.iter().enumerate() {
        if max <= min {
            tracing::warn!(
                channel = c,
                min,
                max,
                "auto-contrast range is degenerate; leaving channel unchanged"
            );
        }
    }

    map_rgb(input, output, "auto_contrast", |px| {
        let rgb = px.rgb();
        std::array::from_fn(|c| stretch(rgb[c], ranges[c]))
    })
}

fn stretch(v: u8, (min, max): (u8, u8)) -> u8 {
    if max <= min {
        return v;
    }
    let range = f64::from(max) - f64::from(min);
    clamp_round_u8((f64::from(v) - f64::from(min)) / range * 255.0)
}

#[cfg(test)]
#[path = "../../tests/unit/image/histogram.rs"]
mod tests;
