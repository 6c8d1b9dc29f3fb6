use std::collections::VecDeque;

use kurbo::{Affine, Point};

use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{MediaLabError, MediaLabResult};
use crate::foundation::math::{clamp_round_u8, mix_u8, scale_u8};
use crate::image::buffer::PixelBuffer;
use crate::image::color::parse_hex_rgb;
use crate::params::{ParamSource, count_or, number_or, seed, text_or};
use crate::video::chroma::{ChromaEdge, VlahosMatte, key_by_hue};
use crate::video::source::FrameSource;

/// Default hue distance under which a pixel counts as key-colored.
pub const DEFAULT_HUE_THRESHOLD: f64 = 0.2;

/// Keying formula used by [`FrameEffect::ChromaKey`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChromaMethod {
    Hue { threshold: f64, edge: ChromaEdge },
    Vlahos { k: f64 },
}

/// A video effect over one or two input sequences, with its parameters captured.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameEffect {
    Reverse,
    FadeInOut {
        fade_in_secs: f64,
        fade_out_secs: f64,
        /// Scale alpha along with color.
        fade_alpha: bool,
    },
    MotionBlur {
        blur_frames: u32,
    },
    Earthquake {
        strength: u32,
        seed: Option<u64>,
    },
    CrossFade {
        cross_fade_secs: f64,
    },
    ChromaKey {
        key: Rgba8,
        method: ChromaMethod,
    },
}

impl FrameEffect {
    pub fn parse(name: &str, params: &dyn ParamSource) -> MediaLabResult<Self> {
        let kind = name.trim().to_ascii_lowercase().replace(['-', '_'], "");
        if kind.is_empty() {
            return Err(MediaLabError::validation("effect name must be non-empty"));
        }

        match kind.as_str() {
            "reverse" => Ok(Self::Reverse),
            "fadeinout" | "fade" => Ok(Self::FadeInOut {
                fade_in_secs: non_negative(params, "fade_in_secs", 1.0)?,
                fade_out_secs: non_negative(params, "fade_out_secs", 1.0)?,
                fade_alpha: params.flag("fade_alpha").unwrap_or(false),
            }),
            "motionblur" => {
                let blur_frames = count_or(params, "blur_frames", 3)?;
                if blur_frames == 0 {
                    return Err(MediaLabError::validation("motion_blur.blur_frames must be >= 1"));
                }
                Ok(Self::MotionBlur { blur_frames })
            }
            "earthquake" => Ok(Self::Earthquake {
                strength: count_or(params, "strength", 5)?,
                seed: seed(params),
            }),
            "crossfade" => Ok(Self::CrossFade {
                cross_fade_secs: non_negative(params, "cross_fade_secs", 1.0)?,
            }),
            "chromakey" => {
                let key = parse_hex_rgb(&text_or(params, "color", "#00ff00"))?;
                let method = match text_or(params, "method", "hue").as_str() {
                    "hue" => ChromaMethod::Hue {
                        threshold: non_negative(params, "threshold", DEFAULT_HUE_THRESHOLD)?,
                        edge: ChromaEdge::parse(&text_or(params, "edge", "hard"))?,
                    },
                    "vlahos" => {
                        let k = number_or(params, "k", 1.0)?;
                        // Reject a degenerate matte before any frame is decoded.
                        VlahosMatte::new(key, k)?;
                        ChromaMethod::Vlahos { k }
                    }
                    other => {
                        return Err(MediaLabError::validation(format!(
                            "unknown chroma_key.method '{other}'"
                        )));
                    }
                };
                Ok(Self::ChromaKey { key, method })
            }
            _ => Err(MediaLabError::validation(format!(
                "unknown video effect '{name}'"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reverse => "reverse",
            Self::FadeInOut { .. } => "fade_in_out",
            Self::MotionBlur { .. } => "motion_blur",
            Self::Earthquake { .. } => "earthquake",
            Self::CrossFade { .. } => "cross_fade",
            Self::ChromaKey { .. } => "chroma_key",
        }
    }

    /// Whether the effect reads a second input sequence.
    pub fn needs_second_input(&self) -> bool {
        matches!(self, Self::CrossFade { .. } | Self::ChromaKey { .. })
    }

    /// Resolve parameters against the inputs: output length, frame counts and per-run state.
    ///
    /// Every parameter problem surfaces here, before any frame is rendered.
    #[tracing::instrument(skip_all, fields(effect = self.name()))]
    pub fn prepare(
        &self,
        fps: Fps,
        input1: &dyn FrameSource,
        input2: Option<&dyn FrameSource>,
    ) -> MediaLabResult<PreparedEffect> {
        let canvas = input1.dimensions();
        let len1 = input1.len();

        let second = match (self.needs_second_input(), input2) {
            (true, Some(src)) => {
                if src.dimensions() != canvas {
                    return Err(MediaLabError::validation(format!(
                        "{}: second input is {}x{}, first is {}x{}",
                        self.name(),
                        src.dimensions().width,
                        src.dimensions().height,
                        canvas.width,
                        canvas.height
                    )));
                }
                Some(src.len())
            }
            (true, None) => {
                return Err(MediaLabError::validation(format!(
                    "{} needs a second input sequence",
                    self.name()
                )));
            }
            (false, _) => None,
        };
        let len2 = second.unwrap_or(0);

        let (output_length, plan) = match *self {
            FrameEffect::Reverse => (len1, Plan::Reverse),
            FrameEffect::FadeInOut {
                fade_in_secs,
                fade_out_secs,
                fade_alpha,
            } => (
                len1,
                Plan::Fade {
                    fade_in: fps.secs_to_frames_round(fade_in_secs)?,
                    fade_out: fps.secs_to_frames_round(fade_out_secs)?,
                    fade_alpha,
                },
            ),
            FrameEffect::MotionBlur { blur_frames } => {
                if blur_frames == 0 {
                    return Err(MediaLabError::validation("motion_blur.blur_frames must be >= 1"));
                }
                (
                    len1,
                    Plan::MotionBlur {
                        blur_frames: blur_frames as usize,
                        window: VecDeque::new(),
                    },
                )
            }
            FrameEffect::Earthquake { strength, seed } => {
                let margin = u64::from(strength) * 2;
                if margin >= u64::from(canvas.width) || margin >= u64::from(canvas.height) {
                    return Err(MediaLabError::validation(format!(
                        "earthquake.strength {strength} leaves no picture in a {}x{} frame",
                        canvas.width, canvas.height
                    )));
                }
                let rng = match seed {
                    Some(s) => fastrand::Rng::with_seed(s),
                    None => fastrand::Rng::new(),
                };
                (
                    len1,
                    Plan::Earthquake {
                        strength: f64::from(strength),
                        rng,
                    },
                )
            }
            FrameEffect::CrossFade { cross_fade_secs } => {
                let overlap = fps.secs_to_frames_round(cross_fade_secs)?;
                if overlap > len1 || overlap > len2 {
                    return Err(MediaLabError::validation(format!(
                        "cross_fade of {overlap} frames is longer than an input \
                         ({len1} and {len2} frames)"
                    )));
                }
                (
                    len1 + len2 - overlap,
                    Plan::CrossFade {
                        len1,
                        overlap,
                    },
                )
            }
            FrameEffect::ChromaKey { key, method } => {
                if len2 < len1 {
                    return Err(MediaLabError::validation(format!(
                        "chroma_key background has {len2} frames, foreground has {len1}"
                    )));
                }
                let plan = match method {
                    ChromaMethod::Hue { threshold, edge } => Plan::HueKey {
                        key,
                        threshold,
                        edge,
                    },
                    ChromaMethod::Vlahos { k } => Plan::Vlahos(VlahosMatte::new(key, k)?),
                };
                (len1, plan)
            }
        };

        if output_length == 0 {
            return Err(MediaLabError::validation(format!(
                "{} would produce no frames",
                self.name()
            )));
        }

        tracing::debug!(output_length, "effect prepared");
        Ok(PreparedEffect {
            output_length,
            canvas,
            plan,
        })
    }
}

fn non_negative(params: &dyn ParamSource, name: &str, default: f64) -> MediaLabResult<f64> {
    let v = number_or(params, name, default)?;
    if v < 0.0 {
        return Err(MediaLabError::validation(format!("{name} must be >= 0")));
    }
    Ok(v)
}

/// Input frames an output frame is computed from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameRequest {
    pub input1: Option<u64>,
    pub input2: Option<u64>,
}

/// Decoded frames matching a [`FrameRequest`].
#[derive(Clone, Debug, Default)]
pub struct DecodedFrames {
    pub input1: Option<PixelBuffer>,
    pub input2: Option<PixelBuffer>,
}

/// Parameter snapshot plus the state a run carries between frames.
#[derive(Debug)]
enum Plan {
    Reverse,
    Fade {
        fade_in: u64,
        fade_out: u64,
        fade_alpha: bool,
    },
    MotionBlur {
        blur_frames: usize,
        window: VecDeque<PixelBuffer>,
    },
    Earthquake {
        strength: f64,
        rng: fastrand::Rng,
    },
    CrossFade {
        len1: u64,
        overlap: u64,
    },
    HueKey {
        key: Rgba8,
        threshold: f64,
        edge: ChromaEdge,
    },
    Vlahos(VlahosMatte),
}

/// An effect bound to its inputs, ready to render output frames `0..output_length`.
#[derive(Debug)]
pub struct PreparedEffect {
    output_length: u64,
    canvas: Canvas,
    plan: Plan,
}

impl PreparedEffect {
    pub fn output_length(&self) -> u64 {
        self.output_length
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Which input frames output frame `idx` is built from.
    pub fn request(&self, idx: u64) -> MediaLabResult<FrameRequest> {
        if idx >= self.output_length {
            return Err(MediaLabError::evaluation(format!(
                "output frame {idx} is past the end ({} frames)",
                self.output_length
            )));
        }
        Ok(match self.plan {
            Plan::Reverse => FrameRequest {
                input1: Some(self.output_length - 1 - idx),
                input2: None,
            },
            Plan::CrossFade { len1, overlap } => {
                let left = len1 - overlap;
                if idx < left {
                    FrameRequest {
                        input1: Some(idx),
                        input2: None,
                    }
                } else if idx < len1 {
                    FrameRequest {
                        input1: Some(idx),
                        input2: Some(idx - left),
                    }
                } else {
                    FrameRequest {
                        input1: None,
                        input2: Some(idx - left),
                    }
                }
            }
            Plan::HueKey { .. } | Plan::Vlahos(_) => FrameRequest {
                input1: Some(idx),
                input2: Some(idx),
            },
            Plan::Fade { .. } | Plan::MotionBlur { .. } | Plan::Earthquake { .. } => FrameRequest {
                input1: Some(idx),
                input2: None,
            },
        })
    }

    /// Render output frame `idx` from the frames named by [`Self::request`].
    ///
    /// Frames must be rendered in increasing order; motion blur keeps a history window.
    pub fn render_frame(&mut self, idx: u64, inputs: DecodedFrames) -> MediaLabResult<PixelBuffer> {
        let output_length = self.output_length;
        let DecodedFrames { input1, input2 } = inputs;
        let missing = |which: &str| {
            MediaLabError::evaluation(format!("output frame {idx} needs {which}, none was decoded"))
        };

        match &mut self.plan {
            Plan::Reverse => input1.ok_or_else(|| missing("input 1")),
            Plan::Fade {
                fade_in,
                fade_out,
                fade_alpha,
            } => {
                let mut frame = input1.ok_or_else(|| missing("input 1"))?;
                let multiplier = fade_multiplier(idx, output_length, *fade_in, *fade_out);
                let channels = if *fade_alpha { 4 } else { 3 };
                for px in frame.data_mut().chunks_exact_mut(4) {
                    for c in &mut px[..channels] {
                        *c = scale_u8(*c, multiplier);
                    }
                }
                Ok(frame)
            }
            Plan::MotionBlur {
                blur_frames,
                window,
            } => {
                window.push_back(input1.ok_or_else(|| missing("input 1"))?);
                while window.len() > *blur_frames {
                    window.pop_front();
                }
                mean_of(window)
            }
            Plan::Earthquake { strength, rng } => {
                let frame = input1.ok_or_else(|| missing("input 1"))?;
                let dx = rng.f64() * 2.0 * *strength;
                let dy = rng.f64() * 2.0 * *strength;
                Ok(shake(&frame, dx, dy, *strength))
            }
            Plan::CrossFade { len1, overlap } => {
                let left = *len1 - *overlap;
                match (input1, input2) {
                    (Some(a), None) if idx < left => Ok(a),
                    (None, Some(b)) if idx >= *len1 => Ok(b),
                    (Some(a), Some(b)) => {
                        let multiplier = if idx > left {
                            (*len1 - idx) as f64 / *overlap as f64
                        } else {
                            1.0
                        };
                        blend(&a, &b, multiplier)
                    }
                    _ => Err(missing("both inputs")),
                }
            }
            Plan::HueKey {
                key,
                threshold,
                edge,
            } => {
                let fg = input1.ok_or_else(|| missing("the foreground"))?;
                let bg = input2.ok_or_else(|| missing("the background"))?;
                key_by_hue(&fg, &bg, *key, *threshold, *edge)
            }
            Plan::Vlahos(matte) => {
                let fg = input1.ok_or_else(|| missing("the foreground"))?;
                let bg = input2.ok_or_else(|| missing("the background"))?;
                matte.composite(&fg, &bg)
            }
        }
    }
}

/// Linear fade-in over the first `fade_in` frames and fade-out over the last `fade_out`.
pub fn fade_multiplier(idx: u64, len: u64, fade_in: u64, fade_out: u64) -> f64 {
    if idx < fade_in {
        idx as f64 / fade_in as f64
    } else if idx + fade_out > len {
        (len - idx) as f64 / fade_out as f64
    } else {
        1.0
    }
}

/// Per-channel `a * t + b * (1 - t)` over RGBA.
fn blend(a: &PixelBuffer, b: &PixelBuffer, t: f64) -> MediaLabResult<PixelBuffer> {
    a.ensure_same_shape(b, "cross_fade")?;
    let mut out = a.clone();
    for (dst, src) in out.data_mut().iter_mut().zip(b.data()) {
        *dst = mix_u8(*dst, *src, t);
    }
    Ok(out)
}

/// Mean RGB over the window, fully opaque.
fn mean_of(window: &VecDeque<PixelBuffer>) -> MediaLabResult<PixelBuffer> {
    let first = window
        .front()
        .ok_or_else(|| MediaLabError::evaluation("motion blur window is empty"))?;
    let mut acc = vec![0u32; first.data().len()];
    for frame in window {
        first.ensure_same_shape(frame, "motion_blur")?;
        for (a, v) in acc.iter_mut().zip(frame.data()) {
            *a += u32::from(*v);
        }
    }

    let n = window.len() as f64;
    let mut out = first.same_shape();
    for (dst, sums) in out.data_mut().chunks_exact_mut(4).zip(acc.chunks_exact(4)) {
        for c in 0..3 {
            dst[c] = clamp_round_u8(f64::from(sums[c]) / n);
        }
        dst[3] = 255;
    }
    Ok(out)
}

/// Stretch the `(w - 2s) x (h - 2s)` sub-rectangle at `(dx, dy)` over the whole frame.
fn shake(frame: &PixelBuffer, dx: f64, dy: f64, strength: f64) -> PixelBuffer {
    let w = f64::from(frame.width());
    let h = f64::from(frame.height());
    let to_source = Affine::translate((dx, dy))
        * Affine::scale_non_uniform((w - 2.0 * strength) / w, (h - 2.0 * strength) / h);

    let mut out = frame.same_shape();
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            // Map pixel centers.
            let p = to_source * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            out.set_pixel(x, y, sample_bilinear(frame, p.x - 0.5, p.y - 0.5));
        }
    }
    out
}

fn sample_bilinear(frame: &PixelBuffer, x: f64, y: f64) -> Rgba8 {
    use crate::foundation::core::BorderMode::Clamp;

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = frame.get_pixel(x0, y0, Clamp);
    let p10 = frame.get_pixel(x0 + 1, y0, Clamp);
    let p01 = frame.get_pixel(x0, y0 + 1, Clamp);
    let p11 = frame.get_pixel(x0 + 1, y0 + 1, Clamp);

    let lerp = |a: u8, b: u8, c: u8, d: u8| {
        let top = f64::from(a) * (1.0 - fx) + f64::from(b) * fx;
        let bottom = f64::from(c) * (1.0 - fx) + f64::from(d) * fx;
        clamp_round_u8(top * (1.0 - fy) + bottom * fy)
    };
    Rgba8 {
        r: lerp(p00.r, p10.r, p01.r, p11.r),
        g: lerp(p00.g, p10.g, p01.g, p11.g),
        b: lerp(p00.b, p10.b, p01.b, p11.b),
        a: lerp(p00.a, p10.a, p01.a, p11.a),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/effect.rs"]
mod tests;
