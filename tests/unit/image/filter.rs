use super::*;
use crate::foundation::core::Rgba8;
use serde_json::json;

fn gradient() -> PixelBuffer {
    let mut data = Vec::new();
    for y in 0..4u8 {
        for x in 0..4u8 {
            data.extend_from_slice(&[x * 60, y * 60, 255 - x * 30, 255]);
        }
    }
    PixelBuffer::from_rgba8(4, 4, data).unwrap()
}

#[test]
fn parses_every_filter_with_defaults() {
    let empty = json!({});
    for name in [
        "negation",
        "grayscale",
        "brightness",
        "contrast",
        "posterize",
        "threshold",
        "auto-contrast",
        "blur",
        "dither",
        "sobel",
        "comic",
    ] {
        let filter = parse_filter(name, &empty).unwrap();
        apply_filter(&filter, &gradient()).unwrap();
    }
}

#[test]
fn unknown_filter_is_a_validation_error() {
    let err = parse_filter("sharpen", &json!({})).unwrap_err();
    assert!(matches!(err, MediaLabError::Validation(_)));
}

#[test]
fn blur_parameters_are_checked_at_parse_time() {
    assert!(parse_filter("blur", &json!({ "kernel_size": 4 })).is_err());
    assert!(parse_filter("blur", &json!({ "border": "mirror" })).is_err());
    assert_eq!(
        parse_filter("blur", &json!({ "kernel_size": "5", "border": "Wrap" })).unwrap(),
        ImageFilter::Blur {
            kernel_size: 5,
            border: BorderMode::Wrap
        }
    );
}

#[test]
fn posterize_with_zero_red_bits_zeroes_red() {
    let filter = parse_filter("posterization", &json!({ "red_bits": 0 })).unwrap();
    let out = apply_filter(&filter, &gradient()).unwrap();
    assert!(out.data().chunks_exact(4).all(|p| p[0] == 0));
    // Other channels keep all 8 bits by default.
    assert_eq!(out.data()[1..3], gradient().data()[1..3]);
}

#[test]
fn posterize_rejects_more_than_eight_bits() {
    assert!(parse_filter("posterize", &json!({ "green_bits": 9 })).is_err());
}

#[test]
fn apply_does_not_touch_the_input() {
    let input = gradient();
    let before = input.clone();
    let out = apply_filter(&ImageFilter::Negation, &input).unwrap();
    assert_eq!(input, before);
    assert_eq!(out.get_pixel(0, 0, BorderMode::Clamp), Rgba8::opaque(255, 255, 0));
}
