use super::*;
use crate::foundation::core::Rgba8;

fn checker(w: u32, h: u32) -> PixelBuffer {
    let mut data = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = if (x + y) % 2 == 0 { 240 } else { 16 };
            data.extend_from_slice(&[v, v / 2, 255 - v, 200]);
        }
    }
    PixelBuffer::from_rgba8(w, h, data).unwrap()
}

#[test]
fn kernel_size_1_is_identity() {
    let src = checker(5, 4);
    let mut out = src.same_shape();
    box_blur(&src, &mut out, 1, BorderMode::Clamp).unwrap();
    assert_eq!(out, src);
}

#[test]
fn constant_image_is_unchanged() {
    let src = PixelBuffer::filled(4, 3, Rgba8 { r: 10, g: 20, b: 30, a: 40 }).unwrap();
    let mut out = src.same_shape();
    box_blur(&src, &mut out, 5, BorderMode::Wrap).unwrap();
    assert_eq!(out, src);
}

#[test]
fn spreads_a_single_bright_pixel() {
    let mut src = PixelBuffer::filled(5, 5, Rgba8::BLACK).unwrap();
    src.set_pixel(2, 2, Rgba8::WHITE);
    let mut out = src.same_shape();
    box_blur(&src, &mut out, 3, BorderMode::Clamp).unwrap();

    // 255 / 9 rounds to 28 inside the 3x3 footprint, zero elsewhere.
    assert_eq!(out.get_pixel(1, 1, BorderMode::Clamp).r, 28);
    assert_eq!(out.get_pixel(2, 2, BorderMode::Clamp).g, 28);
    assert_eq!(out.get_pixel(0, 0, BorderMode::Clamp).b, 0);
    assert_eq!(out.get_pixel(2, 2, BorderMode::Clamp).a, 255);
}

#[test]
fn wrap_border_pulls_from_opposite_edge() {
    let mut src = PixelBuffer::filled(3, 1, Rgba8::BLACK).unwrap();
    src.set_pixel(2, 0, Rgba8::opaque(90, 90, 90));
    let mut clamp = src.same_shape();
    let mut wrap = src.same_shape();
    box_blur(&src, &mut clamp, 3, BorderMode::Clamp).unwrap();
    box_blur(&src, &mut wrap, 3, BorderMode::Wrap).unwrap();
    assert_eq!(clamp.get_pixel(0, 0, BorderMode::Clamp).r, 0);
    assert_eq!(wrap.get_pixel(0, 0, BorderMode::Clamp).r, 30);
}

#[test]
fn rejects_even_or_zero_kernels() {
    let src = checker(2, 2);
    let mut out = src.same_shape();
    assert!(box_blur(&src, &mut out, 0, BorderMode::Clamp).is_err());
    assert!(box_blur(&src, &mut out, 4, BorderMode::Clamp).is_err());
}

#[test]
fn widest_kernel_averages_without_overflow() {
    // On a 1x1 image the widest allowed kernel is 3; everything wider is rejected.
    let src = PixelBuffer::filled(1, 1, Rgba8::WHITE).unwrap();
    let mut out = src.same_shape();
    box_blur(&src, &mut out, 3, BorderMode::Clamp).unwrap();
    assert_eq!(out, src);
    assert!(box_blur(&src, &mut out, 5, BorderMode::Clamp).is_err());
    assert!(box_blur(&src, &mut out, 4107, BorderMode::Clamp).is_err());
}

#[test]
fn kernel_twice_the_longest_side_is_accepted() {
    let src = PixelBuffer::filled(3, 2, Rgba8::WHITE).unwrap();
    let mut out = src.same_shape();
    box_blur(&src, &mut out, 7, BorderMode::Wrap).unwrap();
    assert_eq!(out, src);
    assert!(box_blur(&src, &mut out, 9, BorderMode::Wrap).is_err());
}
