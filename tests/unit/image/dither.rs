use super::*;
use crate::foundation::core::Rgba8;

#[test]
fn bayer2_black_stays_black_and_white_stays_white() {
    for (v, expected) in [(0u8, 0u8), (255, 255)] {
        let img = PixelBuffer::filled(4, 4, Rgba8::opaque(v, v, v)).unwrap();
        let mut out = img.same_shape();
        dither(&img, &mut out, DitherMatrix::Bayer2).unwrap();
        for px in out.data().chunks_exact(4) {
            assert_eq!(&px[..3], &[expected; 3]);
        }
    }
}

#[test]
fn bayer2_mid_gray_produces_a_pattern() {
    // 128/255*5 ~= 2.5: above thresholds 1 and 2, below 3 and 4.
    let img = PixelBuffer::filled(2, 2, Rgba8::opaque(128, 128, 128)).unwrap();
    let mut out = img.same_shape();
    dither(&img, &mut out, DitherMatrix::Bayer2).unwrap();
    let reds: Vec<u8> = out.data().chunks_exact(4).map(|p| p[0]).collect();
    assert_eq!(reds, vec![255, 0, 0, 255]);
}

#[test]
fn matrix_tiles_across_the_image() {
    assert_eq!(DitherMatrix::Bayer4.threshold(0, 0), 1.0);
    assert_eq!(DitherMatrix::Bayer4.threshold(4, 4), 1.0);
    assert_eq!(DitherMatrix::Bayer4.threshold(5, 3), 8.0);
    assert_eq!(DitherMatrix::Bayer2.threshold(3, 1), 2.0);
}

#[test]
fn level_counts_match_matrix_family() {
    assert_eq!(DitherMatrix::Bayer2.levels(), 5.0);
    assert_eq!(DitherMatrix::Bayer4.levels(), 17.0);
    assert_eq!(DitherMatrix::Line.levels(), 100.0);
    assert_eq!(DitherMatrix::Diamond.levels(), 100.0);
}

#[test]
fn alpha_is_preserved() {
    let img = PixelBuffer::filled(2, 2, Rgba8 { r: 9, g: 9, b: 9, a: 33 }).unwrap();
    let mut out = img.same_shape();
    dither(&img, &mut out, DitherMatrix::Diamond).unwrap();
    assert!(out.data().chunks_exact(4).all(|p| p[3] == 33));
}

#[test]
fn parses_names() {
    assert_eq!(DitherMatrix::parse("Bayer4").unwrap(), DitherMatrix::Bayer4);
    assert!(DitherMatrix::parse("floyd").is_err());
}
