use super::*;
use crate::foundation::core::Rgba8;

fn gray_row(values: &[u8]) -> PixelBuffer {
    let mut data = Vec::new();
    for &v in values {
        data.extend_from_slice(&[v, v, v, 255]);
    }
    PixelBuffer::from_rgba8(values.len() as u32, 1, data).unwrap()
}

#[test]
fn histogram_counts_every_pixel() {
    let img = gray_row(&[0, 0, 7, 255]);
    let hist = build_histogram(&img, HistogramChannel::Gray);
    assert_eq!(hist[0], 2);
    assert_eq!(hist[7], 1);
    assert_eq!(hist[255], 1);
    assert_eq!(hist.iter().sum::<u64>(), 4);
}

#[test]
fn min_max_without_ignoring_is_occupied_range() {
    let mut hist = [0u64; 256];
    hist[10] = 3;
    hist[200] = 4;
    assert_eq!(find_min_max(&hist, 0.0), (10, 200));
}

#[test]
fn min_max_skips_ignored_tails() {
    let mut hist = [0u64; 256];
    hist[5] = 1;
    hist[50] = 10;
    hist[150] = 10;
    hist[250] = 1;
    assert_eq!(find_min_max(&hist, 1.0), (50, 150));
    // A bin larger than the remaining budget stops the scan.
    assert_eq!(find_min_max(&hist, 0.5), (5, 250));
}

#[test]
fn gray_auto_contrast_stretches_to_full_range() {
    let img = gray_row(&[50, 100, 150]);
    let mut out = img.same_shape();
    auto_contrast(&img, &mut out, AutoContrastMode::Gray, 0.0).unwrap();
    let reds: Vec<u8> = out.data().chunks_exact(4).map(|p| p[0]).collect();
    assert_eq!(reds, vec![0, 128, 255]);
}

#[test]
fn per_channel_auto_contrast_uses_independent_ranges() {
    let img = PixelBuffer::from_rgba8(
        2,
        1,
        vec![
            10, 100, 0, 255, //
            20, 200, 0, 255,
        ],
    )
    .unwrap();
    let mut out = img.same_shape();
    auto_contrast(&img, &mut out, AutoContrastMode::PerChannel, 0.0).unwrap();
    assert_eq!(out.data(), &[0, 0, 0, 255, 255, 255, 0, 255]);
}

#[test]
fn degenerate_range_is_identity() {
    let img = PixelBuffer::filled(3, 2, Rgba8::opaque(90, 90, 90)).unwrap();
    let mut out = img.same_shape();
    auto_contrast(&img, &mut out, AutoContrastMode::Gray, 0.0).unwrap();
    assert_eq!(out, img);
}

#[test]
fn rejects_out_of_range_percentage() {
    let img = gray_row(&[1, 2]);
    let mut out = img.same_shape();
    assert!(auto_contrast(&img, &mut out, AutoContrastMode::Gray, 1.5).is_err());
}

#[test]
fn parses_modes() {
    assert_eq!(AutoContrastMode::parse("gray").unwrap(), AutoContrastMode::Gray);
    assert_eq!(AutoContrastMode::parse("color").unwrap(), AutoContrastMode::PerChannel);
    assert!(AutoContrastMode::parse("sepia").is_err());
}
