use super::*;

#[test]
fn zero_sample_rate_is_rejected() {
    assert!(SampleBuffer::new(vec![0.0], 0, 0).is_err());
}

#[test]
fn time_follows_sample_rate() {
    let buf = SampleBuffer::silent(8, 4, 0).unwrap();
    assert_eq!(buf.time_at(2), 0.5);
    assert_eq!(buf.duration_secs(), 2.0);
}

#[test]
fn peak_is_absolute() {
    let buf = SampleBuffer::new(vec![0.25, -0.75, 0.5], 10, 0).unwrap();
    assert_eq!(buf.peak(), 0.75);
    assert_eq!(SampleBuffer::silent(0, 10, 0).unwrap().peak(), 0.0);
}

#[test]
fn interleave_alternates_channels() {
    let l = SampleBuffer::new(vec![1.0, 2.0], 10, 0).unwrap();
    let r = SampleBuffer::new(vec![-1.0, -2.0], 10, 1).unwrap();
    assert_eq!(interleave(&[l.clone(), r]).unwrap(), vec![1.0, -1.0, 2.0, -2.0]);

    let short = SampleBuffer::new(vec![0.0], 10, 1).unwrap();
    assert!(interleave(&[l, short]).is_err());
}

#[test]
fn f32le_file_holds_four_bytes_per_sample() {
    let dir = std::env::temp_dir().join(format!("medialab_f32le_{}", std::process::id()));
    let path = dir.join("nested").join("out.f32le");
    write_samples_f32le(&[0.5, -1.0], &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 0.5);
    assert_eq!(f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), -1.0);
    let _ = std::fs::remove_dir_all(&dir);
}
