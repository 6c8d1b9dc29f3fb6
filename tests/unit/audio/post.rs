use super::*;
use serde_json::json;

fn buf(samples: &[f32]) -> SampleBuffer {
    SampleBuffer::new(samples.to_vec(), 8, 0).unwrap()
}

#[test]
fn reverse_flips_order() {
    let mut b = buf(&[1.0, 2.0, 3.0]);
    reverse(&mut b);
    assert_eq!(b.samples(), &[3.0, 2.0, 1.0]);
}

#[test]
fn boost_normalizes_the_global_peak_to_one() {
    let mut channels = vec![buf(&[0.1, -0.25]), buf(&[0.2, 0.05])];
    let mul = boost(&mut channels);
    assert!((mul - 4.0).abs() < 1e-6);
    let peak = channels.iter().map(SampleBuffer::peak).fold(0.0f32, f32::max);
    assert!((peak - 1.0).abs() < 1e-6);
    assert!((channels[1].samples()[0] - 0.8).abs() < 1e-6);
}

#[test]
fn boost_of_silence_is_identity() {
    let mut channels = vec![buf(&[0.0, 0.0])];
    assert_eq!(boost(&mut channels), 1.0);
    assert_eq!(channels[0].samples(), &[0.0, 0.0]);
}

#[test]
fn echo_with_zero_multiplier_is_identity() {
    let input = [0.5, -0.25, 1.0, 0.75, -1.0, 0.125];
    let mut b = buf(&input);
    echo(&mut b, 0.25, 0.0).unwrap();
    assert_eq!(b.samples(), &input);
}

#[test]
fn echo_feeds_back_through_the_delay_line() {
    // 8 Hz with a 0.25 s delay gives a 2-sample line.
    let mut b = buf(&[1.0, 0.0, 0.0, 0.0, 0.0]);
    echo(&mut b, 0.25, 0.5).unwrap();
    assert_eq!(b.samples(), &[1.0, 0.0, 0.5, 0.0, 0.25]);
}

#[test]
fn echo_shorter_than_a_sample_is_rejected() {
    let mut b = buf(&[1.0]);
    assert!(echo(&mut b, 0.01, 0.5).is_err());
}

#[test]
fn echo_longer_than_the_buffer_is_identity() {
    let input = [1.0, 0.5];
    let mut b = buf(&input);
    echo(&mut b, 1e15, 0.5).unwrap();
    assert_eq!(b.samples(), &input);

    // Exactly the buffer length: the first sample would land past the end.
    let mut b = buf(&input);
    echo(&mut b, 0.25, 0.5).unwrap();
    assert_eq!(b.samples(), &input);
}

#[test]
fn echo_delay_is_bounded_when_parsed() {
    assert!(PostEffect::parse("echo", &json!({ "delay_secs": 1e15 })).is_err());
    assert!(PostEffect::parse("echo", &json!({ "delay_secs": 0 })).is_err());
    assert_eq!(
        PostEffect::parse("echo", &json!({ "delay_secs": MAX_ECHO_DELAY_SECS })).unwrap(),
        PostEffect::Echo {
            delay_secs: MAX_ECHO_DELAY_SECS,
            multiplier: 0.5
        }
    );
}

#[test]
fn tremolo_starts_at_its_trough() {
    let mut b = buf(&[1.0; 8]);
    tremolo(&mut b, 1.0, 1.0);
    assert!(b.samples()[0].abs() < 1e-6);
    // Quarter period in: half depth.
    assert!((b.samples()[2] - 0.5).abs() < 1e-6);
    // Half period in: full amplitude.
    assert!((b.samples()[4] - 1.0).abs() < 1e-6);
}

#[test]
fn dry_tremolo_is_identity() {
    let mut b = buf(&[0.3, -0.6, 0.9]);
    tremolo(&mut b, 3.0, 0.0);
    assert_eq!(b.samples(), &[0.3, -0.6, 0.9]);
}

#[test]
fn adsr_effect_converts_seconds_per_channel() {
    let effect = PostEffect::parse(
        "adsr",
        &json!({
            "attack_secs": 0.5,
            "decay_secs": 0,
            "release_secs": 0.25,
            "sustain_percent": 50
        }),
    )
    .unwrap();
    let mut channels = vec![buf(&[1.0; 8])];
    effect.apply(&mut channels).unwrap();
    assert_eq!(
        channels[0].samples(),
        &[0.0, 0.25, 0.5, 0.75, 0.5, 0.5, 0.5, 0.25]
    );
}

#[test]
fn chain_parses_and_applies_in_order() {
    let chain = parse_post_chain(&json!([
        { "effect": "reverse" },
        { "effect": "boost" },
        { "effect": "no-pp" }
    ]))
    .unwrap();
    assert_eq!(chain, vec![PostEffect::Reverse, PostEffect::Boost, PostEffect::None]);

    let mut channels = vec![buf(&[0.5, 0.25])];
    apply_passes(&mut channels, &chain).unwrap();
    assert_eq!(channels[0].samples(), &[0.5, 1.0]);
}

#[test]
fn unknown_effects_and_bad_params_are_rejected() {
    assert!(PostEffect::parse("flanger", &json!({})).is_err());
    assert!(PostEffect::parse("tremolo", &json!({ "wetness": 2 })).is_err());
    assert!(parse_post_chain(&json!([{ "frequency": 3 }])).is_err());
    assert!(parse_post_chain(&json!({ "effect": "boost" })).is_err());
}
