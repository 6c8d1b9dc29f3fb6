use super::*;

fn keyboard() -> VirtualKeyboard<MidiRecorder> {
    let mut kb = VirtualKeyboard::open(MidiRecorder::new()).unwrap();
    kb.out.take();
    kb
}

fn on(pitch: u8, velocity: u8) -> MidiEvent {
    MidiEvent::NoteOn {
        channel: 0,
        pitch,
        velocity,
    }
}

fn off(pitch: u8) -> MidiEvent {
    MidiEvent::NoteOff { channel: 0, pitch }
}

#[test]
fn layout_covers_two_octaves() {
    assert_eq!(key_number('z'), Some(0));
    assert_eq!(key_number('s'), Some(1));
    assert_eq!(key_number('m'), Some(11));
    assert_eq!(key_number('W'), Some(12));
    assert_eq!(key_number('3'), Some(13));
    assert_eq!(key_number('i'), Some(23));
    assert_eq!(key_number('q'), None);

    let mut numbers: Vec<u8> = KEY_LAYOUT.iter().map(|(_, n)| *n).collect();
    numbers.sort_unstable();
    assert_eq!(numbers, (0..KEY_COUNT).collect::<Vec<_>>());
}

#[test]
fn opening_sets_volume_and_trumpet() {
    let kb = VirtualKeyboard::open(MidiRecorder::new()).unwrap();
    assert_eq!(
        kb.output().events(),
        &[
            MidiEvent::Volume {
                channel: 0,
                volume: DEFAULT_VOLUME
            },
            MidiEvent::ProgramChange {
                channel: 0,
                program: DEFAULT_PROGRAM
            },
        ]
    );
}

#[test]
fn pitch_is_lowest_plus_key_number() {
    let mut kb = keyboard();
    kb.set_lowest_pitch(48).unwrap();
    kb.set_velocity(100).unwrap();
    assert!(kb.key_down('e').unwrap());
    assert!(kb.key_up('e').unwrap());
    assert_eq!(kb.out.take(), vec![on(62, 100), off(62)]);
}

#[test]
fn held_keys_ignore_auto_repeat() {
    let mut kb = keyboard();
    assert!(kb.key_down('z').unwrap());
    assert!(!kb.key_down('z').unwrap());
    assert!(kb.is_sounding(0));
    assert!(!kb.key_down('q').unwrap());
    assert_eq!(kb.out.events().len(), 1);

    kb.key_up('z').unwrap();
    assert!(!kb.is_sounding(0));
    assert!(kb.key_down('z').unwrap());
}

#[test]
fn chords_add_thirds_and_fifths() {
    assert_eq!(PlayMode::Single.chord(60), vec![60]);
    assert_eq!(PlayMode::Major.chord(60), vec![60, 64, 67]);
    assert_eq!(PlayMode::Minor.chord(60), vec![60, 63, 67]);
    // Chord notes past the top of the piano are dropped; the root always plays.
    assert_eq!(PlayMode::Major.chord(103), vec![103, 107]);
    assert_eq!(PlayMode::Minor.chord(106), vec![106]);
    assert_eq!(PlayMode::Major.chord(120), vec![120]);
}

#[test]
fn release_stops_the_notes_that_were_started() {
    let mut kb = keyboard();
    kb.set_mode(PlayMode::Major);
    kb.key_down('c').unwrap();
    kb.set_mode(PlayMode::Single);
    kb.set_lowest_pitch(30).unwrap();
    kb.key_up('c').unwrap();

    assert_eq!(
        kb.out.take(),
        vec![on(64, 80), on(68, 80), on(71, 80), off(64), off(68), off(71)]
    );
}

#[test]
fn mouse_release_stops_the_last_pressed_key() {
    let mut kb = keyboard();
    assert!(kb.mouse_down(5).unwrap());
    assert!(kb.mouse_up().unwrap());
    assert!(!kb.mouse_up().unwrap());
    assert_eq!(kb.out.take(), vec![on(65, 80), off(65)]);
    assert!(kb.mouse_down(KEY_COUNT).is_err());
}

#[test]
fn instrument_menu_is_one_based() {
    let mut kb = keyboard();
    kb.select_instrument(1).unwrap();
    kb.select_instrument(128).unwrap();
    assert!(kb.select_instrument(0).is_err());
    assert!(kb.select_instrument(129).is_err());
    assert_eq!(
        kb.out.take(),
        vec![
            MidiEvent::ProgramChange {
                channel: 0,
                program: 0
            },
            MidiEvent::ProgramChange {
                channel: 0,
                program: 127
            },
        ]
    );
}

#[test]
fn settings_stay_in_midi_range() {
    let mut kb = keyboard();
    assert!(kb.set_lowest_pitch(104).is_ok());
    assert!(kb.set_lowest_pitch(105).is_err());
    assert!(kb.set_velocity(128).is_err());
    assert!(PlayMode::parse("Major").is_ok());
    assert!(PlayMode::parse("seventh").is_err());
}

#[test]
fn events_serialize_with_a_type_tag() {
    let json = serde_json::to_value(off(60)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "note_off", "channel": 0, "pitch": 60})
    );
}
