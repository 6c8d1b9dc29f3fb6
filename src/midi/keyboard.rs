use std::collections::BTreeMap;

use crate::foundation::error::{MediaLabError, MediaLabResult};

/// Number of playable keys: two octaves.
pub const KEY_COUNT: u8 = 24;
/// Chord notes above this pitch are not sent.
pub const MAX_CHORD_PITCH: u8 = 108;
/// General MIDI "trumpet", selected when a keyboard is opened.
pub const DEFAULT_PROGRAM: u8 = 56;
pub const DEFAULT_VOLUME: u8 = 127;

const MAX_MIDI_VALUE: u8 = 127;

/// Computer-key to key-number layout. Bottom row and `s d g h j` are the first octave, the
/// `w`..`i` row and `3 4 6 7 8` the second.
const KEY_LAYOUT: [(char, u8); KEY_COUNT as usize] = [
    ('z', 0),
    ('s', 1),
    ('x', 2),
    ('d', 3),
    ('c', 4),
    ('v', 5),
    ('g', 6),
    ('b', 7),
    ('h', 8),
    ('n', 9),
    ('j', 10),
    ('m', 11),
    ('w', 12),
    ('3', 13),
    ('e', 14),
    ('4', 15),
    ('r', 16),
    ('t', 17),
    ('6', 18),
    ('y', 19),
    ('7', 20),
    ('u', 21),
    ('8', 22),
    ('i', 23),
];

/// Key number for a computer key, if it is part of the keyboard layout.
pub fn key_number(key: char) -> Option<u8> {
    let key = key.to_ascii_lowercase();
    KEY_LAYOUT
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, n)| *n)
}

/// MIDI output device. Channel, pitch, velocity and program are 7-bit values.
pub trait MidiOut {
    fn note_on(&mut self, channel: u8, pitch: u8, velocity: u8) -> MediaLabResult<()>;
    fn note_off(&mut self, channel: u8, pitch: u8) -> MediaLabResult<()>;
    fn program_change(&mut self, channel: u8, program: u8) -> MediaLabResult<()>;
    fn set_volume(&mut self, channel: u8, volume: u8) -> MediaLabResult<()>;
}

/// One message sent to a [`MidiOut`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MidiEvent {
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    NoteOff { channel: u8, pitch: u8 },
    ProgramChange { channel: u8, program: u8 },
    Volume { channel: u8, volume: u8 },
}

/// [`MidiOut`] that keeps every message in order.
#[derive(Clone, Debug, Default)]
pub struct MidiRecorder {
    events: Vec<MidiEvent>,
}

impl MidiRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MidiEvent] {
        &self.events
    }

    /// Drain the recorded messages.
    pub fn take(&mut self) -> Vec<MidiEvent> {
        std::mem::take(&mut self.events)
    }
}

impl MidiOut for MidiRecorder {
    fn note_on(&mut self, channel: u8, pitch: u8, velocity: u8) -> MediaLabResult<()> {
        self.events.push(MidiEvent::NoteOn {
            channel,
            pitch,
            velocity,
        });
        Ok(())
    }

    fn note_off(&mut self, channel: u8, pitch: u8) -> MediaLabResult<()> {
        self.events.push(MidiEvent::NoteOff { channel, pitch });
        Ok(())
    }

    fn program_change(&mut self, channel: u8, program: u8) -> MediaLabResult<()> {
        self.events
            .push(MidiEvent::ProgramChange { channel, program });
        Ok(())
    }

    fn set_volume(&mut self, channel: u8, volume: u8) -> MediaLabResult<()> {
        self.events.push(MidiEvent::Volume { channel, volume });
        Ok(())
    }
}

/// Notes sounded for each key press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayMode {
    #[default]
    Single,
    /// Root, major third and fifth.
    Major,
    /// Root, minor third and fifth.
    Minor,
}

impl PlayMode {
    pub fn parse(s: &str) -> MediaLabResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            other => Err(MediaLabError::validation(format!(
                "unknown play mode '{other}'"
            ))),
        }
    }

    fn intervals(self) -> &'static [u8] {
        match self {
            Self::Single => &[],
            Self::Major => &[4, 7],
            Self::Minor => &[3, 7],
        }
    }

    /// Pitches sounded for a root pitch.
    pub fn chord(self, root: u8) -> Vec<u8> {
        let mut notes = vec![root];
        notes.extend(
            self.intervals()
                .iter()
                .map(|i| u16::from(root) + u16::from(*i))
                .filter(|p| *p <= u16::from(MAX_CHORD_PITCH))
                .map(|p| p as u8),
        );
        notes
    }
}

/// Two-octave virtual keyboard driving a [`MidiOut`].
///
/// Each held key remembers the pitches it sounded, so releasing it stops exactly those notes even
/// if the lowest pitch or play mode changed in between.
#[derive(Debug)]
pub struct VirtualKeyboard<O> {
    out: O,
    channel: u8,
    lowest_pitch: u8,
    velocity: u8,
    mode: PlayMode,
    sounding: BTreeMap<u8, Vec<u8>>,
    mouse_key: Option<u8>,
}

impl<O: MidiOut> VirtualKeyboard<O> {
    /// Wrap `out` on channel 0, set full volume and select [`DEFAULT_PROGRAM`].
    pub fn open(mut out: O) -> MediaLabResult<Self> {
        out.set_volume(0, DEFAULT_VOLUME)?;
        out.program_change(0, DEFAULT_PROGRAM)?;
        Ok(Self {
            out,
            channel: 0,
            lowest_pitch: 60,
            velocity: 80,
            mode: PlayMode::Single,
            sounding: BTreeMap::new(),
            mouse_key: None,
        })
    }

    pub fn lowest_pitch(&self) -> u8 {
        self.lowest_pitch
    }

    /// Pitch of key 0. The top key must stay within MIDI range.
    pub fn set_lowest_pitch(&mut self, pitch: u8) -> MediaLabResult<()> {
        if u16::from(pitch) + u16::from(KEY_COUNT - 1) > u16::from(MAX_MIDI_VALUE) {
            return Err(MediaLabError::validation(format!(
                "lowest pitch {pitch} puts the top key above {MAX_MIDI_VALUE}"
            )));
        }
        self.lowest_pitch = pitch;
        Ok(())
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: u8) -> MediaLabResult<()> {
        if velocity > MAX_MIDI_VALUE {
            return Err(MediaLabError::validation(format!(
                "velocity must be <= {MAX_MIDI_VALUE}, got {velocity}"
            )));
        }
        self.velocity = velocity;
        Ok(())
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlayMode) {
        self.mode = mode;
    }

    /// Select an instrument by its 1-based menu number (General MIDI program + 1).
    pub fn select_instrument(&mut self, menu_number: u8) -> MediaLabResult<()> {
        if !(1..=128).contains(&menu_number) {
            return Err(MediaLabError::validation(format!(
                "instrument number must be in 1..=128, got {menu_number}"
            )));
        }
        tracing::debug!(program = menu_number - 1, "program change");
        self.out.program_change(self.channel, menu_number - 1)
    }

    /// Whether a key number is currently sounding.
    pub fn is_sounding(&self, key_number: u8) -> bool {
        self.sounding.contains_key(&key_number)
    }

    /// Handle a computer key press. Returns whether it started notes; unmapped keys and
    /// auto-repeat of a held key are ignored.
    pub fn key_down(&mut self, key: char) -> MediaLabResult<bool> {
        match key_number(key) {
            Some(n) => self.press(n),
            None => Ok(false),
        }
    }

    /// Handle a computer key release. Returns whether it stopped notes.
    pub fn key_up(&mut self, key: char) -> MediaLabResult<bool> {
        match key_number(key) {
            Some(n) => self.release(n),
            None => Ok(false),
        }
    }

    /// Handle a mouse press on an on-screen key.
    pub fn mouse_down(&mut self, key_number: u8) -> MediaLabResult<bool> {
        if key_number >= KEY_COUNT {
            return Err(MediaLabError::validation(format!(
                "key number must be < {KEY_COUNT}, got {key_number}"
            )));
        }
        let started = self.press(key_number)?;
        if started {
            self.mouse_key = Some(key_number);
        }
        Ok(started)
    }

    /// Handle a mouse release anywhere; stops the key the mouse last pressed.
    pub fn mouse_up(&mut self) -> MediaLabResult<bool> {
        match self.mouse_key.take() {
            Some(n) => self.release(n),
            None => Ok(false),
        }
    }

    fn press(&mut self, key_number: u8) -> MediaLabResult<bool> {
        if self.is_sounding(key_number) {
            return Ok(false);
        }
        let notes = self.mode.chord(self.lowest_pitch + key_number);
        for pitch in &notes {
            self.out.note_on(self.channel, *pitch, self.velocity)?;
        }
        tracing::debug!(key_number, ?notes, "note on");
        self.sounding.insert(key_number, notes);
        Ok(true)
    }

    fn release(&mut self, key_number: u8) -> MediaLabResult<bool> {
        let Some(notes) = self.sounding.remove(&key_number) else {
            return Ok(false);
        };
        for pitch in &notes {
            self.out.note_off(self.channel, *pitch)?;
        }
        tracing::debug!(key_number, ?notes, "note off");
        Ok(true)
    }

    pub fn output(&self) -> &O {
        &self.out
    }

    pub fn into_output(self) -> O {
        self.out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/midi/keyboard.rs"]
mod tests;
