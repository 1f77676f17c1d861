//! Pattern events.

use crate::tuning::{ALT_EDO_DIVISIONS, MAX_OCTAVE};

/// What a pattern cell tells its track to do.
///
/// A command byte outside the known range is kept as [`Command::Unknown`] so
/// a loaded song saves back byte for byte. Playback treats it as a NOP.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Command {
    /// Nothing happens on this track
    #[default]
    Nop,
    /// Release the track's note
    NoteOff,
    /// Note in the song's equal division of the octave
    NoteOn,
    /// Note as a just-intonation ratio against 440 Hz
    JustNoteOn,
    /// Note in the alternate (31-tone) equal division
    AltEdoNoteOn,
    /// Unrecognized command byte
    Unknown(u8),
}

impl Command {
    /// Decode a command byte. Returns `None` for unknown values.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match Self::from_byte(value) {
            Command::Unknown(_) => None,
            known => Some(known),
        }
    }

    /// Decode a command byte, keeping unknown values.
    pub const fn from_byte(value: u8) -> Self {
        match value {
            0 => Command::Nop,
            1 => Command::NoteOff,
            2 => Command::NoteOn,
            3 => Command::JustNoteOn,
            4 => Command::AltEdoNoteOn,
            other => Command::Unknown(other),
        }
    }

    /// The command byte used in the song image.
    pub const fn as_u8(self) -> u8 {
        match self {
            Command::Nop => 0,
            Command::NoteOff => 1,
            Command::NoteOn => 2,
            Command::JustNoteOn => 3,
            Command::AltEdoNoteOn => 4,
            Command::Unknown(byte) => byte,
        }
    }

    /// True for the three note-on variants.
    pub const fn is_note_on(self) -> bool {
        matches!(
            self,
            Command::NoteOn | Command::JustNoteOn | Command::AltEdoNoteOn
        )
    }
}

/// A single pattern cell.
///
/// `octave` and `degree` only mean something for note-on commands, and what
/// they mean depends on the command (see [`crate::tuning`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Event {
    pub command: Command,
    pub octave: u8,
    pub degree: u8,
}

impl Event {
    /// An empty cell.
    pub const fn nop() -> Self {
        Self {
            command: Command::Nop,
            octave: 0,
            degree: 0,
        }
    }

    pub const fn note_off() -> Self {
        Self {
            command: Command::NoteOff,
            octave: 0,
            degree: 0,
        }
    }

    /// Note-on in the song's tuning.
    pub const fn note_on(octave: u8, degree: u8) -> Self {
        Self {
            command: Command::NoteOn,
            octave,
            degree,
        }
    }

    /// Note-on in 31-EDO.
    pub const fn alt_edo_note_on(octave: u8, degree: u8) -> Self {
        Self {
            command: Command::AltEdoNoteOn,
            octave,
            degree,
        }
    }

    /// Just-intonation note-on playing `numerator/denominator` times 440 Hz.
    ///
    /// Stored as `octave = numerator - 1`, `degree = denominator - 1`.
    pub const fn just_note_on(numerator: u8, denominator: u8) -> Self {
        Self {
            command: Command::JustNoteOn,
            octave: numerator.saturating_sub(1),
            degree: denominator.saturating_sub(1),
        }
    }

    /// Returns true if the cell does nothing.
    pub fn is_nop(&self) -> bool {
        self.command == Command::Nop
    }

    /// Transpose an equal-division note by `delta` degrees.
    ///
    /// Whole octaves carry into `octave`, which is clamped to `0..=7`.
    /// Only [`Command::NoteOn`] (in `song_divisions`) and
    /// [`Command::AltEdoNoteOn`] (in 31) move; every other event is
    /// returned unchanged.
    pub fn transposed(self, delta: i32, song_divisions: u8) -> Self {
        let divisions = match self.command {
            Command::NoteOn => song_divisions as i32,
            Command::AltEdoNoteOn => ALT_EDO_DIVISIONS as i32,
            _ => return self,
        };
        if divisions == 0 {
            return self;
        }

        let steps = self.degree as i32 + delta;
        let octave = (self.octave as i32 + steps.div_euclid(divisions)).clamp(0, MAX_OCTAVE as i32);
        Self {
            octave: octave as u8,
            degree: steps.rem_euclid(divisions) as u8,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes_roundtrip() {
        for byte in 0..=4u8 {
            let cmd = Command::from_u8(byte).unwrap();
            assert_eq!(cmd.as_u8(), byte);
        }
        assert_eq!(Command::from_u8(5), None);
        assert_eq!(Command::from_u8(255), None);
    }

    #[test]
    fn unknown_bytes_are_kept() {
        let cmd = Command::from_byte(42);
        assert_eq!(cmd, Command::Unknown(42));
        assert_eq!(cmd.as_u8(), 42);
        assert!(!cmd.is_note_on());
        assert_eq!(Command::from_byte(3), Command::JustNoteOn);
    }

    #[test]
    fn default_event_is_nop() {
        assert!(Event::default().is_nop());
        assert_eq!(Event::default(), Event::nop());
    }

    #[test]
    fn just_note_on_stores_offsets() {
        let ev = Event::just_note_on(3, 2);
        assert_eq!(ev.command, Command::JustNoteOn);
        assert_eq!(ev.octave, 2);
        assert_eq!(ev.degree, 1);
    }

    #[test]
    fn transpose_carries_into_next_octave() {
        let ev = Event::note_on(3, 52).transposed(1, 53);
        assert_eq!(ev, Event::note_on(4, 0));
    }

    #[test]
    fn transpose_borrows_from_previous_octave() {
        let ev = Event::note_on(3, 0).transposed(-1, 53);
        assert_eq!(ev, Event::note_on(2, 52));
    }

    #[test]
    fn transpose_clamps_octave() {
        assert_eq!(Event::note_on(7, 52).transposed(1, 53), Event::note_on(7, 0));
        assert_eq!(Event::note_on(0, 0).transposed(-1, 53), Event::note_on(0, 52));
    }

    #[test]
    fn transpose_alt_edo_uses_31() {
        let ev = Event::alt_edo_note_on(2, 30).transposed(1, 53);
        assert_eq!(ev, Event::alt_edo_note_on(3, 0));
    }

    #[test]
    fn transpose_ignores_other_commands() {
        let ji = Event::just_note_on(3, 2);
        assert_eq!(ji.transposed(5, 53), ji);
        assert_eq!(Event::note_off().transposed(5, 53), Event::note_off());
        assert_eq!(Event::nop().transposed(5, 53), Event::nop());
    }
}
