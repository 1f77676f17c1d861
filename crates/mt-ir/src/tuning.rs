//! Pitch tables: event (octave, degree) to frequency.
//!
//! Three note-on flavours exist:
//! - [`Command::NoteOn`]: degree of the song's equal division. In 53-EDO a
//!   set of degrees is replaced by the just interval they approximate;
//!   every other degree (and every other division) uses the pure
//!   equal-step formula.
//! - [`Command::AltEdoNoteOn`]: the same formula in 31-EDO.
//! - [`Command::JustNoteOn`]: the ratio `(octave+1)/(degree+1)` of 440 Hz.
//!
//! EDO notes are scaled from [`EDO_BASE_HZ`]: `f = 8 * 2^octave * ratio`.

use crate::event::{Command, Event};

/// Frequency of octave 0, degree 0 for equal-division notes.
pub const EDO_BASE_HZ: f64 = 8.0;

/// Reference pitch for just-intonation ratios.
pub const JUST_REFERENCE_HZ: f64 = 440.0;

/// Divisions used by [`Command::AltEdoNoteOn`].
pub const ALT_EDO_DIVISIONS: u8 = 31;

/// Highest octave an equal-division note can reach.
pub const MAX_OCTAVE: u8 = 7;

const DIATONIC_53_EDO: [u8; 7] = [0, 9, 17, 22, 31, 39, 48];
const DIATONIC_31_EDO: [u8; 7] = [0, 5, 10, 13, 18, 23, 28];

/// Just interval approximated by a 53-EDO degree, if one is named.
fn named_interval_53(degree: u8) -> Option<f64> {
    Some(match degree {
        0 => 1.0,
        7 => 35.0 / 32.0,
        8 => 10.0 / 9.0,
        9 => 9.0 / 8.0,
        14 => 6.0 / 5.0,
        17 => 5.0 / 4.0,
        18 => 80.0 / 63.0,
        21 => 21.0 / 16.0,
        22 => 4.0 / 3.0,
        24 => 11.0 / 8.0,
        25 => 25.0 / 18.0,
        26 => 45.0 / 32.0,
        29 => 35.0 / 24.0,
        31 => 3.0 / 2.0,
        34 => 25.0 / 16.0,
        36 => 8.0 / 5.0,
        37 => 13.0 / 8.0,
        39 => 5.0 / 3.0,
        40 => 27.0 / 16.0,
        43 => 7.0 / 4.0,
        44 => 16.0 / 9.0,
        45 => 9.0 / 5.0,
        48 => 15.0 / 8.0,
        49 => 40.0 / 21.0,
        _ => return None,
    })
}

/// Ratio of an equal-division note to [`EDO_BASE_HZ`].
pub fn edo_ratio(octave: u8, degree: u8, divisions: u8) -> f64 {
    let named = if divisions == 53 {
        named_interval_53(degree)
    } else {
        None
    };
    match named {
        Some(ratio) => libm::exp2(octave as f64) * ratio,
        None => {
            let divisions = divisions.max(1) as f64;
            libm::exp2(octave as f64 + degree as f64 / divisions)
        }
    }
}

/// Ratio of a just-intonation note to [`JUST_REFERENCE_HZ`].
pub fn just_ratio(octave: u8, degree: u8) -> f64 {
    (octave as f64 + 1.0) / (degree as f64 + 1.0)
}

/// Frequency in Hz of a note-on event.
///
/// `None` for NOP, note-off and unknown commands, and for equal-division
/// notes above [`MAX_OCTAVE`].
pub fn event_frequency(event: &Event, song_divisions: u8) -> Option<f64> {
    let edo = |divisions| {
        (event.octave <= MAX_OCTAVE)
            .then(|| EDO_BASE_HZ * edo_ratio(event.octave, event.degree, divisions))
    };
    match event.command {
        Command::NoteOn => edo(song_divisions),
        Command::AltEdoNoteOn => edo(ALT_EDO_DIVISIONS),
        Command::JustNoteOn => Some(JUST_REFERENCE_HZ * just_ratio(event.octave, event.degree)),
        Command::Nop | Command::NoteOff | Command::Unknown(_) => None,
    }
}

/// How the editor turns a diatonic key into an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TuningMode {
    #[default]
    Edo53,
    Edo31,
    Just,
}

impl TuningMode {
    /// Note-on for diatonic step `diatonic` (0-6) in `octave`.
    ///
    /// Returns `None` in [`TuningMode::Just`], where notes are entered as
    /// ratios with [`Event::just_note_on`], or for a step past the scale.
    pub fn note_on(self, octave: u8, diatonic: usize) -> Option<Event> {
        match self {
            TuningMode::Edo53 => DIATONIC_53_EDO
                .get(diatonic)
                .map(|&degree| Event::note_on(octave, degree)),
            TuningMode::Edo31 => DIATONIC_31_EDO
                .get(diatonic)
                .map(|&degree| Event::alt_edo_note_on(octave, degree)),
            TuningMode::Just => None,
        }
    }
}
