//! Fixed-size song image.
//!
//! Layout, no header or version:
//! 1 byte tuning divisor, 256 bytes order list, then 255 patterns of
//! 64 lines x 4 tracks x (command, octave, degree).

use std::fs;
use std::io::Cursor;
use std::path::Path;

use binrw::{BinRead, BinWrite};
use log::{info, warn};
use mt_ir::tuning::MAX_OCTAVE;
use mt_ir::{
    Command, Event, Pattern, Song, ORDER_CAPACITY, PATTERN_LINES, SONG_PATTERNS, TRACKS,
};

use crate::FormatError;

const EVENT_SIZE: usize = 3;

/// Exact byte length of a song image.
pub const SONG_IMAGE_SIZE: usize =
    1 + ORDER_CAPACITY + SONG_PATTERNS * PATTERN_LINES * TRACKS * EVENT_SIZE;

#[derive(BinRead, BinWrite, Clone, Copy, Default)]
struct RawEvent {
    command: u8,
    octave: u8,
    degree: u8,
}

#[derive(BinRead, BinWrite)]
struct RawPattern {
    lines: [[RawEvent; TRACKS]; PATTERN_LINES],
}

#[derive(BinRead, BinWrite)]
#[brw(little)]
struct RawSong {
    divisions: u8,
    order: [u8; ORDER_CAPACITY],
    #[br(count = SONG_PATTERNS)]
    patterns: Vec<RawPattern>,
}

impl RawSong {
    fn from_song(song: &Song) -> Self {
        let patterns = song
            .patterns()
            .iter()
            .map(|pattern| {
                let mut lines = [[RawEvent::default(); TRACKS]; PATTERN_LINES];
                for (raw_line, line) in lines.iter_mut().zip(pattern.lines()) {
                    for (raw, event) in raw_line.iter_mut().zip(line) {
                        *raw = RawEvent {
                            command: event.command.as_u8(),
                            octave: event.octave,
                            degree: event.degree,
                        };
                    }
                }
                RawPattern { lines }
            })
            .collect();

        Self {
            divisions: song.divisions,
            order: *song.order(),
            patterns,
        }
    }

    /// Cells keep their raw bytes so the image saves back unchanged.
    /// Unknown commands play as NOP and out-of-range EDO octaves stay silent.
    fn into_song(self) -> Song {
        let mut unknown = 0usize;
        let mut out_of_range = 0usize;
        let mut patterns = Vec::with_capacity(self.patterns.len());

        for raw_pattern in &self.patterns {
            let mut pattern = Pattern::new();
            for (line, raw_line) in raw_pattern.lines.iter().enumerate() {
                for (track, raw) in raw_line.iter().enumerate() {
                    let command = Command::from_byte(raw.command);
                    match command {
                        Command::Unknown(_) => unknown += 1,
                        Command::NoteOn | Command::AltEdoNoteOn if raw.octave > MAX_OCTAVE => {
                            out_of_range += 1
                        }
                        _ => {}
                    }
                    *pattern.event_mut(line, track) = Event {
                        command,
                        octave: raw.octave,
                        degree: raw.degree,
                    };
                }
            }
            patterns.push(pattern);
        }

        if unknown > 0 {
            warn!("song image: {} cells with unknown commands play as NOP", unknown);
        }
        if out_of_range > 0 {
            warn!(
                "song image: {} notes above octave {} will not sound",
                out_of_range, MAX_OCTAVE
            );
        }
        Song::from_parts(self.divisions, self.order, patterns)
    }
}

/// Encode a song as a song image.
pub fn song_to_bytes(song: &Song) -> Result<Vec<u8>, FormatError> {
    let mut cursor = Cursor::new(Vec::with_capacity(SONG_IMAGE_SIZE));
    RawSong::from_song(song).write(&mut cursor)?;
    Ok(cursor.into_inner())
}

/// Decode a song image. The input must be exactly [`SONG_IMAGE_SIZE`] bytes.
pub fn song_from_bytes(data: &[u8]) -> Result<Song, FormatError> {
    if data.len() < SONG_IMAGE_SIZE {
        return Err(FormatError::UnexpectedEof {
            expected: SONG_IMAGE_SIZE,
            actual: data.len(),
        });
    }
    if data.len() > SONG_IMAGE_SIZE {
        return Err(FormatError::TrailingData {
            expected: SONG_IMAGE_SIZE,
            actual: data.len(),
        });
    }

    let raw = RawSong::read(&mut Cursor::new(data))?;
    Ok(raw.into_song())
}

/// Write a song image to `path`. On error the file may be incomplete.
pub fn save_song(song: &Song, path: impl AsRef<Path>) -> Result<(), FormatError> {
    let path = path.as_ref();
    let bytes = song_to_bytes(song)?;
    fs::write(path, &bytes)?;
    info!("saved {} ({} patterns in order)", path.display(), song.order_length());
    Ok(())
}

/// Read a song image from `path`.
pub fn load_song(path: impl AsRef<Path>) -> Result<Song, FormatError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let song = song_from_bytes(&data)?;
    info!("loaded {} ({} patterns in order)", path.display(), song.order_length());
    Ok(song)
}

/// Replace `song` with the image at `path`. On error `song` is untouched.
pub fn load_song_into(song: &mut Song, path: impl AsRef<Path>) -> Result<(), FormatError> {
    *song = load_song(path)?;
    Ok(())
}
