//! Fixed-size pattern grid.

use crate::event::Event;

/// Number of lines in every pattern.
pub const PATTERN_LINES: usize = 64;

/// Number of tracks in every pattern.
pub const TRACKS: usize = 4;

/// One pattern line: an event per track.
pub type Line = [Event; TRACKS];

/// A 64-line by 4-track grid of events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    lines: [Line; PATTERN_LINES],
}

impl Pattern {
    /// Create a pattern with every cell empty.
    pub const fn new() -> Self {
        Self {
            lines: [[Event::nop(); TRACKS]; PATTERN_LINES],
        }
    }

    /// Get a reference to a cell.
    pub fn event(&self, line: usize, track: usize) -> &Event {
        debug_assert!(line < PATTERN_LINES);
        debug_assert!(track < TRACKS);
        &self.lines[line][track]
    }

    /// Get a mutable reference to a cell.
    pub fn event_mut(&mut self, line: usize, track: usize) -> &mut Event {
        debug_assert!(line < PATTERN_LINES);
        debug_assert!(track < TRACKS);
        &mut self.lines[line][track]
    }

    /// All events on one line.
    pub fn line(&self, line: usize) -> &Line {
        &self.lines[line]
    }

    pub fn line_mut(&mut self, line: usize) -> &mut Line {
        &mut self.lines[line]
    }

    /// Lines in playback order.
    pub fn lines(&self) -> &[Line; PATTERN_LINES] {
        &self.lines
    }

    /// Returns true if every track on the line is NOP.
    pub fn line_is_empty(&self, line: usize) -> bool {
        self.lines[line].iter().all(Event::is_nop)
    }

    /// Returns true if every cell in the pattern is NOP.
    pub fn is_empty(&self) -> bool {
        (0..PATTERN_LINES).all(|line| self.line_is_empty(line))
    }

    /// Reset every cell to NOP.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new()
    }
}
