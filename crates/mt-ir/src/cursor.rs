//! Song position and navigation.

use crate::pattern::PATTERN_LINES;
use crate::song::{OrderEntry, Song, ORDER_CAPACITY};

/// A position in a song: an order slot and a pattern line.
///
/// The cursor does not borrow the song. Every navigation call takes the song
/// and recomputes the order length, so a cursor stays usable across edits as
/// long as [`SongCursor::normalize`] is called after the order list changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SongCursor {
    order_pos: u8,
    line: u8,
}

impl SongCursor {
    /// Cursor at the given order slot and line.
    pub const fn new(order_pos: u8, line: u8) -> Self {
        debug_assert!((line as usize) < PATTERN_LINES);
        Self { order_pos, line }
    }

    /// Order slot 0, line 0.
    pub const fn start() -> Self {
        Self::new(0, 0)
    }

    pub fn order_pos(&self) -> usize {
        self.order_pos as usize
    }

    pub fn line(&self) -> usize {
        self.line as usize
    }

    /// Same order slot, line 0.
    pub fn line_start(&self) -> Self {
        Self::new(self.order_pos, 0)
    }

    /// Pattern the cursor is in.
    pub fn pattern(&self, song: &Song) -> OrderEntry {
        song.order_entry(self.order_pos())
    }

    /// Returns true at order slot 0, line 0.
    pub fn is_at_beginning_of_song(&self) -> bool {
        self.order_pos == 0 && self.line == 0
    }

    /// Move by `delta` order slots, wrapping modulo the song's current order
    /// length.
    pub fn move_order_pos(&mut self, song: &Song, delta: i32) {
        let order_length = song.order_length() as i32;
        if order_length == 0 {
            self.order_pos = 0;
            return;
        }
        self.order_pos = (self.order_pos as i32 + delta).rem_euclid(order_length) as u8;
    }

    /// Move by `delta` lines. Every time the line leaves the pattern one order
    /// step is carried, so large deltas walk across several patterns.
    pub fn move_pat_line(&mut self, song: &Song, delta: i32) {
        let lines = PATTERN_LINES as i32;
        let mut line = self.line as i32 + delta;
        while line >= lines {
            line -= lines;
            self.move_order_pos(song, 1);
        }
        while line < 0 {
            line += lines;
            self.move_order_pos(song, -1);
        }
        self.line = line as u8;
    }

    /// Step one line forward in playback order.
    ///
    /// After the last line of a pattern the cursor moves to the next order
    /// slot, or back to slot 0 when there is no next entry.
    pub fn advance(&mut self, song: &Song) {
        if self.line() == PATTERN_LINES - 1 {
            self.line = 0;
            self.advance_pattern(song);
        } else {
            self.line += 1;
        }
    }

    fn advance_pattern(&mut self, song: &Song) {
        let next = self.order_pos() + 1;
        if next >= ORDER_CAPACITY || song.order_entry(next) == OrderEntry::End {
            self.order_pos = 0;
        } else {
            self.order_pos = next as u8;
        }
    }

    /// Re-wrap the cursor against the song's current order length.
    pub fn normalize(&mut self, song: &Song) {
        self.move_order_pos(song, 0);
        self.move_pat_line(song, 0);
    }

    /// Pack into 16 bits (order slot high byte, line low byte).
    pub const fn to_bits(self) -> u16 {
        (self.order_pos as u16) << 8 | self.line as u16
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self {
            order_pos: (bits >> 8) as u8,
            line: (bits & 0xff) as u8,
        }
    }
}
