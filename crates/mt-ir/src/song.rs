//! Song structure: pattern pool and order list.
//!
//! All structural edits here are plain in-place mutations. When a player is
//! bound to the song they must happen inside the player's edit bracket.

use alloc::vec::Vec;

use crate::cursor::SongCursor;
use crate::edit::Edit;
use crate::event::Event;
use crate::pattern::{Line, Pattern};

/// Number of patterns in a song's pool (indices 0-254).
pub const SONG_PATTERNS: usize = 255;

/// Number of slots in the order list.
pub const ORDER_CAPACITY: usize = 256;

/// Order value marking the end of the order list.
pub const END_OF_ORDER: u8 = 255;

/// Tuning divisor of a freshly created song.
pub const DEFAULT_DIVISIONS: u8 = 53;

/// A decoded order list slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderEntry {
    /// Play pattern with this index
    Pattern(u8),
    /// End of song marker
    End,
}

impl From<u8> for OrderEntry {
    fn from(value: u8) -> Self {
        if value == END_OF_ORDER {
            OrderEntry::End
        } else {
            OrderEntry::Pattern(value)
        }
    }
}

/// A complete song.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    /// Equal divisions of the octave used by plain note-on events
    pub divisions: u8,
    /// Order list, `END_OF_ORDER` terminated. Slots past the first
    /// terminator are kept verbatim.
    order: [u8; ORDER_CAPACITY],
    /// Always exactly `SONG_PATTERNS` entries
    patterns: Vec<Pattern>,
}

impl Default for Song {
    fn default() -> Self {
        let mut order = [END_OF_ORDER; ORDER_CAPACITY];
        order[0] = 0;
        Self {
            divisions: DEFAULT_DIVISIONS,
            order,
            patterns: alloc::vec![Pattern::new(); SONG_PATTERNS],
        }
    }
}

impl Song {
    /// Create an empty song: one order entry pointing at pattern 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a song from decoded parts.
    ///
    /// The pool is truncated or padded with empty patterns to `SONG_PATTERNS`.
    pub fn from_parts(divisions: u8, order: [u8; ORDER_CAPACITY], mut patterns: Vec<Pattern>) -> Self {
        patterns.resize(SONG_PATTERNS, Pattern::new());
        Self {
            divisions,
            order,
            patterns,
        }
    }

    // --- Order list ---

    /// Raw order slots, including the sentinel and anything after it.
    pub fn order(&self) -> &[u8; ORDER_CAPACITY] {
        &self.order
    }

    /// Decoded order slot at `pos`.
    pub fn order_entry(&self, pos: usize) -> OrderEntry {
        OrderEntry::from(self.order[pos])
    }

    /// Overwrite a single order slot.
    pub fn set_order_entry(&mut self, pos: usize, entry: OrderEntry) {
        self.order[pos] = match entry {
            OrderEntry::Pattern(idx) => idx,
            OrderEntry::End => END_OF_ORDER,
        };
    }

    /// Number of order entries before the first sentinel.
    pub fn order_length(&self) -> usize {
        self.order
            .iter()
            .position(|&entry| entry == END_OF_ORDER)
            .unwrap_or(ORDER_CAPACITY)
    }

    /// Open a slot at `pos` by shifting everything from `pos` one slot
    /// toward the end. The entry at `pos` is duplicated into the new slot and
    /// the last slot falls off.
    pub fn insert_order(&mut self, pos: usize) {
        debug_assert!(pos < ORDER_CAPACITY);
        self.order.copy_within(pos..ORDER_CAPACITY - 1, pos + 1);
    }

    /// Remove the slot at `pos`, shifting later entries toward the start and
    /// filling the tail with the sentinel.
    pub fn delete_order(&mut self, pos: usize) {
        debug_assert!(pos < ORDER_CAPACITY);
        self.order.copy_within(pos + 1..ORDER_CAPACITY, pos);
        self.order[ORDER_CAPACITY - 1] = END_OF_ORDER;
    }

    /// Step the pattern index at `pos` by `delta`, wrapping over 0-254.
    pub fn increment_order(&mut self, pos: usize, delta: i32) {
        let value = self.order[pos] as i32 + delta;
        self.order[pos] = value.rem_euclid(END_OF_ORDER as i32) as u8;
    }

    // --- Pattern pool ---

    /// All patterns in the pool.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Pattern by pool index; `None` for the sentinel or anything past the pool.
    pub fn pattern(&self, idx: u8) -> Option<&Pattern> {
        self.patterns.get(idx as usize)
    }

    pub fn pattern_mut(&mut self, idx: u8) -> Option<&mut Pattern> {
        self.patterns.get_mut(idx as usize)
    }

    /// Returns true if every event of pattern `idx` is NOP.
    pub fn pattern_is_empty(&self, idx: u8) -> bool {
        self.pattern(idx).map_or(true, Pattern::is_empty)
    }

    /// Lowest-indexed empty pattern, or `None` when the pool is full.
    pub fn first_empty_pattern(&self) -> Option<u8> {
        self.patterns
            .iter()
            .position(Pattern::is_empty)
            .map(|idx| idx as u8)
    }

    /// Copy the whole grid of pattern `from` over pattern `to`.
    pub fn copy_pattern(&mut self, from: u8, to: u8) {
        if from == to {
            return;
        }
        let (Some(_), Some(_)) = (self.pattern(from), self.pattern(to)) else {
            return;
        };
        self.patterns[to as usize] = self.patterns[from as usize].clone();
    }

    /// Fork the pattern referenced at order position `pos` into the first
    /// empty slot and point the order entry at the copy.
    ///
    /// Returns the new pattern index, or `None` (and changes nothing) when
    /// the pool has no empty pattern or `pos` holds the sentinel.
    pub fn uniquify_pattern_at(&mut self, pos: usize) -> Option<u8> {
        let OrderEntry::Pattern(current) = self.order_entry(pos) else {
            return None;
        };
        let free = self.first_empty_pattern()?;
        self.copy_pattern(current, free);
        self.order[pos] = free;
        Some(free)
    }

    // --- Cursor lookups ---

    /// Pattern index at the cursor's order position.
    pub fn pattern_at(&self, cursor: &SongCursor) -> OrderEntry {
        self.order_entry(cursor.order_pos())
    }

    /// Copy of the events on the cursor's line, or `None` when the cursor's
    /// order slot is the sentinel.
    pub fn line_events(&self, cursor: &SongCursor) -> Option<Line> {
        match self.pattern_at(cursor) {
            OrderEntry::Pattern(idx) => self.pattern(idx).map(|p| *p.line(cursor.line())),
            OrderEntry::End => None,
        }
    }

    // --- Edits ---

    /// Apply an edit command.
    pub fn apply_edit(&mut self, edit: &Edit) {
        match *edit {
            Edit::SetEvent {
                pattern,
                line,
                track,
                event,
            } => {
                if let Some(p) = self.pattern_mut(pattern) {
                    *p.event_mut(line, track) = event;
                }
            }
            Edit::Transpose {
                pattern,
                line,
                track,
                delta,
            } => {
                let divisions = self.divisions;
                if let Some(p) = self.pattern_mut(pattern) {
                    let cell = p.event_mut(line, track);
                    *cell = cell.transposed(delta, divisions);
                }
            }
            Edit::InsertOrder(pos) => self.insert_order(pos),
            Edit::DeleteOrder(pos) => self.delete_order(pos),
            Edit::IncrementOrder { pos, delta } => self.increment_order(pos, delta),
            Edit::UniquifyPattern(pos) => {
                self.uniquify_pattern_at(pos);
            }
            Edit::CopyPattern { from, to } => self.copy_pattern(from, to),
            Edit::SetDivisions(divisions) => self.divisions = divisions,
        }
    }
}
