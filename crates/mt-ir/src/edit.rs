//! Edit commands for mutating song data during playback.

use crate::event::Event;

/// An edit command that mutates song data. Applied with
/// [`crate::Song::apply_edit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Set a single cell in a pattern.
    SetEvent {
        pattern: u8,
        line: usize,
        track: usize,
        event: Event,
    },
    /// Transpose an equal-division note by a number of degrees.
    Transpose {
        pattern: u8,
        line: usize,
        track: usize,
        delta: i32,
    },
    /// Duplicate the order slot at this position.
    InsertOrder(usize),
    /// Remove the order slot at this position.
    DeleteOrder(usize),
    /// Step the pattern index in an order slot.
    IncrementOrder { pos: usize, delta: i32 },
    /// Give the order slot its own copy of its pattern.
    UniquifyPattern(usize),
    CopyPattern { from: u8, to: u8 },
    SetDivisions(u8),
}

impl Edit {
    /// True for edits that can change the order length.
    pub fn changes_order(&self) -> bool {
        matches!(
            self,
            Edit::InsertOrder(_) | Edit::DeleteOrder(_) | Edit::IncrementOrder { .. }
        )
    }
}
