//! Core data model for the microtracker sequencer.
//!
//! A song is a fixed pool of 64x4 patterns plus an order list. Nothing in
//! this crate knows about audio; the engine walks a [`Song`] with a
//! [`SongCursor`] and turns [`Event`]s into plugin calls.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod cursor;
mod edit;
mod event;
mod pattern;
pub mod song;
pub mod tuning;

pub use cursor::SongCursor;
pub use edit::Edit;
pub use event::{Command, Event};
pub use pattern::{Line, Pattern, PATTERN_LINES, TRACKS};
pub use song::{
    OrderEntry, Song, DEFAULT_DIVISIONS, END_OF_ORDER, ORDER_CAPACITY, SONG_PATTERNS,
};
pub use tuning::{event_frequency, TuningMode};
