//! Audio output backends for microtracker.
//!
//! Backends pull audio from a shared [`mt_engine::Player`] inside the device
//! callback; nothing here ever edits the song.

mod cpal_backend;
mod traits;

pub use cpal_backend::CpalOutput;
pub use traits::{AudioError, AudioOutput};
