//! Playback engine for microtracker.
//!
//! Walks a song line by line on a fixed tick grid and drives a synthesis
//! plugin (plus an optional effect) to produce stereo audio.

mod chain;
mod frame;
mod player;
mod plugin;
pub mod plugins;

pub use chain::{PluginChain, PluginRole};
pub use frame::Frame;
pub use player::{Player, SongEdit, NOTE_VELOCITY, TICKS_PER_SECOND};
pub use plugin::{ParamInfo, PluginError, PluginInfo, PluginKind, SynthPlugin};
pub use plugins::{create_plugin, find_plugin, plugin_names, PluginDescriptor};
