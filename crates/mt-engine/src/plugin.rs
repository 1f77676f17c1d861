//! Synthesis plugin contract for instruments and effects.

use std::fmt;

/// Whether a plugin generates or processes audio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PluginKind {
    Instrument,
    Effect,
}

/// Metadata describing a named, range-bounded parameter.
pub struct ParamInfo {
    pub id: u16,
    pub name: &'static str,
    pub unit: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub is_enum: bool,
}

/// Static metadata about a plugin.
pub struct PluginInfo {
    pub name: &'static str,
    pub kind: PluginKind,
    /// Input channels read by `process` (0 for instruments)
    pub inputs: u16,
    /// Output channels written by `process`
    pub outputs: u16,
    /// Note-gate slots accepted by `note_on`/`note_off`
    pub voices: u16,
    pub params: &'static [ParamInfo],
}

impl PluginInfo {
    /// Parameter metadata by id.
    pub fn param(&self, id: u16) -> Option<&'static ParamInfo> {
        self.params.iter().find(|p| p.id == id)
    }
}

/// Core trait for instruments and effects.
///
/// Instruments and effects implement the same capability set. `process`
/// works in place on a stereo block: an instrument (0 inputs) overwrites the
/// buffers, an effect (2 inputs) reads them as its input and overwrites them
/// with its output. The block length is the slice length.
///
/// Every callback must be total over its documented domain; nothing may
/// panic across this boundary. Voice indices are always below
/// `info().voices`.
pub trait SynthPlugin: Send {
    fn info(&self) -> &PluginInfo;

    /// Prepare for rendering at `sample_rate`. Called once before any other
    /// callback.
    fn init(&mut self, sample_rate: u32);

    /// Last call before the plugin is dropped.
    fn finalize(&mut self) {}

    fn process(&mut self, left: &mut [f32], right: &mut [f32]);

    fn note_on(&mut self, _voice: usize, _freq: f32, _velocity: f32) {}
    fn note_off(&mut self, _voice: usize) {}

    fn pitch_bend(&mut self, _cents: f32) {}
    fn mod_wheel(&mut self, _value: f32) {}
    fn volume(&mut self, _value: f32) {}

    /// Current value of a parameter, `None` if the id is unknown.
    fn param(&self, _id: u16) -> Option<f32> {
        None
    }

    /// Set a parameter. Values are clamped to the declared range.
    fn set_param(&mut self, _id: u16, _value: f32) {}
}

/// Error type for plugin lookup and binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// No plugin registered under this name
    UnknownPlugin(String),
    /// Plugins cannot run at this sample rate
    InvalidSampleRate(u32),
    /// Plugin channel/voice layout does not fit the role it was bound to
    Layout {
        name: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::UnknownPlugin(name) => write!(f, "Unknown plugin: {}", name),
            PluginError::InvalidSampleRate(rate) => write!(f, "Invalid sample rate: {}", rate),
            PluginError::Layout { name, reason } => {
                write!(f, "Plugin {} cannot be bound: {}", name, reason)
            }
        }
    }
}

impl std::error::Error for PluginError {}
