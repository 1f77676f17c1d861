//! Built-in plugin implementations and the name registry.

mod one_pole;
mod simple_synth;
mod swap;

pub use one_pole::OnePole;
pub use simple_synth::SimpleSynth;
pub use swap::Swap;

use crate::plugin::{PluginError, SynthPlugin};

/// Registry entry: how to build a plugin by name.
pub struct PluginDescriptor {
    pub name: &'static str,
    /// Bytes of state an instance needs at the given sample rate
    pub state_size: fn(u32) -> usize,
    /// Build an uninitialized instance
    pub create: fn() -> Box<dyn SynthPlugin>,
}

static REGISTRY: &[PluginDescriptor] = &[
    simple_synth::DESCRIPTOR,
    one_pole::DESCRIPTOR,
    swap::DESCRIPTOR,
];

/// Look up a plugin by name.
pub fn find_plugin(name: &str) -> Option<&'static PluginDescriptor> {
    REGISTRY.iter().find(|desc| desc.name == name)
}

/// Names of every registered plugin.
pub fn plugin_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|desc| desc.name)
}

/// Create a plugin by name. The instance still needs `init`.
pub fn create_plugin(name: &str) -> Result<Box<dyn SynthPlugin>, PluginError> {
    let desc = find_plugin(name).ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))?;
    Ok((desc.create)())
}
