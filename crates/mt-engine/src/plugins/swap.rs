//! Left/right channel swap effect.

use crate::plugin::{PluginInfo, PluginKind, SynthPlugin};
use crate::plugins::PluginDescriptor;

static INFO: PluginInfo = PluginInfo {
    name: "swap",
    kind: PluginKind::Effect,
    inputs: 2,
    outputs: 2,
    voices: 0,
    params: &[],
};

pub(super) const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "swap",
    state_size,
    create,
};

fn state_size(_sample_rate: u32) -> usize {
    core::mem::size_of::<Swap>()
}

fn create() -> Box<dyn SynthPlugin> {
    Box::new(Swap)
}

pub struct Swap;

impl SynthPlugin for Swap {
    fn info(&self) -> &PluginInfo {
        &INFO
    }

    fn init(&mut self, _sample_rate: u32) {}

    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        let len = left.len().min(right.len());
        left[..len].swap_with_slice(&mut right[..len]);
    }
}
