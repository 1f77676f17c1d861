//! Instrument plus optional insert effect, validated and initialized together.

use log::info;
use mt_ir::TRACKS;

use crate::plugin::{PluginError, SynthPlugin};
use crate::plugins::{create_plugin, find_plugin};

/// Which plugin in the chain a parameter call targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PluginRole {
    Instrument,
    Effect,
}

/// The two-stage synthesis pipeline a Player drives.
///
/// Plugins are initialized exactly once, here, and finalized when the chain
/// is dropped.
pub struct PluginChain {
    instrument: Box<dyn SynthPlugin>,
    effect: Option<Box<dyn SynthPlugin>>,
    sample_rate: u32,
}

impl PluginChain {
    /// Validate plugin layouts and initialize both stages.
    pub fn new(
        mut instrument: Box<dyn SynthPlugin>,
        mut effect: Option<Box<dyn SynthPlugin>>,
        sample_rate: u32,
    ) -> Result<Self, PluginError> {
        if sample_rate == 0 {
            return Err(PluginError::InvalidSampleRate(sample_rate));
        }

        let info = instrument.info();
        let reason = if info.inputs != 0 {
            Some("instrument must not take audio input")
        } else if info.outputs != 2 {
            Some("instrument must have 2 outputs")
        } else if (info.voices as usize) < TRACKS {
            Some("instrument needs one voice per track")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(PluginError::Layout {
                name: info.name,
                reason,
            });
        }

        if let Some(fx) = &effect {
            let info = fx.info();
            if info.inputs != 2 || info.outputs != 2 {
                return Err(PluginError::Layout {
                    name: info.name,
                    reason: "effect must be 2-in 2-out",
                });
            }
        }

        instrument.init(sample_rate);
        if let Some(fx) = effect.as_mut() {
            fx.init(sample_rate);
        }

        Ok(Self {
            instrument,
            effect,
            sample_rate,
        })
    }

    /// Build a chain from registered plugin names.
    pub fn from_registry(
        instrument: &str,
        effect: Option<&str>,
        sample_rate: u32,
    ) -> Result<Self, PluginError> {
        let inst = create_plugin(instrument)?;
        let fx = effect.map(create_plugin).transpose()?;

        for name in core::iter::once(instrument).chain(effect) {
            if let Some(desc) = find_plugin(name) {
                info!(
                    "plugin {}: {} bytes of state at {} Hz",
                    name,
                    (desc.state_size)(sample_rate),
                    sample_rate
                );
            }
        }

        Self::new(inst, fx, sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn instrument(&self) -> &dyn SynthPlugin {
        self.instrument.as_ref()
    }

    pub fn effect(&self) -> Option<&dyn SynthPlugin> {
        self.effect.as_deref()
    }

    fn plugin_mut(&mut self, role: PluginRole) -> Option<&mut dyn SynthPlugin> {
        match role {
            PluginRole::Instrument => Some(self.instrument.as_mut()),
            PluginRole::Effect => match self.effect.as_mut() {
                Some(fx) => Some(fx.as_mut()),
                None => None,
            },
        }
    }

    pub(crate) fn note_on(&mut self, track: usize, freq: f32, velocity: f32) {
        debug_assert!(track < self.instrument.info().voices as usize);
        self.instrument.note_on(track, freq, velocity);
    }

    pub(crate) fn note_off(&mut self, track: usize) {
        debug_assert!(track < self.instrument.info().voices as usize);
        self.instrument.note_off(track);
    }

    /// Release the gate on every pattern track.
    pub(crate) fn all_notes_off(&mut self) {
        for track in 0..TRACKS {
            self.instrument.note_off(track);
        }
    }

    /// Performance controls go to the instrument only.
    pub(crate) fn pitch_bend(&mut self, cents: f32) {
        self.instrument.pitch_bend(cents);
    }

    pub(crate) fn mod_wheel(&mut self, value: f32) {
        self.instrument.mod_wheel(value);
    }

    pub(crate) fn volume(&mut self, value: f32) {
        self.instrument.volume(value);
    }

    /// Run the instrument, then the effect in place on the same block.
    pub(crate) fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.instrument.process(left, right);
        if let Some(fx) = self.effect.as_mut() {
            fx.process(left, right);
        }
    }

    pub(crate) fn param(&self, role: PluginRole, id: u16) -> Option<f32> {
        match role {
            PluginRole::Instrument => self.instrument.param(id),
            PluginRole::Effect => self.effect.as_ref()?.param(id),
        }
    }

    /// Returns false if the role has no plugin bound.
    pub(crate) fn set_param(&mut self, role: PluginRole, id: u16, value: f32) -> bool {
        match self.plugin_mut(role) {
            Some(plugin) => {
                plugin.set_param(id, value);
                true
            }
            None => false,
        }
    }
}

impl Drop for PluginChain {
    fn drop(&mut self) {
        self.instrument.finalize();
        if let Some(fx) = self.effect.as_mut() {
            fx.finalize();
        }
    }
}
