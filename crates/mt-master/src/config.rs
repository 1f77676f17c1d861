//! Plugin and export settings, stored as TOML.

use std::path::Path;

use mt_engine::{PluginChain, PluginError};
use serde::{Deserialize, Serialize};

use crate::ControllerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registered instrument plugin name
    pub instrument: String,
    /// Registered effect plugin name, empty for none
    pub effect: String,
    /// Offline render rate
    pub sample_rate: u32,
    /// Frames requested per render call during export
    pub export_block: usize,
    /// Export stops here even if the song has not looped
    pub max_export_seconds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instrument: "simplesynth".into(),
            effect: "onepole".into(),
            sample_rate: 48000,
            export_block: 256,
            max_export_seconds: 600,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ControllerError> {
        let s = std::fs::read_to_string(path)?;
        let c = toml::from_str(&s).map_err(|e| ControllerError::Config(e.to_string()))?;
        Ok(c)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ControllerError> {
        let s = toml::to_string(self).map_err(|e| ControllerError::Config(e.to_string()))?;
        std::fs::write(path, s)?;
        Ok(())
    }

    pub fn effect_name(&self) -> Option<&str> {
        Some(self.effect.as_str()).filter(|name| !name.is_empty())
    }

    /// Instantiate the configured plugins at `sample_rate`.
    pub fn chain(&self, sample_rate: u32) -> Result<PluginChain, PluginError> {
        PluginChain::from_registry(&self.instrument, self.effect_name(), sample_rate)
    }

    pub(crate) fn max_export_frames(&self) -> usize {
        self.sample_rate as usize * self.max_export_seconds as usize
    }
}
