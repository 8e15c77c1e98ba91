//! Surround bus configuration

use rf_core::SampleRate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SurroundError, SurroundResult};
use crate::renderer::DEFAULT_RENDERER_URI;

/// How a send reacts when its mute gain target changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainRamp {
    /// Linear ramp across one block
    #[default]
    Block,
    /// Jump straight to the target (test rigs, offline bounce)
    Step,
}

/// Surround bus configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurroundConfig {
    pub sample_rate: SampleRate,
    /// Nominal block size; buffers are pre-sized to this many frames
    pub block_size: usize,
    /// Renderer looked up in the registry when the return is created
    pub renderer_uri: String,
    /// Upper bound on pan parameter sets per send (None = one per input channel)
    pub max_pannables_per_send: Option<usize>,
    /// Tracks reserved up front for the per-cycle order snapshot
    pub track_capacity: usize,
    pub gain_ramp: GainRamp,
}

impl Default for SurroundConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::Hz48000,
            block_size: 256,
            renderer_uri: DEFAULT_RENDERER_URI.to_string(),
            max_pannables_per_send: None,
            track_capacity: 256,
            gain_ramp: GainRamp::Block,
        }
    }
}

impl SurroundConfig {
    /// Configuration mirroring a two-channel-per-send mixer
    pub fn stereo_sends() -> Self {
        Self {
            max_pannables_per_send: Some(2),
            ..Self::default()
        }
    }

    /// Number of pan parameter sets a send with `inputs` channels should carry
    pub fn pannables_for(&self, inputs: usize) -> usize {
        match self.max_pannables_per_send {
            Some(cap) => inputs.min(cap),
            None => inputs,
        }
    }

    pub fn validate(&self) -> SurroundResult<()> {
        if self.block_size == 0 {
            return Err(SurroundError::Config("block_size must be non-zero".into()));
        }
        if self.renderer_uri.is_empty() {
            return Err(SurroundError::Config("renderer_uri is empty".into()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> SurroundResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SurroundResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
