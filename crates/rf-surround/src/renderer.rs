//! Spatial renderer boundary
//!
//! The renderer consumes the 128-channel object/bed buffer plus the control
//! events forged by the return stage, and produces a fixed 14-channel mix:
//! 7.1.4 speakers followed by a binaural pair.

use rf_core::ChannelBuffers;
use std::collections::HashMap;

use crate::config::SurroundConfig;

/// Renderer looked up when no URI is configured
pub const DEFAULT_RENDERER_URI: &str = "urn:reelforge:surround-renderer";

/// Renderer input channels (beds + objects)
pub const MAX_OBJECT_ID: usize = 128;

/// Renderer output channels (7.1.4 + binaural)
pub const RENDER_OUTPUT_CHANNELS: usize = 14;

/// Output channel order
pub const OUTPUT_CHANNEL_NAMES: [&str; RENDER_OUTPUT_CHANNELS] = [
    "L", "R", "C", "LFE", "Lss", "Rss", "Lsr", "Rsr", "Ltf", "Rtf", "Ltr", "Rtr", "BinL", "BinR",
];

/// External spatial renderer
///
/// All methods except `activate` and `set_block_size` are called from the
/// audio thread and must not block or allocate.
pub trait SurroundRenderer: Send {
    fn activate(&mut self) {}

    /// Non-real-time: prepare for blocks of up to `frames` samples
    fn set_block_size(&mut self, frames: usize);

    /// Processing latency in samples
    fn signal_latency(&self) -> usize {
        0
    }

    /// Discard internal state (tails, smoothing) before the next block
    fn flush(&mut self);

    /// Queue one framed control message for the next `run`
    fn write_event(&mut self, frame_time: u32, bytes: &[u8]);

    /// Render `nframes` of `inputs` (128 channels) into `outputs` (14 channels)
    fn run(
        &mut self,
        inputs: &ChannelBuffers,
        outputs: &mut ChannelBuffers,
        start: u64,
        end: u64,
        nframes: usize,
    );
}

type RendererFactory = Box<dyn Fn(&SurroundConfig) -> Box<dyn SurroundRenderer> + Send + Sync>;

/// URI → renderer factory
#[derive(Default)]
pub struct RendererRegistry {
    factories: HashMap<String, RendererFactory>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a factory under `uri`
    pub fn register<F>(&mut self, uri: &str, factory: F)
    where
        F: Fn(&SurroundConfig) -> Box<dyn SurroundRenderer> + Send + Sync + 'static,
    {
        if self.factories.insert(uri.to_string(), Box::new(factory)).is_some() {
            log::debug!("Replaced surround renderer factory for {}", uri);
        }
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.factories.contains_key(uri)
    }

    /// Instantiate the renderer registered under `uri`
    pub fn find(&self, uri: &str, config: &SurroundConfig) -> Option<Box<dyn SurroundRenderer>> {
        self.factories.get(uri).map(|factory| factory(config))
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("uris", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
