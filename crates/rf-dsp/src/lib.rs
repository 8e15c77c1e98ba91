//! rf-dsp: DSP processors for ReelForge
//!
//! ## Modules
//! - `delay_compensation` - Integer-sample latency compensation delays
//! - `gain` - Block gain ramps and constant gain

pub mod delay_compensation;
pub mod gain;

pub use delay_compensation::{ChannelDelay, DelayLine};
pub use gain::{apply_gain, apply_gain_curve, apply_simple_gain};

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);

    /// Get latency in samples
    fn latency(&self) -> usize {
        0
    }
}
