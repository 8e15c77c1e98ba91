//! Parameter types for audio processors

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic parameter for lock-free access
#[derive(Debug)]
pub struct AtomicParam {
    bits: AtomicU64,
}

impl AtomicParam {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Store `value`, returning true if it differs from the previous value
    #[inline]
    pub fn replace(&self, value: f64) -> bool {
        let old = self.bits.swap(value.to_bits(), Ordering::Relaxed);
        f64::from_bits(old) != value
    }
}

impl Default for AtomicParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Parameter range specification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub skew: ParamSkew,
}

impl ParamRange {
    pub const fn linear(min: f64, max: f64, default: f64) -> Self {
        Self {
            min,
            max,
            default,
            skew: ParamSkew::Linear,
        }
    }

    /// On/off switch stored as 0.0 / 1.0
    pub const fn toggle(default: bool) -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            default: if default { 1.0 } else { 0.0 },
            skew: ParamSkew::Toggled,
        }
    }

    /// Integer choice in `0..=max`
    pub const fn enumeration(max: u32, default: u32) -> Self {
        Self {
            min: 0.0,
            max: max as f64,
            default: default as f64,
            skew: ParamSkew::Integer,
        }
    }

    /// Clamp (and quantize, for toggles and enumerations) a raw value
    pub fn constrain(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        match self.skew {
            ParamSkew::Linear => clamped,
            ParamSkew::Toggled => {
                if clamped > 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParamSkew::Integer => clamped.round(),
        }
    }
}

/// Parameter skew type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamSkew {
    Linear,
    Toggled,
    Integer,
}
