//! rf-core: Shared types, traits, and utilities for ReelForge
//!
//! This crate provides the foundational types used across all ReelForge crates.

mod sample;
mod time;
mod params;

pub use sample::*;
pub use time::*;
pub use params::*;

/// Standard sample rate options
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u32)]
pub enum SampleRate {
    Hz44100 = 44100,
    Hz48000 = 48000,
    Hz88200 = 88200,
    Hz96000 = 96000,
    Hz176400 = 176400,
    Hz192000 = 192000,
    Hz352800 = 352800,
    Hz384000 = 384000,
}

impl SampleRate {
    #[inline]
    pub fn as_f64(self) -> f64 {
        self as u32 as f64
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::Hz48000
    }
}

/// Gain coefficient for silence
pub const GAIN_COEFF_ZERO: f64 = 0.0;

/// Gain coefficient for unity gain
pub const GAIN_COEFF_UNITY: f64 = 1.0;
