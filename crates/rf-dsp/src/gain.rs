//! Block gain helpers
//!
//! - `apply_gain` ramps linearly from the current to the target gain over a block
//! - `apply_simple_gain` applies a constant gain (zero gain silences)
//! - `apply_gain_curve` applies a per-sample gain array

use rf_core::{ChannelBuffers, Sample, GAIN_COEFF_UNITY, GAIN_COEFF_ZERO};

/// Ramp every channel from `current` to `target` across `nframes`.
///
/// Returns the gain reached at the end of the block, which is always `target`.
pub fn apply_gain(bufs: &mut ChannelBuffers, nframes: usize, current: f64, target: f64) -> f64 {
    if nframes == 0 {
        return current;
    }
    if current == target {
        apply_simple_gain(bufs, nframes, target);
        return target;
    }

    let step = (target - current) / nframes as f64;
    for ch in bufs.iter_mut() {
        let samples = ch.samples_mut();
        let n = nframes.min(samples.len());
        let mut g = current;
        for s in &mut samples[..n] {
            g += step;
            *s *= g;
        }
    }
    target
}

/// Constant gain over the first `nframes` of every channel
pub fn apply_simple_gain(bufs: &mut ChannelBuffers, nframes: usize, gain: f64) {
    if gain == GAIN_COEFF_UNITY {
        return;
    }
    if gain == GAIN_COEFF_ZERO {
        bufs.silence(nframes);
        return;
    }
    for ch in bufs.iter_mut() {
        let samples = ch.samples_mut();
        let n = nframes.min(samples.len());
        for s in &mut samples[..n] {
            *s *= gain;
        }
    }
}

/// Multiply each sample by the matching entry of `curve`
pub fn apply_gain_curve(bufs: &mut ChannelBuffers, nframes: usize, curve: &[Sample]) {
    for ch in bufs.iter_mut() {
        let samples = ch.samples_mut();
        let n = nframes.min(samples.len()).min(curve.len());
        for (s, g) in samples[..n].iter_mut().zip(&curve[..n]) {
            *s *= *g;
        }
    }
}
