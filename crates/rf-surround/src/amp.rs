//! Fader stage of a surround send
//!
//! Applies the send-level control. When the control is automated the gain
//! curve is evaluated sample by sample into a pre-sized scratch buffer,
//! otherwise the gain ramps from the last applied value to the current one.

use rf_core::{ChannelBuffers, Sample, GAIN_COEFF_UNITY};
use rf_dsp::{apply_gain, apply_gain_curve};

use crate::automation::{AutomationControl, ControlKind};

#[derive(Debug)]
pub struct Amp {
    gain_control: AutomationControl,
    /// Gain reached at the end of the previous block
    current_gain: f64,
    automation_buffer: Vec<Sample>,
}

impl Amp {
    pub fn new(block_size: usize) -> Self {
        Self {
            gain_control: AutomationControl::new(ControlKind::Gain),
            current_gain: GAIN_COEFF_UNITY,
            automation_buffer: vec![0.0; block_size],
        }
    }

    pub fn gain_control(&self) -> &AutomationControl {
        &self.gain_control
    }

    /// Gain applied at the end of the last block
    pub fn current_gain(&self) -> f64 {
        self.current_gain
    }

    /// Non-real-time: size the automation scratch buffer
    pub fn set_block_size(&mut self, frames: usize) {
        if frames > self.automation_buffer.len() {
            self.automation_buffer.resize(frames, 0.0);
        }
    }

    /// Fill the scratch buffer from the gain automation, if it drives the gain
    fn setup_gain_automation(&mut self, start: u64, nframes: usize) -> bool {
        if nframes == 0 || nframes > self.automation_buffer.len() {
            return false;
        }
        if !self.gain_control.is_automated() {
            return false;
        }
        self.gain_control
            .list()
            .rt_safe_curve(start, &mut self.automation_buffer[..nframes])
    }

    pub fn run(&mut self, bufs: &mut ChannelBuffers, start: u64, _end: u64, nframes: usize) {
        if self.setup_gain_automation(start, nframes) {
            let range = ControlKind::Gain.range();
            for g in &mut self.automation_buffer[..nframes] {
                *g = range.constrain(*g);
            }
            apply_gain_curve(bufs, nframes, &self.automation_buffer[..nframes]);
            self.current_gain = self.automation_buffer[nframes - 1];
            self.gain_control.set_value(self.current_gain);
            return;
        }

        let target = self.gain_control.value();
        self.current_gain = apply_gain(bufs, nframes, self.current_gain, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::AutoState;

    fn ones(frames: usize) -> ChannelBuffers {
        let mut bufs = ChannelBuffers::new(1, frames);
        bufs.channel_mut(0).fill(1.0);
        bufs
    }

    #[test]
    fn test_unity_is_transparent() {
        let mut amp = Amp::new(8);
        let mut bufs = ones(8);
        amp.run(&mut bufs, 0, 8, 8);
        assert!(bufs.channel(0).iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_level_change_ramps() {
        let mut amp = Amp::new(4);
        amp.gain_control().set_value(0.5);
        let mut bufs = ones(4);
        amp.run(&mut bufs, 0, 4, 4);

        let s = bufs.channel(0);
        assert!(s[0] < 1.0 && s[0] > 0.5);
        assert!((s[3] - 0.5).abs() < 1e-12);
        assert_eq!(amp.current_gain(), 0.5);
    }

    #[test]
    fn test_automated_gain_follows_curve() {
        let mut amp = Amp::new(4);
        let ctl = amp.gain_control();
        ctl.add_event(0, 0.0);
        ctl.add_event(4, 2.0);
        ctl.set_automation_state(AutoState::Play);

        let mut bufs = ones(4);
        amp.run(&mut bufs, 0, 4, 4);
        assert_eq!(bufs.channel(0), &[0.0, 0.5, 1.0, 1.5]);
        assert_eq!(amp.gain_control().value(), 1.5);
    }
}
