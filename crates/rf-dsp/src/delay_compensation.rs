//! Latency Compensation Delay Lines
//!
//! Integer-sample delays used to line up signal paths with different latency:
//! - Mono circular-buffer delay line
//! - Multichannel delay operating on planar [`ChannelBuffers`]
//! - Buffer growth only happens in `set_delay` / `configure` (control thread)

use rf_core::{ChannelBuffers, Sample};

use crate::Processor;

// ============ Delay Line ============

/// Circular buffer delay line for compensation
#[derive(Debug)]
pub struct DelayLine {
    buffer: Vec<Sample>,
    write_pos: usize,
    delay_samples: usize,
}

impl DelayLine {
    /// Create new delay line with maximum capacity
    pub fn new(max_delay: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay + 1],
            write_pos: 0,
            delay_samples: 0,
        }
    }

    /// Set delay amount, returns true if it changed.
    ///
    /// Grows the buffer when needed (NOT in audio thread!)
    pub fn set_delay(&mut self, samples: usize) -> bool {
        if samples >= self.buffer.len() {
            self.buffer.resize(samples + 1, 0.0);
        }
        if samples == self.delay_samples {
            return false;
        }
        self.delay_samples = samples;
        true
    }

    /// Get current delay
    #[inline]
    pub fn delay(&self) -> usize {
        self.delay_samples
    }

    /// Process a single sample
    #[inline]
    pub fn process_sample(&mut self, input: Sample) -> Sample {
        if self.delay_samples == 0 {
            return input;
        }

        let buffer_len = self.buffer.len();
        let read_pos = (self.write_pos + buffer_len - self.delay_samples) % buffer_len;

        let output = self.buffer[read_pos];
        self.buffer[self.write_pos] = input;
        self.write_pos = (self.write_pos + 1) % buffer_len;

        output
    }

    /// Process a block of samples in place
    pub fn process_block(&mut self, buffer: &mut [Sample]) {
        if self.delay_samples == 0 {
            return;
        }

        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Clear buffer (reset to zeros)
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

// ============ Multichannel Delay ============

/// One delay line per channel, all sharing the same delay amount
#[derive(Debug, Default)]
pub struct ChannelDelay {
    lines: Vec<DelayLine>,
    delay_samples: usize,
}

impl ChannelDelay {
    pub fn new(channels: usize) -> Self {
        let mut delay = Self::default();
        delay.configure(channels);
        delay
    }

    /// Make sure at least `channels` lines exist (control thread only)
    pub fn configure(&mut self, channels: usize) {
        while self.lines.len() < channels {
            let mut line = DelayLine::new(self.delay_samples);
            line.set_delay(self.delay_samples);
            self.lines.push(line);
        }
    }

    #[inline]
    pub fn n_channels(&self) -> usize {
        self.lines.len()
    }

    /// Set delay for every channel, returns true if it changed
    pub fn set_delay(&mut self, samples: usize) -> bool {
        for line in &mut self.lines {
            line.set_delay(samples);
        }
        if samples == self.delay_samples {
            return false;
        }
        self.delay_samples = samples;
        true
    }

    #[inline]
    pub fn delay(&self) -> usize {
        self.delay_samples
    }

    /// Delay the first `nframes` of each channel in place
    pub fn process(&mut self, bufs: &mut ChannelBuffers, nframes: usize) {
        if self.delay_samples == 0 {
            return;
        }
        for (line, ch) in self.lines.iter_mut().zip(bufs.iter_mut()) {
            let n = nframes.min(ch.samples().len());
            line.process_block(&mut ch.samples_mut()[..n]);
        }
    }

    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }
}

impl Processor for ChannelDelay {
    fn reset(&mut self) {
        self.clear();
    }

    fn latency(&self) -> usize {
        self.delay_samples
    }
}
