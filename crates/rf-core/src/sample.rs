//! Sample types and audio buffer definitions

/// Type alias for audio samples (always f64 for maximum precision)
pub type Sample = f64;

/// Audio buffer trait for generic buffer operations
pub trait AudioBuffer {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn clear(&mut self);
}

/// Mono audio buffer
#[derive(Debug, Clone)]
pub struct MonoBuffer {
    samples: Vec<Sample>,
}

impl MonoBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            samples: vec![0.0; size],
        }
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.samples
    }

    /// Copy `nframes` from `src` (replaces contents)
    #[inline]
    pub fn read_from(&mut self, src: &[Sample], nframes: usize) {
        let n = nframes.min(self.samples.len()).min(src.len());
        self.samples[..n].copy_from_slice(&src[..n]);
    }

    /// Accumulate `nframes` from `src` into this buffer
    #[inline]
    pub fn merge_from(&mut self, src: &[Sample], nframes: usize) {
        let n = nframes.min(self.samples.len()).min(src.len());
        for (dst, s) in self.samples[..n].iter_mut().zip(&src[..n]) {
            *dst += *s;
        }
    }

    /// Zero the first `nframes` samples
    #[inline]
    pub fn silence(&mut self, nframes: usize) {
        let n = nframes.min(self.samples.len());
        self.samples[..n].fill(0.0);
    }

    /// Grow or shrink to `size` samples. Allocates: never call from the audio thread.
    pub fn resize(&mut self, size: usize) {
        self.samples.resize(size, 0.0);
    }
}

impl AudioBuffer for MonoBuffer {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn clear(&mut self) {
        self.samples.fill(0.0);
    }
}

/// Planar multichannel block buffer.
///
/// Capacity (channel count and frames per channel) is fixed at configuration
/// time via [`ChannelBuffers::ensure`]. Everything else is allocation-free and
/// safe to call from the audio thread.
#[derive(Debug, Clone, Default)]
pub struct ChannelBuffers {
    channels: Vec<MonoBuffer>,
    frames: usize,
}

impl ChannelBuffers {
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            channels: (0..channels).map(|_| MonoBuffer::new(frames)).collect(),
            frames,
        }
    }

    /// Make sure at least `channels` x `frames` are available.
    ///
    /// Existing channels keep their contents; never shrinks.
    pub fn ensure(&mut self, channels: usize, frames: usize) {
        if frames > self.frames {
            for ch in &mut self.channels {
                ch.resize(frames);
            }
            self.frames = frames;
        }
        while self.channels.len() < channels {
            self.channels.push(MonoBuffer::new(self.frames));
        }
    }

    #[inline]
    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel
    #[inline]
    pub fn capacity(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[Sample] {
        self.channels[index].samples()
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [Sample] {
        self.channels[index].samples_mut()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&MonoBuffer> {
        self.channels.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut MonoBuffer> {
        self.channels.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonoBuffer> {
        self.channels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MonoBuffer> {
        self.channels.iter_mut()
    }

    /// Zero the first `nframes` of every channel
    pub fn silence(&mut self, nframes: usize) {
        for ch in &mut self.channels {
            ch.silence(nframes);
        }
    }

    /// Channel-by-channel copy of `nframes` from `src`.
    ///
    /// Copies `min(self, src)` channels.
    pub fn read_from(&mut self, src: &ChannelBuffers, nframes: usize) {
        for (dst, s) in self.channels.iter_mut().zip(src.channels.iter()) {
            dst.read_from(s.samples(), nframes);
        }
    }

    /// True if the first `nframes` of every channel are exactly zero
    pub fn is_silent(&self, nframes: usize) -> bool {
        self.channels.iter().all(|ch| {
            let n = nframes.min(ch.len());
            ch.samples()[..n].iter().all(|&s| s == 0.0)
        })
    }
}
