//! Surround bus orchestration
//!
//! Owns the track list and the return stage, runs every track's send and
//! then the return inside a process scope, and applies deferred work from
//! the idle (non-real-time) side.

use rf_core::ChannelBuffers;

use crate::config::SurroundConfig;
use crate::error::SurroundResult;
use crate::renderer::{RendererRegistry, RENDER_OUTPUT_CHANNELS};
use crate::rt::ProcessScope;
use crate::send::{MuteMaster, SurroundSend};
use crate::surround_return::{CycleReport, FlushHandle, SurroundReturn};
use crate::track::{Track, TrackId, TrackList};

pub struct SurroundBus {
    config: SurroundConfig,
    tracks: TrackList,
    surround_return: SurroundReturn,
}

impl SurroundBus {
    pub fn new(config: SurroundConfig, registry: &RendererRegistry) -> SurroundResult<Self> {
        config.validate()?;
        let surround_return = SurroundReturn::new(&config, registry)?;
        surround_return.configure(0)?;
        Ok(Self {
            config,
            tracks: TrackList::new(),
            surround_return,
        })
    }

    pub fn config(&self) -> &SurroundConfig {
        &self.config
    }

    pub fn tracks(&self) -> &TrackList {
        &self.tracks
    }

    pub fn surround_return(&self) -> &SurroundReturn {
        &self.surround_return
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Topology (non-real-time)
    // ─────────────────────────────────────────────────────────────────────

    /// Add a track whose channels become surround objects
    pub fn add_track(&mut self, name: &str, channels: usize) -> SurroundResult<TrackId> {
        let send = SurroundSend::new(&self.config, MuteMaster::new());
        self.add_with_send(name, channels, send)
    }

    /// Add a track whose channels feed the bed slots
    pub fn add_bed(&mut self, name: &str, channels: usize) -> SurroundResult<TrackId> {
        let send = SurroundSend::bed(&self.config, MuteMaster::new());
        self.add_with_send(name, channels, send)
    }

    fn add_with_send(&mut self, name: &str, channels: usize, mut send: SurroundSend) -> SurroundResult<TrackId> {
        send.configure(channels, channels)?;
        send.set_delay_out(self.surround_return.playback_offset());
        send.activate();

        let id = self.tracks.next_id();
        self.tracks
            .add(Track::new(id, name, channels, self.config.block_size).with_send(send));
        self.surround_return.reserve_tracks(self.tracks.len());

        log::debug!("Surround bus: added track {} '{}' ({} ch)", id, name, channels);
        Ok(id)
    }

    pub fn remove_track(&mut self, id: TrackId) -> Option<Track> {
        self.tracks.remove(id)
    }

    pub fn set_track_active(&mut self, id: TrackId, active: bool) -> bool {
        self.tracks.set_active(id, active)
    }

    pub fn set_order_key(&mut self, id: TrackId, order_key: u32) -> bool {
        self.tracks.set_order_key(id, order_key)
    }

    pub fn set_block_size(&mut self, frames: usize) {
        self.config.block_size = frames;
        for track in self.tracks.iter_mut() {
            track.set_block_size(frames);
        }
        self.surround_return.set_block_size(frames);
    }

    pub fn set_playback_offset(&mut self, samples: usize) {
        self.surround_return
            .set_playback_offset(samples, &mut self.tracks);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Processing
    // ─────────────────────────────────────────────────────────────────────

    /// Run one block. Track inputs must already be in each track's buffers;
    /// `outputs` receives the 14 rendered channels.
    pub fn process(&mut self, outputs: &mut ChannelBuffers, start: u64, nframes: usize) -> CycleReport {
        debug_assert!(outputs.n_channels() >= RENDER_OUTPUT_CHANNELS);
        let _scope = ProcessScope::enter();
        let end = start + nframes as u64;

        for track in self.tracks.iter_mut() {
            track.process(start, end, nframes);
        }
        self.surround_return
            .run(&self.tracks, outputs, start, end, nframes);
        self.surround_return.last_cycle()
    }

    /// Non-real-time housekeeping: apply deferred delay splits.
    ///
    /// Returns how many sends were updated.
    pub fn idle(&mut self) -> usize {
        let mut applied = 0;
        for track in self.tracks.iter_mut() {
            if let Some(send) = track.surround_send_mut() {
                if send.apply_pending_delay_update() {
                    applied += 1;
                }
            }
        }
        applied
    }

    pub fn request_flush(&self) {
        self.surround_return.request_flush();
    }

    pub fn flush_handle(&self) -> FlushHandle {
        self.surround_return.flush_handle()
    }

    /// Renderer latency plus the largest send latency
    pub fn signal_latency(&self) -> usize {
        let sends = self
            .tracks
            .iter()
            .filter_map(Track::surround_send)
            .map(SurroundSend::signal_latency)
            .max()
            .unwrap_or(0);
        self.surround_return.signal_latency() + sends
    }
}

impl std::fmt::Debug for SurroundBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurroundBus")
            .field("tracks", &self.tracks.len())
            .field("surround_return", &self.surround_return)
            .finish()
    }
}
