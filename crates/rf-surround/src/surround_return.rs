//! Surround Return
//!
//! Terminates the surround bus. Every cycle it:
//! - consumes a pending flush request
//! - multiplexes all active sends into 128 renderer inputs
//!   (bed slots 0..9 summed, object slots 10..127 one per send channel)
//! - evaluates pan automation at breakpoints inside the block
//! - forges change-only control messages for the renderer
//! - runs the renderer and copies its 14 outputs

use rf_core::{ChannelBuffers, SamplePosition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::SurroundConfig;
use crate::error::{SurroundError, SurroundResult};
use crate::pannable::{Pannable, PanValues, NUM_PAN_PARAMETERS};
use crate::protocol::{ControlForge, ControlMessage};
use crate::renderer::{RendererRegistry, SurroundRenderer, MAX_OBJECT_ID, RENDER_OUTPUT_CHANNELS};
use crate::send::SendRole;
use crate::track::TrackList;

/// Bed slots 0..9
pub const NUM_BED_CHANNELS: usize = 10;

/// First dynamically assigned object id
pub const FIRST_OBJECT_ID: usize = NUM_BED_CHANNELS;

/// Type tag of persisted return state
pub const RETURN_STATE_KIND: &str = "SurroundReturn";

/// Cached pan value that never equals a real one
const UNSET_PAN_VALUE: f32 = -1111.0;

/// Cached render mode that never equals a real one
const UNSET_RENDER_MODE: i32 = -1;

// ═══════════════════════════════════════════════════════════════════════════
// FLUSH
// ═══════════════════════════════════════════════════════════════════════════

/// Cloneable flush request flag.
///
/// Level-triggered: requests made before the next cycle are coalesced into
/// one renderer flush.
#[derive(Debug, Clone, Default)]
pub struct FlushHandle(Arc<AtomicBool>);

impl FlushHandle {
    /// Callable from any thread, never blocks
    pub fn request_flush(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Test-and-clear; true at most once per request burst
    fn consume(&self) -> bool {
        self.0
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CYCLE REPORT
// ═══════════════════════════════════════════════════════════════════════════

/// What the last cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// Object ids assigned (excluding beds)
    pub objects: usize,
    /// Send channels left out because all ids were taken
    pub dropped_channels: usize,
    pub metadata_messages: usize,
    pub render_mode_messages: usize,
    pub object_count_messages: usize,
    /// Sample-accurate automation evaluations
    pub evaluations: usize,
    pub flushed: bool,
    /// Messages the forge rejected
    pub forge_errors: usize,
}

/// Persisted return state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnState {
    #[serde(rename = "type")]
    pub kind: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// SURROUND RETURN
// ═══════════════════════════════════════════════════════════════════════════

pub struct SurroundReturn {
    renderer: Box<dyn SurroundRenderer>,
    surround_bufs: ChannelBuffers,
    render_out: ChannelBuffers,
    forge: ControlForge,
    flush: FlushHandle,

    current_value: [PanValues; MAX_OBJECT_ID],
    current_render_mode: [i32; MAX_OBJECT_ID],
    current_n_objects: usize,

    /// Track indices sorted by (order key, id)
    order: Vec<usize>,
    order_generation: Option<u64>,

    pending_active: AtomicBool,
    playback_offset: usize,
    last_cycle: CycleReport,
}

impl SurroundReturn {
    /// Fails permanently if the configured renderer is not registered
    pub fn new(config: &SurroundConfig, registry: &RendererRegistry) -> SurroundResult<Self> {
        let Some(mut renderer) = registry.find(&config.renderer_uri, config) else {
            log::warn!("Surround renderer {} not found", config.renderer_uri);
            return Err(SurroundError::RendererUnavailable {
                uri: config.renderer_uri.clone(),
            });
        };
        renderer.activate();

        let mut ret = Self {
            renderer,
            surround_bufs: ChannelBuffers::default(),
            render_out: ChannelBuffers::default(),
            forge: ControlForge::new(),
            flush: FlushHandle::default(),
            current_value: [[UNSET_PAN_VALUE; NUM_PAN_PARAMETERS]; MAX_OBJECT_ID],
            current_render_mode: [UNSET_RENDER_MODE; MAX_OBJECT_ID],
            current_n_objects: MAX_OBJECT_ID,
            order: Vec::with_capacity(config.track_capacity),
            order_generation: None,
            pending_active: AtomicBool::new(true),
            playback_offset: 0,
            last_cycle: CycleReport::default(),
        };
        ret.set_block_size(config.block_size);

        log::info!("Surround return using renderer {}", config.renderer_uri);
        Ok(ret)
    }

    /// Non-real-time: size the multiplex buffer to 128 x `frames`
    pub fn set_block_size(&mut self, frames: usize) {
        self.surround_bufs.ensure(MAX_OBJECT_ID, frames);
        self.render_out.ensure(RENDER_OUTPUT_CHANNELS, frames);
        self.renderer.set_block_size(frames);
    }

    /// Non-real-time: make room for `tracks` entries in the order snapshot
    pub fn reserve_tracks(&mut self, tracks: usize) {
        if tracks > self.order.capacity() {
            self.order.reserve(tracks - self.order.len());
        }
    }

    /// All audio comes in through sends; direct inputs are refused
    pub fn can_support_io(inputs: usize) -> bool {
        inputs == 0
    }

    /// Returns the output channel count
    pub fn configure(&self, inputs: usize) -> SurroundResult<usize> {
        if !Self::can_support_io(inputs) {
            return Err(SurroundError::UnsupportedIo { inputs });
        }
        Ok(RENDER_OUTPUT_CHANNELS)
    }

    pub fn activate(&self) {
        self.pending_active.store(true, Ordering::Release);
    }

    pub fn deactivate(&self) {
        self.pending_active.store(false, Ordering::Release);
    }

    pub fn active(&self) -> bool {
        self.pending_active.load(Ordering::Acquire)
    }

    pub fn request_flush(&self) {
        self.flush.request_flush();
    }

    pub fn flush_handle(&self) -> FlushHandle {
        self.flush.clone()
    }

    pub fn signal_latency(&self) -> usize {
        self.renderer.signal_latency()
    }

    /// Propagate the bus playback offset to every send as its output delay
    pub fn set_playback_offset(&mut self, samples: usize, tracks: &mut TrackList) {
        self.playback_offset = samples;
        for track in tracks.iter_mut() {
            if let Some(send) = track.surround_send_mut() {
                send.set_delay_out(samples);
            }
        }
    }

    pub fn playback_offset(&self) -> usize {
        self.playback_offset
    }

    /// Object ids in use after the last cycle (beds included)
    pub fn n_objects(&self) -> usize {
        self.current_n_objects
    }

    pub fn last_cycle(&self) -> CycleReport {
        self.last_cycle
    }

    /// Renderer input of the last cycle
    pub fn surround_bufs(&self) -> &ChannelBuffers {
        &self.surround_bufs
    }

    pub fn get_state(&self) -> ReturnState {
        ReturnState {
            kind: RETURN_STATE_KIND.to_string(),
        }
    }

    pub fn set_state(&self, state: &ReturnState) -> SurroundResult<()> {
        if state.kind != RETURN_STATE_KIND {
            return Err(SurroundError::InvalidState(format!(
                "expected {} state, got {}",
                RETURN_STATE_KIND, state.kind
            )));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Processing
    // ─────────────────────────────────────────────────────────────────────

    /// Sort track indices once per topology change. Allocation-free as long
    /// as [`Self::reserve_tracks`] kept up with the track count.
    fn refresh_order(&mut self, tracks: &TrackList) {
        if self.order_generation == Some(tracks.generation()) && self.order.len() == tracks.len() {
            return;
        }
        let list = tracks.tracks();
        self.order.clear();
        self.order.extend(0..list.len());
        self.order
            .sort_unstable_by_key(|&i| (list[i].order_key(), list[i].id()));
        self.order_generation = Some(tracks.generation());
    }

    pub fn run(
        &mut self,
        tracks: &TrackList,
        outputs: &mut ChannelBuffers,
        start: u64,
        end: u64,
        nframes: usize,
    ) {
        if !self.active() {
            return;
        }
        let nframes = nframes.min(self.surround_bufs.capacity());
        let mut report = CycleReport::default();

        if self.flush.consume() {
            self.renderer.flush();
            report.flushed = true;
        }

        self.surround_bufs.silence(nframes);
        self.refresh_order(tracks);
        let list = tracks.tracks();

        // beds
        for &idx in &self.order {
            let track = &list[idx];
            let Some(send) = track.surround_send() else {
                continue;
            };
            if !track.active() || !send.active() || send.role() != SendRole::Bed {
                continue;
            }
            let n = send.active_channel_count().min(NUM_BED_CHANNELS);
            for (slot, src) in send.bufs().iter().take(n).enumerate() {
                if let Some(dst) = self.surround_bufs.get_mut(slot) {
                    dst.merge_from(src.samples(), nframes);
                }
            }
        }

        // objects
        let mut id = FIRST_OBJECT_ID;
        for i in 0..self.order.len() {
            let track = &list[self.order[i]];
            let Some(send) = track.surround_send() else {
                continue;
            };
            if !track.active() || !send.active() || send.role() != SendRole::Object {
                continue;
            }
            let n = send.active_channel_count();

            if id >= MAX_OBJECT_ID {
                report.dropped_channels += n;
                continue;
            }

            for s in 0..n {
                if id >= MAX_OBJECT_ID {
                    report.dropped_channels += n - s;
                    break;
                }
                let Some(p) = send.pannable(s) else {
                    break;
                };

                if let (Some(dst), Some(src)) = (self.surround_bufs.get_mut(id), send.bufs().get(s)) {
                    dst.read_from(src.samples(), nframes);
                }

                if !p.is_automated() || start >= end {
                    self.maybe_send_metadata(id, 0, &p.current_values(), &mut report);
                } else if nframes < 2 {
                    self.evaluate(id, p, start, 0, &mut report);
                } else {
                    // exclusive end: [start, end), end is the next cycle's start
                    let last = end - 1;
                    let mut cursor = start;
                    while let Some(ev) = p.find_next_event(cursor, last) {
                        let pos = SamplePosition(start)
                            .distance(SamplePosition(ev.when))
                            .min(nframes as u64 - 1) as u32;
                        self.evaluate(id, p, ev.when, pos, &mut report);
                        cursor = ev.when;
                    }
                    self.evaluate(id, p, last, nframes as u32 - 1, &mut report);
                }

                // not sample-accurate, applies from block start
                let mode = p.render_mode();
                if mode != self.current_render_mode[id] {
                    self.current_render_mode[id] = mode;
                    let msg = ControlMessage::RenderMode {
                        channel: id as i32,
                        mode,
                    };
                    if self.send_message(&msg, &mut report) {
                        report.render_mode_messages += 1;
                    }
                }

                id += 1;
            }
        }

        report.objects = id - FIRST_OBJECT_ID;

        if self.current_n_objects != id {
            self.current_n_objects = id;
            let msg = ControlMessage::ObjectCount { count: id as i32 };
            if self.send_message(&msg, &mut report) {
                report.object_count_messages += 1;
            }
        }

        self.renderer
            .run(&self.surround_bufs, &mut self.render_out, start, end, nframes);

        for (dst, src) in outputs.iter_mut().zip(self.render_out.iter()) {
            dst.read_from(src.samples(), nframes);
        }

        self.last_cycle = report;
    }

    /// Publish pan values at `frame` if all five evaluate
    fn evaluate(&mut self, id: usize, p: &Pannable, when: u64, frame: u32, report: &mut CycleReport) {
        report.evaluations += 1;
        if let Some(values) = p.evaluate_all(when) {
            self.maybe_send_metadata(id, frame, &values, report);
        }
    }

    /// Forge a metadata message if any value differs from what was last sent
    fn maybe_send_metadata(&mut self, id: usize, frame: u32, v: &PanValues, report: &mut CycleReport) {
        let cached = &mut self.current_value[id];
        if *cached == *v {
            return;
        }
        *cached = *v;

        let msg = ControlMessage::Metadata {
            frame: frame as i32,
            channel: id as i32,
            x: v[0],
            y: v[1],
            z: v[2],
            size: v[3],
            snap: v[4] > 0.0,
        };
        if self.send_message(&msg, report) {
            report.metadata_messages += 1;
        }
    }

    fn send_message(&mut self, msg: &ControlMessage, report: &mut CycleReport) -> bool {
        match self.forge.forge(msg) {
            Ok(bytes) => {
                self.renderer.write_event(0, bytes);
                true
            }
            Err(_) => {
                report.forge_errors += 1;
                false
            }
        }
    }
}

impl std::fmt::Debug for SurroundReturn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurroundReturn")
            .field("n_objects", &self.current_n_objects)
            .field("flush_pending", &self.flush.pending())
            .field("last_cycle", &self.last_cycle)
            .finish()
    }
}
