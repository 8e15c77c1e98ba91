//! Surround Send
//!
//! Per-track stage feeding the surround return:
//! - One pan parameter set per input channel (grows, never shrinks)
//! - Mute gain with click-free fades and a silence fast-path
//! - Automatable send level (fader)
//! - Complementary send/thru delay lines for latency alignment
//! - Records the cycle window the return evaluates pan automation in

use rf_core::{ChannelBuffers, GAIN_COEFF_UNITY, GAIN_COEFF_ZERO};
use rf_dsp::{apply_gain, apply_simple_gain, ChannelDelay, Processor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::amp::Amp;
use crate::automation::{AutomationControl, ControlKind, ControlState};
use crate::config::{GainRamp, SurroundConfig};
use crate::error::{SurroundError, SurroundResult};
use crate::events::{ControlChange, LatencyChange, SendSignals};
use crate::pannable::{Pannable, PannableState};
use crate::rt;

/// Type tag of persisted send state
pub const SEND_STATE_KIND: &str = "sursend";

// ============ Mute ============

/// Shared mute switch of the owning track
#[derive(Debug, Default)]
pub struct MuteMaster {
    muted: AtomicBool,
}

impl MuteMaster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Release);
    }

    pub fn muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    /// Gain the surround send should reach
    #[inline]
    pub fn mute_gain(&self) -> f64 {
        if self.muted() {
            GAIN_COEFF_ZERO
        } else {
            GAIN_COEFF_UNITY
        }
    }
}

// ============ Types ============

/// What the return does with a send's channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendRole {
    /// Each channel becomes a panned object (ids 10..)
    #[default]
    Object,
    /// Channel k is summed into bed slot k (ids 0..9)
    Bed,
}

/// What the last `run` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    /// Send inactive, mix buffers silenced
    #[default]
    Inactive,
    /// Target gain zero for the second block in a row, nothing else ran
    Silent,
    /// Target gain changed, fade applied
    Ramping,
    /// Target gain unchanged and non-zero
    Steady,
}

/// Persisted send state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendState {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub role: SendRole,
    pub n_pannables: usize,
    pub gain: ControlState,
    pub pannables: Vec<PannableState>,
}

impl SendState {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============ Surround Send ============

pub struct SurroundSend {
    role: SendRole,
    config: SurroundConfig,
    block_size: usize,

    pannables: Vec<Pannable>,
    configured: bool,
    configured_inputs: usize,

    mixbufs: ChannelBuffers,
    amp: Amp,
    mute_master: Arc<MuteMaster>,
    /// Mute gain reached at the end of the previous block
    current_gain: f64,

    send_delay: ChannelDelay,
    thru_delay: ChannelDelay,
    delay_in: usize,
    delay_out: usize,
    delay_update_pending: bool,

    pending_active: AtomicBool,
    active: bool,

    cycle_start: u64,
    cycle_end: u64,
    last_block: BlockState,

    signals: SendSignals,
}

impl SurroundSend {
    pub fn new(config: &SurroundConfig, mute_master: Arc<MuteMaster>) -> Self {
        Self {
            role: SendRole::Object,
            config: config.clone(),
            block_size: config.block_size,
            pannables: Vec::new(),
            configured: false,
            configured_inputs: 0,
            mixbufs: ChannelBuffers::default(),
            amp: Amp::new(config.block_size),
            mute_master,
            current_gain: GAIN_COEFF_ZERO,
            send_delay: ChannelDelay::default(),
            thru_delay: ChannelDelay::default(),
            delay_in: 0,
            delay_out: 0,
            delay_update_pending: false,
            pending_active: AtomicBool::new(false),
            active: false,
            cycle_start: 0,
            cycle_end: 0,
            last_block: BlockState::Inactive,
            signals: SendSignals::default(),
        }
    }

    /// Send whose channels feed the bed slots
    pub fn bed(config: &SurroundConfig, mute_master: Arc<MuteMaster>) -> Self {
        let mut send = Self::new(config, mute_master);
        send.role = SendRole::Bed;
        send
    }

    #[inline]
    pub fn role(&self) -> SendRole {
        self.role
    }

    pub fn signals(&self) -> &SendSignals {
        &self.signals
    }

    pub fn mute_master(&self) -> &Arc<MuteMaster> {
        &self.mute_master
    }

    // ─────────────────────────────────────────────────────────────────────
    // Activation
    // ─────────────────────────────────────────────────────────────────────

    /// Takes effect at the start of the next `run`
    pub fn activate(&self) {
        self.pending_active.store(true, Ordering::Release);
    }

    pub fn deactivate(&self) {
        self.pending_active.store(false, Ordering::Release);
    }

    /// Activation requested (may not be effective until the next cycle)
    pub fn pending_active(&self) -> bool {
        self.pending_active.load(Ordering::Acquire)
    }

    /// Effective activation of the current cycle
    #[inline]
    pub fn active(&self) -> bool {
        self.active
    }

    fn check_active(&mut self) -> bool {
        let pending = self.pending_active();
        if pending != self.active {
            self.active = pending;
        }
        self.active
    }

    // ─────────────────────────────────────────────────────────────────────
    // Configuration (non-real-time)
    // ─────────────────────────────────────────────────────────────────────

    /// Number of pan parameter sets in use
    pub fn n_pannables(&self) -> usize {
        if self.configured {
            self.config.pannables_for(self.configured_inputs)
        } else {
            self.pannables.len()
        }
    }

    /// Channels the return reads from this send
    #[inline]
    pub fn active_channel_count(&self) -> usize {
        self.n_pannables()
    }

    pub fn configure(&mut self, inputs: usize, outputs: usize) -> SurroundResult<()> {
        if inputs != outputs {
            return Err(SurroundError::ChannelMismatch { inputs, outputs });
        }

        let n_audio = self.config.pannables_for(inputs);
        let changed = self.configured && n_audio != self.n_pannables();

        while self.pannables.len() < n_audio {
            self.add_pannable();
        }

        self.configured_inputs = inputs;
        self.configured = true;

        self.send_delay.configure(n_audio);
        self.thru_delay.configure(inputs);
        self.set_block_size(self.block_size);
        self.update_delaylines();

        log::debug!(
            "Surround send configured: {} in, {} pannables ({:?})",
            inputs,
            n_audio,
            self.role
        );

        if changed {
            self.signals.pannables_changed.emit(&n_audio);
        }
        Ok(())
    }

    fn add_pannable(&mut self) {
        let channel = self.pannables.len();
        self.pannables.push(Pannable::new(channel));
    }

    pub fn set_block_size(&mut self, frames: usize) {
        self.block_size = frames;
        self.mixbufs.ensure(self.n_pannables(), frames);
        self.amp.set_block_size(frames);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Query interface for the return
    // ─────────────────────────────────────────────────────────────────────

    pub fn pannable(&self, channel: usize) -> Option<&Pannable> {
        self.pannables.get(channel)
    }

    /// Pan parameters of `channel` together with the recorded cycle window
    pub fn pan_param(&self, channel: usize) -> Option<(&Pannable, u64, u64)> {
        self.pannables
            .get(channel)
            .map(|p| (p, self.cycle_start, self.cycle_end))
    }

    /// `[start, end)` of the last processed cycle
    pub fn cycle_window(&self) -> (u64, u64) {
        (self.cycle_start, self.cycle_end)
    }

    /// Send-path audio of the last cycle
    pub fn bufs(&self) -> &ChannelBuffers {
        &self.mixbufs
    }

    pub fn gain_control(&self) -> &AutomationControl {
        self.amp.gain_control()
    }

    /// Mute gain reached at the end of the last block
    pub fn current_gain(&self) -> f64 {
        self.current_gain
    }

    pub fn last_block_state(&self) -> BlockState {
        self.last_block
    }

    // ─────────────────────────────────────────────────────────────────────
    // Processing
    // ─────────────────────────────────────────────────────────────────────

    /// Process one block. `bufs` is the track signal; it leaves as the
    /// thru-delayed pass-through output.
    pub fn run(&mut self, bufs: &mut ChannelBuffers, start: u64, end: u64, nframes: usize) {
        let nframes = nframes.min(self.mixbufs.capacity());
        let n_pannables = self.n_pannables();

        self.cycle_start = start;
        self.cycle_end = end;
        self.amp.gain_control().automation_run(start, nframes);
        for p in &self.pannables[..n_pannables] {
            p.automation_run(start, nframes);
        }

        if !self.check_active() {
            self.mixbufs.silence(nframes);
            self.last_block = BlockState::Inactive;
            return;
        }

        // copy inputs, the return reads the mix buffers later in the cycle
        for (ch, dst) in self.mixbufs.iter_mut().take(n_pannables).enumerate() {
            match bufs.get(ch) {
                Some(src) => dst.read_from(src.samples(), nframes),
                None => dst.silence(nframes),
            }
        }

        let target = self.mute_master.mute_gain();
        if target != self.current_gain {
            self.current_gain = match self.config.gain_ramp {
                GainRamp::Block => apply_gain(&mut self.mixbufs, nframes, self.current_gain, target),
                GainRamp::Step => {
                    apply_simple_gain(&mut self.mixbufs, nframes, target);
                    target
                }
            };
            self.last_block = BlockState::Ramping;
        } else if target == GAIN_COEFF_ZERO {
            // quiet last time and still supposed to be quiet
            apply_simple_gain(&mut self.mixbufs, nframes, GAIN_COEFF_ZERO);
            self.last_block = BlockState::Silent;
            return;
        } else {
            apply_simple_gain(&mut self.mixbufs, nframes, target);
            self.last_block = BlockState::Steady;
        }

        self.amp.run(&mut self.mixbufs, start, end, nframes);
        self.send_delay.process(&mut self.mixbufs, nframes);
        self.thru_delay.process(bufs, nframes);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Latency
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_delay_in(&mut self, delay: usize) {
        if self.delay_in == delay {
            return;
        }
        self.delay_in = delay;
        self.update_delaylines();
    }

    pub fn set_delay_out(&mut self, delay: usize) {
        if self.delay_out == delay {
            return;
        }
        self.delay_out = delay;
        self.update_delaylines();
    }

    pub fn delay_in(&self) -> usize {
        self.delay_in
    }

    pub fn delay_out(&self) -> usize {
        self.delay_out
    }

    /// (send, thru) lengths the current in/out delays call for
    fn wanted_split(&self) -> (usize, usize) {
        if self.delay_out > self.delay_in {
            (0, self.delay_out - self.delay_in)
        } else {
            (self.delay_in - self.delay_out, 0)
        }
    }

    /// Effective (send, thru) delay line lengths
    pub fn delay_split(&self) -> (usize, usize) {
        (self.send_delay.delay(), self.thru_delay.delay())
    }

    /// A split change is waiting for [`Self::apply_pending_delay_update`]
    pub fn delay_update_pending(&self) -> bool {
        self.delay_update_pending
    }

    fn update_delaylines(&mut self) {
        let wanted = self.wanted_split();

        if rt::in_process_thread() {
            if wanted != self.delay_split() {
                self.delay_update_pending = true;
                self.signals.queue_update.emit(&());
            }
            return;
        }

        self.apply_delay_split(wanted);
    }

    fn apply_delay_split(&mut self, (send, thru): (usize, usize)) {
        self.delay_update_pending = false;
        let thru_changed = self.thru_delay.set_delay(thru);
        let send_changed = self.send_delay.set_delay(send);

        if thru_changed || send_changed {
            log::debug!("Surround send delay split: send {} / thru {}", send, thru);
            self.signals.latency_changed.emit(&LatencyChange {
                send_delay: send,
                thru_delay: thru,
            });
        }
    }

    /// Apply a deferred delay split. Call from a non-real-time context after
    /// a queue-update notification; returns true if a split was applied.
    pub fn apply_pending_delay_update(&mut self) -> bool {
        if !self.delay_update_pending || rt::in_process_thread() {
            return false;
        }
        let wanted = self.wanted_split();
        self.apply_delay_split(wanted);
        true
    }

    /// Latency this send adds to the graph
    pub fn signal_latency(&self) -> usize {
        if !self.pending_active() {
            return 0;
        }
        self.send_delay.latency()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Controls
    // ─────────────────────────────────────────────────────────────────────

    /// Set the gain (`channel` ignored) or a pan control of `channel`
    pub fn set_control(&self, channel: Option<usize>, kind: ControlKind, value: f64) -> SurroundResult<()> {
        let control = match (kind, channel) {
            (ControlKind::Gain, _) => self.amp.gain_control(),
            (_, Some(ch)) => self
                .pannables
                .get(ch)
                .and_then(|p| p.control(kind))
                .ok_or(SurroundError::InvalidChannel {
                    channel: ch,
                    available: self.pannables.len(),
                })?,
            (_, None) => {
                return Err(SurroundError::InvalidControl(format!(
                    "{:?} needs a channel",
                    kind
                )));
            }
        };

        if control.set_value(value) {
            self.signals.control_changed.emit(&ControlChange {
                channel: if kind == ControlKind::Gain { None } else { channel },
                kind,
                value: control.value(),
            });
        }
        Ok(())
    }

    /// Automation lane name, prefixed with the channel when there are several
    pub fn describe_parameter(&self, channel: usize, kind: ControlKind) -> String {
        let n = self.n_pannables();
        if n < 2 || !kind.is_pan() {
            return kind.name().to_string();
        }
        let prefix = if n == 2 {
            if channel == 0 { "L".to_string() } else { "R".to_string() }
        } else {
            (channel + 1).to_string()
        };
        format!("[{}] {}", prefix, kind.name())
    }

    // ─────────────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────────────

    pub fn get_state(&self) -> SendState {
        let n = self.n_pannables();
        SendState {
            kind: SEND_STATE_KIND.to_string(),
            role: self.role,
            n_pannables: n,
            gain: self.amp.gain_control().get_state(),
            pannables: self.pannables[..n].iter().map(Pannable::get_state).collect(),
        }
    }

    pub fn set_state(&mut self, state: &SendState) -> SurroundResult<()> {
        if state.kind != SEND_STATE_KIND {
            return Err(SurroundError::InvalidState(format!(
                "expected {} state, got {}",
                SEND_STATE_KIND, state.kind
            )));
        }

        self.amp.gain_control().set_state(&state.gain)?;
        self.role = state.role;

        while self.pannables.len() < state.n_pannables {
            self.add_pannable();
        }

        for ps in &state.pannables {
            match self.pannables.get(ps.channel) {
                Some(p) => p.set_state(ps)?,
                None => log::warn!("Ignoring state for surround pannable {}", ps.channel),
            }
        }
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SurroundResult<()> {
        std::fs::write(path, self.get_state().to_json()?)?;
        Ok(())
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> SurroundResult<()> {
        let json = std::fs::read_to_string(path)?;
        self.set_state(&SendState::from_json(&json)?)
    }
}

impl std::fmt::Debug for SurroundSend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurroundSend")
            .field("role", &self.role)
            .field("n_pannables", &self.n_pannables())
            .field("active", &self.active)
            .field("delay_split", &self.delay_split())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::AutoState;
    use std::sync::atomic::AtomicUsize;

    fn send(inputs: usize) -> SurroundSend {
        let mut config = SurroundConfig::default();
        config.block_size = 8;
        let mut s = SurroundSend::new(&config, MuteMaster::new());
        s.configure(inputs, inputs).unwrap();
        s.activate();
        s
    }

    fn signal(channels: usize, frames: usize, value: f64) -> ChannelBuffers {
        let mut bufs = ChannelBuffers::new(channels, frames);
        for ch in bufs.iter_mut() {
            ch.samples_mut().fill(value);
        }
        bufs
    }

    #[test]
    fn test_configure_grows_never_shrinks() {
        let mut s = send(4);
        assert_eq!(s.n_pannables(), 4);

        s.configure(2, 2).unwrap();
        assert_eq!(s.n_pannables(), 2);
        assert!(s.pannable(3).is_some());

        assert!(s.configure(2, 3).is_err());
    }

    #[test]
    fn test_pannables_changed_only_on_reconfigure() {
        let mut config = SurroundConfig::default();
        config.block_size = 8;
        let mut s = SurroundSend::new(&config, MuteMaster::new());
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        s.signals().pannables_changed.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        s.configure(2, 2).unwrap();
        s.configure(2, 2).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        s.configure(3, 3).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pannable_cap() {
        let mut config = SurroundConfig::stereo_sends();
        config.block_size = 8;
        let mut s = SurroundSend::new(&config, MuteMaster::new());
        s.configure(6, 6).unwrap();
        assert_eq!(s.n_pannables(), 2);
    }

    #[test]
    fn test_first_block_fades_in() {
        let mut s = send(1);
        let mut bufs = signal(1, 8, 1.0);
        s.run(&mut bufs, 0, 8, 8);

        assert_eq!(s.last_block_state(), BlockState::Ramping);
        let out = s.bufs().channel(0);
        assert!(out[0] < out[7]);
        assert!((out[7] - 1.0).abs() < 1e-12);

        let mut bufs = signal(1, 8, 1.0);
        s.run(&mut bufs, 8, 16, 8);
        assert_eq!(s.last_block_state(), BlockState::Steady);
        assert!(s.bufs().channel(0).iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_inactive_send_is_silent() {
        let mut s = send(2);
        s.deactivate();
        let mut bufs = signal(2, 8, 0.5);
        s.run(&mut bufs, 0, 8, 8);
        assert_eq!(s.last_block_state(), BlockState::Inactive);
        assert!(s.bufs().is_silent(8));
        assert!(!s.active());
    }

    #[test]
    fn test_silent_fast_path() {
        let mut s = send(1);
        s.mute_master().set_muted(true);

        let mut bufs = signal(1, 8, 1.0);
        s.run(&mut bufs, 0, 8, 8);
        assert_eq!(s.last_block_state(), BlockState::Silent);
        assert!(s.bufs().is_silent(8));
        assert_eq!(s.cycle_window(), (0, 8));
    }

    #[test]
    fn test_gain_automation_advances_while_silent() {
        let mut s = send(1);
        s.mute_master().set_muted(true);
        let gain = s.gain_control();
        gain.add_event(0, 0.0);
        gain.add_event(100, 2.0);
        gain.set_automation_state(AutoState::Play);

        let mut bufs = signal(1, 8, 1.0);
        s.run(&mut bufs, 0, 8, 8);
        assert_eq!(s.last_block_state(), BlockState::Silent);
        assert_eq!(s.gain_control().value(), 0.0);

        s.run(&mut bufs, 50, 58, 8);
        assert_eq!(s.last_block_state(), BlockState::Silent);
        assert!((s.gain_control().value() - 1.0).abs() < 1e-12);

        s.deactivate();
        s.run(&mut bufs, 75, 83, 8);
        assert_eq!(s.last_block_state(), BlockState::Inactive);
        assert!((s.gain_control().value() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_delay_split_outside_process_thread() {
        let mut s = send(1);
        let latency = Arc::new(AtomicUsize::new(0));
        let l = Arc::clone(&latency);
        s.signals().latency_changed.connect(move |_| {
            l.fetch_add(1, Ordering::SeqCst);
        });

        s.set_delay_in(10);
        assert_eq!(s.delay_split(), (10, 0));
        s.set_delay_out(25);
        assert_eq!(s.delay_split(), (0, 15));
        s.set_delay_out(25);
        assert_eq!(latency.load(Ordering::SeqCst), 2);
        assert_eq!(s.signal_latency(), 0);
    }

    #[test]
    fn test_delay_split_deferred_in_process_thread() {
        let mut s = send(1);
        let queued = Arc::new(AtomicUsize::new(0));
        let q = Arc::clone(&queued);
        s.signals().queue_update.connect(move |_| {
            q.fetch_add(1, Ordering::SeqCst);
        });

        {
            let _scope = rt::ProcessScope::enter();
            s.set_delay_in(32);
            assert_eq!(s.delay_split(), (0, 0));
            assert!(s.delay_update_pending());
            assert!(!s.apply_pending_delay_update());
        }
        assert_eq!(queued.load(Ordering::SeqCst), 1);

        assert!(s.apply_pending_delay_update());
        assert_eq!(s.delay_split(), (32, 0));
        assert_eq!(s.signal_latency(), 32);
    }

    #[test]
    fn test_send_delay_shifts_send_path() {
        let mut s = send(1);
        s.set_delay_in(2);

        let mut bufs = ChannelBuffers::new(1, 8);
        bufs.channel_mut(0)[0] = 1.0;
        // skip the fade-in block
        s.run(&mut ChannelBuffers::new(1, 8), 0, 8, 8);
        s.run(&mut bufs, 8, 16, 8);

        assert_eq!(s.bufs().channel(0)[2], 1.0);
        assert_eq!(bufs.channel(0)[0], 1.0);
    }

    #[test]
    fn test_set_control_and_events() {
        let s = send(2);
        let seen = Arc::new(AtomicUsize::new(0));
        let v = Arc::clone(&seen);
        s.signals().control_changed.connect(move |c| {
            assert_eq!(c.channel, Some(1));
            assert_eq!(c.kind, ControlKind::PanZ);
            v.fetch_add(1, Ordering::SeqCst);
        });

        s.set_control(Some(1), ControlKind::PanZ, 0.75).unwrap();
        s.set_control(Some(1), ControlKind::PanZ, 0.75).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(s.pannable(1).map(|p| p.value(ControlKind::PanZ)), Some(0.75));

        assert!(s.set_control(Some(5), ControlKind::PanX, 0.0).is_err());
        assert!(s.set_control(None, ControlKind::Size, 0.0).is_err());
    }

    #[test]
    fn test_describe_parameter() {
        assert_eq!(send(1).describe_parameter(0, ControlKind::PanX), "Left/Right");
        assert_eq!(send(2).describe_parameter(1, ControlKind::PanY), "[R] Front/Back");
        assert_eq!(send(4).describe_parameter(2, ControlKind::PanZ), "[3] Elevation");
        assert_eq!(
            send(2).describe_parameter(0, ControlKind::RenderMode),
            "[L] Binaural Render mode"
        );
    }

    #[test]
    fn test_state_rejects_wrong_kind() {
        let mut s = send(1);
        let mut state = s.get_state();
        state.kind = "aux".into();
        assert!(s.set_state(&state).is_err());
    }

    #[test]
    fn test_state_restores_automation() {
        let a = send(2);
        a.pannable(1).unwrap().pan_pos_x().add_event(100, 0.2);
        a.pannable(1).unwrap().set_automation_state(AutoState::Play);

        let mut b = SurroundSend::new(&SurroundConfig::default(), MuteMaster::new());
        b.set_state(&a.get_state()).unwrap();
        assert_eq!(b.n_pannables(), 2);
        assert_eq!(b.pannable(1).unwrap().automation_state(), AutoState::Play);
        assert_eq!(b.pannable(1).unwrap().pan_pos_x().list().len(), 1);
    }
}
