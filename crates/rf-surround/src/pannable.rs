//! Pan parameter set for one surround object
//!
//! Five automatable pan controls (X, Y, Z, Size, Snap) plus the binaural
//! render-mode selector, owned by one channel of a surround send.

use serde::{Deserialize, Serialize};

use crate::automation::{AutoState, AutomationControl, ControlEvent, ControlKind, ControlState};
use crate::error::{SurroundError, SurroundResult};

/// Number of pan parameters carried in each metadata update
pub const NUM_PAN_PARAMETERS: usize = 5;

/// Pan values in metadata order: x, y, z, size, snap
pub type PanValues = [f32; NUM_PAN_PARAMETERS];

/// Binaural render distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum BinauralRenderMode {
    #[default]
    Off = 0,
    Near = 1,
    Mid = 2,
    Far = 3,
}

impl BinauralRenderMode {
    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Near,
            2 => Self::Mid,
            3 => Self::Far,
            _ => Self::Off,
        }
    }
}

/// Persisted form of a pan parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PannableState {
    pub channel: usize,
    pub controls: Vec<ControlState>,
}

/// Spatial trajectory of one object
#[derive(Debug)]
pub struct Pannable {
    channel: usize,
    pan: [AutomationControl; NUM_PAN_PARAMETERS],
    render_mode: AutomationControl,
}

impl Pannable {
    pub fn new(channel: usize) -> Self {
        Self {
            channel,
            pan: ControlKind::PAN.map(AutomationControl::new),
            render_mode: AutomationControl::new(ControlKind::RenderMode),
        }
    }

    /// Channel index inside the owning send
    #[inline]
    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn control(&self, kind: ControlKind) -> Option<&AutomationControl> {
        match kind {
            ControlKind::Gain => None,
            ControlKind::RenderMode => Some(&self.render_mode),
            pan => self.pan.iter().find(|c| c.kind() == pan),
        }
    }

    pub fn controls(&self) -> impl Iterator<Item = &AutomationControl> {
        self.pan.iter().chain(std::iter::once(&self.render_mode))
    }

    pub fn pan_pos_x(&self) -> &AutomationControl {
        &self.pan[0]
    }

    pub fn pan_pos_y(&self) -> &AutomationControl {
        &self.pan[1]
    }

    pub fn pan_pos_z(&self) -> &AutomationControl {
        &self.pan[2]
    }

    pub fn pan_size(&self) -> &AutomationControl {
        &self.pan[3]
    }

    pub fn pan_snap(&self) -> &AutomationControl {
        &self.pan[4]
    }

    pub fn binaural_render_mode(&self) -> &AutomationControl {
        &self.render_mode
    }

    /// Current value of one parameter (0.0 for kinds this set does not own)
    pub fn value(&self, kind: ControlKind) -> f64 {
        self.control(kind).map_or(0.0, AutomationControl::value)
    }

    /// Point sample of one parameter's automation
    pub fn evaluate(&self, kind: ControlKind, when: u64) -> Option<f64> {
        self.control(kind)?.evaluate(when)
    }

    /// Current values of the five pan parameters
    pub fn current_values(&self) -> PanValues {
        self.pan.each_ref().map(|c| c.value() as f32)
    }

    /// Evaluate all five pan parameters at `when`; fails if any one fails
    pub fn evaluate_all(&self, when: u64) -> Option<PanValues> {
        let mut values = [0.0f32; NUM_PAN_PARAMETERS];
        for (v, c) in values.iter_mut().zip(&self.pan) {
            *v = c.evaluate(when)? as f32;
        }
        Some(values)
    }

    #[inline]
    pub fn render_mode(&self) -> i32 {
        self.render_mode.value() as i32
    }

    pub fn set_render_mode(&self, mode: BinauralRenderMode) -> bool {
        self.render_mode.set_value(mode as i32 as f64)
    }

    /// Combined state of the pan controls: play wins, then touch, then latch
    pub fn automation_state(&self) -> AutoState {
        let mut combined = AutoState::Manual;
        for c in &self.pan {
            match c.automation_state() {
                AutoState::Play => return AutoState::Play,
                AutoState::Touch => combined = AutoState::Touch,
                AutoState::Latch if combined == AutoState::Manual => combined = AutoState::Latch,
                _ => {}
            }
        }
        combined
    }

    pub fn set_automation_state(&self, state: AutoState) {
        for c in &self.pan {
            c.set_automation_state(state);
        }
    }

    /// True while any pan control is being touched
    pub fn touching(&self) -> bool {
        self.pan.iter().any(AutomationControl::touching)
    }

    #[inline]
    pub fn is_automated(&self) -> bool {
        self.automation_state().is_automated(self.touching())
    }

    /// Earliest breakpoint across the pan parameters with `after < when < before`
    pub fn find_next_event(&self, after: u64, before: u64) -> Option<ControlEvent> {
        let mut next: Option<ControlEvent> = None;
        for c in &self.pan {
            let Some(ev) = c.list().find_next_event(after, before) else {
                continue;
            };
            if next.is_none_or(|n| ev.when < n.when) {
                next = Some(ev);
            }
        }
        next
    }

    /// Per-block update of every control
    pub fn automation_run(&self, start: u64, nframes: usize) {
        for c in self.controls() {
            c.automation_run(start, nframes);
        }
    }

    pub fn get_state(&self) -> PannableState {
        PannableState {
            channel: self.channel,
            controls: self.controls().map(AutomationControl::get_state).collect(),
        }
    }

    pub fn set_state(&self, state: &PannableState) -> SurroundResult<()> {
        for cs in &state.controls {
            let control = self.control(cs.kind).ok_or_else(|| {
                SurroundError::InvalidState(format!("{:?} is not a pan control", cs.kind))
            })?;
            control.set_state(cs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pannable::new(3);
        assert_eq!(p.channel(), 3);
        assert_eq!(p.current_values(), [0.5, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(p.render_mode(), 0);
        assert!(p.control(ControlKind::Gain).is_none());
        assert_eq!(p.controls().count(), 6);
    }

    #[test]
    fn test_evaluate_all_mixes_lanes_and_current_values() {
        let p = Pannable::new(0);
        p.pan_size().set_value(0.25);
        p.pan_pos_x().add_event(0, 0.0);
        p.pan_pos_x().add_event(100, 1.0);
        assert_eq!(p.evaluate_all(50), Some([0.5, 0.0, 0.0, 0.25, 0.0]));

        p.pan_snap().add_event(0, 1.0);
        assert_eq!(p.evaluate_all(100), Some([1.0, 0.0, 0.0, 0.25, 1.0]));
    }

    #[test]
    fn test_evaluate_all_fails_while_any_lane_is_edited() {
        let p = Pannable::new(0);
        p.pan_pos_x().add_event(0, 0.3);
        let _guard = p.pan_pos_z().list().edit_guard();
        assert_eq!(p.evaluate_all(0), None);
    }

    #[test]
    fn test_combined_automation_state() {
        let p = Pannable::new(0);
        assert_eq!(p.automation_state(), AutoState::Manual);

        p.pan_pos_z().set_automation_state(AutoState::Latch);
        assert_eq!(p.automation_state(), AutoState::Latch);

        p.pan_size().set_automation_state(AutoState::Touch);
        assert_eq!(p.automation_state(), AutoState::Touch);
        assert!(p.is_automated());

        p.pan_pos_x().start_touch();
        assert!(!p.is_automated());

        p.pan_pos_y().set_automation_state(AutoState::Play);
        assert!(p.is_automated());
    }

    #[test]
    fn test_find_next_event_earliest_wins() {
        let p = Pannable::new(0);
        p.pan_pos_x().add_event(300, 0.1);
        p.pan_pos_z().add_event(120, 0.9);
        p.pan_snap().add_event(200, 1.0);

        assert_eq!(p.find_next_event(100, 400).map(|e| e.when), Some(120));
        assert_eq!(p.find_next_event(120, 400).map(|e| e.when), Some(200));
        assert_eq!(p.find_next_event(300, 400), None);
    }

    #[test]
    fn test_render_mode_selector() {
        let p = Pannable::new(0);
        assert!(p.set_render_mode(BinauralRenderMode::Far));
        assert_eq!(p.render_mode(), 3);
        assert_eq!(BinauralRenderMode::from_i32(p.render_mode()), BinauralRenderMode::Far);
    }

    #[test]
    fn test_state_roundtrip() {
        let p = Pannable::new(1);
        p.pan_pos_x().set_value(0.125);
        p.pan_snap().set_value(1.0);
        p.pan_pos_y().add_event(48, 0.75);
        p.pan_pos_y().set_automation_state(AutoState::Play);

        let json = serde_json::to_string(&p.get_state()).unwrap();
        let state: PannableState = serde_json::from_str(&json).unwrap();

        let q = Pannable::new(1);
        q.set_state(&state).unwrap();
        assert_eq!(q.current_values(), p.current_values());
        assert_eq!(q.pan_pos_y().automation_state(), AutoState::Play);
        assert_eq!(q.pan_pos_y().list().events(), p.pan_pos_y().list().events());
    }
}
