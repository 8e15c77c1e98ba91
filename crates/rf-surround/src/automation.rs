//! Automation for surround controls
//!
//! - Closed set of control kinds with their ranges and names
//! - Time-sorted breakpoint lists with non-blocking point evaluation
//! - Per-control automation state (Manual/Play/Touch/Latch) and touch tracking

use parking_lot::RwLock;
use rf_core::{AtomicParam, ParamRange, ParamSkew};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use crate::error::{SurroundError, SurroundResult};

// ═══════════════════════════════════════════════════════════════════════════
// CONTROL KIND
// ═══════════════════════════════════════════════════════════════════════════

/// Every automatable control a surround send exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    /// Send level (linear gain)
    Gain,
    /// Left/right position
    PanX,
    /// Front/back position
    PanY,
    /// Elevation
    PanZ,
    /// Object size
    Size,
    /// Snap to nearest speaker
    Snap,
    /// Binaural near/mid/far selector
    RenderMode,
}

impl ControlKind {
    /// The five pan parameters, in metadata order
    pub const PAN: [ControlKind; 5] = [
        ControlKind::PanX,
        ControlKind::PanY,
        ControlKind::PanZ,
        ControlKind::Size,
        ControlKind::Snap,
    ];

    pub fn range(self) -> ParamRange {
        match self {
            ControlKind::Gain => ParamRange::linear(0.0, 2.0, 1.0),
            ControlKind::PanX => ParamRange::linear(0.0, 1.0, 0.5),
            ControlKind::PanY | ControlKind::PanZ | ControlKind::Size => {
                ParamRange::linear(0.0, 1.0, 0.0)
            }
            ControlKind::Snap => ParamRange::toggle(false),
            ControlKind::RenderMode => ParamRange::enumeration(3, 0),
        }
    }

    /// Display name of the automation lane
    pub fn name(self) -> &'static str {
        match self {
            ControlKind::Gain => "Send Level",
            ControlKind::PanX => "Left/Right",
            ControlKind::PanY => "Front/Back",
            ControlKind::PanZ => "Elevation",
            ControlKind::Size => "Object Size",
            ControlKind::Snap => "Snap to Speaker",
            ControlKind::RenderMode => "Binaural Render mode",
        }
    }

    pub fn is_pan(self) -> bool {
        !matches!(self, ControlKind::Gain)
    }

    /// Toggles and selectors hold their value between breakpoints
    pub fn interpolation(self) -> Interpolation {
        match self.range().skew {
            ParamSkew::Linear => Interpolation::Linear,
            ParamSkew::Toggled | ParamSkew::Integer => Interpolation::Discrete,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// AUTOMATION STATE
// ═══════════════════════════════════════════════════════════════════════════

/// Automation playback/recording state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AutoState {
    /// Control follows user input only
    #[default]
    Manual,
    /// Control follows the automation list
    Play,
    /// Plays back, records while touched
    Touch,
    /// Plays back, records from first touch until stop
    Latch,
}

impl AutoState {
    /// Whether the automation list drives the value right now
    #[inline]
    pub fn is_automated(self, touching: bool) -> bool {
        match self {
            AutoState::Play => true,
            AutoState::Touch | AutoState::Latch => !touching,
            AutoState::Manual => false,
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            AutoState::Manual => 0,
            AutoState::Play => 1,
            AutoState::Touch => 2,
            AutoState::Latch => 3,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => AutoState::Play,
            2 => AutoState::Touch,
            3 => AutoState::Latch,
            _ => AutoState::Manual,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// AUTOMATION LIST
// ═══════════════════════════════════════════════════════════════════════════

/// Single breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlEvent {
    /// Time in samples
    pub when: u64,
    pub value: f64,
}

impl ControlEvent {
    pub fn new(when: u64, value: f64) -> Self {
        Self { when, value }
    }
}

/// How values between breakpoints are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Hold the previous breakpoint's value
    Discrete,
}

/// Time-sorted breakpoint list
///
/// Editing takes the write lock and must happen off the audio thread.
/// The `rt_safe_*` readers only ever try-lock and report failure instead of
/// waiting.
#[derive(Debug, Default)]
pub struct AutomationList {
    events: RwLock<Vec<ControlEvent>>,
    interpolation: Interpolation,
    /// Index of the first event after the last evaluated time
    search_hint: AtomicUsize,
}

impl AutomationList {
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            interpolation,
            search_hint: AtomicUsize::new(0),
        }
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Add a breakpoint, maintaining sorted order (replaces one at the same time)
    pub fn add(&self, when: u64, value: f64) {
        let mut events = self.events.write();
        match events.binary_search_by_key(&when, |e| e.when) {
            Ok(idx) => events[idx].value = value,
            Err(idx) => events.insert(idx, ControlEvent::new(when, value)),
        }
        self.search_hint.store(0, Ordering::Relaxed);
    }

    /// Replace the whole list
    pub fn set_events(&self, mut new_events: Vec<ControlEvent>) {
        new_events.sort_by_key(|e| e.when);
        new_events.dedup_by_key(|e| e.when);
        *self.events.write() = new_events;
        self.search_hint.store(0, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.events.write().clear();
        self.search_hint.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hold the edit lock, as an editor on another thread would
    #[cfg(test)]
    pub(crate) fn edit_guard(&self) -> parking_lot::RwLockWriteGuard<'_, Vec<ControlEvent>> {
        self.events.write()
    }

    /// Snapshot of all breakpoints
    pub fn events(&self) -> Vec<ControlEvent> {
        self.events.read().clone()
    }

    /// Point evaluation that never blocks.
    ///
    /// Returns None when the list is empty or currently being edited.
    pub fn rt_safe_eval(&self, when: u64) -> Option<f64> {
        let events = self.events.try_read()?;
        if events.is_empty() {
            return None;
        }
        Some(self.eval_locked(&events, when))
    }

    /// Point evaluation where an empty list yields `unset`.
    ///
    /// Only a list that is currently being edited returns None.
    pub fn rt_safe_eval_or(&self, when: u64, unset: f64) -> Option<f64> {
        let events = self.events.try_read()?;
        if events.is_empty() {
            return Some(unset);
        }
        Some(self.eval_locked(&events, when))
    }

    fn eval_locked(&self, events: &[ControlEvent], when: u64) -> f64 {
        let idx = self.upper_bound(events, when);
        self.search_hint.store(idx, Ordering::Relaxed);
        self.value_between(events, idx, when)
    }

    /// Fill `out[i]` with the value at `start + i`.
    ///
    /// Returns false (leaving `out` untouched) when the list is empty or busy.
    pub fn rt_safe_curve(&self, start: u64, out: &mut [f64]) -> bool {
        let Some(events) = self.events.try_read() else {
            return false;
        };
        if events.is_empty() {
            return false;
        }

        let mut idx = self.upper_bound(&events, start);
        for (i, slot) in out.iter_mut().enumerate() {
            let when = start + i as u64;
            while idx < events.len() && events[idx].when <= when {
                idx += 1;
            }
            *slot = self.value_between(&events, idx, when);
        }
        self.search_hint.store(idx, Ordering::Relaxed);
        true
    }

    /// First breakpoint with `after < when < before`
    pub fn find_next_event(&self, after: u64, before: u64) -> Option<ControlEvent> {
        let events = self.events.try_read()?;
        let idx = events.partition_point(|e| e.when <= after);
        events.get(idx).copied().filter(|e| e.when < before)
    }

    /// Index of the first event strictly after `when`, scanning forward from
    /// the hint when it is still valid
    fn upper_bound(&self, events: &[ControlEvent], when: u64) -> usize {
        let hint = self.search_hint.load(Ordering::Relaxed);
        if hint <= events.len() && (hint == 0 || events[hint - 1].when <= when) {
            let mut idx = hint;
            while idx < events.len() && events[idx].when <= when {
                idx += 1;
            }
            idx
        } else {
            events.partition_point(|e| e.when <= when)
        }
    }

    fn value_between(&self, events: &[ControlEvent], idx: usize, when: u64) -> f64 {
        if idx == 0 {
            return events[0].value;
        }
        let prev = &events[idx - 1];
        let Some(next) = events.get(idx) else {
            return prev.value;
        };

        match self.interpolation {
            Interpolation::Discrete => prev.value,
            Interpolation::Linear => {
                let t = (when - prev.when) as f64 / (next.when - prev.when) as f64;
                prev.value + (next.value - prev.value) * t
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// AUTOMATION CONTROL
// ═══════════════════════════════════════════════════════════════════════════

/// Persisted form of one control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub kind: ControlKind,
    pub value: f64,
    #[serde(default)]
    pub auto_state: AutoState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ControlEvent>,
}

/// One automatable scalar
#[derive(Debug)]
pub struct AutomationControl {
    kind: ControlKind,
    value: AtomicParam,
    list: AutomationList,
    auto_state: AtomicU8,
    touching: AtomicBool,
}

impl AutomationControl {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            value: AtomicParam::new(kind.range().default),
            list: AutomationList::new(kind.interpolation()),
            auto_state: AtomicU8::new(AutoState::Manual.to_u8()),
            touching: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value.get()
    }

    /// Set the current value (clamped to the control's range).
    ///
    /// Returns true if the stored value changed.
    pub fn set_value(&self, value: f64) -> bool {
        self.value.replace(self.kind.range().constrain(value))
    }

    pub fn list(&self) -> &AutomationList {
        &self.list
    }

    /// Add a breakpoint, clamping the value to the control's range
    pub fn add_event(&self, when: u64, value: f64) {
        self.list.add(when, self.kind.range().constrain(value));
    }

    pub fn automation_state(&self) -> AutoState {
        AutoState::from_u8(self.auto_state.load(Ordering::Acquire))
    }

    pub fn set_automation_state(&self, state: AutoState) {
        self.auto_state.store(state.to_u8(), Ordering::Release);
    }

    pub fn start_touch(&self) {
        self.touching.store(true, Ordering::Release);
    }

    pub fn stop_touch(&self) {
        self.touching.store(false, Ordering::Release);
    }

    #[inline]
    pub fn touching(&self) -> bool {
        self.touching.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_automated(&self) -> bool {
        self.automation_state().is_automated(self.touching())
    }

    /// Non-blocking point evaluation of the automation list.
    ///
    /// A lane without breakpoints evaluates to the current value; None means
    /// the list is being edited.
    #[inline]
    pub fn evaluate(&self, when: u64) -> Option<f64> {
        self.list.rt_safe_eval_or(when, self.value())
    }

    /// Per-block update: when automated, follow the list at `start`
    pub fn automation_run(&self, start: u64, _nframes: usize) {
        if !self.is_automated() {
            return;
        }
        if let Some(v) = self.list.rt_safe_eval(start) {
            self.value.set(self.kind.range().constrain(v));
        }
    }

    pub fn get_state(&self) -> ControlState {
        ControlState {
            kind: self.kind,
            value: self.value(),
            auto_state: self.automation_state(),
            events: self.list.events(),
        }
    }

    pub fn set_state(&self, state: &ControlState) -> SurroundResult<()> {
        if state.kind != self.kind {
            return Err(SurroundError::InvalidState(format!(
                "control state for {:?} applied to {:?}",
                state.kind, self.kind
            )));
        }
        self.set_value(state.value);
        self.list.set_events(state.events.clone());
        self.set_automation_state(state.auto_state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_linear_eval() {
        let list = AutomationList::new(Interpolation::Linear);
        assert_eq!(list.rt_safe_eval(0), None);

        list.add(100, 0.0);
        list.add(200, 1.0);

        assert_eq!(list.rt_safe_eval(0), Some(0.0));
        assert!((list.rt_safe_eval(150).unwrap() - 0.5).abs() < 1e-10);
        assert_eq!(list.rt_safe_eval(200), Some(1.0));
        assert_eq!(list.rt_safe_eval(1000), Some(1.0));
        // hint must not break a backwards jump
        assert!((list.rt_safe_eval(125).unwrap() - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_list_discrete_eval() {
        let list = AutomationList::new(Interpolation::Discrete);
        list.add(0, 0.0);
        list.add(100, 1.0);
        assert_eq!(list.rt_safe_eval(99), Some(0.0));
        assert_eq!(list.rt_safe_eval(100), Some(1.0));
    }

    #[test]
    fn test_add_replaces_same_time() {
        let list = AutomationList::new(Interpolation::Linear);
        list.add(10, 0.2);
        list.add(10, 0.7);
        assert_eq!(list.len(), 1);
        assert_eq!(list.events()[0].value, 0.7);
    }

    #[test]
    fn test_find_next_event_is_exclusive() {
        let list = AutomationList::new(Interpolation::Linear);
        list.add(100, 0.0);
        list.add(150, 0.5);
        list.add(200, 1.0);

        assert_eq!(list.find_next_event(100, 200).map(|e| e.when), Some(150));
        assert_eq!(list.find_next_event(99, 200).map(|e| e.when), Some(100));
        assert_eq!(list.find_next_event(150, 200), None);
        assert_eq!(list.find_next_event(0, 100), None);
    }

    #[test]
    fn test_eval_fails_while_editing() {
        let list = AutomationList::new(Interpolation::Linear);
        list.add(0, 0.5);
        let _guard = list.events.write();
        assert_eq!(list.rt_safe_eval(0), None);
        assert_eq!(list.find_next_event(0, 10), None);
    }

    #[test]
    fn test_empty_lane_evaluates_to_current_value() {
        let ctl = AutomationControl::new(ControlKind::PanY);
        assert_eq!(ctl.evaluate(500), Some(0.0));
        ctl.set_value(0.4);
        assert_eq!(ctl.evaluate(500), Some(0.4));

        ctl.add_event(0, 0.9);
        assert_eq!(ctl.evaluate(500), Some(0.9));

        let _guard = ctl.list().edit_guard();
        assert_eq!(ctl.evaluate(500), None);
    }

    #[test]
    fn test_curve_matches_point_eval() {
        let list = AutomationList::new(Interpolation::Linear);
        list.add(0, 0.0);
        list.add(8, 1.0);

        let mut curve = [0.0; 12];
        assert!(list.rt_safe_curve(2, &mut curve));
        for (i, v) in curve.iter().enumerate() {
            let expected = list.rt_safe_eval(2 + i as u64).unwrap();
            assert!((v - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_auto_state_touch() {
        assert!(AutoState::Play.is_automated(true));
        assert!(AutoState::Touch.is_automated(false));
        assert!(!AutoState::Touch.is_automated(true));
        assert!(!AutoState::Latch.is_automated(true));
        assert!(!AutoState::Manual.is_automated(false));
    }

    #[test]
    fn test_control_clamps_and_follows_automation() {
        let ctl = AutomationControl::new(ControlKind::PanX);
        assert_eq!(ctl.value(), 0.5);
        assert!(ctl.set_value(3.0));
        assert_eq!(ctl.value(), 1.0);
        assert!(!ctl.set_value(1.0));

        ctl.add_event(0, 0.25);
        ctl.automation_run(0, 64);
        assert_eq!(ctl.value(), 1.0);

        ctl.set_automation_state(AutoState::Play);
        ctl.automation_run(0, 64);
        assert_eq!(ctl.value(), 0.25);
    }

    #[test]
    fn test_control_state_kind_mismatch() {
        let x = AutomationControl::new(ControlKind::PanX);
        let y = AutomationControl::new(ControlKind::PanY);
        assert!(y.set_state(&x.get_state()).is_err());
    }
}
