use crate::config::{EndPolicy, Mode};
use crate::router::Action;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    Hidden,
    Playing,
    Looping,
}

/// Lightweight per-slot playback state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSlot {
    pub state: ClipState,
    /// Session time at which the current activation started
    pub start_time: f64,
    /// Clip-local time of the frame last presented
    pub playhead: f64,
}

impl Default for ClipSlot {
    fn default() -> Self {
        Self {
            state: ClipState::Hidden,
            start_time: 0.0,
            playhead: 0.0,
        }
    }
}

impl ClipSlot {
    pub fn is_active(&self) -> bool {
        self.state != ClipState::Hidden
    }
}

/// Owns the lifecycle of every clip slot.
///
/// Hidden slots always carry a zero playhead. Indices come from the note
/// router and are already reduced modulo the slot count; anything else is a
/// caller bug and is ignored.
#[derive(Debug, Clone)]
pub struct ClipStateMachine {
    mode: Mode,
    end_policy: EndPolicy,
    slots: Vec<ClipSlot>,
}

impl ClipStateMachine {
    pub fn new(clip_count: usize, mode: Mode, end_policy: EndPolicy) -> Self {
        Self {
            mode,
            end_policy,
            slots: vec![ClipSlot::default(); clip_count],
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn end_policy(&self) -> EndPolicy {
        self.end_policy
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&ClipSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[ClipSlot] {
        &self.slots
    }

    pub fn state(&self, index: usize) -> Option<ClipState> {
        self.slots.get(index).map(|s| s.state)
    }

    pub fn any_active(&self) -> bool {
        self.slots.iter().any(ClipSlot::is_active)
    }

    pub fn active_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_active())
            .map(|(i, _)| i)
            .collect()
    }

    fn active_state(&self) -> ClipState {
        match self.end_policy {
            EndPolicy::Loop => ClipState::Looping,
            EndPolicy::Hold | EndPolicy::Hide => ClipState::Playing,
        }
    }

    /// Starts (or restarts) clip `index` from its first frame at session
    /// time `at`. In exclusive mode every other clip is hidden.
    pub fn activate(&mut self, index: usize, at: f64) {
        if index >= self.slots.len() {
            return;
        }
        if self.mode == Mode::Exclusive {
            for (i, slot) in self.slots.iter_mut().enumerate() {
                if i != index {
                    *slot = ClipSlot::default();
                }
            }
        }
        let state = self.active_state();
        let slot = &mut self.slots[index];
        if slot.is_active() {
            debug!("Retriggering clip {}", index);
        }
        *slot = ClipSlot {
            state,
            start_time: at,
            playhead: 0.0,
        };
    }

    /// Releases clip `index`. Only polyphonic mode reacts; an exclusive
    /// selection stays latched until another clip is activated.
    pub fn deactivate(&mut self, index: usize) {
        if self.mode == Mode::Exclusive {
            return;
        }
        self.hide(index);
    }

    /// Forces clip `index` to Hidden regardless of mode.
    pub fn hide(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = ClipSlot::default();
        }
    }

    /// Restarts an active clip at session time `at` without touching others.
    pub fn restart(&mut self, index: usize, at: f64) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_active() {
                slot.start_time = at;
                slot.playhead = 0.0;
            }
        }
    }

    pub fn set_playhead(&mut self, index: usize, playhead: f64) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_active() {
                slot.playhead = playhead;
            }
        }
    }

    /// Applies a routed action. Returns `true` when the action is `Quit`.
    pub fn apply(&mut self, action: Action, at: f64) -> bool {
        match action {
            Action::Quit => return true,
            Action::Activate(index) => self.activate(index, at),
            Action::Deactivate(index) => self.deactivate(index),
            Action::Ignore => {}
        }
        false
    }
}
