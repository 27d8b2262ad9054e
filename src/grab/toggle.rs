//! Chord recognizer driving the grab state.

use tracing::{debug, info, warn};

use super::{GrabState, GrabTarget, HeldKeys};

/// What a key event did to the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Press state recorded, nothing else happened.
    Tracked,
    /// The chord is (or remains) armed, waiting for all keys to lift.
    Armed,
    /// All keys lifted after the chord: the grab flipped to this state.
    Toggled(GrabState),
}

/// Held-key tracking plus the arm-then-release chord protocol.
///
/// Without a [`GrabTarget`] (seat-wide sessions) keys are still tracked
/// but the state is pinned to `Captured` and never toggles.
pub struct GrabToggle {
    held: HeldKeys,
    chord: [u32; 2],
    armed: bool,
    state: GrabState,
    target: Option<Box<dyn GrabTarget>>,
}

impl GrabToggle {
    /// Permanently captured, no runtime toggle.
    pub fn seat_wide(chord: [u32; 2]) -> Self {
        Self {
            held: HeldKeys::new(),
            chord,
            armed: false,
            state: GrabState::Captured,
            target: None,
        }
    }

    /// Toggle-able grab over an explicit set of devices.
    pub fn switchable(chord: [u32; 2], initial: GrabState, target: Box<dyn GrabTarget>) -> Self {
        Self {
            held: HeldKeys::new(),
            chord,
            armed: false,
            state: initial,
            target: Some(target),
        }
    }

    pub fn state(&self) -> GrabState {
        self.state
    }

    pub fn is_switchable(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn held_keys(&self) -> &HeldKeys {
        &self.held
    }

    /// Whether events from managed devices should reach the consumer.
    ///
    /// Closed only while a switchable grab is released, so devices that
    /// were handed back to the system do not also inject here.
    pub fn propagates(&self) -> bool {
        !self.is_switchable() || self.state.is_captured()
    }

    /// Record a key event and advance the chord protocol.
    pub fn observe_key(&mut self, key: u32, pressed: bool) -> KeyOutcome {
        self.held.set(key, pressed);

        if !self.is_switchable() {
            return KeyOutcome::Tracked;
        }

        if self.held.is_held(self.chord[0]) && self.held.is_held(self.chord[1]) {
            if !self.armed {
                debug!(chord = ?self.chord, "Grab toggle armed");
            }
            self.armed = true;
        }

        if self.armed && self.held.is_empty() {
            self.armed = false;
            return KeyOutcome::Toggled(self.flip());
        }

        if self.armed {
            KeyOutcome::Armed
        } else {
            KeyOutcome::Tracked
        }
    }

    fn flip(&mut self) -> GrabState {
        self.state = self.state.toggled();
        let captured = self.state.is_captured();
        if let Some(target) = self.target.as_mut() {
            let failed = target.set_captured(captured);
            if failed > 0 {
                warn!(
                    failed,
                    devices = target.device_count(),
                    "Grab toggle left some devices unchanged"
                );
            }
            info!(state = %self.state, devices = target.device_count(), "Grab toggled");
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grab::{DEFAULT_CHORD, KEY_G, KEY_LEFTMETA};
    use std::cell::RefCell;
    use std::rc::Rc;

    const KEY_A: u32 = 30;

    #[derive(Clone, Default)]
    struct RecordingTarget {
        calls: Rc<RefCell<Vec<bool>>>,
        failures: usize,
    }

    impl GrabTarget for RecordingTarget {
        fn set_captured(&mut self, captured: bool) -> usize {
            self.calls.borrow_mut().push(captured);
            self.failures
        }

        fn device_count(&self) -> usize {
            2
        }
    }

    fn switchable(initial: GrabState) -> (GrabToggle, Rc<RefCell<Vec<bool>>>) {
        let target = RecordingTarget::default();
        let calls = target.calls.clone();
        (
            GrabToggle::switchable(DEFAULT_CHORD, initial, Box::new(target)),
            calls,
        )
    }

    #[test]
    fn chord_fires_on_full_release() {
        let (mut toggle, calls) = switchable(GrabState::Captured);

        assert_eq!(toggle.observe_key(KEY_LEFTMETA, true), KeyOutcome::Tracked);
        assert_eq!(toggle.observe_key(KEY_G, true), KeyOutcome::Armed);
        assert_eq!(toggle.observe_key(KEY_G, false), KeyOutcome::Armed);
        assert!(calls.borrow().is_empty());

        assert_eq!(
            toggle.observe_key(KEY_LEFTMETA, false),
            KeyOutcome::Toggled(GrabState::Released)
        );
        assert_eq!(toggle.state(), GrabState::Released);
        assert_eq!(*calls.borrow(), vec![false]);
        assert!(!toggle.is_armed());
    }

    #[test]
    fn fires_once_per_cycle() {
        let (mut toggle, calls) = switchable(GrabState::Released);

        toggle.observe_key(KEY_LEFTMETA, true);
        toggle.observe_key(KEY_G, true);
        // Re-pressing while armed must not fire anything.
        toggle.observe_key(KEY_G, false);
        toggle.observe_key(KEY_G, true);
        toggle.observe_key(KEY_G, false);
        toggle.observe_key(KEY_LEFTMETA, false);
        // A stray release afterwards is not a second trigger.
        assert_eq!(toggle.observe_key(KEY_LEFTMETA, false), KeyOutcome::Tracked);

        assert_eq!(*calls.borrow(), vec![true]);
        assert_eq!(toggle.state(), GrabState::Captured);
    }

    #[test]
    fn waits_for_other_held_keys() {
        let (mut toggle, calls) = switchable(GrabState::Captured);

        toggle.observe_key(KEY_A, true);
        toggle.observe_key(KEY_LEFTMETA, true);
        toggle.observe_key(KEY_G, true);
        toggle.observe_key(KEY_G, false);
        toggle.observe_key(KEY_LEFTMETA, false);
        assert!(calls.borrow().is_empty());
        assert!(toggle.is_armed());

        assert_eq!(
            toggle.observe_key(KEY_A, false),
            KeyOutcome::Toggled(GrabState::Released)
        );
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn single_chord_key_does_not_arm() {
        let (mut toggle, calls) = switchable(GrabState::Captured);

        toggle.observe_key(KEY_LEFTMETA, true);
        toggle.observe_key(KEY_A, true);
        toggle.observe_key(KEY_A, false);
        toggle.observe_key(KEY_LEFTMETA, false);
        toggle.observe_key(KEY_G, true);
        toggle.observe_key(KEY_G, false);

        assert!(calls.borrow().is_empty());
        assert_eq!(toggle.state(), GrabState::Captured);
    }

    #[test]
    fn two_cycles_toggle_back() {
        let (mut toggle, calls) = switchable(GrabState::Captured);

        for _ in 0..2 {
            toggle.observe_key(KEY_G, true);
            toggle.observe_key(KEY_LEFTMETA, true);
            toggle.observe_key(KEY_LEFTMETA, false);
            toggle.observe_key(KEY_G, false);
        }

        assert_eq!(*calls.borrow(), vec![false, true]);
        assert_eq!(toggle.state(), GrabState::Captured);
    }

    #[test]
    fn grab_failures_still_flip_state() {
        let target = RecordingTarget {
            failures: 2,
            ..Default::default()
        };
        let calls = target.calls.clone();
        let mut toggle = GrabToggle::switchable(DEFAULT_CHORD, GrabState::Released, Box::new(target));

        toggle.observe_key(KEY_LEFTMETA, true);
        toggle.observe_key(KEY_G, true);
        toggle.observe_key(KEY_LEFTMETA, false);
        toggle.observe_key(KEY_G, false);

        assert_eq!(toggle.state(), GrabState::Captured);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn seat_wide_never_toggles() {
        let mut toggle = GrabToggle::seat_wide(DEFAULT_CHORD);

        toggle.observe_key(KEY_LEFTMETA, true);
        toggle.observe_key(KEY_G, true);
        assert!(toggle.held_keys().is_held(KEY_G));
        toggle.observe_key(KEY_LEFTMETA, false);
        assert_eq!(toggle.observe_key(KEY_G, false), KeyOutcome::Tracked);

        assert_eq!(toggle.state(), GrabState::Captured);
        assert!(toggle.propagates());
        assert!(toggle.held_keys().is_empty());
    }

    #[test]
    fn gate_follows_state() {
        let (toggle, _) = switchable(GrabState::Released);
        assert!(!toggle.propagates());

        let (toggle, _) = switchable(GrabState::Captured);
        assert!(toggle.propagates());
    }
}
