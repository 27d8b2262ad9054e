//! Consumer-side contracts: where translated events go.
//!
//! The consumer owns state shared with other producers, so it is always
//! reached through a mutex and locked once per forwarded event. The
//! input policy and physical-input hook are owned by the host and only
//! read by the translator.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Receiver of normalized, sequenced input events.
pub trait InputSink {
    fn motion(&mut self, dx: f64, dy: f64, seq: u32);
    /// Absolute pointer position.
    fn warp(&mut self, x: f64, y: f64, seq: u32);
    fn button(&mut self, code: u32, pressed: bool, seq: u32);
    fn key(&mut self, code: u32, pressed: bool, seq: u32);
    /// Combined wheel movement in legacy click units.
    fn wheel(&mut self, dx: f64, dy: f64, seq: u32);
}

/// A consumer shared with other producers.
pub type SharedSink<S> = Arc<Mutex<S>>;

/// Class of hardware that produced physical activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Mouse,
    Keyboard,
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mouse => write!(f, "mouse"),
            Self::Keyboard => write!(f, "keyboard"),
        }
    }
}

/// Hook telling an external arbiter that real hardware was used.
pub trait PhysicalInputNotifier {
    fn notify_physical_input(&self, kind: InputType);
}

/// Global enable switches for keyboard and pointer input.
///
/// Shared via `Arc`; the host flips them, the translator only reads.
#[derive(Debug)]
pub struct InputPolicy {
    keyboard: AtomicBool,
    pointer: AtomicBool,
}

impl InputPolicy {
    pub fn new(keyboard: bool, pointer: bool) -> Arc<Self> {
        Arc::new(Self {
            keyboard: AtomicBool::new(keyboard),
            pointer: AtomicBool::new(pointer),
        })
    }

    pub fn keyboard_enabled(&self) -> bool {
        self.keyboard.load(Ordering::Acquire)
    }

    pub fn pointer_enabled(&self) -> bool {
        self.pointer.load(Ordering::Acquire)
    }

    pub fn set_keyboard_enabled(&self, enabled: bool) {
        self.keyboard.store(enabled, Ordering::Release);
    }

    pub fn set_pointer_enabled(&self, enabled: bool) {
        self.pointer.store(enabled, Ordering::Release);
    }
}

impl Default for InputPolicy {
    fn default() -> Self {
        Self {
            keyboard: AtomicBool::new(true),
            pointer: AtomicBool::new(true),
        }
    }
}

/// Records when physical input was last seen, in milliseconds since the
/// Unix epoch. Clones share the same clock.
#[derive(Debug, Clone, Default)]
pub struct ActivityClock {
    last_ms: Arc<AtomicU64>,
}

impl ActivityClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the last physical input, or `None` if nothing
    /// has been seen yet.
    pub fn idle_ms(&self) -> Option<u64> {
        match self.last_ms.load(Ordering::Acquire) {
            0 => None,
            last => Some(now_ms().saturating_sub(last)),
        }
    }
}

impl PhysicalInputNotifier for ActivityClock {
    fn notify_physical_input(&self, _kind: InputType) {
        self.last_ms.store(now_ms().max(1), Ordering::Release);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults_to_enabled() {
        let policy = InputPolicy::default();
        assert!(policy.keyboard_enabled());
        assert!(policy.pointer_enabled());
    }

    #[test]
    fn policy_switches_are_independent() {
        let policy = InputPolicy::new(true, true);
        policy.set_pointer_enabled(false);
        assert!(policy.keyboard_enabled());
        assert!(!policy.pointer_enabled());
    }

    #[test]
    fn activity_clock_starts_idle() {
        let clock = ActivityClock::new();
        assert_eq!(clock.idle_ms(), None);

        let shared = clock.clone();
        shared.notify_physical_input(InputType::Mouse);
        assert!(clock.idle_ms().is_some());
    }
}
