//! Exclusive-grab state and the key-chord toggle.
//!
//! The chord arms when both of its keys are down and fires only once
//! every key has been released, so holding the chord never re-triggers
//! and extra keys held alongside it are simply waited out.

pub mod held_keys;
pub mod toggle;

pub use held_keys::{HeldKeys, KEY_MAX};
pub use toggle::{GrabToggle, KeyOutcome};

/// `KEY_LEFTMETA` from linux/input-event-codes.h.
pub const KEY_LEFTMETA: u32 = 125;
/// `KEY_G` from linux/input-event-codes.h.
pub const KEY_G: u32 = 34;

/// Default toggle chord: Super+G.
pub const DEFAULT_CHORD: [u32; 2] = [KEY_LEFTMETA, KEY_G];

/// Whether managed devices are currently held exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabState {
    /// Events also reach the rest of the system.
    Released,
    /// Devices are held exclusively by this process.
    Captured,
}

impl GrabState {
    pub fn from_captured(captured: bool) -> Self {
        if captured {
            Self::Captured
        } else {
            Self::Released
        }
    }

    pub fn is_captured(self) -> bool {
        self == Self::Captured
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Released => Self::Captured,
            Self::Captured => Self::Released,
        }
    }
}

impl std::fmt::Display for GrabState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Released => write!(f, "released"),
            Self::Captured => write!(f, "captured"),
        }
    }
}

/// The set of devices whose exclusive grab follows the toggle.
pub trait GrabTarget {
    /// Apply (`true`) or release (`false`) exclusive access on every
    /// tracked device. Failures are per device and must not stop the
    /// remaining devices from being updated; returns how many failed.
    fn set_captured(&mut self, captured: bool) -> usize;

    /// Number of devices currently tracked.
    fn device_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggled_flips_both_ways() {
        assert_eq!(GrabState::Released.toggled(), GrabState::Captured);
        assert_eq!(GrabState::Captured.toggled(), GrabState::Released);
    }

    #[test]
    fn display_names() {
        assert_eq!(GrabState::from_captured(true).to_string(), "captured");
        assert_eq!(GrabState::from_captured(false).to_string(), "released");
    }
}
