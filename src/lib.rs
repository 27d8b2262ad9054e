//! Input stealer: exclusive capture of raw input devices.
//!
//! Owns a libinput session over either a whole seat or an explicit list of
//! device nodes, holds those devices exclusively (EVIOCGRAB), and turns
//! their events into a sequenced stream for a shared consumer. In explicit
//! mode a key chord (Super+G by default) hands the devices back to the
//! system and takes them again, without reopening anything.
//!
//! Flow per readable wake-up of [`session::DeviceSession::poll_handle`]:
//! dispatch → [`translate::EventTranslator::drain`] → key tracking and the
//! chord ([`grab`]) → propagation gate → consumer ([`sink::InputSink`]) →
//! one wheel flush at the end of the cycle.

pub mod config;
pub mod error;
pub mod grab;
pub mod ipc;
pub mod logger;
pub mod session;
pub mod sink;
pub mod translate;

pub use error::{Result, StealerError};
pub use grab::{GrabState, GrabToggle};
pub use session::{OpenReport, SessionMode};
pub use sink::{InputPolicy, InputSink, InputType, PhysicalInputNotifier, SharedSink};
pub use translate::{CycleReport, EventTranslator, RawEvent};

#[cfg(target_os = "linux")]
pub use session::DeviceSession;
