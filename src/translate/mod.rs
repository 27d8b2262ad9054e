//! Raw device events to normalized, sequenced consumer calls.
//!
//! One drain cycle runs per readable wake-up of the session descriptor.
//! Every event first updates key tracking, then passes the propagation
//! gate, then is forwarded with the consumer locked for that single call.
//! Wheel movement is held back and flushed once the queue is empty.

pub mod scroll;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::grab::{GrabState, GrabToggle, KeyOutcome};
use crate::sink::{InputPolicy, InputSink, InputType, PhysicalInputNotifier, SharedSink};

pub use scroll::{ScrollAccumulator, ScrollAxis, V120_PER_CLICK};

/// Device event reduced to what the translator acts on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    PointerMotion { dx: f64, dy: f64 },
    PointerMotionAbsolute { x: f64, y: f64 },
    PointerButton { button: u32, pressed: bool },
    /// v120 values; an axis the event does not carry is `None`.
    ScrollWheel {
        horizontal: Option<f64>,
        vertical: Option<f64>,
    },
    Keyboard { key: u32, pressed: bool },
    /// Anything else libinput reports (device added, touch, gestures...).
    Other,
}

/// Summary of one drain cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Raw events taken off the queue.
    pub processed: usize,
    /// Events delivered to the consumer, including the wheel flush.
    pub forwarded: usize,
    /// Final grab state if the chord flipped it during this cycle.
    pub grab_change: Option<GrabState>,
}

pub struct EventTranslator<S> {
    sink: SharedSink<S>,
    policy: Arc<InputPolicy>,
    notifier: Option<Box<dyn PhysicalInputNotifier>>,
    toggle: GrabToggle,
    scroll: ScrollAccumulator,
    sequence: u32,
}

impl<S: InputSink> EventTranslator<S> {
    pub fn new(sink: SharedSink<S>, policy: Arc<InputPolicy>, toggle: GrabToggle) -> Self {
        Self {
            sink,
            policy,
            notifier: None,
            toggle,
            scroll: ScrollAccumulator::new(),
            sequence: 0,
        }
    }

    /// Report pointer activity to an external input-source arbiter.
    pub fn with_notifier(mut self, notifier: Box<dyn PhysicalInputNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn grab_state(&self) -> GrabState {
        self.toggle.state()
    }

    pub fn is_captured(&self) -> bool {
        self.toggle.state().is_captured()
    }

    /// Sequence number of the last emitted event (0 before the first).
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Run one drain cycle over everything currently queued.
    pub fn drain<I>(&mut self, events: I) -> CycleReport
    where
        I: IntoIterator<Item = RawEvent>,
    {
        let mut report = CycleReport::default();
        for event in events {
            report.processed += 1;
            if let Some(state) = self.handle(event, &mut report) {
                report.grab_change = Some(state);
            }
        }

        if self.flush_scroll() {
            report.forwarded += 1;
        }

        if report.processed > 0 {
            debug!(
                processed = report.processed,
                forwarded = report.forwarded,
                seq = self.sequence,
                "Drain cycle complete"
            );
        }
        report
    }

    /// Returns the new grab state if this event completed the chord.
    fn handle(&mut self, event: RawEvent, report: &mut CycleReport) -> Option<GrabState> {
        match event {
            RawEvent::PointerMotion { dx, dy } => {
                if self.pointer_open() {
                    self.notify(InputType::Mouse);
                    self.forward(report, |sink, seq| sink.motion(dx, dy, seq));
                }
                None
            }
            RawEvent::PointerMotionAbsolute { x, y } => {
                if self.pointer_open() {
                    self.notify(InputType::Mouse);
                    self.forward(report, |sink, seq| sink.warp(x, y, seq));
                }
                None
            }
            RawEvent::PointerButton { button, pressed } => {
                if self.pointer_open() {
                    self.forward(report, |sink, seq| sink.button(button, pressed, seq));
                }
                None
            }
            RawEvent::ScrollWheel {
                horizontal,
                vertical,
            } => {
                if self.pointer_open() {
                    if let Some(v120) = horizontal {
                        self.scroll.accumulate(ScrollAxis::Horizontal, v120);
                    }
                    if let Some(v120) = vertical {
                        self.scroll.accumulate(ScrollAxis::Vertical, v120);
                    }
                }
                None
            }
            RawEvent::Keyboard { key, pressed } => self.handle_key(key, pressed, report),
            RawEvent::Other => None,
        }
    }

    fn handle_key(&mut self, key: u32, pressed: bool, report: &mut CycleReport) -> Option<GrabState> {
        // Tracking comes first so the chord is seen even when the key
        // itself is filtered below.
        let toggled = match self.toggle.observe_key(key, pressed) {
            KeyOutcome::Toggled(state) => Some(state),
            KeyOutcome::Tracked | KeyOutcome::Armed => None,
        };

        // Releases always go through, whatever the policy or grab state,
        // so nothing stays held downstream.
        if pressed && !self.policy.keyboard_enabled() {
            trace!(key, "Key press filtered by keyboard policy");
            return toggled;
        }
        if pressed && !self.toggle.propagates() {
            trace!(key, "Key press filtered while released");
            return toggled;
        }

        self.forward(report, |sink, seq| sink.key(key, pressed, seq));
        toggled
    }

    fn flush_scroll(&mut self) -> bool {
        match self.scroll.take() {
            Some((dx, dy)) => {
                let seq = self.next_sequence();
                let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
                sink.wheel(dx, dy, seq);
                true
            }
            None => false,
        }
    }

    fn pointer_open(&self) -> bool {
        self.policy.pointer_enabled() && self.toggle.propagates()
    }

    fn notify(&self, kind: InputType) {
        if let Some(notifier) = self.notifier.as_ref() {
            notifier.notify_physical_input(kind);
        }
    }

    fn forward(&mut self, report: &mut CycleReport, deliver: impl FnOnce(&mut S, u32)) {
        let seq = self.next_sequence();
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        deliver(&mut *sink, seq);
        report.forwarded += 1;
    }

    fn next_sequence(&mut self) -> u32 {
        self.sequence = self.sequence.wrapping_add(1);
        self.sequence
    }
}
