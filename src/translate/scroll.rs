//! Per-cycle wheel accumulation.
//!
//! High-resolution wheels report in 1/120ths of a detent. Ticks are summed
//! for the whole drain cycle and handed out as a single wheel event in
//! legacy click units, so a burst of sub-detent notifications reaches the
//! consumer once per wake-up.

/// High-resolution units per legacy wheel click.
pub const V120_PER_CLICK: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollAccumulator {
    horizontal: f64,
    vertical: f64,
}

impl ScrollAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw v120 value on one axis.
    pub fn accumulate(&mut self, axis: ScrollAxis, v120: f64) {
        let clicks = v120 / V120_PER_CLICK;
        match axis {
            ScrollAxis::Horizontal => self.horizontal += clicks,
            ScrollAxis::Vertical => self.vertical += clicks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.horizontal == 0.0 && self.vertical == 0.0
    }

    /// Reset both axes, returning `(x, y)` if anything was accumulated.
    pub fn take(&mut self) -> Option<(f64, f64)> {
        let pending = (self.horizontal, self.vertical);
        self.horizontal = 0.0;
        self.vertical = 0.0;

        if pending.0 != 0.0 || pending.1 != 0.0 {
            Some(pending)
        } else {
            None
        }
    }
}
