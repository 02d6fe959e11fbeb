//! Asynchronous ripple counter built from gated D latches.
//!
//! Each latch toggles by loading its own inverted output, captured in a
//! feedback cell while the latch is disabled. The least-significant latch is
//! enabled by the clock; every other latch is enabled by the inverted output
//! of the latch below it, so a 1 -> 0 transition below ripples upward.

use tracing::debug;

use crate::bits::Bits;
use crate::error::Result;
use crate::logic::GatedDLatch;
use crate::reactive::{Signal, Wire};

#[derive(Debug, Clone)]
pub struct AsyncCounter {
    clock: Signal<bool>,
    /// Most-significant latch first.
    latches: Vec<GatedDLatch>,
    feedback: Vec<Signal<bool>>,
}

impl AsyncCounter {
    pub fn new(width: usize) -> Self {
        let clock = Signal::new(false);
        let latches: Vec<GatedDLatch> = (0..width).map(|_| GatedDLatch::new()).collect();
        let feedback: Vec<Signal<bool>> = (0..width).map(|_| Signal::new(false)).collect();

        for (index, latch) in latches.iter().enumerate() {
            latch.data().connect(&feedback[index]);
            match latches.get(index + 1) {
                Some(lower) => latch.enable().connect(lower.not_q()),
                None => latch.enable().connect(&clock),
            }
        }

        Self {
            clock,
            latches,
            feedback,
        }
    }

    pub fn width(&self) -> usize {
        self.latches.len()
    }

    pub fn clock(&self) -> Wire<bool> {
        Wire::from(&self.clock)
    }

    /// Advance one half-cycle. The count goes up on rising edges.
    pub fn tick(&self) -> Result<Bits> {
        for (latch, feedback) in self.latches.iter().zip(&self.feedback) {
            if !latch.enable().get()? {
                feedback.set(latch.not_q().get()?);
            }
        }

        let level = !self.clock.get_untracked();
        self.clock.set(level);

        for latch in self.latches.iter().rev() {
            latch.update()?;
        }

        let count = self.value();
        debug!(clock = level, count = %count, "counter ticked");
        Ok(count)
    }

    /// Current count, most-significant bit first.
    pub fn value(&self) -> Bits {
        Bits::from_bools(self.latches.iter().map(GatedDLatch::value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_on_rising_edges_and_wraps() {
        let counter = AsyncCounter::new(4);
        assert_eq!(counter.value().value(), 0);

        for expected in (1..16).chain([0, 1]) {
            let rising = counter.tick().unwrap();
            assert_eq!(rising.value(), expected, "after rising edge");
            let falling = counter.tick().unwrap();
            assert_eq!(falling.value(), expected, "falling edge holds");
        }
    }

    #[test]
    fn single_latch_toggles() {
        let counter = AsyncCounter::new(1);
        assert_eq!(counter.tick().unwrap().to_string(), "1");
        assert_eq!(counter.tick().unwrap().to_string(), "1");
        assert_eq!(counter.tick().unwrap().to_string(), "0");
    }
}
