//! N-bit register.
//!
//! Registers split their transition into [`next_state`](NBitRegister::next_state)
//! and [`commit`](NBitRegister::commit) so an owner can sample every register
//! of a machine before any of them changes.

use tracing::trace;

use crate::bits::{Bits, Resize};
use crate::error::Result;
use crate::reactive::{Signal, Slot, Wire};

/// A `width`-bit register with load and reset inputs.
#[derive(Debug, Clone)]
pub struct NBitRegister {
    name: &'static str,
    width: usize,
    input: Slot<Bits>,
    load: Slot<bool>,
    reset: Slot<bool>,
    stored: Signal<Bits>,
}

impl NBitRegister {
    /// New all-zero register with unconnected inputs.
    pub fn new(name: &'static str, width: usize) -> Self {
        Self {
            name,
            width,
            input: Slot::new(Bits::zeros(width)),
            load: Slot::new(false),
            reset: Slot::new(false),
            stored: Signal::new(Bits::zeros(width)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn input(&self) -> &Slot<Bits> {
        &self.input
    }

    pub fn load(&self) -> &Slot<bool> {
        &self.load
    }

    pub fn reset(&self) -> &Slot<bool> {
        &self.reset
    }

    /// The stored value as a wire.
    pub fn output(&self) -> Wire<Bits> {
        Wire::from(&self.stored)
    }

    /// The stored value, without tracking.
    pub fn value(&self) -> Bits {
        self.stored.get_untracked()
    }

    /// Compute the value the register would hold after this evaluation.
    ///
    /// Reset wins when both load and reset are high.
    pub fn next_state(&self) -> Result<Bits> {
        let mut next = self.stored.get_untracked();
        if self.load.get()? {
            next = self.input.get()?.resize(self.width, Resize::RightAligned);
        }
        if self.reset.get()? {
            next = Bits::zeros(self.width);
        }
        Ok(next)
    }

    /// Store a sampled value.
    pub fn commit(&self, next: Bits) {
        let next = next.resize(self.width, Resize::RightAligned);
        if self.stored.set(next) {
            trace!(register = self.name, value = %next, "register loaded");
        }
    }

    /// Sample and commit in one step.
    pub fn update(&self) -> Result<Bits> {
        let next = self.next_state()?;
        self.commit(next);
        Ok(next)
    }

    /// Overwrite the stored value directly, bypassing the inputs.
    pub fn force(&self, value: Bits) {
        self.commit(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Bits {
        s.parse().unwrap()
    }

    #[test]
    fn load_stores_the_input() {
        let reg = NBitRegister::new("R", 4);
        let input = Signal::new(bits("1010"));
        let load = Signal::new(false);
        reg.input().connect(&input);
        reg.load().connect(&load);

        assert_eq!(reg.update().unwrap(), bits("0000"));

        load.set(true);
        reg.update().unwrap();
        assert_eq!(reg.output().get().unwrap(), bits("1010"));

        load.set(false);
        input.set(bits("0001"));
        reg.update().unwrap();
        assert_eq!(reg.value(), bits("1010"));
    }

    #[test]
    fn reset_wins_over_load() {
        let reg = NBitRegister::new("R", 4);
        reg.force(bits("1111"));
        reg.input().connect(bits("1010"));
        reg.load().connect(true);
        reg.reset().connect(true);

        assert_eq!(reg.update().unwrap(), bits("0000"));
    }

    #[test]
    fn wide_inputs_keep_the_low_bits() {
        let reg = NBitRegister::new("R", 4);
        reg.input().connect(bits("11110110"));
        reg.load().connect(true);

        assert_eq!(reg.update().unwrap(), bits("0110"));
    }

    #[test]
    fn next_state_does_not_commit() {
        let reg = NBitRegister::new("R", 2);
        reg.input().connect(bits("11"));
        reg.load().connect(true);

        assert_eq!(reg.next_state().unwrap(), bits("11"));
        assert_eq!(reg.value(), bits("00"));
    }
}
