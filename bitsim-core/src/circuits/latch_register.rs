//! Register made of gated D latches and a gate-level load multiplexer.
//!
//! Every bit is a [`GatedDLatch`] enabled by the clock. Its data input is
//!
//! ```text
//! OR(AND(q, NOT load), AND(load, d))
//! ```
//!
//! so a clocked latch reloads its own value unless `load` selects the new
//! input bit. The hold path reads the latch's held bit: reading the live `q`
//! would close a loop through the enabled latch.

use crate::bits::{Bits, Resize};
use crate::error::Result;
use crate::logic::{Gate, GatedDLatch};
use crate::reactive::{Memo, Slot, Wire};

#[derive(Debug, Clone)]
pub struct LatchRegister {
    width: usize,
    data: Slot<Bits>,
    load: Slot<bool>,
    clock: Slot<bool>,
    latches: Vec<GatedDLatch>,
}

impl LatchRegister {
    pub fn new(width: usize) -> Self {
        let data = Slot::new(Bits::zeros(width));
        let load = Slot::new(false);
        let clock = Slot::new(false);
        let not_load = Gate::not(&load);

        let mut latches = Vec::with_capacity(width);
        for index in 0..width {
            let latch = GatedDLatch::new();
            let d = {
                let data = data.clone();
                Memo::new(move || Ok(data.get()?.resize(width, Resize::RightAligned).bit(index)))
            };
            let hold = Gate::and(latch.held(), &not_load);
            let take = Gate::and(&load, d);
            let select = Gate::or(&hold, &take);

            latch.data().connect(&select);
            latch.enable().connect(&clock);
            latches.push(latch);
        }

        Self {
            width,
            data,
            load,
            clock,
            latches,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn data(&self) -> &Slot<Bits> {
        &self.data
    }

    pub fn load(&self) -> &Slot<bool> {
        &self.load
    }

    pub fn clock(&self) -> &Slot<bool> {
        &self.clock
    }

    /// Let every latch sample its multiplexer output.
    pub fn update(&self) -> Result<Bits> {
        for latch in &self.latches {
            latch.update()?;
        }
        Ok(self.value())
    }

    pub fn value(&self) -> Bits {
        Bits::from_bools(self.latches.iter().map(GatedDLatch::value))
    }

    /// Bit `index` (most-significant first) as a wire.
    pub fn bit(&self, index: usize) -> Option<Wire<bool>> {
        self.latches.get(index).map(GatedDLatch::q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;

    #[test]
    fn loads_only_when_clocked_with_load_high() {
        let reg = LatchRegister::new(4);
        let data = Signal::new("1011".parse::<Bits>().unwrap());
        let load = Signal::new(false);
        let clock = Signal::new(false);
        reg.data().connect(&data);
        reg.load().connect(&load);
        reg.clock().connect(&clock);

        // Load high but clock low: nothing happens.
        load.set(true);
        assert_eq!(reg.update().unwrap().to_string(), "0000");

        clock.set(true);
        assert_eq!(reg.update().unwrap().to_string(), "1011");

        // Clocked without load: the latches reload themselves.
        load.set(false);
        data.set("0100".parse().unwrap());
        assert_eq!(reg.update().unwrap().to_string(), "1011");
        assert!(reg.bit(0).unwrap().get().unwrap());

        load.set(true);
        assert_eq!(reg.update().unwrap().to_string(), "0100");
    }
}
