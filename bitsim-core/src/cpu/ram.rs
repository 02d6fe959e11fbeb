//! Word-addressed RAM.
//!
//! Each cell holds one 16-bit word. Reads are combinational: the `word`,
//! `opcode` and `operand` outputs follow the address input. Writes happen in
//! [`Ram::update`], at most once per assertion of the write-enable line.

use std::sync::Arc;

use tracing::{debug, warn};

use super::isa::{BYTE_BITS, WORD_BITS};
use crate::bits::{Bits, Resize};
use crate::error::Result;
use crate::reactive::{Memo, Signal, Slot, Wire};

#[derive(Debug, Clone)]
pub struct Ram {
    cells: Arc<[Signal<Bits>]>,
    address: Slot<Bits>,
    write_enable: Slot<bool>,
    data_in: Slot<Bits>,
    /// Cleared by a write, set again once write-enable drops.
    armed: Signal<bool>,
    word: Memo<Bits>,
    opcode: Memo<Bits>,
    operand: Memo<Bits>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        let cells: Arc<[Signal<Bits>]> = (0..size)
            .map(|_| Signal::new(Bits::zeros(WORD_BITS)))
            .collect();
        let address = Slot::new(Bits::zeros(BYTE_BITS));

        let word = {
            let cells = cells.clone();
            let address = address.clone();
            Memo::new(move || {
                let index = address.get()?.value() as usize;
                match cells.get(index) {
                    Some(cell) => Ok(cell.get()),
                    None => {
                        warn!(address = index, size = cells.len(), "RAM read out of range");
                        Ok(Bits::zeros(WORD_BITS))
                    }
                }
            })
        };
        let opcode = {
            let word = word.clone();
            Memo::new(move || Ok(word.get()?.resize(BYTE_BITS, Resize::LeftAligned)))
        };
        let operand = {
            let word = word.clone();
            Memo::new(move || Ok(word.get()?.resize(BYTE_BITS, Resize::RightAligned)))
        };

        Self {
            cells,
            address,
            write_enable: Slot::new(false),
            data_in: Slot::new(Bits::zeros(BYTE_BITS)),
            armed: Signal::new(true),
            word,
            opcode,
            operand,
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn address(&self) -> &Slot<Bits> {
        &self.address
    }

    pub fn write_enable(&self) -> &Slot<bool> {
        &self.write_enable
    }

    pub fn data_in(&self) -> &Slot<Bits> {
        &self.data_in
    }

    /// The word at the current address.
    pub fn word(&self) -> Wire<Bits> {
        Wire::from(&self.word)
    }

    /// High byte of the addressed word.
    pub fn opcode(&self) -> Wire<Bits> {
        Wire::from(&self.opcode)
    }

    /// Low byte of the addressed word.
    pub fn operand(&self) -> Wire<Bits> {
        Wire::from(&self.operand)
    }

    /// Read a cell directly.
    pub fn read(&self, address: usize) -> Option<Bits> {
        self.cells.get(address).map(Signal::get_untracked)
    }

    /// Write a cell directly. Returns `false` for out-of-range addresses.
    pub fn write(&self, address: usize, value: Bits) -> bool {
        match self.cells.get(address) {
            Some(cell) => {
                cell.set(value.resize(WORD_BITS, Resize::RightAligned));
                true
            }
            None => {
                warn!(address, size = self.cells.len(), "RAM write out of range");
                false
            }
        }
    }

    /// Store `words` from address 0 and clear the rest.
    pub fn load(&self, words: &[Bits]) {
        for (address, cell) in self.cells.iter().enumerate() {
            let word = words.get(address).copied().unwrap_or(Bits::zeros(WORD_BITS));
            cell.set(word.resize(WORD_BITS, Resize::RightAligned));
        }
    }

    /// Perform a pending write.
    ///
    /// While write-enable is high only the first call writes; the data byte
    /// lands in the low half of the word. Returns whether a write happened.
    pub fn update(&self) -> Result<bool> {
        if !self.write_enable.get()? {
            self.armed.set(true);
            return Ok(false);
        }
        if !self.armed.get_untracked() {
            return Ok(false);
        }
        self.armed.set(false);

        let address = self.address.get()?.value() as usize;
        let data = self.data_in.get()?.resize(BYTE_BITS, Resize::RightAligned);
        let word = Bits::zeros(BYTE_BITS).concat(data);
        if self.write(address, word) {
            debug!(address, value = %data, "RAM write");
        }
        Ok(true)
    }

    /// Snapshot of every cell.
    pub fn dump(&self) -> Vec<Bits> {
        self.cells.iter().map(Signal::get_untracked).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_follow_the_address() {
        let ram = Ram::new(4);
        ram.load(&[Bits::new(16, 0x0103), Bits::new(16, 0x0a00)]);
        let address = Signal::new(Bits::new(8, 0));
        ram.address().connect(&address);

        assert_eq!(ram.opcode().get().unwrap().value(), 1);
        assert_eq!(ram.operand().get().unwrap().value(), 3);

        address.set(Bits::new(8, 1));
        assert_eq!(ram.opcode().get().unwrap().value(), 10);
        assert_eq!(ram.word().get().unwrap().value(), 0x0a00);
    }

    #[test]
    fn out_of_range_reads_are_zero() {
        let ram = Ram::new(2);
        ram.address().connect(Bits::new(8, 200));
        assert_eq!(ram.word().get().unwrap(), Bits::zeros(16));
        assert!(!ram.write(200, Bits::new(16, 1)));
        assert_eq!(ram.read(200), None);
    }

    #[test]
    fn writes_once_per_enable_pulse() {
        let ram = Ram::new(4);
        let enable = Signal::new(false);
        let data = Signal::new(Bits::new(8, 7));
        ram.address().connect(Bits::new(8, 2));
        ram.write_enable().connect(&enable);
        ram.data_in().connect(&data);

        assert!(!ram.update().unwrap());

        enable.set(true);
        assert!(ram.update().unwrap());
        assert_eq!(ram.read(2), Some(Bits::new(16, 7)));

        // Still enabled: no second write.
        data.set(Bits::new(8, 9));
        assert!(!ram.update().unwrap());
        assert_eq!(ram.read(2), Some(Bits::new(16, 7)));

        enable.set(false);
        ram.update().unwrap();
        enable.set(true);
        assert!(ram.update().unwrap());
        assert_eq!(ram.read(2), Some(Bits::new(16, 9)));
    }

    #[test]
    fn writes_clear_the_opcode_byte() {
        let ram = Ram::new(1);
        ram.load(&[Bits::new(16, 0xff00)]);
        ram.write_enable().connect(true);
        ram.data_in().connect(Bits::new(8, 5));

        ram.update().unwrap();
        assert_eq!(ram.read(0).unwrap().to_string(), "0000000000000101");
    }
}
