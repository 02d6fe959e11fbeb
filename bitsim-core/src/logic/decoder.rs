//! One-hot decoder.

use crate::bits::Bits;
use crate::reactive::{Memo, Wire};

/// Decode `address` onto `outputs` lines.
///
/// Address 0 lights nothing, address 1 lights the most-significant line, and
/// address `outputs` lights the least-significant line. Anything past the
/// last line decodes to all zeros.
pub fn decode(address: u64, outputs: usize) -> Bits {
    let outputs = outputs.min(Bits::MAX_WIDTH);
    if address == 0 || address > outputs as u64 {
        return Bits::zeros(outputs);
    }
    let top = 1u64 << (outputs - 1);
    Bits::new(outputs, top >> (address - 1))
}

/// Reactive decoder over an address wire.
#[derive(Debug, Clone)]
pub struct Decoder {
    outputs: usize,
    output: Memo<Bits>,
}

impl Decoder {
    pub fn new(address: impl Into<Wire<Bits>>, outputs: usize) -> Self {
        let address = address.into();
        let output = Memo::new(move || Ok(decode(address.get()?.value(), outputs)));
        Self { outputs, output }
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn output(&self) -> Wire<Bits> {
        Wire::from(&self.output)
    }

    /// Index of the lit line, counting from the most-significant end.
    pub fn selected(&self) -> crate::Result<Option<usize>> {
        let lines = self.output.get()?;
        let selected = lines.iter().position(|line| line);
        Ok(selected)
    }
}
