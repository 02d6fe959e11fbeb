//! Microcode table.
//!
//! Microstep 0 is idle. Steps 1 and 2 fetch the next instruction for every
//! opcode. Steps 3 onward run the per-opcode sequence below.
//!
//! | Instruction | Step 3    | Step 4    |
//! |-------------|-----------|-----------|
//! | LOADA n     | IRO MRI   | RVO ARI   |
//! | LOADB n     | IRO MRI   | RVO BRI   |
//! | SETA n      | IRO ARI   |           |
//! | STOREA n    | IRO MRI   | ARO RVI   |
//! | STORETB     | BRO MRI   | ARO RVI   |
//! | MOV r1 r2   | from operand bits     |
//! | ADD         | EA        | SRO ARI   |
//! | JMP n       | IRO PCI   |           |
//! | JMPC n      | IRO PCI if overflow   |
//! | HALT        | HE        |           |

use indexmap::IndexMap;
use smallvec::{smallvec, SmallVec};

use super::control::{ControlLine, LineSet};
use super::isa::Opcode;
use crate::bits::{Bits, Resize};

use ControlLine::*;

/// One entry of an opcode's sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicroOp {
    /// Assert these lines.
    Lines(SmallVec<[ControlLine; 4]>),
    /// Assert the lines selected by the operand byte (MOV).
    OperandSelect,
    /// Assert these lines only if the overflow flag is set.
    IfOverflow(SmallVec<[ControlLine; 4]>),
}

/// Operand bit (most-significant first) to the line it asserts under MOV.
/// Bit 0 is the memory address register as a source, which has no driver.
pub const MOV_LINES: [(usize, ControlLine); 7] = [
    (1, Pco),
    (2, Bro),
    (3, Aro),
    (4, Mri),
    (5, Pci),
    (6, Bri),
    (7, Ari),
];

/// Flag bit (most-significant first) holding the adder's carry-out.
pub const OVERFLOW_FLAG: usize = 1;

#[derive(Debug, Clone)]
pub struct Microcode {
    fetch: Vec<SmallVec<[ControlLine; 4]>>,
    table: IndexMap<Opcode, Vec<MicroOp>>,
}

impl Microcode {
    /// The instruction set's microcode.
    pub fn standard() -> Self {
        let fetch = vec![smallvec![Pco, Mri], smallvec![Rvo, Iri, Pce]];

        let mut table = IndexMap::new();
        let lines = MicroOp::Lines;
        table.insert(Opcode::Noop, vec![]);
        table.insert(
            Opcode::LoadA,
            vec![lines(smallvec![Iro, Mri]), lines(smallvec![Rvo, Ari])],
        );
        table.insert(
            Opcode::LoadB,
            vec![lines(smallvec![Iro, Mri]), lines(smallvec![Rvo, Bri])],
        );
        table.insert(Opcode::SetA, vec![lines(smallvec![Iro, Ari])]);
        table.insert(
            Opcode::StoreA,
            vec![lines(smallvec![Iro, Mri]), lines(smallvec![Aro, Rvi])],
        );
        table.insert(
            Opcode::StoreTB,
            vec![lines(smallvec![Bro, Mri]), lines(smallvec![Aro, Rvi])],
        );
        table.insert(Opcode::Mov, vec![MicroOp::OperandSelect]);
        table.insert(
            Opcode::Add,
            vec![lines(smallvec![Ea]), lines(smallvec![Sro, Ari])],
        );
        table.insert(Opcode::Jmp, vec![lines(smallvec![Iro, Pci])]);
        table.insert(
            Opcode::Jmpc,
            vec![MicroOp::IfOverflow(smallvec![Iro, Pci])],
        );
        table.insert(Opcode::Halt, vec![lines(smallvec![He])]);

        Self { fetch, table }
    }

    /// Number of fetch steps shared by every instruction.
    pub fn fetch_len(&self) -> u64 {
        self.fetch.len() as u64
    }

    /// Sequence for `opcode`, without the fetch steps.
    pub fn sequence(&self, opcode: Opcode) -> &[MicroOp] {
        self.table.get(&opcode).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Lines to assert at `step` for the latched instruction.
    ///
    /// `opcode` is `None` for words that do not decode; they assert nothing
    /// after fetch.
    pub fn lines_for(&self, step: u64, opcode: Option<Opcode>, operand: Bits, flags: Bits) -> LineSet {
        let Some(step) = step.checked_sub(1) else {
            return LineSet::new();
        };
        if let Some(lines) = usize::try_from(step).ok().and_then(|s| self.fetch.get(s)) {
            return lines.iter().copied().collect();
        }

        let execute = (step - self.fetch_len()) as usize;
        let Some(op) = opcode.and_then(|op| self.sequence(op).get(execute)) else {
            return LineSet::new();
        };
        match op {
            MicroOp::Lines(lines) => lines.iter().copied().collect(),
            MicroOp::OperandSelect => mov_lines(operand),
            MicroOp::IfOverflow(lines) if flags.bit(OVERFLOW_FLAG) => {
                lines.iter().copied().collect()
            }
            MicroOp::IfOverflow(_) => LineSet::new(),
        }
    }
}

impl Default for Microcode {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lines selected by a MOV operand byte.
pub fn mov_lines(operand: Bits) -> LineSet {
    let operand = operand.resize(8, Resize::RightAligned);
    MOV_LINES
        .iter()
        .filter(|(bit, _)| operand.bit(*bit))
        .map(|(_, line)| *line)
        .collect()
}
