//! Instruction set.
//!
//! Every instruction is a 16-bit word: an 8-bit opcode followed by an 8-bit
//! operand. Opcodes are indices into [`Opcode::ALL`].

use std::fmt;
use std::str::FromStr;

use crate::bits::{Bits, Resize};

/// Width of an instruction word.
pub const WORD_BITS: usize = 16;

/// Width of the opcode and operand halves.
pub const BYTE_BITS: usize = 8;

/// Instruction opcodes, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    Noop,
    LoadA,
    LoadB,
    SetA,
    StoreA,
    StoreTB,
    Mov,
    Add,
    Jmp,
    Jmpc,
    Halt,
}

/// What follows the mnemonic in assembly text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Nothing.
    None,
    /// A decimal byte, defaulting to 0.
    Number,
    /// Source and destination register names.
    Registers,
}

impl Opcode {
    pub const ALL: [Opcode; 11] = [
        Opcode::Noop,
        Opcode::LoadA,
        Opcode::LoadB,
        Opcode::SetA,
        Opcode::StoreA,
        Opcode::StoreTB,
        Opcode::Mov,
        Opcode::Add,
        Opcode::Jmp,
        Opcode::Jmpc,
        Opcode::Halt,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Noop => "NOOP",
            Opcode::LoadA => "LOADA",
            Opcode::LoadB => "LOADB",
            Opcode::SetA => "SETA",
            Opcode::StoreA => "STOREA",
            Opcode::StoreTB => "STORETB",
            Opcode::Mov => "MOV",
            Opcode::Add => "ADD",
            Opcode::Jmp => "JMP",
            Opcode::Jmpc => "JMPC",
            Opcode::Halt => "HALT",
        }
    }

    pub fn operand_kind(self) -> OperandKind {
        match self {
            Opcode::Noop | Opcode::StoreTB | Opcode::Add | Opcode::Halt => OperandKind::None,
            Opcode::Mov => OperandKind::Registers,
            _ => OperandKind::Number,
        }
    }
}

impl FromStr for Opcode {
    type Err = ();

    /// Whole-word, case-insensitive mnemonic lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Registers addressable by `MOV`.
///
/// The code is a one-hot nibble. In the operand byte the source nibble comes
/// first, so `MOV A B` is `0001_0010`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterName {
    A,
    B,
    /// Program counter.
    P,
    /// Memory address register.
    M,
}

impl RegisterName {
    pub const ALL: [RegisterName; 4] = [
        RegisterName::A,
        RegisterName::B,
        RegisterName::P,
        RegisterName::M,
    ];

    pub fn code(self) -> u8 {
        match self {
            RegisterName::A => 1,
            RegisterName::B => 2,
            RegisterName::P => 4,
            RegisterName::M => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.code() == code)
    }

    pub fn letter(self) -> char {
        match self {
            RegisterName::A => 'A',
            RegisterName::B => 'B',
            RegisterName::P => 'P',
            RegisterName::M => 'M',
        }
    }
}

impl FromStr for RegisterName {
    type Err = ();

    /// Accepts `A`, `$A`, `a`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix('$').unwrap_or(s);
        Self::ALL
            .iter()
            .copied()
            .find(|r| name.len() == 1 && name.eq_ignore_ascii_case(&r.letter().to_string()))
            .ok_or(())
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: u8,
}

impl Instruction {
    pub fn new(opcode: Opcode, operand: u8) -> Self {
        Self { opcode, operand }
    }

    /// `MOV source destination`.
    pub fn mov(source: RegisterName, destination: RegisterName) -> Self {
        Self::new(Opcode::Mov, (source.code() << 4) | destination.code())
    }

    pub fn encode(self) -> Bits {
        Bits::new(BYTE_BITS, u64::from(self.opcode.index()))
            .concat(Bits::new(BYTE_BITS, u64::from(self.operand)))
    }

    /// Decode a word. Unknown opcodes yield `None`.
    pub fn decode(word: Bits) -> Option<Self> {
        let word = word.resize(WORD_BITS, Resize::RightAligned);
        let opcode = Opcode::from_index(word.resize(BYTE_BITS, Resize::LeftAligned).value())?;
        let operand = word.resize(BYTE_BITS, Resize::RightAligned).value() as u8;
        Some(Self::new(opcode, operand))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode.operand_kind() {
            OperandKind::None => write!(f, "{}", self.opcode),
            OperandKind::Number => write!(f, "{} {}", self.opcode, self.operand),
            OperandKind::Registers => {
                let source = RegisterName::from_code(self.operand >> 4);
                let destination = RegisterName::from_code(self.operand & 0x0f);
                match (source, destination) {
                    (Some(s), Some(d)) => write!(f, "{} {} {}", self.opcode, s, d),
                    _ => write!(f, "{} {:08b}", self.opcode, self.operand),
                }
            }
        }
    }
}
