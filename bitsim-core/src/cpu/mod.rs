//! Microcoded 8-bit computer.
//!
//! 16-bit instruction words (opcode byte, operand byte) live in a
//! word-addressed RAM. An 8-bit bus connects the registers, the RAM, the
//! adder and the program counter; fifteen control lines decide who drives
//! it and who loads from it. The control unit steps through a five-step
//! microcode sequence per instruction.

pub mod assembler;
pub mod computer;
pub mod config;
pub mod control;
pub mod control_unit;
pub mod isa;
pub mod microcode;
pub mod ram;

pub use assembler::{
    assemble, assemble_with_capacity, disassemble, AssembleError, AssembleErrorKind, Program,
};
pub use computer::{Computer, RegisterBank, TickOutcome};
pub use config::ComputerConfig;
pub use control::{ControlLine, ControlLines, LineSet};
pub use control_unit::{ControlUnit, Stage};
pub use isa::{Instruction, Opcode, OperandKind, RegisterName};
pub use microcode::{MicroOp, Microcode};
pub use ram::Ram;
