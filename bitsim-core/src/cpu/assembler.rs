//! Assembler and disassembler.
//!
//! One instruction per line:
//!
//! ```text
//! SETA 36      ; decimal operand, 0 when omitted
//! MOV A $B     ; registers, optional `$`
//! 00000000 00000101
//! ```
//!
//! A line of exactly sixteen binary digits (spaces allowed) is stored as a
//! raw data word. Everything after `;` is a comment; blank lines are skipped.

use thiserror::Error;

use super::isa::{Instruction, Opcode, OperandKind, RegisterName, WORD_BITS};
use crate::bits::Bits;

/// Default program capacity, the size of an 8-bit address space.
pub const DEFAULT_CAPACITY: usize = 256;

/// Classification of assembly errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleErrorKind {
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    #[error("invalid operand `{0}`")]
    InvalidOperand(String),
    #[error("operand {0} does not fit in 8 bits")]
    OperandOutOfRange(u64),
    #[error("unknown register `{0}`")]
    UnknownRegister(String),
    #[error("MOV needs a source and a destination register")]
    MissingRegister,
    #[error("{mnemonic} takes at most {max} operand(s)")]
    TooManyOperands { mnemonic: &'static str, max: usize },
    #[error("program needs more than {capacity} words")]
    ProgramTooLarge { capacity: usize },
}

/// Assembly error with the 1-indexed source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct AssembleError {
    pub line: usize,
    pub kind: AssembleErrorKind,
}

impl AssembleError {
    fn new(line: usize, kind: AssembleErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Assembled words, each tagged with the source line it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    words: Vec<Bits>,
    lines: Vec<usize>,
}

impl Program {
    /// Wrap pre-built words. Word `i` is attributed to line `i + 1`.
    pub fn from_words(words: Vec<Bits>) -> Self {
        let lines = (1..=words.len()).collect();
        Self { words, lines }
    }

    pub fn words(&self) -> &[Bits] {
        &self.words
    }

    /// Source line of word `index`.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Fail if the program would not fit in `capacity` words.
    pub fn check_capacity(&self, capacity: usize) -> Result<(), AssembleError> {
        if self.words.len() <= capacity {
            return Ok(());
        }
        let line = self.line_of(capacity).unwrap_or(capacity + 1);
        Err(AssembleError::new(
            line,
            AssembleErrorKind::ProgramTooLarge { capacity },
        ))
    }

    /// Render every word back to text.
    pub fn disassemble(&self) -> Vec<String> {
        self.words.iter().copied().map(disassemble).collect()
    }
}

/// Assemble a program for a 256-word memory.
pub fn assemble(source: &str) -> Result<Program, AssembleError> {
    assemble_with_capacity(source, DEFAULT_CAPACITY)
}

/// Assemble a program, rejecting it if it exceeds `capacity` words.
pub fn assemble_with_capacity(source: &str, capacity: usize) -> Result<Program, AssembleError> {
    let mut program = Program::default();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.split(';').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let word = assemble_line(text).map_err(|kind| AssembleError::new(line, kind))?;
        program.words.push(word);
        program.lines.push(line);
    }
    program.check_capacity(capacity)?;
    Ok(program)
}

fn raw_word(text: &str) -> Option<Bits> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != WORD_BITS {
        return None;
    }
    digits.parse().ok()
}

fn assemble_line(text: &str) -> Result<Bits, AssembleErrorKind> {
    if let Some(word) = raw_word(text) {
        return Ok(word);
    }

    let mut tokens = text.split_whitespace();
    let mnemonic = tokens.next().unwrap_or_default();
    let opcode: Opcode = mnemonic
        .parse()
        .map_err(|_| AssembleErrorKind::UnknownMnemonic(mnemonic.to_string()))?;
    let operands: Vec<&str> = tokens.collect();

    let too_many = |max: usize| AssembleErrorKind::TooManyOperands {
        mnemonic: opcode.mnemonic(),
        max,
    };

    let operand = match opcode.operand_kind() {
        OperandKind::None => {
            if !operands.is_empty() {
                return Err(too_many(0));
            }
            0
        }
        OperandKind::Number => match operands.as_slice() {
            [] => 0,
            [value] => parse_byte(value)?,
            _ => return Err(too_many(1)),
        },
        OperandKind::Registers => match operands.as_slice() {
            [source, destination] => {
                Instruction::mov(parse_register(source)?, parse_register(destination)?).operand
            }
            [] | [_] => return Err(AssembleErrorKind::MissingRegister),
            _ => return Err(too_many(2)),
        },
    };

    Ok(Instruction::new(opcode, operand).encode())
}

fn parse_byte(text: &str) -> Result<u8, AssembleErrorKind> {
    let value: u64 = text
        .parse()
        .map_err(|_| AssembleErrorKind::InvalidOperand(text.to_string()))?;
    u8::try_from(value).map_err(|_| AssembleErrorKind::OperandOutOfRange(value))
}

fn parse_register(text: &str) -> Result<RegisterName, AssembleErrorKind> {
    text.parse()
        .map_err(|_| AssembleErrorKind::UnknownRegister(text.to_string()))
}

/// Render a word as assembly text. Unknown opcodes come back as raw binary.
pub fn disassemble(word: Bits) -> String {
    match Instruction::decode(word) {
        Some(instruction) => instruction.to_string(),
        None => {
            let text = word.to_string();
            let split = text.len().saturating_sub(8);
            format!("{} {}", &text[..split], &text[split..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(source: &str) -> AssembleError {
        assemble(source).unwrap_err()
    }

    #[test]
    fn assembles_every_mnemonic() {
        let program = assemble(
            "NOOP\nLOADA 30\nLOADB 31\nSETA 1\nSTOREA 32\nSTORETB\nMOV A B\nADD\nJMP 6\nJMPC 18\nHALT",
        )
        .unwrap();
        let text: Vec<String> = program.words().iter().map(|w| w.to_string()).collect();
        assert_eq!(text[0], "0000000000000000");
        assert_eq!(text[1], "0000000100011110");
        assert_eq!(text[6], "0000011000010010");
        assert_eq!(text[9], "0000100100010010");
        assert_eq!(text[10], "0000101000000000");
    }

    #[test]
    fn comments_blank_lines_and_raw_words() {
        let program = assemble("; header\n\nSETA 5 ; five\n00000000 00000101\n").unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.line_of(0), Some(3));
        assert_eq!(program.words()[1].value(), 5);
    }

    #[test]
    fn omitted_operand_is_zero() {
        let program = assemble("LOADA").unwrap();
        assert_eq!(program.words()[0].to_string(), "0000000100000000");
    }

    #[test]
    fn errors_carry_line_numbers() {
        assert_eq!(
            err("SETA 1\nFROB 2"),
            AssembleError::new(2, AssembleErrorKind::UnknownMnemonic("FROB".into()))
        );
        assert_eq!(err("SETA x").kind, AssembleErrorKind::InvalidOperand("x".into()));
        assert_eq!(err("SETA 256").kind, AssembleErrorKind::OperandOutOfRange(256));
        assert_eq!(err("MOV A Q").kind, AssembleErrorKind::UnknownRegister("Q".into()));
        assert_eq!(err("MOV A").kind, AssembleErrorKind::MissingRegister);
        assert!(matches!(
            err("ADD 1").kind,
            AssembleErrorKind::TooManyOperands { max: 0, .. }
        ));
        assert!(matches!(
            err("SETA 1 2").kind,
            AssembleErrorKind::TooManyOperands { max: 1, .. }
        ));
    }

    #[test]
    fn capacity_is_enforced() {
        let error = assemble_with_capacity("NOOP\nNOOP\n\nHALT", 2).unwrap_err();
        assert_eq!(error.line, 4);
        assert_eq!(error.kind, AssembleErrorKind::ProgramTooLarge { capacity: 2 });
        assert_eq!(error.to_string(), "line 4: program needs more than 2 words");
    }

    #[test]
    fn disassembly_round_trips_through_the_assembler() {
        let source = "SETA 36\nSTOREA 32\nMOV B P\nADD\nJMPC 18\nHALT";
        let program = assemble(source).unwrap();
        let text = program.disassemble();
        assert_eq!(text.join("\n"), source);
        assert_eq!(assemble(&text.join("\n")).unwrap(), program);
    }

    #[test]
    fn unknown_opcodes_disassemble_as_binary() {
        assert_eq!(disassemble(Bits::new(16, 0xff01)), "11111111 00000001");
    }
}
