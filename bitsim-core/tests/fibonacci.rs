//! End-to-end run of the Fibonacci program.
//!
//! The program keeps the last two terms at addresses 30 and 31 and appends
//! every term to a table starting at address 36, using address 32 as the
//! write pointer. It stops once an addition overflows 8 bits.

use bitsim_core::cpu::{assemble, Computer, ComputerConfig, Opcode, Stage};
use bitsim_core::Bits;

const FIBONACCI: &str = "\
; seed: previous = 0, pointer = 36, current = 1
SETA 0
STOREA 31
SETA 36
STOREA 32
SETA 1
STOREA 30
; append current to the table and bump the pointer
LOADB 32
STORETB
SETA 1
ADD
STOREA 32
; current, previous = current + previous, current
LOADA 30
LOADB 31
STOREA 31
ADD
STOREA 30
JMPC 18
JMP 6
HALT
";

fn run() -> (Computer, u64) {
    let mut computer = Computer::new(ComputerConfig::default()).unwrap();
    computer.load_source(FIBONACCI).unwrap();
    let half_cycles = computer.run_until_halt(10_000).unwrap();
    (computer, half_cycles)
}

fn word(computer: &Computer, address: usize) -> u64 {
    computer.ram().read(address).unwrap().value()
}

#[test]
fn program_assembles() {
    let program = assemble(FIBONACCI).unwrap();
    assert_eq!(program.len(), 19);
    assert_eq!(program.line_of(0), Some(2));
    assert_eq!(program.disassemble()[16], "JMPC 18");
    assert_eq!(program.words()[18], Bits::new(16, u64::from(Opcode::Halt.index()) << 8));
}

#[test]
fn halts_after_overflow() {
    let (computer, half_cycles) = run();

    assert!(computer.is_halted());
    assert_eq!(computer.stage(), Stage::Halt);
    assert_eq!(half_cycles, 1938);
    assert_eq!(computer.half_cycles(), 1938);

    let registers = computer.registers();
    assert_eq!(registers.a.value().value(), 121);
    assert_eq!(registers.b.value().value(), 144);
    assert_eq!(registers.program_counter.value().value(), 19);
    assert!(computer.overflow());
}

#[test]
fn writes_the_sequence_to_memory() {
    let (computer, _) = run();

    // 233 + 144 wrapped to 121.
    assert_eq!(word(&computer, 30), 121);
    assert_eq!(word(&computer, 31), 233);
    assert_eq!(word(&computer, 32), 49);

    let table: Vec<u64> = (36..=48).map(|address| word(&computer, address)).collect();
    assert_eq!(table, vec![1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233]);
    assert_eq!(word(&computer, 49), 0);
}

#[test]
fn further_ticks_are_ignored() {
    let (mut computer, _) = run();
    let before = computer.registers().a.value();
    for _ in 0..10 {
        computer.tick().unwrap();
    }
    assert_eq!(computer.half_cycles(), 1938);
    assert_eq!(computer.registers().a.value(), before);
}
