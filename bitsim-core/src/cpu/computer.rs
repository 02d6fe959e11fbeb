//! The assembled 8-bit computer.
//!
//! [`Computer::new`] builds every component and wires it to the bus and the
//! control lines. After that the only mutation entry point is
//! [`Computer::tick`], which advances the clock by one half-cycle.

use tracing::{debug, info};

use super::assembler::{assemble_with_capacity, Program};
use super::config::ComputerConfig;
use super::control::{ControlLine, ControlLines};
use super::control_unit::{ControlUnit, Stage};
use super::isa::{Instruction, BYTE_BITS, WORD_BITS};
use super::ram::Ram;
use crate::bits::{Bits, Resize};
use crate::error::Result;
use crate::logic::{Bus, NBitRegister, RippleCarryAdder};
use crate::reactive::{Memo, Signal, Wire};

/// Width of the flags register. The low bit holds the adder's carry-out.
pub const FLAG_BITS: usize = 2;

/// Registers loaded in the low clock phase, plus the program counter.
#[derive(Debug, Clone)]
pub struct RegisterBank {
    pub a: NBitRegister,
    pub b: NBitRegister,
    pub sum: NBitRegister,
    pub flags: NBitRegister,
    pub program_counter: NBitRegister,
    pub memory_address: NBitRegister,
    pub instruction: NBitRegister,
}

impl RegisterBank {
    fn new() -> Self {
        Self {
            a: NBitRegister::new("A", BYTE_BITS),
            b: NBitRegister::new("B", BYTE_BITS),
            sum: NBitRegister::new("SUM", BYTE_BITS),
            flags: NBitRegister::new("FLAGS", FLAG_BITS),
            program_counter: NBitRegister::new("PC", BYTE_BITS),
            memory_address: NBitRegister::new("MAR", BYTE_BITS),
            instruction: NBitRegister::new("IR", WORD_BITS),
        }
    }

    /// Registers that load on the falling edge. The program counter is
    /// clocked separately.
    fn clocked(&self) -> [&NBitRegister; 6] {
        [
            &self.memory_address,
            &self.instruction,
            &self.a,
            &self.b,
            &self.sum,
            &self.flags,
        ]
    }

    /// Sample every clocked register's input, then commit them all.
    ///
    /// Sampling first means a register loading from the bus sees the bus as
    /// it was before any other register in the same step changed.
    pub fn settle(&self) -> Result<()> {
        let registers = self.clocked();
        let mut next = Vec::with_capacity(registers.len());
        for register in registers {
            next.push(register.next_state()?);
        }
        for (register, value) in registers.iter().zip(next) {
            register.commit(value);
        }
        Ok(())
    }
}

/// What a call to [`Computer::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock is disabled.
    Idle,
    /// The machine has halted; the clock no longer advances.
    Halted,
    /// The clock went high.
    Rising,
    /// The clock went low and the sequencer moved to `step`.
    Falling { step: u64 },
}

#[derive(Debug)]
pub struct Computer {
    config: ComputerConfig,
    clock: Signal<bool>,
    clock_enabled: bool,
    bus: Bus,
    registers: RegisterBank,
    alu: RippleCarryAdder,
    ram: Ram,
    control: ControlUnit,
    half_cycles: u64,
}

/// `value` while `enable` is high, zeros otherwise.
fn gated(value: Wire<Bits>, enable: Wire<bool>, width: usize) -> Memo<Bits> {
    Memo::new(move || {
        if enable.get()? {
            value.get()
        } else {
            Ok(Bits::zeros(width))
        }
    })
}

impl Computer {
    pub fn new(config: ComputerConfig) -> Result<Self> {
        config.validate()?;

        let lines = ControlLines::new();
        let line = |l: ControlLine| lines.wire(l);
        let clock = Signal::new(false);
        let bus = Bus::new(BYTE_BITS);
        let registers = RegisterBank::new();
        let ram = Ram::new(config.ram_size);
        let alu = RippleCarryAdder::new(BYTE_BITS);

        let ir = registers.instruction.output();
        let ir_opcode = {
            let ir = ir.clone();
            Memo::new(move || Ok(ir.get()?.resize(BYTE_BITS, Resize::LeftAligned)))
        };
        let ir_operand = {
            let ir = ir.clone();
            Memo::new(move || Ok(ir.get()?.resize(BYTE_BITS, Resize::RightAligned)))
        };

        bus.attach("A", registers.a.output(), line(ControlLine::Aro));
        bus.attach("B", registers.b.output(), line(ControlLine::Bro));
        bus.attach("SUM", registers.sum.output(), line(ControlLine::Sro));
        bus.attach("RAM", ram.operand(), line(ControlLine::Rvo));
        bus.attach("PC", registers.program_counter.output(), line(ControlLine::Pco));
        bus.attach("IR", &ir_operand, line(ControlLine::Iro));

        for (register, enable) in [
            (&registers.a, ControlLine::Ari),
            (&registers.b, ControlLine::Bri),
            (&registers.memory_address, ControlLine::Mri),
        ] {
            register.input().connect(bus.output());
            register.load().connect(line(enable));
        }

        let ir_input = {
            let rvo = line(ControlLine::Rvo);
            let opcode = ram.opcode();
            let bus = bus.output();
            Memo::new(move || {
                let high = if rvo.get()? {
                    opcode.get()?
                } else {
                    Bits::zeros(BYTE_BITS)
                };
                Ok(high.concat(bus.get()?))
            })
        };
        registers.instruction.input().connect(&ir_input);
        registers.instruction.load().connect(line(ControlLine::Iri));

        alu.a().connect(&gated(registers.a.output(), line(ControlLine::Ea), BYTE_BITS));
        alu.b().connect(&gated(registers.b.output(), line(ControlLine::Ea), BYTE_BITS));
        registers.sum.input().connect(alu.sum());
        registers.sum.load().connect(line(ControlLine::Ea));
        let flags_input = {
            let overflow = alu.overflow();
            Memo::new(move || Ok(Bits::new(FLAG_BITS, u64::from(overflow.get()?))))
        };
        registers.flags.input().connect(&flags_input);
        registers.flags.load().connect(line(ControlLine::Ea));

        let pc_input = {
            let pci = line(ControlLine::Pci);
            let bus = bus.output();
            let pc = registers.program_counter.output();
            Memo::new(move || {
                if pci.get()? {
                    bus.get()
                } else {
                    Ok(pc.get()?.wrapping_add(1))
                }
            })
        };
        let pc_load = {
            let clock = Wire::from(&clock);
            let pce = line(ControlLine::Pce);
            let pci = line(ControlLine::Pci);
            Memo::new(move || Ok(clock.get()? && (pce.get()? || pci.get()?)))
        };
        registers.program_counter.input().connect(&pc_input);
        registers.program_counter.load().connect(&pc_load);

        ram.address().connect(registers.memory_address.output());
        ram.write_enable().connect(line(ControlLine::Rvi));
        ram.data_in().connect(bus.output());

        let control = ControlUnit::new(
            &config,
            lines,
            ir_opcode,
            ir_operand,
            registers.flags.output(),
        )?;

        debug!(
            ram_size = config.ram_size,
            micro_steps = config.micro_steps,
            bus_drivers = bus.driver_count(),
            "computer wired"
        );

        Ok(Self {
            config,
            clock,
            clock_enabled: false,
            bus,
            registers,
            alu,
            ram,
            control,
            half_cycles: 0,
        })
    }

    /// Copy `program` into RAM from address 0, clearing the rest.
    pub fn load_program(&self, program: &Program) -> Result<()> {
        program.check_capacity(self.ram.size())?;
        self.ram.load(program.words());
        info!(words = program.len(), "program loaded");
        Ok(())
    }

    /// Assemble `source` and load it.
    pub fn load_source(&self, source: &str) -> Result<Program> {
        let program = assemble_with_capacity(source, self.ram.size())?;
        self.load_program(&program)?;
        Ok(program)
    }

    pub fn enable_clock(&mut self) {
        self.set_clock_enabled(true);
    }

    pub fn set_clock_enabled(&mut self, enabled: bool) {
        if self.clock_enabled != enabled {
            debug!(enabled, "clock gate changed");
        }
        self.clock_enabled = enabled;
    }

    pub fn is_clock_enabled(&self) -> bool {
        self.clock_enabled
    }

    /// Advance one half-cycle.
    ///
    /// The program counter and RAM see the new clock level first. On the
    /// falling edge the control unit then advances and asserts the next
    /// step's lines, after which the clocked registers settle and `HE` is
    /// latched. On the rising edge the microstep counter stops loading.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.control.is_halted() {
            return Ok(TickOutcome::Halted);
        }
        if !self.clock_enabled {
            return Ok(TickOutcome::Idle);
        }

        let rising = !self.clock.get_untracked();
        self.clock.set(rising);
        self.half_cycles += 1;

        self.registers.program_counter.update()?;
        self.ram.update()?;

        if rising {
            self.control.hold();
            debug!(half_cycle = self.half_cycles, "clock high");
            return Ok(TickOutcome::Rising);
        }

        let step = self.control.begin_cycle()?;
        self.registers.settle()?;
        if self.control.latch_halt()? {
            info!(
                half_cycles = self.half_cycles,
                pc = self.registers.program_counter.value().value(),
                a = self.registers.a.value().value(),
                b = self.registers.b.value().value(),
                "machine halted"
            );
        }
        debug!(half_cycle = self.half_cycles, step, "clock low");
        Ok(TickOutcome::Falling { step })
    }

    /// Enable the clock and tick until the machine halts or `limit`
    /// half-cycles have run. Returns the number of half-cycles run.
    pub fn run_until_halt(&mut self, limit: u64) -> Result<u64> {
        self.enable_clock();
        let mut ran = 0;
        while ran < limit && !self.control.is_halted() {
            self.tick()?;
            ran += 1;
        }
        if !self.control.is_halted() {
            debug!(limit, "half-cycle limit reached before halt");
        }
        Ok(ran)
    }

    pub fn config(&self) -> &ComputerConfig {
        &self.config
    }

    /// Current clock level.
    pub fn clock(&self) -> bool {
        self.clock.get_untracked()
    }

    pub fn half_cycles(&self) -> u64 {
        self.half_cycles
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn registers(&self) -> &RegisterBank {
        &self.registers
    }

    pub fn alu(&self) -> &RippleCarryAdder {
        &self.alu
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn control(&self) -> &ControlUnit {
        &self.control
    }

    pub fn is_halted(&self) -> bool {
        self.control.is_halted()
    }

    pub fn stage(&self) -> Stage {
        self.control.stage()
    }

    /// Whether the last addition carried out of the top bit.
    pub fn overflow(&self) -> bool {
        self.registers.flags.value().bit(FLAG_BITS - 1)
    }

    /// The instruction register, decoded.
    pub fn current_instruction(&self) -> Option<Instruction> {
        Instruction::decode(self.registers.instruction.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::isa::Opcode;

    fn computer(source: &str) -> Computer {
        let computer = Computer::new(ComputerConfig::default()).unwrap();
        computer.load_source(source).unwrap();
        computer
    }

    fn byte(register: &NBitRegister) -> u64 {
        register.value().value()
    }

    #[test]
    fn disabled_clock_does_nothing() {
        let mut computer = computer("SETA 5\nHALT");
        assert_eq!(computer.tick().unwrap(), TickOutcome::Idle);
        assert_eq!(computer.half_cycles(), 0);
        assert!(!computer.clock());
    }

    #[test]
    fn first_ticks_fetch() {
        let mut computer = computer("SETA 5\nHALT");
        computer.enable_clock();

        assert_eq!(computer.tick().unwrap(), TickOutcome::Rising);
        assert_eq!(computer.tick().unwrap(), TickOutcome::Falling { step: 1 });
        assert_eq!(
            computer.control().lines().asserted().to_vec(),
            vec![ControlLine::Pco, ControlLine::Mri]
        );
        assert_eq!(byte(&computer.registers().memory_address), 0);

        computer.tick().unwrap();
        assert_eq!(computer.tick().unwrap(), TickOutcome::Falling { step: 2 });
        assert_eq!(
            computer.current_instruction(),
            Some(Instruction::new(Opcode::SetA, 5))
        );
        // PCE takes effect on the next rising edge.
        assert_eq!(byte(&computer.registers().program_counter), 0);
        computer.tick().unwrap();
        assert_eq!(byte(&computer.registers().program_counter), 1);
    }

    #[test]
    fn seta_then_halt() {
        let mut computer = computer("SETA 5\nHALT");
        let ran = computer.run_until_halt(1_000).unwrap();
        assert!(computer.is_halted());
        assert_eq!(computer.stage(), Stage::Halt);
        assert_eq!(byte(&computer.registers().a), 5);
        // SETA runs all six microsteps, HALT stops at step 3.
        assert_eq!(ran, 2 * (6 + 3));
        assert_eq!(computer.tick().unwrap(), TickOutcome::Halted);
        assert_eq!(computer.half_cycles(), ran);
    }

    #[test]
    fn store_and_load() {
        let mut computer = computer("SETA 7\nSTOREA 20\nLOADB 20\nHALT");
        computer.run_until_halt(1_000).unwrap();
        assert_eq!(computer.ram().read(20), Some(Bits::new(16, 7)));
        assert_eq!(byte(&computer.registers().b), 7);
    }

    #[test]
    fn add_sets_overflow() {
        let mut computer = computer("SETA 200\nSTOREA 20\nLOADB 20\nADD\nHALT");
        computer.run_until_halt(1_000).unwrap();
        assert_eq!(byte(&computer.registers().a), 144);
        assert_eq!(byte(&computer.registers().sum), 144);
        assert!(computer.overflow());
    }

    #[test]
    fn mov_copies_between_registers() {
        let mut computer = computer("SETA 9\nMOV A B\nHALT");
        computer.run_until_halt(1_000).unwrap();
        assert_eq!(byte(&computer.registers().b), 9);
        assert_eq!(byte(&computer.registers().a), 9);
    }

    #[test]
    fn jmp_skips_code() {
        let mut computer = computer("JMP 2\nSETA 1\nSETA 2\nHALT");
        computer.run_until_halt(1_000).unwrap();
        assert_eq!(byte(&computer.registers().a), 2);
    }

    #[test]
    fn jmpc_without_overflow_falls_through() {
        let mut computer = computer("SETA 1\nSTOREA 20\nLOADB 20\nADD\nJMPC 6\nSETA 50\nHALT");
        computer.run_until_halt(1_000).unwrap();
        assert!(!computer.overflow());
        assert_eq!(byte(&computer.registers().a), 50);
    }

    #[test]
    fn run_stops_at_the_limit() {
        let mut computer = computer("JMP 0");
        assert_eq!(computer.run_until_halt(40).unwrap(), 40);
        assert!(!computer.is_halted());
        assert_eq!(computer.half_cycles(), 40);
    }

    #[test]
    fn oversized_programs_are_rejected() {
        let config = ComputerConfig {
            ram_size: 2,
            ..ComputerConfig::default()
        };
        let computer = Computer::new(config).unwrap();
        assert!(matches!(
            computer.load_source("NOOP\nNOOP\nHALT"),
            Err(crate::Error::Assemble(_))
        ));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let config = ComputerConfig {
            micro_steps: 1,
            ..ComputerConfig::default()
        };
        assert!(matches!(Computer::new(config), Err(crate::Error::Config(_))));
    }
}
