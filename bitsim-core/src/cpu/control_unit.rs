//! Microcode sequencer.
//!
//! The control unit owns the microstep counter, the step and instruction
//! decoders, the halt latch and the control lines. The computer drives it
//! once per half-cycle:
//!
//! * falling clock: [`ControlUnit::begin_cycle`] clears every line, advances
//!   the counter, then asserts the lines for the new step;
//! * rising clock: [`ControlUnit::hold`] drops the counter's load input.
//!
//! The counter's next value is a memo: `counter + 1`, or 0 once the step
//! decoder's last output is lit.

use tracing::{debug, trace};

use super::config::ComputerConfig;
use super::control::{ControlLine, ControlLines, LineSet};
use super::isa::{Opcode, BYTE_BITS};
use super::microcode::Microcode;
use crate::bits::{Bits, Resize};
use crate::error::Result;
use crate::logic::{Decoder, NBitRegister, SrLatch};
use crate::reactive::{Memo, Signal, Wire};

/// Coarse phase of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Microstep 0, between instructions.
    Idle,
    /// Loading the next instruction word.
    Fetch,
    /// Running the instruction's own steps.
    Execute,
    /// Stopped by `HE`. Nothing clears this.
    Halt,
}

pub struct ControlUnit {
    lines: ControlLines,
    microcode: Microcode,
    counter: NBitRegister,
    counter_load: Signal<bool>,
    step_decoder: Decoder,
    instruction_decoder: Decoder,
    halt: SrLatch,
    operand: Wire<Bits>,
    flags: Wire<Bits>,
}

impl ControlUnit {
    /// Build the sequencer around the instruction register's opcode and
    /// operand bytes and the flags register.
    ///
    /// Fails if `config` does not validate.
    pub fn new(
        config: &ComputerConfig,
        lines: ControlLines,
        opcode: impl Into<Wire<Bits>>,
        operand: impl Into<Wire<Bits>>,
        flags: impl Into<Wire<Bits>>,
    ) -> Result<Self> {
        config.validate()?;
        let microcode = Microcode::standard();
        let counter = NBitRegister::new("MC", config.micro_counter_bits);
        let counter_load = Signal::new(false);
        let step_decoder = Decoder::new(counter.output(), config.micro_steps);

        let next_step = {
            let current = counter.output();
            let decoded = step_decoder.output();
            let wrap = config.micro_steps - 1;
            Memo::new(move || {
                let current = current.get()?;
                if decoded.get()?.bit(wrap) {
                    Ok(Bits::zeros(current.width()))
                } else {
                    Ok(current.wrapping_add(1))
                }
            })
        };
        counter.input().connect(&next_step);
        counter.load().connect(&counter_load);

        // NOOP is opcode 0, which the decoder leaves dark.
        let instruction_decoder = Decoder::new(opcode, Opcode::ALL.len() - 1);

        let halt = SrLatch::new();
        halt.set().connect(lines.wire(ControlLine::He));

        Ok(Self {
            lines,
            microcode,
            counter,
            counter_load,
            step_decoder,
            instruction_decoder,
            halt,
            operand: operand.into(),
            flags: flags.into(),
        })
    }

    pub fn lines(&self) -> &ControlLines {
        &self.lines
    }

    pub fn microcode(&self) -> &Microcode {
        &self.microcode
    }

    /// Current microstep.
    pub fn step(&self) -> u64 {
        self.counter.value().value()
    }

    /// The step decoder's output lines.
    pub fn step_lines(&self) -> Wire<Bits> {
        self.step_decoder.output()
    }

    /// The latched opcode, or `None` if it does not decode to an instruction
    /// with microcode.
    pub fn opcode(&self) -> Result<Option<Opcode>> {
        Ok(self
            .instruction_decoder
            .selected()?
            .and_then(|line| Opcode::from_index(line as u64 + 1)))
    }

    pub fn is_halted(&self) -> bool {
        self.halt.value()
    }

    pub fn stage(&self) -> Stage {
        let step = self.step();
        if self.is_halted() {
            Stage::Halt
        } else if step == 0 {
            Stage::Idle
        } else if step <= self.microcode.fetch_len() {
            Stage::Fetch
        } else {
            Stage::Execute
        }
    }

    /// Start a cycle on the falling clock edge.
    ///
    /// Returns the new microstep.
    pub fn begin_cycle(&self) -> Result<u64> {
        self.lines.clear_all();

        self.counter_load.set(true);
        self.counter.update()?;
        let step = self.step();

        let opcode = self.opcode()?;
        let operand = self.operand.get()?.resize(BYTE_BITS, Resize::RightAligned);
        let asserted: LineSet = self
            .microcode
            .lines_for(step, opcode, operand, self.flags.get()?);
        for line in &asserted {
            self.lines.assert(*line);
        }

        if step == self.microcode.fetch_len() + 1 && opcode.is_none() {
            debug!(step, "no-op opcode");
        }
        debug!(step, stage = ?self.stage(), "microstep");
        trace!(step, lines = ?asserted.as_slice(), "control lines asserted");
        Ok(step)
    }

    /// Rising clock edge: the counter stops loading.
    pub fn hold(&self) {
        self.counter_load.set(false);
    }

    /// Capture `HE` into the halt latch. Returns whether the unit is halted.
    pub fn latch_halt(&self) -> Result<bool> {
        self.halt.update()
    }
}

impl std::fmt::Debug for ControlUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlUnit")
            .field("step", &self.step())
            .field("stage", &self.stage())
            .field("lines", &self.lines.asserted())
            .finish()
    }
}
