//! Control lines.
//!
//! Fifteen boolean signals gate which component drives the bus, which
//! register loads, and whether the ALU or halt logic is active.

use std::fmt;

use smallvec::SmallVec;

use crate::reactive::{Signal, Wire};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlLine {
    /// Program counter in (load from bus).
    Pci,
    /// Program counter out.
    Pco,
    /// Program counter enable (increment).
    Pce,
    /// Memory address register in.
    Mri,
    /// RAM value in (write).
    Rvi,
    /// RAM value out.
    Rvo,
    /// Instruction register in.
    Iri,
    /// Instruction register operand out.
    Iro,
    /// A register in.
    Ari,
    /// A register out.
    Aro,
    /// B register in.
    Bri,
    /// B register out.
    Bro,
    /// Enable adder (sum and flags load).
    Ea,
    /// Sum register out.
    Sro,
    /// Halt.
    He,
}

/// Lines asserted together in one microstep.
pub type LineSet = SmallVec<[ControlLine; 8]>;

impl ControlLine {
    pub const ALL: [ControlLine; 15] = [
        ControlLine::Pci,
        ControlLine::Pco,
        ControlLine::Pce,
        ControlLine::Mri,
        ControlLine::Rvi,
        ControlLine::Rvo,
        ControlLine::Iri,
        ControlLine::Iro,
        ControlLine::Ari,
        ControlLine::Aro,
        ControlLine::Bri,
        ControlLine::Bro,
        ControlLine::Ea,
        ControlLine::Sro,
        ControlLine::He,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlLine::Pci => "PCI",
            ControlLine::Pco => "PCO",
            ControlLine::Pce => "PCE",
            ControlLine::Mri => "MRI",
            ControlLine::Rvi => "RVI",
            ControlLine::Rvo => "RVO",
            ControlLine::Iri => "IRI",
            ControlLine::Iro => "IRO",
            ControlLine::Ari => "ARI",
            ControlLine::Aro => "ARO",
            ControlLine::Bri => "BRI",
            ControlLine::Bro => "BRO",
            ControlLine::Ea => "EA",
            ControlLine::Sro => "SRO",
            ControlLine::He => "HE",
        }
    }
}

impl fmt::Display for ControlLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One state signal per control line.
#[derive(Debug, Clone)]
pub struct ControlLines {
    lines: [Signal<bool>; 15],
}

impl ControlLines {
    pub fn new() -> Self {
        Self {
            lines: std::array::from_fn(|_| Signal::new(false)),
        }
    }

    /// Read-only handle for wiring a component to `line`.
    pub fn wire(&self, line: ControlLine) -> Wire<bool> {
        Wire::from(&self.lines[line.index()])
    }

    pub fn is_asserted(&self, line: ControlLine) -> bool {
        self.lines[line.index()].get_untracked()
    }

    pub fn assert(&self, line: ControlLine) {
        self.lines[line.index()].set(true);
    }

    pub fn clear_all(&self) {
        for line in &self.lines {
            line.set(false);
        }
    }

    /// Currently asserted lines, in [`ControlLine::ALL`] order.
    pub fn asserted(&self) -> LineSet {
        ControlLine::ALL
            .iter()
            .copied()
            .filter(|line| self.is_asserted(*line))
            .collect()
    }
}

impl Default for ControlLines {
    fn default() -> Self {
        Self::new()
    }
}
