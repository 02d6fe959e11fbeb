//! Combinational gates.
//!
//! A gate is an immutable (kind, inverted) pair applied to one or two input
//! wires. Its output is a memo, so reading it recomputes only after an input
//! changed.

use std::fmt;

use crate::reactive::{Memo, Wire};

/// The base logic function of a gate. Inverted variants flip the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    And,
    Or,
    Xor,
    /// Single-input inverter. An inverted NOT is a buffer.
    Not,
}

impl GateKind {
    /// Mnemonic for the gate, accounting for inversion.
    pub fn name(self, inverted: bool) -> &'static str {
        match (self, inverted) {
            (GateKind::And, false) => "AND",
            (GateKind::And, true) => "NAND",
            (GateKind::Or, false) => "OR",
            (GateKind::Or, true) => "NOR",
            (GateKind::Xor, false) => "XOR",
            (GateKind::Xor, true) => "XNOR",
            (GateKind::Not, false) => "NOT",
            (GateKind::Not, true) => "BUF",
        }
    }
}

/// Truth function of every gate. `b` is ignored for [`GateKind::Not`].
pub fn evaluate(kind: GateKind, inverted: bool, a: bool, b: bool) -> bool {
    let out = match kind {
        GateKind::And => a && b,
        GateKind::Or => a || b,
        GateKind::Xor => a != b,
        GateKind::Not => !a,
    };
    out != inverted
}

/// A logic gate with a derived output.
#[derive(Clone)]
pub struct Gate {
    kind: GateKind,
    inverted: bool,
    output: Memo<bool>,
}

impl Gate {
    /// Build a two-input gate.
    pub fn new(
        kind: GateKind,
        inverted: bool,
        a: impl Into<Wire<bool>>,
        b: impl Into<Wire<bool>>,
    ) -> Self {
        let (a, b) = (a.into(), b.into());
        let output = Memo::new(move || {
            let a = a.get()?;
            // NOT only has one input; reading `b` would add a spurious edge.
            let b = if kind == GateKind::Not { false } else { b.get()? };
            Ok(evaluate(kind, inverted, a, b))
        });
        Self {
            kind,
            inverted,
            output,
        }
    }

    pub fn and(a: impl Into<Wire<bool>>, b: impl Into<Wire<bool>>) -> Self {
        Self::new(GateKind::And, false, a, b)
    }

    pub fn nand(a: impl Into<Wire<bool>>, b: impl Into<Wire<bool>>) -> Self {
        Self::new(GateKind::And, true, a, b)
    }

    pub fn or(a: impl Into<Wire<bool>>, b: impl Into<Wire<bool>>) -> Self {
        Self::new(GateKind::Or, false, a, b)
    }

    pub fn nor(a: impl Into<Wire<bool>>, b: impl Into<Wire<bool>>) -> Self {
        Self::new(GateKind::Or, true, a, b)
    }

    pub fn xor(a: impl Into<Wire<bool>>, b: impl Into<Wire<bool>>) -> Self {
        Self::new(GateKind::Xor, false, a, b)
    }

    pub fn xnor(a: impl Into<Wire<bool>>, b: impl Into<Wire<bool>>) -> Self {
        Self::new(GateKind::Xor, true, a, b)
    }

    pub fn not(a: impl Into<Wire<bool>>) -> Self {
        Self::new(GateKind::Not, false, a, false)
    }

    pub fn buffer(a: impl Into<Wire<bool>>) -> Self {
        Self::new(GateKind::Not, true, a, false)
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// The output cell.
    pub fn output(&self) -> &Memo<bool> {
        &self.output
    }
}

impl From<&Gate> for Wire<bool> {
    fn from(gate: &Gate) -> Self {
        Wire::Memo(gate.output.clone())
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("kind", &self.kind.name(self.inverted))
            .field("output", &self.output.id())
            .finish()
    }
}
