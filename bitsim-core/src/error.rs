//! Error Types
//!
//! The simulation is a closed world, so the error taxonomy is narrow. Width
//! mismatches are resolved by the resize policy on [`Bits`](crate::bits::Bits),
//! unknown opcodes execute as no-ops, and conflicting bus drivers are OR-ed
//! together. Only the cases below abort an operation and reach the caller.

use thiserror::Error;

use crate::cpu::AssembleError;
use crate::graph::NodeId;

/// Errors produced by the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A derived cell transitively read itself before finishing its own
    /// computation.
    #[error("cyclic dependency: node {node} was read while it was being computed")]
    CyclicDependency {
        /// The node that was re-entered.
        node: NodeId,
    },

    /// A bit string contained something other than `0` and `1`.
    #[error("invalid bit string `{input}`")]
    InvalidBits {
        /// The rejected input.
        input: String,
    },

    /// A bit vector wider than the supported maximum was requested.
    #[error("bit width {width} exceeds the maximum of {max}")]
    WidthOutOfRange {
        /// The requested width.
        width: usize,
        /// The largest supported width.
        max: usize,
    },

    /// A program failed to assemble.
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    /// A configuration could not be parsed or is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
