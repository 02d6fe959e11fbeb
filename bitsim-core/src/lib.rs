//! Bitsim Core
//!
//! A digital-logic simulation engine built on fine-grained reactive cells.
//! It implements:
//!
//! - Reactive primitives (signals, memos, slots) with dependency tracking
//! - Gates, latches, registers, a multi-driver bus, adders and a decoder
//! - Gate-level circuits such as an asynchronous ripple counter
//! - A microcoded 8-bit computer with an assembler
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Core reactive primitives and dependency tracking
//! - `graph`: Dependency graph and change propagation order
//! - `logic`: Combinational and sequential logic components
//! - `circuits`: Circuits assembled from logic components
//! - `cpu`: Instruction set, microcode, RAM, control unit and the computer
//!
//! # Example
//!
//! ```rust
//! use bitsim_core::cpu::{Computer, ComputerConfig};
//!
//! let mut computer = Computer::new(ComputerConfig::default()).unwrap();
//! computer.load_source("SETA 2\nSTOREA 20\nLOADB 20\nADD\nHALT").unwrap();
//! computer.run_until_halt(1_000).unwrap();
//!
//! assert!(computer.is_halted());
//! assert_eq!(computer.registers().a.value().value(), 4);
//! ```

pub mod bits;
pub mod circuits;
pub mod cpu;
pub mod error;
pub mod graph;
pub mod logic;
pub mod reactive;

pub use bits::{Bits, Resize};
pub use error::{Error, Result};
