//! Reactive Primitives
//!
//! This module implements the reactive cells every circuit is built from:
//! signals, memos, slots, and the read-only wires that connect them.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state: a latch's stored bit, a
//! register's contents, a clock level, a control line. When a signal's value
//! is read while a memo is computing, the read is recorded. When the value
//! changes, every transitively dependent memo is marked dirty.
//!
//! ## Memos
//!
//! A Memo is a derived value that caches its result. It re-evaluates only
//! when one of its dependencies changed, and only when read. Gate outputs,
//! bus lines, decoder outputs and adder stages are all memos.
//!
//! ## Slots
//!
//! A Slot is an input that is wired after construction, so feedback circuits
//! can be assembled in two phases without a memo ever reading itself.
//!
//! ## Wires
//!
//! A Wire is a read-only handle over any of the above (or a constant). It is
//! what components accept and hand out.
//!
//! # Implementation Notes
//!
//! Dependencies are detected automatically through a thread-local tracking
//! context: when a cell is read, we check whether a memo is computing and, if
//! so, record the read against it. The same stack detects memos that read
//! themselves.
//!
//! Feedback between sequential elements never goes through a memo. It goes
//! through state signals that are written by an explicit `update()` step.

mod context;
mod memo;
mod runtime;
mod signal;
mod slot;
mod wire;

pub use context::{Dependencies, ReactiveContext};
pub use memo::{Memo, MemoState};
pub use runtime::{NodeHandle, Reactive, Runtime};
pub use signal::Signal;
pub use slot::Slot;
pub use wire::Wire;
