//! Logic Components
//!
//! Gates, storage elements and arithmetic built on the reactive cells.
//!
//! Combinational parts (gates, adders, the decoder, bus lines) are memos and
//! recompute lazily. Sequential parts (latches, registers) hold state signals
//! and only change when their owner calls `update()` or `commit()`.

pub mod adder;
pub mod bus;
pub mod decoder;
pub mod gate;
pub mod latch;
pub mod register;

pub use adder::{FullAdder, HalfAdder, RippleCarryAdder};
pub use bus::{Bus, BusDriver};
pub use decoder::{decode, Decoder};
pub use gate::{evaluate, Gate, GateKind};
pub use latch::{d_transition, sr_transition, GatedDLatch, SrLatch};
pub use register::NBitRegister;
