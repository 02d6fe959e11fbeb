//! Gate-level circuits assembled from the logic components.

pub mod counter;
pub mod latch_register;

pub use counter::AsyncCounter;
pub use latch_register::LatchRegister;
