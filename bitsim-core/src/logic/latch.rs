//! Level-sensitive storage elements.
//!
//! Both latches keep their last committed bit in a state [`Signal`]. The `q`
//! output is a memo over that held bit and the current input levels, so it
//! follows set, reset and an enabled data input as soon as they change.
//! [`update`](SrLatch::update) commits `q` into the held bit; once the inputs
//! drop, the latch holds whatever was committed last.
//!
//! Inputs are [`Slot`]s so latches can be chained through each other's
//! outputs. Feedback from a latch into its own inputs must go through
//! [`held`](GatedDLatch::held), never `q`.

use tracing::trace;

use crate::error::Result;
use crate::reactive::{Memo, Signal, Slot, Wire};

/// Next state of an SR latch.
///
/// With both inputs high, `reset_dominated` picks the winner.
pub fn sr_transition(stored: bool, set: bool, reset: bool, reset_dominated: bool) -> bool {
    match (set, reset) {
        (true, true) => !reset_dominated,
        (true, false) => true,
        (false, true) => false,
        (false, false) => stored,
    }
}

/// Next state of a gated D latch. An enabled latch follows `data` and ignores
/// set/reset.
pub fn d_transition(
    stored: bool,
    data: bool,
    enable: bool,
    set: bool,
    reset: bool,
    reset_dominated: bool,
) -> bool {
    if enable {
        data
    } else {
        sr_transition(stored, set, reset, reset_dominated)
    }
}

fn inverted(q: &Memo<bool>) -> Memo<bool> {
    let q = q.clone();
    Memo::new(move || Ok(!q.get()?))
}

/// Set/reset latch.
#[derive(Debug, Clone)]
pub struct SrLatch {
    set: Slot<bool>,
    reset: Slot<bool>,
    reset_dominated: Slot<bool>,
    stored: Signal<bool>,
    q: Memo<bool>,
    not_q: Memo<bool>,
}

impl SrLatch {
    /// New latch holding `false`, with every input unconnected (low).
    pub fn new() -> Self {
        let set = Slot::new(false);
        let reset = Slot::new(false);
        let reset_dominated = Slot::new(false);
        let stored = Signal::new(false);
        let q = {
            let (set, reset, reset_dominated) = (set.clone(), reset.clone(), reset_dominated.clone());
            let stored = stored.clone();
            Memo::new(move || {
                Ok(sr_transition(
                    stored.get(),
                    set.get()?,
                    reset.get()?,
                    reset_dominated.get()?,
                ))
            })
        };
        Self {
            set,
            reset,
            reset_dominated,
            stored,
            not_q: inverted(&q),
            q,
        }
    }

    pub fn set(&self) -> &Slot<bool> {
        &self.set
    }

    pub fn reset(&self) -> &Slot<bool> {
        &self.reset
    }

    pub fn reset_dominated(&self) -> &Slot<bool> {
        &self.reset_dominated
    }

    /// Output for the current input levels.
    pub fn q(&self) -> Wire<bool> {
        Wire::from(&self.q)
    }

    pub fn not_q(&self) -> Wire<bool> {
        Wire::from(&self.not_q)
    }

    /// The bit committed by the last [`update`](Self::update).
    pub fn held(&self) -> Wire<bool> {
        Wire::from(&self.stored)
    }

    /// Held bit, without tracking.
    pub fn value(&self) -> bool {
        self.stored.get_untracked()
    }

    /// The transition rule applied to the held bit and the current inputs.
    pub fn next_state(&self) -> Result<bool> {
        self.q.get()
    }

    /// Commit the current output as the held bit.
    pub fn update(&self) -> Result<bool> {
        let next = self.next_state()?;
        if self.stored.set(next) {
            trace!(q = next, "sr latch changed");
        }
        Ok(next)
    }
}

impl Default for SrLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Gated D latch with asynchronous set/reset.
#[derive(Debug, Clone)]
pub struct GatedDLatch {
    data: Slot<bool>,
    enable: Slot<bool>,
    set: Slot<bool>,
    reset: Slot<bool>,
    reset_dominated: Slot<bool>,
    stored: Signal<bool>,
    q: Memo<bool>,
    not_q: Memo<bool>,
}

impl GatedDLatch {
    pub fn new() -> Self {
        let data = Slot::new(false);
        let enable = Slot::new(false);
        let set = Slot::new(false);
        let reset = Slot::new(false);
        let reset_dominated = Slot::new(false);
        let stored = Signal::new(false);
        let q = {
            let (data, enable) = (data.clone(), enable.clone());
            let (set, reset, reset_dominated) = (set.clone(), reset.clone(), reset_dominated.clone());
            let stored = stored.clone();
            Memo::new(move || {
                Ok(d_transition(
                    stored.get(),
                    data.get()?,
                    enable.get()?,
                    set.get()?,
                    reset.get()?,
                    reset_dominated.get()?,
                ))
            })
        };
        Self {
            data,
            enable,
            set,
            reset,
            reset_dominated,
            stored,
            not_q: inverted(&q),
            q,
        }
    }

    pub fn data(&self) -> &Slot<bool> {
        &self.data
    }

    pub fn enable(&self) -> &Slot<bool> {
        &self.enable
    }

    pub fn set(&self) -> &Slot<bool> {
        &self.set
    }

    pub fn reset(&self) -> &Slot<bool> {
        &self.reset
    }

    pub fn reset_dominated(&self) -> &Slot<bool> {
        &self.reset_dominated
    }

    pub fn q(&self) -> Wire<bool> {
        Wire::from(&self.q)
    }

    pub fn not_q(&self) -> Wire<bool> {
        Wire::from(&self.not_q)
    }

    /// The bit committed by the last [`update`](Self::update).
    pub fn held(&self) -> Wire<bool> {
        Wire::from(&self.stored)
    }

    pub fn value(&self) -> bool {
        self.stored.get_untracked()
    }

    pub fn next_state(&self) -> Result<bool> {
        self.q.get()
    }

    pub fn update(&self) -> Result<bool> {
        let next = self.next_state()?;
        if self.stored.set(next) {
            trace!(q = next, "d latch changed");
        }
        Ok(next)
    }
}

impl Default for GatedDLatch {
    fn default() -> Self {
        Self::new()
    }
}
