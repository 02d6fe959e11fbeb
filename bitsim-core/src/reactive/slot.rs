//! Slot Implementation
//!
//! A Slot is a component input that can be wired after the component exists.
//! Circuits with feedback (a latch enabled by another latch's output, a
//! register fed by a bus it also drives) are built in two phases: construct
//! every component with unconnected slots, then connect the slots.
//!
//! An unconnected slot reads its fallback value. Connecting or disconnecting
//! a slot is a change like any signal write: every cell downstream of the
//! slot is invalidated.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::runtime::{NodeHandle, Runtime};
use super::wire::Wire;
use crate::error::Result;
use crate::graph::NodeId;

/// A re-wirable input socket.
pub struct Slot<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fallback: T,
    source: Arc<RwLock<Option<Wire<T>>>>,
    handle: Arc<NodeHandle>,
}

impl<T> Slot<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Create an unconnected slot reading `fallback`.
    pub fn new(fallback: T) -> Self {
        Self {
            fallback,
            source: Arc::new(RwLock::new(None)),
            handle: Arc::new(Runtime::register_source()),
        }
    }

    /// Get the slot's graph node.
    pub fn id(&self) -> NodeId {
        self.handle.node_id()
    }

    /// Read through the connection, or the fallback if unconnected.
    pub fn get(&self) -> Result<T> {
        ReactiveContext::track_dependency(self.id());
        let source = self.source.read().clone();
        match source {
            Some(wire) => wire.get(),
            None => Ok(self.fallback.clone()),
        }
    }

    /// Wire this slot to `source`, replacing any previous connection.
    pub fn connect(&self, source: impl Into<Wire<T>>) {
        *self.source.write() = Some(source.into());
        Runtime::notify_change(self.id());
    }

    /// Remove the connection; the slot reads its fallback again.
    pub fn disconnect(&self) {
        let previous = self.source.write().take();
        if previous.is_some() {
            Runtime::notify_change(self.id());
        }
    }

    /// Check whether the slot has been wired.
    pub fn is_connected(&self) -> bool {
        self.source.read().is_some()
    }
}

impl<T> Clone for Slot<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn clone(&self) -> Self {
        Self {
            fallback: self.fallback.clone(),
            source: Arc::clone(&self.source),
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<T> Debug for Slot<T>
where
    T: Clone + Send + Sync + PartialEq + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("id", &self.id())
            .field("fallback", &self.fallback)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{Memo, MemoState, Signal};

    #[test]
    fn unconnected_slot_reads_fallback() {
        let slot = Slot::new(7);
        assert!(!slot.is_connected());
        assert_eq!(slot.get().unwrap(), 7);
    }

    #[test]
    fn connecting_invalidates_readers() {
        let slot = Slot::new(0);
        let memo = {
            let slot = slot.clone();
            Memo::new(move || Ok(slot.get()? + 1))
        };
        assert_eq!(memo.get().unwrap(), 1);

        let signal = Signal::new(10);
        slot.connect(&signal);
        assert_eq!(memo.state(), MemoState::Dirty);
        assert_eq!(memo.get().unwrap(), 11);

        // Reads through the slot track the source as well.
        signal.set(20);
        assert_eq!(memo.get().unwrap(), 21);

        slot.disconnect();
        assert_eq!(memo.get().unwrap(), 1);
    }

    #[test]
    fn slots_allow_wiring_after_construction() {
        let first = Slot::new(false);
        let second = Slot::new(false);
        let inverted = {
            let first = first.clone();
            Memo::new(move || Ok(!first.get()?))
        };

        second.connect(&inverted);
        assert!(second.get().unwrap());

        let level = Signal::new(true);
        first.connect(&level);
        assert!(!second.get().unwrap());
    }
}
