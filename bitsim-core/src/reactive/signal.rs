//! Signal Implementation
//!
//! A Signal is a state cell: it holds a value that is written explicitly and
//! read by derived cells.
//!
//! # How Signals Work
//!
//! 1. When a signal is read while a memo is computing, the read is recorded
//!    as a dependency of that memo.
//!
//! 2. When a signal's value changes, the runtime marks every transitively
//!    dependent memo dirty.
//!
//! 3. Dirty memos recompute on their next read.
//!
//! Writing a value equal to the current one is not a change and notifies
//! nobody.
//!
//! # Thread Safety
//!
//! The value is protected by a `parking_lot::RwLock`; clones share both the
//! value and the graph node.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::runtime::{NodeHandle, Runtime};
use crate::graph::NodeId;

/// A reactive state cell holding a value of type `T`.
///
/// # Example
///
/// ```rust
/// use bitsim_core::reactive::Signal;
///
/// let count = Signal::new(0);
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    value: Arc<RwLock<T>>,
    handle: Arc<NodeHandle>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
            handle: Arc::new(Runtime::register_source()),
        }
    }

    /// Get the signal's graph node.
    pub fn id(&self) -> NodeId {
        self.handle.node_id()
    }

    /// Get the current value, recording the read if a memo is computing.
    pub fn get(&self) -> T {
        ReactiveContext::track_dependency(self.id());
        self.value.read().clone()
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.value.read().clone()
    }

    /// Set a new value and invalidate dependents.
    ///
    /// Returns `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut guard = self.value.write();
            if *guard == value {
                return false;
            }
            *guard = value;
        }

        Runtime::notify_change(self.id());
        true
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = {
            let guard = self.value.read();
            f(&guard)
        };
        self.set(new_value)
    }

    /// Number of cells currently reading this signal.
    pub fn dependent_count(&self) -> usize {
        Runtime::dependents_of(self.id()).len()
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + PartialEq + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id())
            .field("value", &self.get_untracked())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
