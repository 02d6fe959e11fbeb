//! Memo Implementation
//!
//! A Memo is a cached derived value: a pure formula over other cells that
//! re-evaluates only when something it read has changed.
//!
//! # How Memos Work
//!
//! 1. On first access, the memo runs its formula inside a reactive context
//!    and caches the result.
//!
//! 2. The reads collected during the run replace the memo's edges in the
//!    dependency graph.
//!
//! 3. When any transitively-read source changes, the runtime marks the memo
//!    dirty.
//!
//! 4. The next access recomputes. Accesses in between return the cache
//!    without calling the formula.
//!
//! # Why This Matters
//!
//! A bus line, a decoder output and an adder stage may all sit downstream of
//! the same control signal, but only the cells that are actually read pay
//! for recomputation.
//!
//! # Failure
//!
//! Formulas return [`Result`]. A memo whose formula (directly or through
//! other memos) reads the memo itself fails with
//! [`Error::CyclicDependency`] instead of recursing. A failed run leaves the
//! memo dirty.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::context::ReactiveContext;
use super::runtime::{NodeHandle, Reactive, Runtime};
use crate::error::{Error, Result};
use crate::graph::NodeId;

/// Dirty state for a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// The cached value is up-to-date.
    Clean,

    /// The memo needs to recompute before its value can be trusted.
    Dirty,
}

type Formula<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// Shared state behind every clone of a memo.
struct MemoCell<T> {
    id: NodeId,
    compute: Formula<T>,
    value: RwLock<Option<T>>,
    state: RwLock<MemoState>,
    runs: AtomicU64,
}

impl<T> Reactive for MemoCell<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn mark_dirty(&self) {
        *self.state.write() = MemoState::Dirty;
    }
}

/// A cached derived value that recomputes only when dependencies change.
pub struct Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    cell: Arc<MemoCell<T>>,
    handle: Arc<NodeHandle>,
}

impl<T> Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Create a new memo with the given formula.
    ///
    /// The formula is not run immediately. It runs on first access.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        let cell = Arc::new(MemoCell {
            id: NodeId::new(),
            compute: Box::new(compute),
            value: RwLock::new(None),
            state: RwLock::new(MemoState::Dirty),
            runs: AtomicU64::new(0),
        });
        let handle = Arc::new(Runtime::register(cell.clone()));
        Self { cell, handle }
    }

    /// Get the memo's graph node.
    pub fn id(&self) -> NodeId {
        self.handle.node_id()
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> Result<T> {
        let id = self.id();
        if ReactiveContext::contains(id) {
            return Err(Error::CyclicDependency { node: id });
        }
        ReactiveContext::track_dependency(id);

        if *self.cell.state.read() == MemoState::Clean {
            if let Some(value) = self.cell.value.read().as_ref() {
                return Ok(value.clone());
            }
        }

        self.recompute()
    }

    /// Mark the memo as needing recomputation.
    pub fn mark_dirty(&self) {
        self.cell.mark_dirty();
    }

    fn recompute(&self) -> Result<T> {
        let id = self.id();

        // Invalidations that land while the formula runs flip this back.
        *self.cell.state.write() = MemoState::Clean;

        let (result, dependencies) = {
            let _ctx = ReactiveContext::enter(id);
            let result = (self.cell.compute)();
            (result, ReactiveContext::get_dependencies())
        };
        Runtime::replace_dependencies(id, dependencies);
        self.cell.runs.fetch_add(1, Ordering::Relaxed);

        match result {
            Ok(value) => {
                trace!(node = %id, "memo recomputed");
                *self.cell.value.write() = Some(value.clone());
                Ok(value)
            }
            Err(err) => {
                self.cell.mark_dirty();
                Err(err)
            }
        }
    }

    /// Get the current dirty state.
    pub fn state(&self) -> MemoState {
        *self.cell.state.read()
    }

    /// Check if the memo has a cached value.
    pub fn has_value(&self) -> bool {
        self.cell.value.read().is_some()
    }

    /// Number of times the formula has run.
    pub fn runs(&self) -> u64 {
        self.cell.runs.load(Ordering::Relaxed)
    }

    /// Cells this memo read during its last run.
    pub fn dependencies(&self) -> Vec<NodeId> {
        Runtime::dependencies_of(self.id())
    }
}

impl<T> Clone for Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + Send + Sync + PartialEq + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("value", &*self.cell.value.read())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;
    use std::sync::atomic::AtomicI32;
    use std::sync::OnceLock;

    #[test]
    fn memo_computes_on_first_access() {
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let memo = Memo::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        });

        assert!(!memo.has_value());
        assert_eq!(call_count.load(Ordering::SeqCst), 0);

        assert_eq!(memo.get().unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(memo.has_value());
    }

    #[test]
    fn memo_caches_value_when_clean() {
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let memo = Memo::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        });

        assert_eq!(memo.get().unwrap(), 42);
        assert_eq!(memo.get().unwrap(), 42);
        assert_eq!(memo.get().unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert_eq!(memo.runs(), 1);
    }

    #[test]
    fn memo_recomputes_after_signal_change() {
        let signal = Signal::new(3);
        let call_count = Arc::new(AtomicI32::new(0));

        let memo = {
            let signal = signal.clone();
            let call_count = call_count.clone();
            Memo::new(move || {
                call_count.fetch_add(1, Ordering::SeqCst);
                Ok(signal.get() * 2)
            })
        };

        assert_eq!(memo.get().unwrap(), 6);
        assert_eq!(memo.dependencies(), vec![signal.id()]);

        signal.set(5);
        assert_eq!(memo.state(), MemoState::Dirty);
        assert_eq!(memo.get().unwrap(), 10);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);

        // Writing the same value is not a change.
        signal.set(5);
        assert_eq!(memo.state(), MemoState::Clean);
        assert_eq!(memo.get().unwrap(), 10);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn memo_clone_shares_state() {
        let memo1 = Memo::new(|| Ok(42));
        assert_eq!(memo1.get().unwrap(), 42);

        let memo2 = memo1.clone();

        assert_eq!(memo1.id(), memo2.id());
        assert!(memo2.has_value());
        assert_eq!(memo2.get().unwrap(), 42);

        memo1.mark_dirty();
        assert_eq!(memo2.state(), MemoState::Dirty);
    }

    #[test]
    fn memo_dependencies_follow_the_branch_taken() {
        let select = Signal::new(true);
        let left = Signal::new(1);
        let right = Signal::new(2);

        let memo = {
            let (select, left, right) = (select.clone(), left.clone(), right.clone());
            Memo::new(move || Ok(if select.get() { left.get() } else { right.get() }))
        };

        assert_eq!(memo.get().unwrap(), 1);
        assert_eq!(memo.dependencies(), vec![select.id(), left.id()]);

        select.set(false);
        assert_eq!(memo.get().unwrap(), 2);
        assert_eq!(memo.dependencies(), vec![select.id(), right.id()]);

        // The old branch no longer invalidates the memo.
        left.set(10);
        assert_eq!(memo.state(), MemoState::Clean);
    }

    #[test]
    fn self_reading_memo_reports_a_cycle() {
        let slot: Arc<OnceLock<Memo<i32>>> = Arc::new(OnceLock::new());
        let memo = {
            let slot = slot.clone();
            Memo::new(move || match slot.get() {
                Some(me) => Ok(me.get()? + 1),
                None => Ok(0),
            })
        };
        let _ = slot.set(memo.clone());

        match memo.get() {
            Err(Error::CyclicDependency { node }) => assert_eq!(node, memo.id()),
            other => panic!("expected a cycle, got {other:?}"),
        }
        assert_eq!(memo.state(), MemoState::Dirty);
    }
}
