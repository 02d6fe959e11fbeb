//! Reactive Context
//!
//! The reactive context tracks which derived cell is currently computing.
//! This enables automatic dependency tracking: when a signal, slot or memo is
//! read, the read is recorded against the innermost computing cell.
//!
//! # Implementation
//!
//! We use a thread-local stack to track the currently executing computation.
//! When a memo starts recomputing, it pushes its node ID onto the stack; the
//! guard pops it again when the computation completes.
//!
//! The stack doubles as the cycle detector: a memo that finds its own ID
//! already on the stack has been re-entered by its own formula.

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::graph::NodeId;

/// Reads collected by one computation. Most gates read two or three cells.
pub type Dependencies = SmallVec<[NodeId; 8]>;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

/// An entry in the reactive context stack.
#[derive(Debug, Clone)]
struct ContextEntry {
    node_id: NodeId,
    dependencies: Dependencies,
}

/// Guard that pops the context when dropped.
///
/// This keeps the stack balanced even if the computation panics.
pub struct ReactiveContext {
    node_id: NodeId,
}

impl ReactiveContext {
    /// Enter a new reactive context for the given node.
    ///
    /// While this context is active, every tracked read is recorded as a
    /// dependency of `node_id`.
    pub fn enter(node_id: NodeId) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(ContextEntry {
                node_id,
                dependencies: Dependencies::new(),
            });
        });

        Self { node_id }
    }

    /// Check if there is an active reactive context.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// Get the node currently computing, if any.
    pub fn current() -> Option<NodeId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map(|entry| entry.node_id))
    }

    /// Check whether `node_id` is anywhere on the stack.
    pub fn contains(node_id: NodeId) -> bool {
        CONTEXT_STACK.with(|stack| stack.borrow().iter().any(|entry| entry.node_id == node_id))
    }

    /// Record a read of `node_id` by the innermost computation.
    ///
    /// Duplicate reads are collapsed. Outside any context this does nothing.
    pub fn track_dependency(node_id: NodeId) {
        CONTEXT_STACK.with(|stack| {
            if let Some(entry) = stack.borrow_mut().last_mut() {
                if !entry.dependencies.contains(&node_id) {
                    entry.dependencies.push(node_id);
                }
            }
        });
    }

    /// Get the dependencies collected in the current context.
    pub fn get_dependencies() -> Dependencies {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|entry| entry.dependencies.clone())
                .unwrap_or_default()
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.node_id, self.node_id,
                    "ReactiveContext mismatch: expected {}, got {}",
                    self.node_id, entry.node_id
                );
            }
        });
    }
}
