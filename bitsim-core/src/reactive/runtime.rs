//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects signals, slots and
//! memos. It owns the dependency graph and invalidates derived cells when a
//! source changes.
//!
//! # How It Works
//!
//! 1. Every signal and slot registers a source node; every memo registers a
//!    derived node plus a weak reference to itself.
//!
//! 2. After a memo recomputes, the runtime replaces its edges with the reads
//!    collected by the reactive context.
//!
//! 3. When a source changes, the runtime:
//!    a. Finds every transitively dependent node in the graph
//!    b. Marks each live memo dirty
//!    c. Leaves recomputation to the next `get()`
//!
//! # Thread Safety
//!
//! The graph sits behind a `parking_lot::RwLock` and the memo registry is a
//! `DashMap`, so handles can move between threads. Locks are never held while
//! user formulas run or while handles are dropped.

use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::trace;

use crate::graph::{DependencyGraph, Node, NodeId, NodeKind};

/// A derived cell that can be invalidated by the runtime.
pub trait Reactive: Send + Sync {
    /// Get the graph node for this cell.
    fn node_id(&self) -> NodeId;

    /// Mark the cached value stale.
    fn mark_dirty(&self);
}

/// Handle to a registered node.
///
/// Dropping this handle removes the node, its edges, and its registry entry.
#[derive(Debug)]
pub struct NodeHandle {
    node_id: NodeId,
}

impl NodeHandle {
    /// The node this handle keeps alive.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }
}

impl Drop for NodeHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.node_id);
    }
}

/// The global reactive runtime.
pub struct Runtime;

static GRAPH: OnceLock<RwLock<DependencyGraph>> = OnceLock::new();
static REGISTRY: OnceLock<DashMap<NodeId, Weak<dyn Reactive>>> = OnceLock::new();

fn graph() -> &'static RwLock<DependencyGraph> {
    GRAPH.get_or_init(|| RwLock::new(DependencyGraph::new()))
}

fn registry() -> &'static DashMap<NodeId, Weak<dyn Reactive>> {
    REGISTRY.get_or_init(DashMap::new)
}

impl Runtime {
    /// Register a new source node (signal or slot).
    pub fn register_source() -> NodeHandle {
        let node_id = graph().write().add_node(Node::source());
        NodeHandle { node_id }
    }

    /// Register a derived cell.
    ///
    /// Returns a handle that unregisters the cell when dropped.
    pub fn register(reactive: Arc<dyn Reactive>) -> NodeHandle {
        let node_id = reactive.node_id();
        graph()
            .write()
            .add_node(Node::with_id(node_id, NodeKind::Derived));
        registry().insert(node_id, Arc::downgrade(&reactive));
        NodeHandle { node_id }
    }

    fn unregister(node_id: NodeId) {
        graph().write().remove_node(node_id);
        registry().remove(&node_id);
    }

    /// Replace the recorded dependencies of a derived cell.
    pub fn replace_dependencies<I>(node_id: NodeId, dependencies: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        graph().write().replace_dependencies(node_id, dependencies);
    }

    /// Invalidate everything downstream of `node_id`.
    ///
    /// Returns the number of live cells that were marked dirty.
    pub fn notify_change(node_id: NodeId) -> usize {
        let affected = graph().read().mark_changed(node_id);
        if affected.is_empty() {
            return 0;
        }

        let live: Vec<Arc<dyn Reactive>> = affected
            .iter()
            .filter_map(|id| registry().get(id).and_then(|weak| weak.upgrade()))
            .collect();

        for reactive in &live {
            reactive.mark_dirty();
        }
        trace!(source = %node_id, invalidated = live.len(), "change propagated");
        live.len()
    }

    /// Nodes that `node_id` currently reads.
    pub fn dependencies_of(node_id: NodeId) -> Vec<NodeId> {
        graph()
            .read()
            .node(node_id)
            .map(|node| node.dependencies().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Nodes that currently read `node_id`.
    pub fn dependents_of(node_id: NodeId) -> Vec<NodeId> {
        graph()
            .read()
            .node(node_id)
            .map(|node| node.dependents().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Check whether a node is still registered.
    pub fn is_registered(node_id: NodeId) -> bool {
        graph().read().contains(node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    struct MockReactive {
        id: NodeId,
        dirtied: AtomicI32,
    }

    impl MockReactive {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                id: NodeId::new(),
                dirtied: AtomicI32::new(0),
            })
        }
    }

    impl Reactive for MockReactive {
        fn node_id(&self) -> NodeId {
            self.id
        }

        fn mark_dirty(&self) {
            self.dirtied.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn runtime_registers_and_unregisters() {
        let reactive = MockReactive::new();
        let id = reactive.id;

        let handle = Runtime::register(reactive);
        assert!(Runtime::is_registered(id));
        assert!(registry().contains_key(&id));

        drop(handle);

        assert!(!Runtime::is_registered(id));
        assert!(!registry().contains_key(&id));
    }

    #[test]
    fn runtime_notifies_transitive_dependents() {
        let source = Runtime::register_source();
        let first = MockReactive::new();
        let second = MockReactive::new();

        let _first_handle = Runtime::register(first.clone());
        let _second_handle = Runtime::register(second.clone());

        Runtime::replace_dependencies(first.id, [source.node_id()]);
        Runtime::replace_dependencies(second.id, [first.id]);

        assert_eq!(Runtime::notify_change(source.node_id()), 2);
        assert_eq!(first.dirtied.load(Ordering::SeqCst), 1);
        assert_eq!(second.dirtied.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn runtime_replaces_dependencies() {
        let source = Runtime::register_source();
        let reactive = MockReactive::new();
        let _handle = Runtime::register(reactive.clone());

        Runtime::replace_dependencies(reactive.id, [source.node_id()]);
        assert_eq!(Runtime::dependents_of(source.node_id()), vec![reactive.id]);

        Runtime::replace_dependencies(reactive.id, []);
        assert!(Runtime::dependents_of(source.node_id()).is_empty());
        assert_eq!(Runtime::notify_change(source.node_id()), 0);
        assert_eq!(reactive.dirtied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropped_source_takes_its_edges() {
        let source = Runtime::register_source();
        let reactive = MockReactive::new();
        let _handle = Runtime::register(reactive.clone());
        let source_id = source.node_id();

        Runtime::replace_dependencies(reactive.id, [source_id]);
        drop(source);

        assert!(Runtime::dependencies_of(reactive.id).is_empty());
    }
}
