//! Dependency Graph
//!
//! This module implements the dependency graph that tracks relationships
//! between state signals, input slots, and the derived cells computed from
//! them.
//!
//! # Overview
//!
//! The dependency graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes represent sources (signals, slots) or derived cells (memos)
//! - Edges represent reads: if A reads B, there is an edge from B to A
//!
//! When a source changes, we walk the graph to find every transitively
//! affected derived cell so it can be invalidated. Recomputation itself is
//! lazy and happens on the next read.
//!
//! # Design Decisions
//!
//! 1. The graph is centralized rather than stored inside each cell, which
//!    keeps topological ordering in one place.
//!
//! 2. Nodes are indexed by ID for O(1) lookups.
//!
//! 3. Both forward (dependencies) and reverse (dependents) edges are kept so
//!    edges can be replaced wholesale after every recomputation.

mod dependency;
mod node;

pub use dependency::DependencyGraph;
pub use node::{Node, NodeId, NodeKind};
