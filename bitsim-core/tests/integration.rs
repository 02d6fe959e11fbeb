//! Integration Tests for the Reactive Cells and Logic Components
//!
//! These tests verify that signals, memos and slots compose into circuits
//! that stay consistent as inputs change.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bitsim_core::graph::NodeId;
use bitsim_core::logic::{Bus, Decoder, Gate, NBitRegister, RippleCarryAdder};
use bitsim_core::reactive::{Memo, MemoState, ReactiveContext, Runtime, Signal, Slot};
use bitsim_core::{Bits, Error};

fn bits(s: &str) -> Bits {
    s.parse().unwrap()
}

/// A memo tracks the signals it reads and recomputes after they change.
#[test]
fn memo_tracks_signal_dependency() {
    let signal = Signal::new(10);

    let signal_clone = signal.clone();
    let memo = Memo::new(move || Ok(signal_clone.get() * 2));

    assert_eq!(memo.get().unwrap(), 20);
    assert_eq!(memo.dependencies(), vec![signal.id()]);

    signal.set(5);
    assert_eq!(memo.state(), MemoState::Dirty);
    assert_eq!(memo.get().unwrap(), 10);
}

/// Memos cache their value until a dependency changes.
#[test]
fn memo_caches_until_invalidated() {
    let count = Arc::new(AtomicU32::new(0));
    let signal = Signal::new(1);

    let memo = {
        let count = count.clone();
        let signal = signal.clone();
        Memo::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(signal.get() + 1)
        })
    };

    for _ in 0..4 {
        assert_eq!(memo.get().unwrap(), 2);
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // Setting the same value is not a change.
    signal.set(1);
    assert_eq!(memo.get().unwrap(), 2);
    assert_eq!(count.load(Ordering::SeqCst), 1);

    signal.set(7);
    assert_eq!(memo.get().unwrap(), 8);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

/// Invalidation reaches memos that only depend on a signal indirectly.
#[test]
fn memo_depends_on_memo() {
    let base = Signal::new(5);

    let doubled = {
        let base = base.clone();
        Memo::new(move || Ok(base.get() * 2))
    };
    let plus_ten = {
        let doubled = doubled.clone();
        Memo::new(move || Ok(doubled.get()? + 10))
    };

    assert_eq!(plus_ten.get().unwrap(), 20);

    base.set(10);
    assert_eq!(doubled.state(), MemoState::Dirty);
    assert_eq!(plus_ten.state(), MemoState::Dirty);
    assert_eq!(plus_ten.get().unwrap(), 30);
}

/// The context stack keeps reads of nested computations apart.
#[test]
fn nested_reactive_contexts() {
    let outer_id = NodeId::new();
    let inner_id = NodeId::new();
    let reads: Vec<NodeId> = (0..4).map(|_| NodeId::new()).collect();

    let _outer = ReactiveContext::enter(outer_id);
    ReactiveContext::track_dependency(reads[0]);
    ReactiveContext::track_dependency(reads[1]);

    {
        let _inner = ReactiveContext::enter(inner_id);
        ReactiveContext::track_dependency(reads[2]);
        ReactiveContext::track_dependency(reads[3]);
        ReactiveContext::track_dependency(reads[3]);

        let inner = ReactiveContext::get_dependencies();
        assert_eq!(inner.as_slice(), &reads[2..4]);
        assert!(ReactiveContext::contains(outer_id));
    }

    let outer = ReactiveContext::get_dependencies();
    assert_eq!(outer.as_slice(), &reads[0..2]);
    assert_eq!(ReactiveContext::current(), Some(outer_id));
}

/// Dropping the last handle to a memo removes it from the graph.
#[test]
fn dropped_memos_leave_the_graph() {
    let signal = Signal::new(3);
    let memo = {
        let signal = signal.clone();
        Memo::new(move || Ok(signal.get()))
    };
    memo.get().unwrap();
    let id = memo.id();
    assert!(Runtime::is_registered(id));
    assert_eq!(signal.dependent_count(), 1);

    drop(memo);
    assert!(!Runtime::is_registered(id));
    assert_eq!(signal.dependent_count(), 0);
    assert!(signal.set(4));
}

/// A slot can be wired after its reader exists, and rewired later.
#[test]
fn slots_allow_late_wiring() {
    let slot = Slot::new(0u8);
    let reader = {
        let slot = slot.clone();
        Memo::new(move || Ok(slot.get()? + 1))
    };
    assert_eq!(reader.get().unwrap(), 1);

    let first = Signal::new(10u8);
    slot.connect(&first);
    assert_eq!(reader.get().unwrap(), 11);

    first.set(20);
    assert_eq!(reader.get().unwrap(), 21);

    let second = Signal::new(40u8);
    slot.connect(&second);
    assert_eq!(reader.get().unwrap(), 41);

    // The old source no longer affects the reader.
    first.set(30);
    assert_eq!(reader.state(), MemoState::Clean);
    assert_eq!(reader.get().unwrap(), 41);
}

/// Two gates feeding each other form a loop that reports an error instead of
/// recursing forever.
#[test]
fn gate_loops_are_reported() {
    let a = Slot::new(false);
    let b = Slot::new(false);
    let first = Gate::nor(&a, false);
    let second = Gate::nor(&b, false);
    a.connect(&second);
    b.connect(&first);

    assert!(matches!(
        first.output().get(),
        Err(Error::CyclicDependency { .. })
    ));
}

/// Adder outputs flow through a register and onto a bus.
#[test]
fn adder_register_bus_pipeline() {
    let a = Signal::new(bits("00001111"));
    let b = Signal::new(bits("00000001"));
    let adder = RippleCarryAdder::new(8);
    adder.a().connect(&a);
    adder.b().connect(&b);

    let register = NBitRegister::new("SUM", 8);
    register.input().connect(adder.sum());
    register.load().connect(true);

    let enable = Signal::new(false);
    let bus = Bus::new(8);
    bus.attach("SUM", register.output(), &enable);

    register.update().unwrap();
    assert_eq!(bus.value().unwrap(), bits("00000000"));

    enable.set(true);
    assert_eq!(bus.value().unwrap(), bits("00010000"));

    a.set(bits("11111111"));
    assert!(adder.overflow().get().unwrap());
    // The register holds its value until it is updated again.
    assert_eq!(bus.value().unwrap(), bits("00010000"));
    register.update().unwrap();
    assert_eq!(bus.value().unwrap(), bits("00000000"));
}

/// A decoder follows the register it reads.
#[test]
fn decoder_follows_register() {
    let register = NBitRegister::new("STEP", 3);
    let decoder = Decoder::new(register.output(), 5);
    assert_eq!(decoder.selected().unwrap(), None);

    for step in 1..=5 {
        register.force(Bits::new(3, step));
        assert_eq!(decoder.selected().unwrap(), Some(step as usize - 1));
    }

    register.force(Bits::new(3, 7));
    assert_eq!(decoder.selected().unwrap(), None);
}
