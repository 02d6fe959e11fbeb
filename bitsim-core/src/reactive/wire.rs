//! Read-only signal handles.
//!
//! A [`Wire`] is what components accept as inputs and hand out as outputs:
//! anything that can be read, without the ability to write it. Reading a
//! wire inside a memo records the same dependencies as reading the
//! underlying cell directly.

use std::fmt::Debug;

use super::memo::Memo;
use super::signal::Signal;
use super::slot::Slot;
use crate::bits::Bits;
use crate::error::Result;

/// Read-only view over a constant, a state signal, a memo, or a slot.
pub enum Wire<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// A constant level.
    Fixed(T),
    /// A state cell.
    Signal(Signal<T>),
    /// A derived cell.
    Memo(Memo<T>),
    /// A re-wirable input.
    Slot(Slot<T>),
}

impl<T> Wire<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Read the current value.
    pub fn get(&self) -> Result<T> {
        match self {
            Wire::Fixed(value) => Ok(value.clone()),
            Wire::Signal(signal) => Ok(signal.get()),
            Wire::Memo(memo) => memo.get(),
            Wire::Slot(slot) => slot.get(),
        }
    }
}

impl<T> Clone for Wire<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn clone(&self) -> Self {
        match self {
            Wire::Fixed(value) => Wire::Fixed(value.clone()),
            Wire::Signal(signal) => Wire::Signal(signal.clone()),
            Wire::Memo(memo) => Wire::Memo(memo.clone()),
            Wire::Slot(slot) => Wire::Slot(slot.clone()),
        }
    }
}

impl<T> Debug for Wire<T>
where
    T: Clone + Send + Sync + PartialEq + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Wire::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Wire::Signal(signal) => f.debug_tuple("Signal").field(&signal.id()).finish(),
            Wire::Memo(memo) => f.debug_tuple("Memo").field(&memo.id()).finish(),
            Wire::Slot(slot) => f.debug_tuple("Slot").field(&slot.id()).finish(),
        }
    }
}

macro_rules! wire_from_cell {
    ($cell:ident) => {
        impl<T> From<$cell<T>> for Wire<T>
        where
            T: Clone + Send + Sync + PartialEq + 'static,
        {
            fn from(cell: $cell<T>) -> Self {
                Wire::$cell(cell)
            }
        }

        impl<T> From<&$cell<T>> for Wire<T>
        where
            T: Clone + Send + Sync + PartialEq + 'static,
        {
            fn from(cell: &$cell<T>) -> Self {
                Wire::$cell(cell.clone())
            }
        }
    };
}

wire_from_cell!(Signal);
wire_from_cell!(Memo);
wire_from_cell!(Slot);

impl<T> From<&Wire<T>> for Wire<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn from(wire: &Wire<T>) -> Self {
        wire.clone()
    }
}

impl From<bool> for Wire<bool> {
    fn from(level: bool) -> Self {
        Wire::Fixed(level)
    }
}

impl From<Bits> for Wire<Bits> {
    fn from(bits: Bits) -> Self {
        Wire::Fixed(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_reads_every_kind_of_cell() {
        let signal = Signal::new(true);
        let memo = {
            let signal = signal.clone();
            Memo::new(move || Ok(!signal.get()))
        };
        let slot = Slot::new(false);
        slot.connect(&signal);

        assert!(Wire::from(true).get().unwrap());
        assert!(Wire::from(&signal).get().unwrap());
        assert!(!Wire::from(&memo).get().unwrap());
        assert!(Wire::from(&slot).get().unwrap());
    }

    #[test]
    fn wire_over_signal_follows_writes() {
        let signal = Signal::new(Bits::zeros(4));
        let wire = Wire::from(&signal);

        signal.set(Bits::new(4, 9));
        assert_eq!(wire.get().unwrap().to_string(), "1001");
    }
}
