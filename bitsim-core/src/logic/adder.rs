//! Binary adders.
//!
//! The half adder is two gates. The full adder counts its high inputs. The
//! ripple-carry adder chains full adders from the least-significant stage up,
//! each stage reading the previous stage's carry-out memo.

use crate::bits::{Bits, Resize};
use crate::logic::gate::Gate;
use crate::reactive::{Memo, Slot, Wire};

/// `sum = a XOR b`, `carry = a AND b`.
#[derive(Debug, Clone)]
pub struct HalfAdder {
    sum: Gate,
    carry: Gate,
}

impl HalfAdder {
    pub fn new(a: impl Into<Wire<bool>>, b: impl Into<Wire<bool>>) -> Self {
        let (a, b) = (a.into(), b.into());
        Self {
            sum: Gate::xor(&a, &b),
            carry: Gate::and(a, b),
        }
    }

    pub fn sum(&self) -> Wire<bool> {
        Wire::from(&self.sum)
    }

    pub fn carry(&self) -> Wire<bool> {
        Wire::from(&self.carry)
    }
}

/// One bit of addition with carry.
#[derive(Debug, Clone)]
pub struct FullAdder {
    sum: Memo<bool>,
    carry_out: Memo<bool>,
}

impl FullAdder {
    pub fn new(
        a: impl Into<Wire<bool>>,
        b: impl Into<Wire<bool>>,
        carry_in: impl Into<Wire<bool>>,
    ) -> Self {
        let (a, b, carry_in) = (a.into(), b.into(), carry_in.into());
        let high_inputs = Memo::new(move || {
            Ok([a.get()?, b.get()?, carry_in.get()?]
                .into_iter()
                .filter(|bit| *bit)
                .count())
        });
        let sum = {
            let n = high_inputs.clone();
            Memo::new(move || Ok(n.get()? % 2 == 1))
        };
        let carry_out = Memo::new(move || Ok(high_inputs.get()? >= 2));
        Self { sum, carry_out }
    }

    pub fn sum(&self) -> Wire<bool> {
        Wire::from(&self.sum)
    }

    pub fn carry_out(&self) -> Wire<bool> {
        Wire::from(&self.carry_out)
    }
}

/// `width` full adders with the carry rippling upward.
#[derive(Debug, Clone)]
pub struct RippleCarryAdder {
    width: usize,
    a: Slot<Bits>,
    b: Slot<Bits>,
    carry_in: Slot<bool>,
    sum: Memo<Bits>,
    overflow: Wire<bool>,
}

fn operand_bit(operand: &Slot<Bits>, width: usize, index: usize) -> Memo<bool> {
    let operand = operand.clone();
    Memo::new(move || Ok(operand.get()?.resize(width, Resize::RightAligned).bit(index)))
}

impl RippleCarryAdder {
    pub fn new(width: usize) -> Self {
        let a = Slot::new(Bits::zeros(width));
        let b = Slot::new(Bits::zeros(width));
        let carry_in = Slot::new(false);

        // Stage 0 is the least-significant bit, which is index `width - 1`
        // counting from the most-significant end.
        let mut stages: Vec<FullAdder> = Vec::with_capacity(width);
        for stage in 0..width {
            let index = width - 1 - stage;
            let carry = match stages.last() {
                Some(previous) => previous.carry_out(),
                None => Wire::from(&carry_in),
            };
            stages.push(FullAdder::new(
                operand_bit(&a, width, index),
                operand_bit(&b, width, index),
                carry,
            ));
        }

        let overflow = stages
            .last()
            .map(FullAdder::carry_out)
            .unwrap_or(Wire::Fixed(false));
        let sum = {
            let sums: Vec<Wire<bool>> = stages.iter().rev().map(FullAdder::sum).collect();
            Memo::new(move || {
                let bits = sums.iter().map(Wire::get).collect::<crate::Result<Vec<_>>>()?;
                Ok(Bits::from_bools(bits))
            })
        };

        Self {
            width,
            a,
            b,
            carry_in,
            sum,
            overflow,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn a(&self) -> &Slot<Bits> {
        &self.a
    }

    pub fn b(&self) -> &Slot<Bits> {
        &self.b
    }

    pub fn carry_in(&self) -> &Slot<bool> {
        &self.carry_in
    }

    /// Sum of `a + b + carry_in`, truncated to the adder width.
    pub fn sum(&self) -> Wire<Bits> {
        Wire::from(&self.sum)
    }

    /// Carry-out of the most-significant stage.
    pub fn overflow(&self) -> Wire<bool> {
        self.overflow.clone()
    }
}
