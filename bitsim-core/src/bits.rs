//! Fixed-Width Bit Vectors
//!
//! Every bus, register and decoder in the simulator carries a [`Bits`] value:
//! an unsigned integer paired with an explicit width. Bits are ordered
//! most-significant first, both when rendered as text and when indexed with
//! [`Bits::bit`], so `"1000"` has bit 0 set.
//!
//! Narrowing and widening go through [`Bits::resize`] with an explicit
//! [`Resize`] policy instead of ad hoc slicing.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// How [`Bits::resize`] aligns the old value inside the new width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// Keep the least-significant bits when narrowing, zero-fill on the left
    /// when widening. `"101101"` resized to 4 is `"1101"`; `"10"` is `"0010"`.
    RightAligned,

    /// Keep the most-significant bits when narrowing, zero-fill on the right
    /// when widening. `"10110000"` resized to 4 is `"1011"`.
    LeftAligned,
}

/// A bit vector of 0 to 64 bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bits {
    width: u8,
    value: u64,
}

fn mask(width: usize) -> u64 {
    if width >= Bits::MAX_WIDTH {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

impl Bits {
    /// Widest supported vector.
    pub const MAX_WIDTH: usize = 64;

    /// Create a vector of `width` bits holding the low bits of `value`.
    ///
    /// Widths above [`Bits::MAX_WIDTH`] are clamped.
    pub fn new(width: usize, value: u64) -> Self {
        debug_assert!(width <= Self::MAX_WIDTH, "bit width {width} too large");
        let width = width.min(Self::MAX_WIDTH);
        Self {
            width: width as u8,
            value: value & mask(width),
        }
    }

    /// Create a vector, rejecting widths above [`Bits::MAX_WIDTH`].
    pub fn try_new(width: usize, value: u64) -> Result<Self> {
        if width > Self::MAX_WIDTH {
            return Err(Error::WidthOutOfRange {
                width,
                max: Self::MAX_WIDTH,
            });
        }
        Ok(Self::new(width, value))
    }

    /// All-zero vector of the given width.
    pub fn zeros(width: usize) -> Self {
        Self::new(width, 0)
    }

    /// Build a vector from booleans, most-significant first.
    pub fn from_bools<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut width = 0;
        let mut value = 0u64;
        for bit in bits.into_iter().take(Self::MAX_WIDTH) {
            value = (value << 1) | u64::from(bit);
            width += 1;
        }
        Self::new(width, value)
    }

    /// Number of bits.
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    /// The unsigned integer value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// True for the zero-width vector.
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    /// Bit `index`, counting from the most-significant end.
    ///
    /// Out-of-range indices read as `false`.
    pub fn bit(&self, index: usize) -> bool {
        let width = self.width();
        if index >= width {
            return false;
        }
        (self.value >> (width - 1 - index)) & 1 == 1
    }

    /// Copy with bit `index` (from the most-significant end) replaced.
    pub fn with_bit(self, index: usize, on: bool) -> Self {
        let width = self.width();
        if index >= width {
            return self;
        }
        let flag = 1u64 << (width - 1 - index);
        let value = if on {
            self.value | flag
        } else {
            self.value & !flag
        };
        Self::new(width, value)
    }

    /// Iterate bits, most-significant first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.width()).map(move |i| self.bit(i))
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.value.count_ones()
    }

    /// Change the width according to `policy`.
    pub fn resize(self, width: usize, policy: Resize) -> Self {
        let width = width.min(Self::MAX_WIDTH);
        let current = self.width();
        match policy {
            Resize::RightAligned => Self::new(width, self.value),
            Resize::LeftAligned if width <= current => {
                let shift = (current - width) as u32;
                Self::new(width, self.value.checked_shr(shift).unwrap_or(0))
            }
            Resize::LeftAligned => {
                let shift = (width - current) as u32;
                Self::new(width, self.value.checked_shl(shift).unwrap_or(0))
            }
        }
    }

    /// Concatenate `self` (high part) with `low`.
    ///
    /// The result is truncated to the most-significant 64 bits if needed.
    pub fn concat(self, low: Bits) -> Self {
        let width = self.width() + low.width();
        if width > Self::MAX_WIDTH {
            let extra = width - Self::MAX_WIDTH;
            let shifted = low.value >> extra.min(63);
            let high = self.value << (low.width() - extra);
            return Self::new(Self::MAX_WIDTH, high | shifted);
        }
        let high = if low.width() >= Self::MAX_WIDTH {
            0
        } else {
            self.value << low.width()
        };
        Self::new(width, high | low.value)
    }

    /// Add `rhs`, discarding anything that does not fit the width.
    pub fn wrapping_add(self, rhs: u64) -> Self {
        Self::new(self.width(), self.value.wrapping_add(rhs))
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bits(\"{self}\")")
    }
}

impl FromStr for Bits {
    type Err = Error;

    /// Parse a string of `0`/`1` characters, most-significant first.
    fn from_str(s: &str) -> Result<Self> {
        if s.len() > Self::MAX_WIDTH {
            return Err(Error::WidthOutOfRange {
                width: s.len(),
                max: Self::MAX_WIDTH,
            });
        }
        let mut value = 0u64;
        for c in s.chars() {
            let bit = match c {
                '0' => 0,
                '1' => 1,
                _ => {
                    return Err(Error::InvalidBits {
                        input: s.to_string(),
                    })
                }
            };
            value = (value << 1) | bit;
        }
        Ok(Self::new(s.len(), value))
    }
}
