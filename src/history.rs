
use bitvec::prelude::*;
use crate::branch::Outcome;

/// A fixed-width register recording the most recent branch outcomes.
///
/// Bit 0 holds the newest outcome. When interpreted as an integer, the
/// register is always less than `2^len`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRegister {
    data: BitVec<u32, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format
// where the leftmost bit is the most-significant (index n) and the rightmost
// bit is the least-significant (index 0).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        assert!(len <= u32::BITS as usize);
        Self {
            data: bitvec![u32, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn data(&self) -> &BitSlice<u32, Lsb0> { &self.data }

    /// Return the contents of the register as an integer.
    pub fn value(&self) -> u32 {
        if self.len == 0 { 0 } else { self.data.load_le::<u32>() }
    }

    /// Clear all bits in the register.
    pub fn reset(&mut self) {
        self.data.fill(false);
    }

    /// Shift the register by one bit and record the newest outcome in the
    /// bottom bit. The oldest outcome is discarded.
    pub fn push(&mut self, outcome: Outcome) {
        if self.len == 0 {
            return;
        }
        self.data.shift_right(1);
        self.data.set(0, outcome.into());
    }
}
