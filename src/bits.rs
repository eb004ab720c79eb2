//! Helpers for decoding branch addresses into table fields.
//!
//! Bit positions handed to [extract_field] are 1-based: a field starting at
//! bit 3 begins with the third least-significant bit of the address.

use bitvec::prelude::*;

/// Width of an address [in bits].
pub const ADDR_BITS: u32 = u32::BITS;

/// Low address bits which never carry information (4-byte alignment).
pub const ALIGN_BITS: u32 = 2;

/// Size of an instruction [in bytes].
pub const INSTRUCTION_BYTES: u32 = 1 << ALIGN_BITS;

/// First informative address bit.
pub const FIELD_BASE: u32 = ALIGN_BITS + 1;

/// Share bits taken from just above the alignment bits.
pub const SHARE_LOW_BIT: u32 = FIELD_BASE;

/// Share bits taken from the middle of the address.
pub const SHARE_MID_BIT: u32 = ADDR_BITS / 2 + 1;

/// Storage allowance for a cached target: the alignment bits are implied.
pub const TARGET_BITS: u32 = ADDR_BITS - ALIGN_BITS;

/// Return the `width`-bit field of `value` starting at bit `start_bit`.
///
/// A zero-width field is always zero.
pub fn extract_field(value: u32, width: u32, start_bit: u32) -> u32 {
    debug_assert!(start_bit >= 1, "bit positions are 1-based");
    debug_assert!(width + start_bit - 1 <= ADDR_BITS,
        "field [{}; {}] exceeds the address width", start_bit, width
    );
    if width == 0 {
        return 0;
    }
    let lo = (start_bit - 1) as usize;
    let hi = lo + width as usize;
    value.view_bits::<Lsb0>()[lo..hi].load_le::<u32>()
}

/// Address of the instruction following the one at `pc`.
pub fn fallthrough(pc: u32) -> u32 {
    pc.wrapping_add(INSTRUCTION_BYTES)
}

/// Returns 'true' if `pc` is aligned to an instruction boundary.
pub fn is_aligned(pc: u32) -> bool {
    pc & (INSTRUCTION_BYTES - 1) == 0
}

/// Describes how a branch address is split into an index and a tag.
///
/// ```text
///  31                                                  0
/// | ...unused... | tag | index | alignment (ALIGN_BITS) |
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    /// Number of index bits
    pub index_bits: u32,

    /// Number of tag bits
    pub tag_bits: u32,
}
impl AddressLayout {
    pub fn new(index_bits: u32, tag_bits: u32) -> Self {
        Self { index_bits, tag_bits }
    }

    /// Returns 'true' if the index and tag both fit inside an address.
    pub fn fits(&self) -> bool {
        self.tag_bits
            .checked_add(self.index_bits)
            .and_then(|x| x.checked_add(ALIGN_BITS))
            .map_or(false, |x| x <= ADDR_BITS)
    }

    pub fn index(&self, pc: u32) -> usize {
        extract_field(pc, self.index_bits, FIELD_BASE) as usize
    }

    pub fn tag(&self, pc: u32) -> u32 {
        extract_field(pc, self.tag_bits, self.index_bits + FIELD_BASE)
    }
}
