//! Errors reported while building a predictor.

use thiserror::Error;

/// Reasons a [crate::BTBConfig] cannot be turned into a predictor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("invalid initial FSM state {0} (expected 0..=3)")]
    InvalidInitialState(u32),

    #[error("invalid sharing mode {0} (expected 0..=2)")]
    InvalidSharingMode(u32),

    #[error("BTB size {0} is not a non-zero power of two")]
    InvalidSize(usize),

    #[error("{tag_bits} tag bits and {index_bits} index bits do not fit in an address")]
    TagOverflow { tag_bits: u32, index_bits: u32 },

    #[error("history length {0} does not fit in an address")]
    InvalidHistory(u32),

    #[error("failed to allocate {0}")]
    Allocation(&'static str),
}
