//! Types for implementing a table of predictors.

use std::collections::HashMap;
use itertools::Itertools;

use crate::error::InitError;
use crate::predictor::counter::*;

/// Interface to a table of predictors.
pub trait PredictorTable {
    /// The type of an index into the table.
    type Index;

    /// The type of entry in the table.
    type Entry;

    /// Returns the number of entries in the table.
    fn size(&self) -> usize;

    /// Returns a reference to an entry in the table.
    fn get_entry(&self, idx: Self::Index) -> &Self::Entry;

    /// Returns a mutable reference to an entry in the table.
    fn get_entry_mut(&mut self, idx: Self::Index) -> &mut Self::Entry;

    /// Returns a bitmask corresponding to the number of entries in the table.
    fn index_mask(&self) -> usize {
        assert!(self.size().is_power_of_two());
        self.size() - 1
    }
}

/// Interface to a *tagged* table of predictors, indexed by program counter.
pub trait TaggedPredictorTable: PredictorTable {
    /// Given a program counter value, return the corresponding index.
    fn get_index(&self, pc: u32) -> Self::Index;

    /// Given a program counter value, return the corresponding tag.
    fn get_tag(&self, pc: u32) -> u32;
}

/// Allocate a vector of `len` copies of `value`, reporting allocation
/// failure instead of aborting.
pub(crate) fn try_alloc<T: Clone>(len: usize, value: T, what: &'static str)
    -> Result<Vec<T>, InitError>
{
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| InitError::Allocation(what))?;
    data.resize(len, value);
    Ok(data)
}

/// A table of [PredictionState] indexed by history (optionally mixed with
/// bits from the program counter).
///
/// The table always has exactly `2^history_bits` entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsmTable {
    data: Vec<PredictionState>,
}
impl FsmTable {
    /// Create a table for `history_bits` of history with every counter in
    /// the `init` state.
    pub fn new(history_bits: u32, init: PredictionState)
        -> Result<Self, InitError>
    {
        let size = 1usize.checked_shl(history_bits)
            .ok_or(InitError::InvalidHistory(history_bits))?;
        Ok(Self { data: try_alloc(size, init, "FSM table")? })
    }

    /// Number of storage bits for the whole table.
    pub fn storage_bits(&self) -> usize {
        self.data.len() * PredictionState::STORAGE_BITS
    }

    /// Set every counter in the table to `state`.
    pub fn reset(&mut self, state: PredictionState) {
        self.data.fill(state);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredictionState> {
        self.data.iter()
    }

    /// Count the number of counters in each state.
    pub fn histogram(&self) -> HashMap<PredictionState, usize> {
        self.data.iter().copied().counts()
    }
}

impl PredictorTable for FsmTable {
    type Index = usize;
    type Entry = PredictionState;

    fn size(&self) -> usize { self.data.len() }

    fn get_entry(&self, idx: usize) -> &PredictionState {
        &self.data[idx & self.index_mask()]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut PredictionState {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}
