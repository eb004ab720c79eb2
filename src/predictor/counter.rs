//! Implementation of a 2-bit saturating counter.

use crate::Outcome;
use crate::error::InitError;
use crate::predictor::StatefulPredictor;

/// State of a 2-bit saturating counter.
///
/// States are ordered from "most confidently not-taken" to "most confidently
/// taken". The counter saturates at both ends.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PredictionState {
    StronglyNotTaken = 0,
    WeaklyNotTaken = 1,
    WeaklyTaken = 2,
    StronglyTaken = 3,
}
impl PredictionState {
    /// Number of storage bits for a single counter.
    pub const STORAGE_BITS: usize = 2;

    /// All states, in order.
    pub const ALL: [Self; 4] = [
        Self::StronglyNotTaken,
        Self::WeaklyNotTaken,
        Self::WeaklyTaken,
        Self::StronglyTaken,
    ];

    /// Move one step towards 'taken'.
    pub fn strengthen(self) -> Self {
        match self {
            Self::StronglyNotTaken => Self::WeaklyNotTaken,
            Self::WeaklyNotTaken => Self::WeaklyTaken,
            Self::WeaklyTaken | Self::StronglyTaken => Self::StronglyTaken,
        }
    }

    /// Move one step towards 'not-taken'.
    pub fn weaken(self) -> Self {
        match self {
            Self::StronglyNotTaken | Self::WeaklyNotTaken => Self::StronglyNotTaken,
            Self::WeaklyTaken => Self::WeaklyNotTaken,
            Self::StronglyTaken => Self::WeaklyTaken,
        }
    }

    /// Return the state reached after observing an outcome.
    pub fn next(self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::T => self.strengthen(),
            Outcome::N => self.weaken(),
        }
    }

    /// Return the direction predicted by this state.
    pub fn direction(self) -> Outcome {
        match self {
            Self::WeaklyTaken | Self::StronglyTaken => Outcome::T,
            Self::WeaklyNotTaken | Self::StronglyNotTaken => Outcome::N,
        }
    }
}

impl TryFrom<u32> for PredictionState {
    type Error = InitError;
    fn try_from(x: u32) -> Result<Self, InitError> {
        match x {
            0 => Ok(Self::StronglyNotTaken),
            1 => Ok(Self::WeaklyNotTaken),
            2 => Ok(Self::WeaklyTaken),
            3 => Ok(Self::StronglyTaken),
            _ => Err(InitError::InvalidInitialState(x)),
        }
    }
}

impl StatefulPredictor for PredictionState {
    fn name(&self) -> &'static str { "PredictionState" }
    fn predict(&self) -> Outcome { self.direction() }
    fn update(&mut self, outcome: Outcome) {
        *self = self.next(outcome);
    }
}
