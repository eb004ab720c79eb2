//! Types for representing branches and branch outcomes.

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    pub fn from_bool(b: bool) -> Self {
        match b {
            true => Self::T,
            false => Self::N,
        }
    }

    pub fn is_taken(&self) -> bool {
        matches!(self, Self::T)
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self { Self::from_bool(x) }
}

impl From<Outcome> for bool {
    fn from(x: Outcome) -> Self { x.is_taken() }
}

/// A resolved branch: the address of the branch instruction, the address
/// it actually went to when taken, and the direction it actually went.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: u32,

    /// The target address evaluated for this branch
    pub tgt: u32,

    /// The outcome evaluated for this branch
    pub outcome: Outcome,
}
impl BranchRecord {
    pub fn new(pc: u32, tgt: u32, outcome: Outcome) -> Self {
        Self { pc, tgt, outcome }
    }

    /// Returns 'true' if this branch was taken.
    pub fn is_taken(&self) -> bool {
        self.outcome.is_taken()
    }

    /// The address of the next sequential instruction.
    pub fn fallthrough(&self) -> u32 {
        crate::bits::fallthrough(self.pc)
    }

    /// The address execution actually continued at after this branch.
    pub fn next_pc(&self) -> u32 {
        if self.is_taken() { self.tgt } else { self.fallthrough() }
    }
}
