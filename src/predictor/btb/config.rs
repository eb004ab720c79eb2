
use crate::bits::*;
use crate::error::InitError;
use crate::predictor::*;

/// Whether a resource is shared by every BTB entry or private to each one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// A single instance shared by all entries
    Global,
    /// One instance per entry
    Local,
}
impl Scope {
    pub fn from_global(global: bool) -> Self {
        if global { Self::Global } else { Self::Local }
    }

    pub fn is_global(&self) -> bool { matches!(self, Self::Global) }

    /// Number of instances needed for a BTB with `entries` entries.
    pub fn pool_size(&self, entries: usize) -> usize {
        match self {
            Self::Global => 1,
            Self::Local => entries,
        }
    }

    /// Index of the instance used by entry `idx`.
    pub fn pool_index(&self, idx: usize) -> usize {
        match self {
            Self::Global => 0,
            Self::Local => idx,
        }
    }
}

/// Strategy for mixing program counter bits into the index of a *shared*
/// FSM table (gshare-style).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SharingMode {
    /// Index with history only
    None,
    /// XOR history with address bits just above the alignment bits
    ShareLow,
    /// XOR history with address bits from the middle of the address
    ShareMid,
}
impl SharingMode {
    /// The first address bit mixed into the index, if any.
    pub fn share_bit(&self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::ShareLow => Some(SHARE_LOW_BIT),
            Self::ShareMid => Some(SHARE_MID_BIT),
        }
    }
}

impl TryFrom<u32> for SharingMode {
    type Error = InitError;
    fn try_from(x: u32) -> Result<Self, InitError> {
        match x {
            0 => Ok(Self::None),
            1 => Ok(Self::ShareLow),
            2 => Ok(Self::ShareMid),
            _ => Err(InitError::InvalidSharingMode(x)),
        }
    }
}

/// Configuration for a [`BTBPredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BTBConfig {
    /// Number of entries
    pub size: usize,

    /// Number of bits in each history register
    pub history_bits: u32,

    /// Number of tag bits
    pub tag_bits: u32,

    /// Initial state for every FSM
    pub initial_state: PredictionState,

    /// Whether history registers are shared
    pub history: Scope,

    /// Whether FSM tables are shared
    pub table: Scope,

    /// Strategy for indexing a shared FSM table
    pub sharing: SharingMode,
}
impl BTBConfig {
    /// Build a configuration from raw integer parameters.
    pub fn from_raw(
        btb_size: u32,
        history_size: u32,
        tag_size: u32,
        initial_state: u32,
        global_history: bool,
        global_table: bool,
        sharing: u32,
    ) -> Result<Self, InitError>
    {
        let cfg = Self {
            size: btb_size as usize,
            history_bits: history_size,
            tag_bits: tag_size,
            initial_state: PredictionState::try_from(initial_state)?,
            history: Scope::from_global(global_history),
            table: Scope::from_global(global_table),
            sharing: SharingMode::try_from(sharing)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that the geometry fits inside an address.
    pub fn validate(&self) -> Result<(), InitError> {
        if !self.size.is_power_of_two() {
            return Err(InitError::InvalidSize(self.size));
        }
        if !self.layout().fits() {
            return Err(InitError::TagOverflow {
                tag_bits: self.tag_bits,
                index_bits: self.index_bits(),
            });
        }
        let top = self.share_bit().unwrap_or(1) - 1;
        if self.history_bits > ADDR_BITS - top {
            return Err(InitError::InvalidHistory(self.history_bits));
        }
        Ok(())
    }

    /// Number of index bits.
    pub fn index_bits(&self) -> u32 { self.size.ilog2() }

    pub fn layout(&self) -> AddressLayout {
        AddressLayout::new(self.index_bits(), self.tag_bits)
    }

    /// The first address bit mixed into FSM table indices, if sharing
    /// applies to this configuration.
    ///
    /// Sharing only applies when the table itself is shared.
    pub fn share_bit(&self) -> Option<u32> {
        if self.table.is_global() { self.sharing.share_bit() } else { None }
    }

    /// Number of history registers.
    pub fn num_histories(&self) -> usize { self.history.pool_size(self.size) }

    /// Number of FSM tables.
    pub fn num_tables(&self) -> usize { self.table.pool_size(self.size) }

    /// Number of counters in each FSM table.
    pub fn table_size(&self) -> u64 { 1u64 << self.history_bits }

    /// Get the number of storage bits.
    ///
    /// Each entry holds a valid bit, a tag, and a target (less the
    /// alignment bits).
    pub fn storage_bits(&self) -> u64 {
        let entry_bits = (1 + self.tag_bits + TARGET_BITS) as u64;
        let fsm_bits = PredictionState::STORAGE_BITS as u64 * self.table_size();
        (self.size as u64 * entry_bits)
            + (self.num_tables() as u64 * fsm_bits)
            + (self.num_histories() as u64 * self.history_bits as u64)
    }

    /// Use this configuration to create a new [`BTBPredictor`].
    pub fn build(self) -> Result<BTBPredictor, InitError> {
        BTBPredictor::new(self)
    }
}
