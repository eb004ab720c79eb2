//! A tagged branch target buffer (BTB) with per-entry direction prediction.
//!
//! Each entry caches the target of a branch and is associated with a
//! [HistoryRegister] and an [FsmTable]. Depending on the configuration, these
//! are either private to the entry or shared by all entries. Both live in
//! pools owned by the [BTBPredictor]; entries only hold indices into them.

pub mod config;
pub mod stat;

pub use config::*;
pub use stat::*;

use log::{ debug, trace };

use crate::bits::*;
use crate::branch::*;
use crate::error::InitError;
use crate::history::*;
use crate::predictor::*;
use crate::predictor::table::try_alloc;

/// Identifies a [HistoryRegister] in the history pool of a [BTBPredictor].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HistoryId(usize);
impl HistoryId {
    pub fn index(&self) -> usize { self.0 }
}

/// Identifies an [FsmTable] in the table pool of a [BTBPredictor].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId(usize);
impl TableId {
    pub fn index(&self) -> usize { self.0 }
}

/// A single BTB entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BTBEntry {
    /// Set once the entry has been written
    valid: bool,
    /// Tag bits of the branch which last wrote this entry
    tag: u32,
    /// Cached target address for the branch
    tgt: u32,
    /// History register used by this entry
    history: HistoryId,
    /// FSM table used by this entry
    table: TableId,
}
impl BTBEntry {
    pub fn new(history: HistoryId, table: TableId) -> Self {
        Self { valid: false, tag: 0, tgt: 0, history, table }
    }

    pub fn is_valid(&self) -> bool { self.valid }
    pub fn tag(&self) -> u32 { self.tag }
    pub fn target(&self) -> u32 { self.tgt }
    pub fn history(&self) -> HistoryId { self.history }
    pub fn table(&self) -> TableId { self.table }

    /// Returns 'true' if this entry holds a branch with the given tag.
    pub fn hits(&self, tag: u32) -> bool {
        self.valid && self.tag == tag
    }
}

/// Output from [`BTBPredictor::predict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BTBPrediction {
    /// Predicted direction
    pub taken: bool,

    /// Predicted address of the next instruction
    pub target: u32,
}
impl BTBPrediction {
    pub fn outcome(&self) -> Outcome { Outcome::from_bool(self.taken) }
}

/// A direct-mapped, tagged BTB where each entry predicts a direction with
/// a history-indexed table of 2-bit counters.
#[derive(Clone, Debug)]
pub struct BTBPredictor {
    /// The configuration used to create this object
    cfg: BTBConfig,

    /// Split of branch addresses into index and tag
    layout: AddressLayout,

    /// BTB entries
    entries: Vec<BTBEntry>,

    /// Pool of history registers
    histories: Vec<HistoryRegister>,

    /// Pool of FSM tables
    tables: Vec<FsmTable>,

    /// Number of predictions
    branches: u64,

    /// Number of mispredictions
    flushes: u64,
}
impl BTBPredictor {
    /// Create a predictor from the provided configuration.
    ///
    /// Nothing is returned unless every pool has been allocated.
    pub fn new(cfg: BTBConfig) -> Result<Self, InitError> {
        cfg.validate()?;

        let histories = try_alloc(
            cfg.num_histories(),
            HistoryRegister::new(cfg.history_bits as usize),
            "history registers",
        )?;

        let mut tables = Vec::new();
        tables.try_reserve_exact(cfg.num_tables())
            .map_err(|_| InitError::Allocation("FSM tables"))?;
        for _ in 0..cfg.num_tables() {
            tables.push(FsmTable::new(cfg.history_bits, cfg.initial_state)?);
        }

        let mut entries = Vec::new();
        entries.try_reserve_exact(cfg.size)
            .map_err(|_| InitError::Allocation("BTB entries"))?;
        entries.extend((0..cfg.size).map(|idx| {
            BTBEntry::new(
                HistoryId(cfg.history.pool_index(idx)),
                TableId(cfg.table.pool_index(idx)),
            )
        }));

        debug!("built BTB: {:?} ({} storage bits)", cfg, cfg.storage_bits());
        Ok(Self {
            layout: cfg.layout(),
            cfg,
            entries,
            histories,
            tables,
            branches: 0,
            flushes: 0,
        })
    }

    /// Replace this predictor with a fresh one built from `cfg`.
    ///
    /// The previous pools are released once the new ones exist. On failure,
    /// this predictor is left untouched.
    pub fn reinit(&mut self, cfg: BTBConfig) -> Result<(), InitError> {
        *self = Self::new(cfg)?;
        Ok(())
    }

    pub fn config(&self) -> &BTBConfig { &self.cfg }
    pub fn entries(&self) -> &[BTBEntry] { &self.entries }
    pub fn histories(&self) -> &[HistoryRegister] { &self.histories }
    pub fn tables(&self) -> &[FsmTable] { &self.tables }

    pub fn history(&self, id: HistoryId) -> &HistoryRegister {
        &self.histories[id.0]
    }

    pub fn table(&self, id: TableId) -> &FsmTable {
        &self.tables[id.0]
    }

    /// Return the index into the FSM table used by `entry` for a branch at
    /// `pc`. When a shared table is in use, address bits are mixed in to
    /// separate branches with the same history.
    pub fn fsm_index(&self, entry: &BTBEntry, pc: u32) -> usize {
        let hist = self.history(entry.history).value();
        let index = match self.cfg.share_bit() {
            Some(bit) => hist ^ extract_field(pc, self.cfg.history_bits, bit),
            None => hist,
        };
        index as usize
    }
}

/// The public interface to a [`BTBPredictor`].
impl BTBPredictor {
    /// Make a prediction for the branch at `pc`.
    ///
    /// Branches missing in the BTB are predicted to fall through.
    pub fn predict(&mut self, pc: u32) -> BTBPrediction {
        debug_assert!(is_aligned(pc), "unaligned branch address {:08x}", pc);
        self.branches += 1;

        let miss = BTBPrediction { taken: false, target: fallthrough(pc) };
        let entry = self.get_entry(self.get_index(pc));
        if !entry.hits(self.get_tag(pc)) {
            return miss;
        }

        let state = *self.table(entry.table)
            .get_entry(self.fsm_index(entry, pc));
        match state.direction() {
            Outcome::T => BTBPrediction { taken: true, target: entry.tgt },
            Outcome::N => miss,
        }
    }

    /// Given the resolved branch at `pc` and the target that was predicted
    /// for it, update the state of the predictor.
    pub fn update(&mut self,
        pc: u32,
        actual_target: u32,
        actual_taken: bool,
        predicted_target: u32,
    )
    {
        debug_assert!(is_aligned(pc), "unaligned branch address {:08x}", pc);
        let idx = self.get_index(pc);
        let tag = self.get_tag(pc);
        let outcome = Outcome::from_bool(actual_taken);

        let next_pc = if actual_taken { actual_target } else { fallthrough(pc) };
        if predicted_target != next_pc {
            self.flushes += 1;
            trace!("flush @ {:08x}: predicted {:08x}, resolved {:08x}",
                pc, predicted_target, next_pc
            );
        }

        // A different branch owns this entry: forget whatever private state
        // it accumulated before learning from this outcome.
        let entry = self.entries[idx];
        if entry.tag != tag {
            trace!("tag miss @ {:08x} (entry {}, tag {:x} -> {:x})",
                pc, idx, entry.tag, tag
            );
            if !self.cfg.table.is_global() {
                self.tables[entry.table.0].reset(self.cfg.initial_state);
            }
            if !self.cfg.history.is_global() {
                self.histories[entry.history.0].reset();
            }
        }

        let fsm_idx = self.fsm_index(&entry, pc);
        self.tables[entry.table.0].get_entry_mut(fsm_idx).update(outcome);
        self.histories[entry.history.0].push(outcome);

        let entry = &mut self.entries[idx];
        entry.tgt = actual_target;
        entry.tag = tag;
        entry.valid = true;
    }

    /// Predict and then resolve a single branch record.
    pub fn simulate(&mut self, record: &BranchRecord) -> BTBPrediction {
        let prediction = self.predict(record.pc);
        self.update(record.pc, record.tgt, record.is_taken(), prediction.target);
        prediction
    }

    /// Return a snapshot of the current statistics.
    pub fn stats(&self) -> BTBStats {
        BTBStats {
            storage_bits: self.cfg.storage_bits(),
            branches: self.branches,
            flushes: self.flushes,
        }
    }
}

impl PredictorTable for BTBPredictor {
    type Index = usize;
    type Entry = BTBEntry;

    fn size(&self) -> usize { self.entries.len() }

    fn get_entry(&self, idx: usize) -> &BTBEntry {
        &self.entries[idx]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut BTBEntry {
        &mut self.entries[idx]
    }
}

impl TaggedPredictorTable for BTBPredictor {
    fn get_index(&self, pc: u32) -> usize { self.layout.index(pc) }
    fn get_tag(&self, pc: u32) -> u32 { self.layout.tag(pc) }
}
