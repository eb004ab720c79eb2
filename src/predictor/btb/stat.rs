
/// Snapshot of [BTBPredictor] statistics.
///
/// [BTBPredictor]: crate::predictor::BTBPredictor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BTBStats {
    /// Approximate hardware cost [in bits]
    pub storage_bits: u64,

    /// Number of predictions
    pub branches: u64,

    /// Number of mispredictions that would flush the pipeline
    pub flushes: u64,
}
impl BTBStats {
    /// Return the fraction of branches which caused a flush.
    pub fn flush_rate(&self) -> f64 {
        if self.branches == 0 {
            return 0.0;
        }
        self.flushes as f64 / self.branches as f64
    }

    /// Return the number of branches which did not cause a flush.
    pub fn hits(&self) -> u64 { self.branches.saturating_sub(self.flushes) }
}

impl std::fmt::Display for BTBStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "flush_num: {}, br_num: {}, size: {}b",
            self.flushes, self.branches, self.storage_bits
        )
    }
}
