use std::fmt;

//per-run item counters, reported at the end of every batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchStats {
    pub fn new() -> Self {
        BatchStats::default()
    }

    //folds another batch's counters into this one
    pub fn merge(&mut self, other: BatchStats) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} skipped, {} failed",
            self.processed, self.skipped, self.failed
        )
    }
}
