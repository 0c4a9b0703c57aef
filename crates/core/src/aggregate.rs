//! Go / no-go running statistics
//!
//! Each outcome keeps its own count, sum, min and max, so one metric answers
//! both "how often did this succeed versus fail" and "how expensive was each".

use crate::flags::Outcome;

/// Running statistics for one outcome class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchStats {
    /// Number of events recorded
    pub count: u64,
    /// Sum of recorded values, saturating at `u64::MAX`
    pub sum: u64,
    /// Smallest recorded value; `u64::MAX` until the first event
    pub min: u64,
    /// Largest recorded value; zero until the first event
    pub max: u64,
}

impl Default for BranchStats {
    fn default() -> Self {
        Self { count: 0, sum: 0, min: u64::MAX, max: 0 }
    }
}

impl BranchStats {
    fn record(&mut self, value: u64) {
        self.count += 1;
        self.sum = self.sum.saturating_add(value);
        self.max = self.max.max(value);
        self.min = self.min.min(value);
    }

    /// Whether no event has been recorded
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Integer mean of the recorded values; zero when empty
    pub fn mean(&self) -> u64 {
        self.sum.checked_div(self.count).unwrap_or(0)
    }
}

/// Dual running statistics indexed by [`Outcome`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStore {
    branches: [BranchStats; 2],
}

impl AggregateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `value` into the statistics of `outcome`
    pub fn record(&mut self, outcome: Outcome, value: u64) {
        self.branches[outcome.index()].record(value);
    }

    /// Statistics for one outcome
    pub fn branch(&self, outcome: Outcome) -> &BranchStats {
        &self.branches[outcome.index()]
    }

    /// Event count for one outcome
    pub fn count(&self, outcome: Outcome) -> u64 {
        self.branch(outcome).count
    }

    /// Value sum for one outcome
    pub fn sum(&self, outcome: Outcome) -> u64 {
        self.branch(outcome).sum
    }

    /// Events recorded across both outcomes
    pub fn total_count(&self) -> u64 {
        self.branches.iter().map(|b| b.count).sum()
    }

    /// Whether neither outcome has recorded an event
    pub fn is_empty(&self) -> bool {
        self.branches.iter().all(BranchStats::is_empty)
    }

    /// Smallest and largest value over the non-empty branches
    ///
    /// With `only_go` the no-go branch is ignored. Returns `None` when no
    /// considered branch has an event.
    pub fn extremes(&self, only_go: bool) -> Option<(u64, u64)> {
        let considered: &[BranchStats] =
            if only_go { &self.branches[..1] } else { &self.branches[..] };

        considered.iter().filter(|b| !b.is_empty()).fold(None, |acc, b| match acc {
            None => Some((b.min, b.max)),
            Some((lo, hi)) => Some((lo.min(b.min), hi.max(b.max))),
        })
    }

    /// Return both branches to their initial state
    pub fn reset(&mut self) {
        self.branches = [BranchStats::default(); 2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates the initial statistics.
    ///
    /// Assertions:
    /// - Confirms min starts at `u64::MAX` so any first value replaces it.
    /// - Ensures the store reports empty.
    #[test]
    fn test_new_store_is_empty() {
        let store = AggregateStore::new();
        assert!(store.is_empty());
        assert_eq!(store.branch(Outcome::Go).min, u64::MAX);
        assert_eq!(store.branch(Outcome::NoGo).max, 0);
        assert_eq!(store.extremes(false), None);
    }

    /// Validates interleaved recording keeps branches separate.
    ///
    /// Assertions:
    /// - Confirms count, sum, min and max per branch.
    #[test]
    fn test_interleaved_outcomes() {
        let mut store = AggregateStore::new();
        store.record(Outcome::Go, 100);
        store.record(Outcome::NoGo, 50);
        store.record(Outcome::Go, 300);

        let go = store.branch(Outcome::Go);
        assert_eq!((go.count, go.sum, go.min, go.max), (2, 400, 100, 300));
        assert_eq!(go.mean(), 200);

        let nogo = store.branch(Outcome::NoGo);
        assert_eq!((nogo.count, nogo.sum, nogo.min, nogo.max), (1, 50, 50, 50));
        assert_eq!(store.total_count(), 3);
    }

    /// Validates that aggregates match a brute-force recomputation over a
    /// pseudo-random event sequence.
    ///
    /// Assertions:
    /// - Confirms every branch equals the reference statistics.
    #[test]
    fn test_matches_reference_over_mixed_sequence() {
        let mut store = AggregateStore::new();
        let mut expected: [Vec<u64>; 2] = [Vec::new(), Vec::new()];
        let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;

        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let outcome = Outcome::from_raw((seed & 1) as u8);
            let value = (seed >> 8) % 10_000;
            store.record(outcome, value);
            expected[outcome.index()].push(value);
        }

        for outcome in Outcome::ALL {
            let values = &expected[outcome.index()];
            let branch = store.branch(outcome);
            assert_eq!(branch.count, values.len() as u64);
            assert_eq!(branch.sum, values.iter().sum::<u64>());
            assert_eq!(branch.min, values.iter().copied().min().unwrap_or(u64::MAX));
            assert_eq!(branch.max, values.iter().copied().max().unwrap_or(0));
        }
    }

    #[test]
    fn test_mean_of_empty_branch_is_zero() {
        assert_eq!(BranchStats::default().mean(), 0);
    }

    #[test]
    fn test_sum_saturates() {
        let mut store = AggregateStore::new();
        store.record(Outcome::Go, u64::MAX);
        store.record(Outcome::Go, 5);
        assert_eq!(store.sum(Outcome::Go), u64::MAX);
        assert_eq!(store.count(Outcome::Go), 2);
    }

    /// Validates extremes over both branches and the go-only view.
    ///
    /// Assertions:
    /// - Confirms the combined range spans both branches.
    /// - Confirms `only_go` ignores the no-go branch.
    #[test]
    fn test_extremes() {
        let mut store = AggregateStore::new();
        store.record(Outcome::Go, 100);
        store.record(Outcome::Go, 300);
        store.record(Outcome::NoGo, 50);

        assert_eq!(store.extremes(false), Some((50, 300)));
        assert_eq!(store.extremes(true), Some((100, 300)));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut store = AggregateStore::new();
        store.record(Outcome::NoGo, 7);
        store.reset();
        assert_eq!(store, AggregateStore::new());
    }
}
