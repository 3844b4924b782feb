use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::outcome::FragmentIndex;

/// Snapshot of what a run has retrieved so far.
///
/// Handed to progress sinks after every stored fragment. The sequence length is
/// unknown until the boundary is found, so completion is only an estimate
/// based on the highest index seen.
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// Indices confirmed present, each by exactly one fetch.
    pub present: HashSet<FragmentIndex>,

    /// Highest index confirmed present. Zero until the first fragment lands.
    pub max_index: FragmentIndex,

    /// Completed fetches, present or absent.
    pub fetch_count: u64,

    /// Bytes persisted across all present fragments.
    pub bytes: u64,

    /// When the run started.
    pub started_at: Instant,
}

impl ProgressState {
    pub fn new() -> Self {
        Self {
            present: HashSet::new(),
            max_index: 0,
            fetch_count: 0,
            bytes: 0,
            started_at: Instant::now(),
        }
    }

    /// Number of fragments retrieved.
    #[must_use]
    pub fn len(&self) -> usize {
        self.present.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    #[must_use]
    pub fn contains(&self, index: FragmentIndex) -> bool {
        self.present.contains(&index)
    }

    /// Estimated completion in `[0, 100]`.
    ///
    /// Computed as `present / max(max_index, 1) * 100`. It reads low while
    /// ranges are still in flight and only settles once `max_index` reaches the
    /// final fragment.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        let denominator = self.max_index.max(1) as f64;
        (self.present.len() as f64 / denominator * 100.0).min(100.0)
    }

    /// Returns `true` if every index in `from..thru` has been retrieved.
    #[must_use]
    pub fn is_range_complete(&self, from: FragmentIndex, thru: FragmentIndex) -> bool {
        (from..thru).all(|i| self.present.contains(&i))
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}
