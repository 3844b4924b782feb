use std::sync::{Arc, Mutex, MutexGuard};

use crate::data::{FragmentIndex, ProgressState};
use crate::error::{FetchError, Result};

/// Consumer of progress snapshots, e.g. a terminal progress bar.
///
/// Called after every stored fragment while the tracker's lock is held, so
/// calls never overlap. Implementations should return quickly.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, state: &ProgressState);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressState) + Send + Sync,
{
    fn on_progress(&self, state: &ProgressState) {
        self(state)
    }
}

/// Sink that ignores every update.
impl ProgressSink for () {
    fn on_progress(&self, _state: &ProgressState) {}
}

/// Thread-safe record of the fragments retrieved during one run.
///
/// All mutations go through a single mutex; readers get a copy via
/// [`snapshot`](Self::snapshot).
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressTracker {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            state: Mutex::new(ProgressState::new()),
            sink,
        }
    }

    /// Record a stored fragment and notify the sink.
    ///
    /// Recording the same index twice is rejected and leaves the state as it
    /// was.
    pub fn record_present(&self, index: FragmentIndex, bytes: u64) -> Result<()> {
        let mut state = self.lock();
        if !state.present.insert(index) {
            return Err(FetchError::DuplicateFragment(index));
        }
        state.max_index = state.max_index.max(index);
        state.fetch_count += 1;
        state.bytes += bytes;
        self.sink.on_progress(&state);
        Ok(())
    }

    /// Count a fetch that found nothing. The sink is not notified.
    pub fn record_absent(&self, _index: FragmentIndex) {
        self.lock().fetch_count += 1;
    }

    pub fn percentage(&self) -> f64 {
        self.lock().percentage()
    }

    pub fn snapshot(&self) -> ProgressState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ProgressTracker")
            .field("present", &state.present.len())
            .field("max_index", &state.max_index)
            .field("fetch_count", &state.fetch_count)
            .finish()
    }
}
