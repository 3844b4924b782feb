use crate::data::{FetchOutcome, FragmentIndex};
use crate::effects::fetcher::FragmentFetcher;
use crate::effects::http::HttpClient;
use crate::effects::signal::AbortSignal;
use crate::effects::store::FragmentStore;
use crate::effects::tracker::ProgressTracker;
use crate::error::Result;

/// State shared by the prober and every range task of one run.
pub(crate) struct RunContext<C: HttpClient, S: FragmentStore> {
    pub(crate) fetcher: FragmentFetcher<C, S>,
    pub(crate) tracker: ProgressTracker,
    pub(crate) signal: AbortSignal,
}

impl<C: HttpClient, S: FragmentStore> RunContext<C, S> {
    pub(crate) fn new(fetcher: FragmentFetcher<C, S>, tracker: ProgressTracker) -> Self {
        Self {
            fetcher,
            tracker,
            signal: AbortSignal::new(),
        }
    }

    /// Fetch one fragment and record the outcome with the tracker.
    pub(crate) async fn fetch(&self, index: FragmentIndex) -> Result<FetchOutcome> {
        let outcome = self.fetcher.fetch(index).await?;
        match outcome {
            FetchOutcome::Present(bytes) => self.tracker.record_present(index, bytes)?,
            FetchOutcome::Absent => self.tracker.record_absent(index),
        }
        Ok(outcome)
    }
}
