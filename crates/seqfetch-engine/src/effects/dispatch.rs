use std::ops::Range;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::data::{FetchOutcome, FragmentIndex};
use crate::effects::http::HttpClient;
use crate::effects::run::RunContext;
use crate::effects::store::FragmentStore;
use crate::error::FetchError;

/// Spawns one task per probed range and joins them all at the end of a run.
///
/// Each task fetches its indices in order. Tasks check the run's abort signal
/// before every fetch and stop on the first fatal outcome or on a missing
/// fragment, which inside a probed range is an inconsistency.
pub(crate) struct RangeDispatcher {
    tasks: JoinSet<()>,
    permits: Option<Arc<Semaphore>>,
    dispatched: u64,
}

impl RangeDispatcher {
    pub(crate) fn new(max_in_flight: Option<usize>) -> Self {
        Self {
            tasks: JoinSet::new(),
            permits: max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
            dispatched: 0,
        }
    }

    /// Number of ranges handed out so far.
    pub(crate) fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Start fetching `range` in the background. Empty ranges are skipped.
    pub(crate) fn dispatch<C, S>(&mut self, ctx: Arc<RunContext<C, S>>, range: Range<FragmentIndex>)
    where
        C: HttpClient + 'static,
        S: FragmentStore + 'static,
    {
        self.reap(&*ctx);
        if range.is_empty() {
            return;
        }

        self.dispatched += 1;
        let permits = self.permits.clone();
        self.tasks.spawn(async move {
            let _permit = match permits {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
                None => None,
            };
            fetch_range(&ctx, range).await;
        });
    }

    /// Wait for every dispatched task. Task panics are recorded on the signal.
    pub(crate) async fn drain<C, S>(&mut self, ctx: &RunContext<C, S>)
    where
        C: HttpClient,
        S: FragmentStore,
    {
        debug!(remaining = self.tasks.len(), "draining range tasks");
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                ctx.signal.abort(FetchError::TaskFailed(e.to_string()));
            }
        }
    }

    // Collect tasks that already finished so the set does not grow with the run.
    fn reap<C, S>(&mut self, ctx: &RunContext<C, S>)
    where
        C: HttpClient,
        S: FragmentStore,
    {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                ctx.signal.abort(FetchError::TaskFailed(e.to_string()));
            }
        }
    }
}

async fn fetch_range<C, S>(ctx: &RunContext<C, S>, range: Range<FragmentIndex>)
where
    C: HttpClient,
    S: FragmentStore,
{
    trace!(start = range.start, end = range.end, "range task started");
    for index in range.clone() {
        if ctx.signal.is_aborted() {
            trace!(index, "range task stopped by abort");
            return;
        }

        match ctx.fetch(index).await {
            Ok(FetchOutcome::Present(_)) => {}
            Ok(FetchOutcome::Absent) => {
                ctx.signal.abort(FetchError::Inconsistent {
                    index,
                    start: range.start,
                    end: range.end,
                });
                return;
            }
            Err(e) => {
                ctx.signal.abort(e);
                return;
            }
        }
    }
    trace!(start = range.start, end = range.end, "range task finished");
}
