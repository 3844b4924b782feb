use std::sync::Arc;

use tracing::{debug, info};

use crate::core::{FilenameTemplate, validate_base_url};
use crate::data::{EngineOptions, EnginePhase, ProgressState};
use crate::effects::dispatch::RangeDispatcher;
use crate::effects::fetcher::FragmentFetcher;
use crate::effects::http::HttpClient;
use crate::effects::prober::BoundaryProber;
use crate::effects::run::RunContext;
use crate::effects::store::FragmentStore;
use crate::effects::tracker::{ProgressSink, ProgressTracker};
use crate::error::Result;

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of contiguous fragments starting at index 0.
    pub count: u64,
    /// Tracker state after every task joined.
    pub progress: ProgressState,
    /// Probes issued while locating the boundary.
    pub probes: u64,
    /// Ranges handed to concurrent tasks.
    pub ranges: u64,
}

/// Current phase of a run, with transitions logged.
pub(crate) struct PhaseCursor(EnginePhase);

impl PhaseCursor {
    fn new() -> Self {
        Self(EnginePhase::Idle)
    }

    pub(crate) fn enter(&mut self, next: EnginePhase) {
        debug_assert!(
            self.0.can_transition_to(next),
            "illegal phase transition {} -> {}",
            self.0,
            next
        );
        debug!(from = %self.0, to = %next, "phase");
        self.0 = next;
    }
}

/// Discovers how many fragments exist and retrieves all of them.
///
/// The engine holds only the client and options. Every call to
/// [`run`](Self::run) takes the store to fill and gets its own tracker, abort
/// signal and tasks, so one engine can serve any number of runs.
pub struct Engine<C: HttpClient> {
    client: Arc<C>,
    options: EngineOptions,
}

impl<C> Engine<C>
where
    C: HttpClient + 'static,
{
    pub fn new(client: C, options: EngineOptions) -> Self {
        Self::with_shared(Arc::new(client), options)
    }

    pub fn with_shared(client: Arc<C>, options: EngineOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Fetch every fragment of the sequence at `base_url` into `store` and
    /// return how many there are.
    ///
    /// Fragment `i` is requested from `base_url/` followed by `template`
    /// rendered with `i`. On failure the first fatal condition is returned,
    /// after every dispatched task has finished; fragments already stored stay
    /// in the store. Stores are write-once, so each run needs an empty one.
    pub async fn run<S>(
        &self,
        store: Arc<S>,
        base_url: &str,
        template: &str,
        sink: impl ProgressSink + 'static,
    ) -> Result<u64>
    where
        S: FragmentStore + 'static,
    {
        self.run_report(store, base_url, template, sink)
            .await
            .map(|report| report.count)
    }

    /// Like [`run`](Self::run), with the final tracker state and probe counts.
    pub async fn run_report<S>(
        &self,
        store: Arc<S>,
        base_url: &str,
        template: &str,
        sink: impl ProgressSink + 'static,
    ) -> Result<RunReport>
    where
        S: FragmentStore + 'static,
    {
        let mut phase = PhaseCursor::new();

        let template = match self.prepare(base_url, template) {
            Ok(template) => template,
            Err(e) => {
                phase.enter(EnginePhase::Failed);
                return Err(e);
            }
        };

        let fetcher = FragmentFetcher::new(
            Arc::clone(&self.client),
            store,
            base_url,
            template,
            Arc::clone(&self.options.headers),
        );
        let sink: Arc<dyn ProgressSink> = Arc::new(sink);
        let ctx = Arc::new(RunContext::new(fetcher, ProgressTracker::new(sink)));
        let mut dispatcher = RangeDispatcher::new(self.options.max_in_flight);
        let mut prober = BoundaryProber::new(Arc::clone(&ctx), self.options.initial_step);

        phase.enter(EnginePhase::Probing);
        let located = prober.locate(&mut dispatcher, &mut phase).await;

        phase.enter(EnginePhase::Draining);
        dispatcher.drain(&ctx).await;

        if let Some(err) = ctx.signal.take_error() {
            phase.enter(EnginePhase::Failed);
            return Err(err);
        }

        match located {
            Ok(count) => {
                phase.enter(EnginePhase::Done);
                let report = RunReport {
                    count,
                    progress: ctx.tracker.snapshot(),
                    probes: prober.probes(),
                    ranges: dispatcher.dispatched(),
                };
                info!(
                    count,
                    probes = report.probes,
                    ranges = report.ranges,
                    bytes = report.progress.bytes,
                    "sequence retrieved"
                );
                Ok(report)
            }
            Err(e) => {
                phase.enter(EnginePhase::Failed);
                Err(e)
            }
        }
    }

    fn prepare(&self, base_url: &str, template: &str) -> Result<FilenameTemplate> {
        self.options.validate()?;
        validate_base_url(base_url)?;
        FilenameTemplate::parse(template)
    }
}

impl<C: HttpClient> std::fmt::Debug for Engine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("options", &self.options).finish()
    }
}
