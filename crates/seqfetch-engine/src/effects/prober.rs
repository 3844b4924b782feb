use std::sync::Arc;

use tracing::debug;

use crate::core::{ProbeDecision, ProbeState};
use crate::data::EnginePhase;
use crate::effects::dispatch::RangeDispatcher;
use crate::effects::engine::PhaseCursor;
use crate::effects::http::HttpClient;
use crate::effects::run::RunContext;
use crate::effects::store::FragmentStore;
use crate::error::{FetchError, Result};

/// Sequential driver of [`ProbeState`].
///
/// Issues one probe at a time and hands every range a probe vouches for to
/// the dispatcher without waiting for it.
pub(crate) struct BoundaryProber<C: HttpClient, S: FragmentStore> {
    ctx: Arc<RunContext<C, S>>,
    state: ProbeState,
    probes: u64,
}

impl<C, S> BoundaryProber<C, S>
where
    C: HttpClient + 'static,
    S: FragmentStore + 'static,
{
    pub(crate) fn new(ctx: Arc<RunContext<C, S>>, initial_step: u64) -> Self {
        Self {
            ctx,
            state: ProbeState::new(initial_step),
            probes: 0,
        }
    }

    pub(crate) fn probes(&self) -> u64 {
        self.probes
    }

    /// Probe until the boundary is located.
    ///
    /// A fatal probe outcome is recorded on the run's abort signal and
    /// [`FetchError::Cancelled`] is returned; so is an abort raised by a range
    /// task. No probe is issued once the signal is set.
    pub(crate) async fn locate(
        &mut self,
        dispatcher: &mut RangeDispatcher,
        phase: &mut PhaseCursor,
    ) -> Result<u64> {
        loop {
            if self.ctx.signal.is_aborted() {
                debug!(probes = self.probes, "probing stopped by abort");
                return Err(FetchError::Cancelled);
            }

            let index = self.state.next_probe();
            self.probes += 1;
            let outcome = match self.ctx.fetch(index).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.ctx.signal.abort(e);
                    return Err(FetchError::Cancelled);
                }
            };

            let step = self.state.step();
            match self.state.observe(outcome.is_present()) {
                ProbeDecision::Dispatch(range) => {
                    debug!(index, step, start = range.start, end = range.end, "probe hit");
                    phase.enter(EnginePhase::Dispatching);
                    dispatcher.dispatch(Arc::clone(&self.ctx), range);
                    phase.enter(EnginePhase::Probing);
                }
                ProbeDecision::Narrow => {
                    debug!(index, step, next_step = self.state.step(), "probe miss");
                }
                ProbeDecision::Located(count) => {
                    debug!(count, probes = self.probes, "boundary located");
                    return Ok(count);
                }
            }
        }
    }
}
