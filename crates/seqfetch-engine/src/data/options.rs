use std::fmt;
use std::sync::Arc;

use crate::error::{FetchError, Result};

/// Step size used for the first probe when none is configured.
pub const DEFAULT_INITIAL_STEP: u64 = 100;

/// Phases of a single engine run.
///
/// A run moves through these phases in order:
/// Idle → Probing ⇄ Dispatching → Draining → Done | Failed
///
/// Dispatching is momentary: the prober hands a range off and immediately
/// returns to Probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnginePhase {
    /// Created, nothing issued yet.
    #[default]
    Idle,

    /// Issuing sequential probes to locate the boundary.
    Probing,

    /// Handing a probed range to a concurrent fetch task.
    Dispatching,

    /// Boundary found or run aborted; waiting for range tasks to finish.
    Draining,

    /// All tasks joined with no failure recorded.
    Done,

    /// A fatal condition was recorded. Terminal.
    Failed,
}

impl EnginePhase {
    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub fn can_transition_to(self, next: EnginePhase) -> bool {
        use EnginePhase::*;
        matches!(
            (self, next),
            (Idle, Probing)
                | (Idle, Failed)
                | (Probing, Dispatching)
                | (Dispatching, Probing)
                | (Probing, Draining)
                | (Dispatching, Failed)
                | (Draining, Failed)
                | (Draining, Done)
        )
    }
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnginePhase::Idle => write!(f, "Idle"),
            EnginePhase::Probing => write!(f, "Probing"),
            EnginePhase::Dispatching => write!(f, "Dispatching"),
            EnginePhase::Draining => write!(f, "Draining"),
            EnginePhase::Done => write!(f, "Done"),
            EnginePhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Configuration for an [`Engine`](crate::Engine) run.
///
/// # Examples
///
/// ```
/// use seqfetch_engine::EngineOptions;
///
/// let options = EngineOptions::default()
///     .initial_step(64)
///     .max_in_flight(Some(8))
///     .header("Referer", "https://example.com/");
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct EngineOptions {
    /// Size of the first probe window.
    ///
    /// A present probe at `i + step - 1` vouches for every index below it, so a
    /// larger step means fewer probes but larger ranges per task.
    ///
    /// Default: 100
    pub initial_step: u64,

    /// Upper bound on range tasks fetching at the same time.
    ///
    /// `None` lets every dispatched range run immediately. The prober never
    /// waits on this bound; tasks queue for a permit instead.
    ///
    /// Default: None
    pub max_in_flight: Option<usize>,

    /// Custom HTTP headers sent with every fragment request.
    ///
    /// Default: empty
    pub headers: Arc<[(String, String)]>,
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("initial_step", &self.initial_step)
            .field("max_in_flight", &self.max_in_flight)
            .field("headers", &self.headers.len())
            .finish()
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            initial_step: DEFAULT_INITIAL_STEP,
            max_in_flight: None,
            headers: Arc::new([]),
        }
    }
}

impl EngineOptions {
    /// Set the first probe window.
    #[must_use]
    pub fn initial_step(mut self, initial_step: u64) -> Self {
        self.initial_step = initial_step;
        self
    }

    /// Bound the number of range tasks fetching at once.
    #[must_use]
    pub fn max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Add a single custom HTTP header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((key.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    /// Replace all custom HTTP headers.
    #[must_use]
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = Arc::from(headers);
        self
    }

    /// Reject option values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.initial_step == 0 {
            return Err(FetchError::InvalidOption(
                "initial_step must be at least 1".to_string(),
            ));
        }
        if self.max_in_flight == Some(0) {
            return Err(FetchError::InvalidOption(
                "max_in_flight must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}
