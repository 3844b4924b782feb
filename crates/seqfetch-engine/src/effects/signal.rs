use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::FetchError;

/// Set-once failure signal shared by the prober and every range task.
///
/// The first error passed to [`abort`](Self::abort) is kept and the token is
/// cancelled. Later errors are logged and dropped. Tasks observe the signal
/// between fetches; nothing in flight is interrupted.
#[derive(Debug, Default)]
pub struct AbortSignal {
    token: CancellationToken,
    first: Mutex<Option<FetchError>>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `err` if it is the first failure, then cancel.
    pub fn abort(&self, err: FetchError) {
        let mut first = self.first.lock().unwrap_or_else(|e| e.into_inner());
        if first.is_none() {
            warn!(error = %err, "aborting run");
            *first = Some(err);
        } else {
            warn!(error = %err, "further failure after abort");
        }
        drop(first);
        self.token.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Take the recorded failure, leaving `None` behind.
    pub fn take_error(&self) -> Option<FetchError> {
        self.first.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}
