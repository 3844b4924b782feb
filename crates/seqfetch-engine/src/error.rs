//! Error types for seqfetch-engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::FragmentIndex;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Every condition that aborts a run.
///
/// A missing fragment is not an error: it is reported as
/// [`FetchOutcome::Absent`](crate::FetchOutcome::Absent) and is how the end of
/// the sequence is found.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("invalid filename template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: &'static str },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("unexpected HTTP status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A fragment inside a range vouched for by a probe turned out to be missing.
    #[error("fragment {index} missing inside range {start}..{end} that was probed as present")]
    Inconsistent {
        index: FragmentIndex,
        start: FragmentIndex,
        end: FragmentIndex,
    },

    #[error("fragment {0} was already stored")]
    DuplicateFragment(FragmentIndex),

    #[error("failed to store fragment {index}: {source}")]
    Store {
        index: FragmentIndex,
        #[source]
        source: io::Error,
    },

    #[error("output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("failed to write output {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("fetch task failed: {0}")]
    TaskFailed(String),

    #[error("run cancelled")]
    Cancelled,
}

impl FetchError {
    pub(crate) fn transport<E>(url: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FetchError::Transport {
            url: url.to_string(),
            source: Box::new(source),
        }
    }

    /// Returns `true` for a gap detected inside a range that a probe vouched for.
    #[must_use]
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, FetchError::Inconsistent { .. })
    }
}
