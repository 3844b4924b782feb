//! Retrieval of numbered HTTP fragment sequences of unknown length.
//!
//! Given a base URL and a filename template such as `chunk-%d.ts`, the
//! [`Engine`] finds how many fragments exist by probing ahead, and fetches the
//! ranges each successful probe vouches for in concurrent tasks while probing
//! continues.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable options, outcomes and progress snapshots
//! - [`core`] - Pure logic: the probe state machine, templates, status rules
//! - [`effects`] - HTTP, storage, and the concurrent run
//!
//! # Key Features
//!
//! - **Adaptive probing**: a fixed-size window advances while probes land and
//!   halves when they miss, so the boundary costs `O(log step)` extra requests
//! - **Overlapped retrieval**: each landed probe spawns a range task at once
//! - **Fail-fast**: the first fatal condition cancels the run cooperatively and
//!   is returned after every task has joined
//! - **Mechanism-only**: concatenation helpers are provided, but temp
//!   directories and rendering belong to the caller

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use data::{
    DEFAULT_INITIAL_STEP, EngineOptions, EnginePhase, FetchOutcome, FragmentIndex, ProgressState,
};
pub use effects::{
    AbortSignal, DirStore, Engine, FragmentFetcher, FragmentStore, HttpClient, HttpResponse,
    MemoryStore, ProgressSink, ProgressTracker, RunReport,
};

#[cfg(feature = "reqwest")]
pub use effects::{ClientSetting, ReqwestClient, Url};

pub use error::{FetchError, Result};
