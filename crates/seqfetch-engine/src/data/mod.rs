//! Immutable data types shared by the engine.
//!
//! This module holds the options, outcomes, phases and progress snapshots that
//! flow between the pure [`core`](crate::core) logic and the I/O in
//! [`effects`](crate::effects).

pub mod options;
pub mod outcome;
pub mod progress;

pub use options::{DEFAULT_INITIAL_STEP, EngineOptions, EnginePhase};
pub use outcome::{FetchOutcome, FragmentIndex};
pub use progress::ProgressState;
