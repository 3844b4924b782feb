//! Pure logic for boundary discovery.
//!
//! Nothing here performs I/O. The probe state machine decides where to look
//! next from the outcome of the previous probe; the effects layer carries out
//! the fetches.

mod probe;
mod status;
mod template;

pub use probe::{ProbeDecision, ProbeState};
pub use status::{StatusClass, classify_status};
pub use template::{FilenameTemplate, fragment_url, validate_base_url};
