//! I/O operations: HTTP, fragment storage and the concurrent run itself.
//!
//! Everything that touches the network, the filesystem or the tokio runtime
//! lives here. Decisions are delegated to [`core`](crate::core).

mod dispatch;
mod engine;
mod fetcher;
mod http;
mod prober;
mod run;
mod signal;
mod store;
mod tracker;

pub use engine::{Engine, RunReport};
pub use fetcher::FragmentFetcher;
pub use http::{HttpClient, HttpResponse};
pub use signal::AbortSignal;
pub use store::{DirStore, FragmentStore, MemoryStore};
pub use tracker::{ProgressSink, ProgressTracker};

#[cfg(feature = "reqwest")]
pub use http::{ClientSetting, ReqwestClient, Url};
