// components/playlist_engine/src/lib.rs
//! Download orchestration for playlist/album URLs.
//!
//! A caller builds a [`RetrievalRequest`] from a raw URL and a base
//! directory, then hands it to [`Engine::spawn_run`] together with a
//! [`StatusSink`]. The engine classifies the URL into one of two providers,
//! drives the matching retrieval tool, normalizes its textual output into
//! [`StatusEvent`]s and reports the resolved collection folder when done.

mod backend;
mod controller;
mod plan;
mod progress;
mod sink;
mod spotdl;
mod types;
mod ytdlp;

pub use backend::Backend;
pub use controller::{Engine, Orchestrator};
pub use plan::OutputPlan;
pub use progress::{parse_line, ParsedLine};
pub use sink::StatusSink;
pub use spotdl::SpotdlBackend;
pub use types::{
    CollectionMetadata, EngineError, Phase, Provider, RetrievalRequest, RunResult, StatusEvent,
};
pub use ytdlp::YtDlpBackend;
