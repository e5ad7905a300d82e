// components/playlist_engine/src/types.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Retrieval failed: {0}")]
    BackendFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A download is already in progress")]
    RunInProgress,
}

/// The two supported source ecosystems.
///
/// Classification is total: a URL that matches neither pattern falls through
/// to `YouTube`, which acts as the catch-all backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Spotify,
    YouTube,
}

impl Provider {
    /// Classify a raw URL string. Never fails; always yields one of the two
    /// providers, and yields the same provider for the same input.
    pub fn classify(url: &str) -> Self {
        if url.contains("spotify.com") {
            Provider::Spotify
        } else {
            Provider::YouTube
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Spotify => write!(f, "Spotify"),
            Provider::YouTube => write!(f, "YouTube"),
        }
    }
}

/// One download request, immutable once constructed.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    pub url: String,
    pub base_dir: PathBuf,
    pub provider: Provider,
}

impl RetrievalRequest {
    pub fn new(url: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        let url = url.into();
        let provider = Provider::classify(&url);
        Self {
            url,
            base_dir: base_dir.into(),
            provider,
        }
    }
}

/// Best-effort result of the pre-download metadata probe.
///
/// Absence never aborts a run; the planner falls back to a flat layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMetadata {
    pub title: String,
    pub item_count_hint: Option<u64>,
}

/// Run phases, in the only order they may be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Probing,
    Retrieving,
    Finalizing,
    Done,
    Failed,
}

impl Phase {
    /// Position in the forward-only phase sequence. `Done` and `Failed` are
    /// both terminal and mutually exclusive within one run.
    pub fn rank(&self) -> u8 {
        match self {
            Phase::Init => 0,
            Phase::Probing => 1,
            Phase::Retrieving => 2,
            Phase::Finalizing => 3,
            Phase::Done | Phase::Failed => 4,
        }
    }
}

/// A normalized progress signal delivered to the status sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub phase: Phase,
    pub message: String,
    pub percent: Option<u8>,
}

impl StatusEvent {
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
            percent: None,
        }
    }

    pub fn with_percent(phase: Phase, message: impl Into<String>, percent: u8) -> Self {
        Self {
            phase,
            message: message.into(),
            percent: Some(percent),
        }
    }
}

/// Terminal outcome of one run. Exactly one of these is produced per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    Done { final_dir: PathBuf },
    Failed { message: String },
}

impl RunResult {
    pub fn is_done(&self) -> bool {
        matches!(self, RunResult::Done { .. })
    }

    /// Resolved download folder on success.
    pub fn final_dir(&self) -> Option<&std::path::Path> {
        match self {
            RunResult::Done { final_dir } => Some(final_dir),
            RunResult::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://open.spotify.com/playlist/XYZ", Provider::Spotify)]
    #[case("https://open.spotify.com/album/123", Provider::Spotify)]
    #[case("https://www.youtube.com/playlist?list=ABC", Provider::YouTube)]
    #[case("https://music.youtube.com/playlist?list=ABC", Provider::YouTube)]
    #[case("not a url at all", Provider::YouTube)]
    #[case("", Provider::YouTube)]
    fn classification_is_total(#[case] url: &str, #[case] expected: Provider) {
        assert_eq!(Provider::classify(url), expected);
    }

    #[test]
    fn classification_is_idempotent() {
        let url = "https://open.spotify.com/playlist/XYZ";
        assert_eq!(Provider::classify(url), Provider::classify(url));
    }

    #[test]
    fn request_derives_provider() {
        let request = RetrievalRequest::new("https://open.spotify.com/playlist/XYZ", "/music");
        assert_eq!(request.provider, Provider::Spotify);
        assert_eq!(request.base_dir, PathBuf::from("/music"));
    }

    #[test]
    fn phases_rank_forward() {
        let order = [
            Phase::Init,
            Phase::Probing,
            Phase::Retrieving,
            Phase::Finalizing,
            Phase::Done,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
        assert_eq!(Phase::Done.rank(), Phase::Failed.rank());
    }
}
