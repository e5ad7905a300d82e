// components/playlist_engine/src/backend.rs
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;

use crate::plan::OutputPlan;
use crate::types::{CollectionMetadata, EngineError};

/// A retrieval backend for one provider.
///
/// The two implementations differ deliberately: the YouTube side has a cheap
/// metadata probe and per-item failure tolerance, the Spotify side is an
/// opaque external tool with neither. That asymmetry mirrors what the
/// underlying tools actually offer.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Check that the backend's external tool is installed.
    async fn check_available(&self) -> Result<(), EngineError>;

    /// Best-effort metadata lookup before downloading. Every failure mode
    /// collapses to `None`; a failed probe never fails a run.
    async fn probe(&self, url: &str) -> Option<CollectionMetadata>;

    /// Retrieve the whole collection, pushing raw output lines through
    /// `lines` in production order. Returns once the underlying tool
    /// terminates; a non-zero exit becomes `BackendFailed`.
    async fn retrieve(
        &self,
        url: &str,
        plan: &OutputPlan,
        lines: mpsc::UnboundedSender<String>,
    ) -> Result<(), EngineError>;
}

/// Forward a child's stdout and stderr to `lines` and wait for it to exit.
///
/// Reader tasks are joined after the exit so every produced line is delivered
/// before the status is reported.
pub(crate) async fn pump_child(
    mut child: Child,
    lines: mpsc::UnboundedSender<String>,
) -> Result<std::process::ExitStatus, EngineError> {
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(tokio::spawn(forward_lines(stdout, lines.clone())));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(tokio::spawn(forward_lines(stderr, lines)));
    }

    let status = child.wait().await?;
    for reader in readers {
        let _ = reader.await;
    }
    Ok(status)
}

async fn forward_lines<R>(reader: R, lines: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut stream = BufReader::new(reader).lines();
    while let Ok(Some(line)) = stream.next_line().await {
        if lines.send(line).is_err() {
            // Receiver went away; nothing left to report to.
            break;
        }
    }
}
