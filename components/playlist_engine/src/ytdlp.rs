// components/playlist_engine/src/ytdlp.rs
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::info;
use url::Url;

use crate::backend::{pump_child, Backend};
use crate::plan::OutputPlan;
use crate::types::{CollectionMetadata, EngineError};

/// The probe-capable backend, driving yt-dlp.
///
/// yt-dlp enumerates playlist entries itself and, with `--ignore-errors`,
/// skips past items it cannot fetch; a partly-broken playlist still downloads
/// the rest and exits successfully.
pub struct YtDlpBackend;

#[async_trait]
impl Backend for YtDlpBackend {
    async fn check_available(&self) -> Result<(), EngineError> {
        which::which("yt-dlp")
            .map(|_| ())
            .map_err(|_| EngineError::DependencyNotFound("yt-dlp"))
    }

    async fn probe(&self, url: &str) -> Option<CollectionMetadata> {
        let output = Command::new("yt-dlp")
            .arg("--flat-playlist")
            .arg("--dump-single-json")
            .arg("--no-download")
            .arg(url)
            .stdin(Stdio::null())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            info!(%url, "playlist probe failed, continuing without metadata");
            return None;
        }

        let probed: PlaylistProbe = serde_json::from_slice(&output.stdout).ok()?;
        let title = probed.title?;
        info!(%title, "resolved playlist metadata");
        Some(CollectionMetadata {
            title,
            item_count_hint: probed.playlist_count,
        })
    }

    async fn retrieve(
        &self,
        url: &str,
        plan: &OutputPlan,
        lines: mpsc::UnboundedSender<String>,
    ) -> Result<(), EngineError> {
        let url = Url::parse(url).map_err(|e| EngineError::InvalidUrl(e.to_string()))?;

        let child = Command::new("yt-dlp")
            .arg("--format")
            .arg("bestaudio/best")
            .arg("--extract-audio")
            .arg("--audio-format")
            .arg("mp3")
            .arg("--audio-quality")
            .arg("320K")
            .arg("--ignore-errors")
            .arg("--newline")
            .arg("--output")
            .arg(&plan.item_template)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let status = pump_child(child, lines).await?;
        if !status.success() {
            return Err(EngineError::BackendFailed(format!(
                "yt-dlp exited with status: {}",
                status
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistProbe {
    title: Option<String>,
    playlist_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_json_parses_title_and_count() {
        let raw = r#"{"title": "My Mix", "playlist_count": 5, "entries": []}"#;
        let probed: PlaylistProbe = serde_json::from_str(raw).unwrap();
        assert_eq!(probed.title.as_deref(), Some("My Mix"));
        assert_eq!(probed.playlist_count, Some(5));
    }

    #[test]
    fn probe_json_tolerates_missing_fields() {
        let probed: PlaylistProbe = serde_json::from_str("{}").unwrap();
        assert!(probed.title.is_none());
        assert!(probed.playlist_count.is_none());
    }
}
