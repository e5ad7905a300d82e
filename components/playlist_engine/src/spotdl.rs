// components/playlist_engine/src/spotdl.rs
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use crate::backend::{pump_child, Backend};
use crate::plan::OutputPlan;
use crate::types::{CollectionMetadata, EngineError};

/// The probe-less backend, driving the spotdl executable.
///
/// spotdl has no cheap metadata-only mode, so `probe` always reports absent
/// and the collection folder is only known after the tool has created it.
pub struct SpotdlBackend;

#[async_trait]
impl Backend for SpotdlBackend {
    async fn check_available(&self) -> Result<(), EngineError> {
        which::which("spotdl")
            .map(|_| ())
            .map_err(|_| EngineError::DependencyNotFound("spotdl"))
    }

    async fn probe(&self, url: &str) -> Option<CollectionMetadata> {
        debug!(%url, "spotdl has no metadata probe, skipping");
        None
    }

    async fn retrieve(
        &self,
        url: &str,
        plan: &OutputPlan,
        lines: mpsc::UnboundedSender<String>,
    ) -> Result<(), EngineError> {
        let url = Url::parse(url).map_err(|e| EngineError::InvalidUrl(e.to_string()))?;

        let child = Command::new("spotdl")
            .arg("download")
            .arg(url.as_str())
            .arg("--output")
            .arg(&plan.item_template)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let status = pump_child(child, lines).await?;
        if !status.success() {
            return Err(EngineError::BackendFailed(format!(
                "spotdl exited with status: {}",
                status
            )));
        }
        Ok(())
    }
}
