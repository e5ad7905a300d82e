// components/playlist_engine/src/controller.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::plan::OutputPlan;
use crate::progress::{parse_line, ParsedLine};
use crate::sink::StatusSink;
use crate::spotdl::SpotdlBackend;
use crate::types::{
    EngineError, Phase, Provider, RetrievalRequest, RunResult, StatusEvent,
};
use crate::ytdlp::YtDlpBackend;

/// Sequences one run: classify, probe, plan, retrieve, finalize.
///
/// `run` never panics and never returns an error to the caller; every outcome
/// is a terminal `RunResult` with exactly one `Done` or `Failed` event behind
/// it.
pub struct Orchestrator {
    youtube: Arc<dyn Backend>,
    spotify: Arc<dyn Backend>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            youtube: Arc::new(YtDlpBackend),
            spotify: Arc::new(SpotdlBackend),
        }
    }

    /// Swap in specific backends (stubs in tests).
    pub fn with_backends(youtube: Arc<dyn Backend>, spotify: Arc<dyn Backend>) -> Self {
        Self { youtube, spotify }
    }

    fn backend_for(&self, provider: Provider) -> Arc<dyn Backend> {
        match provider {
            Provider::YouTube => self.youtube.clone(),
            Provider::Spotify => self.spotify.clone(),
        }
    }

    /// Drive one request to its terminal state, pushing status into `sink`.
    pub async fn run(&self, request: RetrievalRequest, sink: &dyn StatusSink) -> RunResult {
        let mut last_message = None;
        match self.drive(&request, sink, &mut last_message).await {
            Ok(final_dir) => {
                sink.event(StatusEvent::with_percent(
                    Phase::Done,
                    format!("Done. Saved to {}", final_dir.display()),
                    100,
                ));
                RunResult::Done { final_dir }
            }
            Err(error) => {
                warn!(%error, url = %request.url, "run failed");
                // Prefer the last thing the backend said; it names the cause
                // better than the exit status does.
                let message = last_message.unwrap_or_else(|| error.to_string());
                sink.event(StatusEvent::new(Phase::Failed, message.clone()));
                RunResult::Failed { message }
            }
        }
    }

    async fn drive(
        &self,
        request: &RetrievalRequest,
        sink: &dyn StatusSink,
        last_message: &mut Option<String>,
    ) -> Result<PathBuf, EngineError> {
        sink.event(StatusEvent::new(Phase::Init, "Initializing download"));

        tokio::fs::create_dir_all(&request.base_dir).await?;

        let backend = self.backend_for(request.provider);
        backend.check_available().await?;

        sink.event(StatusEvent::new(
            Phase::Probing,
            format!("Analyzing {} collection...", request.provider),
        ));
        let metadata = backend.probe(&request.url).await;
        match &metadata {
            Some(meta) => info!(title = %meta.title, "collection resolved before download"),
            None => info!("no collection metadata, using flat fallback layout"),
        }

        let plan = OutputPlan::build(&request.base_dir, metadata.as_ref(), request.provider);
        let dirs_before = snapshot_subdirs(&request.base_dir).await;

        sink.event(StatusEvent::new(Phase::Retrieving, "Starting retrieval"));

        let (line_tx, mut line_rx) = mpsc::unbounded_channel();
        let worker = {
            let backend = backend.clone();
            let url = request.url.clone();
            let plan = plan.clone();
            tokio::spawn(async move { backend.retrieve(&url, &plan, line_tx).await })
        };

        // The sender lives only in the worker, so this loop drains every
        // produced line before the join below observes the exit.
        while let Some(line) = line_rx.recv().await {
            match parse_line(&line) {
                ParsedLine::Ignored => {}
                ParsedLine::Log | ParsedLine::Machine { .. } => sink.raw_line(&line),
                ParsedLine::Status { message, percent } => {
                    sink.raw_line(&line);
                    *last_message = Some(message.clone());
                    sink.event(StatusEvent {
                        phase: Phase::Retrieving,
                        message,
                        percent,
                    });
                }
            }
        }

        worker
            .await
            .map_err(|e| EngineError::BackendFailed(e.to_string()))??;

        sink.event(StatusEvent::new(Phase::Finalizing, "Resolving download folder"));
        let final_dir = resolve_final_dir(&request.base_dir, &plan, dirs_before).await;
        Ok(final_dir)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the directory to report (and reveal) after a successful run.
///
/// The planned directory wins when it exists. When the plan fell back to the
/// base directory, a single subdirectory created during the run is taken to
/// be the collection folder the tool derived itself. Anything else resolves
/// to the base directory.
async fn resolve_final_dir(
    base_dir: &Path,
    plan: &OutputPlan,
    dirs_before: HashSet<PathBuf>,
) -> PathBuf {
    if plan.final_dir != base_dir {
        if tokio::fs::metadata(&plan.final_dir).await.is_ok() {
            return plan.final_dir.clone();
        }
        return base_dir.to_path_buf();
    }

    let dirs_after = snapshot_subdirs(base_dir).await;
    let mut created = dirs_after.difference(&dirs_before);
    match (created.next(), created.next()) {
        (Some(only), None) => only.clone(),
        _ => base_dir.to_path_buf(),
    }
}

/// Best-effort listing of a directory's immediate subdirectories.
async fn snapshot_subdirs(dir: &Path) -> HashSet<PathBuf> {
    let mut found = HashSet::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return found;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            found.insert(entry.path());
        }
    }
    found
}

/// Entry point owning the one-run-at-a-time guard.
///
/// A second `spawn_run` while a run is active is refused with
/// `RunInProgress`; there is no queue and no cancellation, the active run
/// proceeds to its natural end.
pub struct Engine {
    orchestrator: Arc<Orchestrator>,
    active: Arc<AtomicBool>,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_orchestrator(Orchestrator::new())
    }

    pub fn with_orchestrator(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a run on its own worker task so the caller stays responsive.
    pub fn spawn_run(
        &self,
        request: RetrievalRequest,
        sink: Arc<dyn StatusSink>,
    ) -> Result<JoinHandle<RunResult>, EngineError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::RunInProgress);
        }

        let orchestrator = self.orchestrator.clone();
        let active = self.active.clone();
        Ok(tokio::spawn(async move {
            let result = orchestrator.run(request, sink.as_ref()).await;
            active.store(false, Ordering::SeqCst);
            result
        }))
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::stub::StubBackend;
    use crate::sink::recording::RecordingSink;
    use crate::types::CollectionMetadata;
    use assert_matches::assert_matches;
    use std::time::Duration;
    use tempfile::TempDir;

    fn orchestrator_with_youtube(stub: StubBackend) -> Orchestrator {
        Orchestrator::with_backends(Arc::new(stub), Arc::new(StubBackend::default()))
    }

    fn orchestrator_with_spotify(stub: StubBackend) -> Orchestrator {
        Orchestrator::with_backends(Arc::new(StubBackend::default()), Arc::new(stub))
    }

    #[tokio::test]
    async fn spotify_run_resolves_created_subfolder() {
        let base = TempDir::new().unwrap();
        let stub = StubBackend {
            create_subdir: Some("Road Trip Mix".to_string()),
            lines: vec!["Downloading \"Road Trip Mix\"".to_string()],
            ..Default::default()
        };
        let orchestrator = orchestrator_with_spotify(stub);
        let sink = RecordingSink::default();

        let request = RetrievalRequest::new("https://open.spotify.com/playlist/XYZ", base.path());
        assert_eq!(request.provider, Provider::Spotify);

        let result = orchestrator.run(request, &sink).await;
        assert_eq!(
            result,
            RunResult::Done {
                final_dir: base.path().join("Road Trip Mix")
            }
        );
    }

    #[tokio::test]
    async fn probe_title_places_collection_under_base_dir() {
        let base = TempDir::new().unwrap();
        let stub = StubBackend {
            metadata: Some(CollectionMetadata {
                title: "My Mix".to_string(),
                item_count_hint: Some(5),
            }),
            create_final_dir: true,
            lines: vec![
                "Downloading item one".to_string(),
                "ERROR: unable to download item two, skipping".to_string(),
                "Downloading item three".to_string(),
            ],
            ..Default::default()
        };
        let orchestrator = orchestrator_with_youtube(stub);
        let sink = RecordingSink::default();

        let request =
            RetrievalRequest::new("https://www.youtube.com/playlist?list=ABC", base.path());
        let result = orchestrator.run(request, &sink).await;

        // One broken item does not fail the batch.
        assert_eq!(
            result,
            RunResult::Done {
                final_dir: base.path().join("My Mix")
            }
        );
        let last = sink.events().into_iter().last().unwrap();
        assert_eq!(last.phase, Phase::Done);
        assert_eq!(last.percent, Some(100));
    }

    #[tokio::test]
    async fn failed_probe_falls_back_to_base_dir() {
        let base = TempDir::new().unwrap();
        let stub = StubBackend {
            metadata: None,
            lines: vec!["Downloading something".to_string()],
            ..Default::default()
        };
        let orchestrator = orchestrator_with_youtube(stub);
        let sink = RecordingSink::default();

        let request =
            RetrievalRequest::new("https://www.youtube.com/playlist?list=ABC", base.path());
        let result = orchestrator.run(request, &sink).await;

        assert_eq!(
            result,
            RunResult::Done {
                final_dir: base.path().to_path_buf()
            }
        );
    }

    #[tokio::test]
    async fn backend_failure_ends_in_failed_and_never_done() {
        let base = TempDir::new().unwrap();
        let stub = StubBackend {
            lines: vec!["Downloading doomed item".to_string()],
            failure: Some("exit status 1".to_string()),
            ..Default::default()
        };
        let orchestrator = orchestrator_with_spotify(stub);
        let sink = RecordingSink::default();

        let request = RetrievalRequest::new("https://open.spotify.com/playlist/XYZ", base.path());
        let result = orchestrator.run(request, &sink).await;

        assert_matches!(result, RunResult::Failed { message } => {
            // The last backend message names the cause.
            assert_eq!(message, "doomed item");
        });

        let events = sink.events();
        let last = events.last().unwrap();
        assert_eq!(last.phase, Phase::Failed);
        assert!(events.iter().all(|e| e.phase != Phase::Done));
    }

    #[tokio::test]
    async fn phases_never_regress() {
        let base = TempDir::new().unwrap();
        let stub = StubBackend {
            lines: vec![
                "Downloading one".to_string(),
                "".to_string(),
                "[download] machine noise".to_string(),
                "Downloading two".to_string(),
            ],
            ..Default::default()
        };
        let orchestrator = orchestrator_with_youtube(stub);
        let sink = RecordingSink::default();

        let request = RetrievalRequest::new("https://youtube.com/playlist?list=A", base.path());
        orchestrator.run(request, &sink).await;

        let events = sink.events();
        assert_eq!(events.first().unwrap().phase, Phase::Init);
        for pair in events.windows(2) {
            assert!(
                pair[0].phase.rank() <= pair[1].phase.rank(),
                "phase regressed: {:?} -> {:?}",
                pair[0].phase,
                pair[1].phase
            );
        }
    }

    #[tokio::test]
    async fn raw_log_keeps_machine_lines_but_drops_blank_ones() {
        let base = TempDir::new().unwrap();
        let stub = StubBackend {
            lines: vec![
                "".to_string(),
                "Downloading [1/2] item 50%".to_string(),
                "plain log line".to_string(),
            ],
            ..Default::default()
        };
        let orchestrator = orchestrator_with_youtube(stub);
        let sink = RecordingSink::default();

        let request = RetrievalRequest::new("https://youtube.com/playlist?list=A", base.path());
        orchestrator.run(request, &sink).await;

        let raw = sink.raw_lines();
        assert_eq!(
            raw,
            vec![
                "Downloading [1/2] item 50%".to_string(),
                "plain log line".to_string(),
            ]
        );
        // Machine-formatted progress stays out of the human-facing status.
        assert!(sink
            .events()
            .iter()
            .all(|e| !e.message.contains("[1/2]")));
    }

    #[tokio::test]
    async fn engine_refuses_second_concurrent_run() {
        let base = TempDir::new().unwrap();
        let stub = StubBackend {
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        };
        let engine = Engine::with_orchestrator(orchestrator_with_youtube(stub));

        let request = RetrievalRequest::new("https://youtube.com/playlist?list=A", base.path());
        let sink: Arc<dyn StatusSink> = Arc::new(RecordingSink::default());

        let first = engine
            .spawn_run(request.clone(), sink.clone())
            .expect("first run should start");
        assert!(engine.is_active());

        let second = engine.spawn_run(request.clone(), sink.clone());
        assert_matches!(second, Err(EngineError::RunInProgress));

        first.await.unwrap();
        assert!(!engine.is_active());

        // Guard clears once the run finishes, a new run may start.
        let third = engine.spawn_run(request, sink);
        assert!(third.is_ok());
        third.unwrap().await.unwrap();
    }
}
