// bases/playlist_cli/src/app.rs
use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use playlist_engine::{Engine, RetrievalRequest, RunResult, StatusSink};
use settings_store::{Settings, SettingsStore};
use tracing::warn;

use crate::args::Args;
use crate::output::ConsoleSink;

pub struct App {
    args: Args,
}

impl App {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    pub async fn run(&self) -> Result<()> {
        let store = SettingsStore::new(&self.args.settings_file);
        let base_dir = self.resolve_base_dir(&store)?;

        // Remember the folder before the run so the next invocation can
        // default to it even if this run fails.
        if let Err(error) = store.save(&Settings {
            last_folder: base_dir.display().to_string(),
        }) {
            warn!(%error, "could not persist last used folder");
        }

        let engine = Engine::new();
        let request = RetrievalRequest::new(self.args.url.clone(), base_dir);
        let sink: Arc<dyn StatusSink> = Arc::new(ConsoleSink::new(self.args.verbose));

        let handle = engine.spawn_run(request, sink)?;
        match handle.await? {
            RunResult::Done { final_dir } => {
                if !self.args.no_reveal {
                    folder_reveal::reveal(&final_dir);
                }
                Ok(())
            }
            RunResult::Failed { message } => Err(eyre!(message)),
        }
    }

    fn resolve_base_dir(&self, store: &SettingsStore) -> Result<PathBuf> {
        if let Some(dir) = &self.args.output_dir {
            return Ok(dir.clone());
        }

        let settings = store.load().unwrap_or_else(|error| {
            warn!(%error, "could not read settings, ignoring them");
            Settings::default()
        });
        if settings.last_folder.is_empty() {
            return Err(eyre!(
                "no output directory given and no previously used folder on record; \
                 pass --output-dir"
            ));
        }
        Ok(PathBuf::from(settings.last_folder))
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.args.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}
