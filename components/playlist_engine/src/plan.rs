// components/playlist_engine/src/plan.rs
use std::path::{Path, PathBuf};

use crate::types::{CollectionMetadata, Provider};

/// Where a run writes its files: the expected collection directory plus the
/// per-item output template handed to the retrieval tool.
///
/// Computed once per request and immutable afterwards. The template leaves
/// the collection subfolder to the tool's own placeholder, so `final_dir` is
/// an expectation that finalization checks against the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    pub final_dir: PathBuf,
    pub item_template: String,
}

impl OutputPlan {
    /// Derive the plan from the base directory and the (possibly absent)
    /// probe result. Deterministic: same inputs, same plan.
    pub fn build(
        base_dir: &Path,
        metadata: Option<&CollectionMetadata>,
        provider: Provider,
    ) -> Self {
        let final_dir = match metadata {
            Some(meta) => base_dir.join(sanitize_filename::sanitize(&meta.title)),
            None => base_dir.to_path_buf(),
        };

        let item_template = match provider {
            // Index prefix keeps ordinary playlists collision-free even when
            // two uploads share a title.
            Provider::YouTube => format!(
                "{}/%(playlist_title)s/%(playlist_index)s - %(title)s.%(ext)s",
                base_dir.display()
            ),
            // spotdl resolves {list-title} itself; bare title naming.
            Provider::Spotify => format!(
                "{}/{{list-title}}/{{title}}.{{ext}}",
                base_dir.display()
            ),
        };

        Self {
            final_dir,
            item_template,
        }
    }
}
