// bases/playlist_cli/src/args.rs
use clap::Parser;
use std::path::PathBuf;

/// Download a whole playlist or album into a per-collection folder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Playlist or album URL (Spotify or YouTube)
    pub url: String,

    /// Base directory for downloads; defaults to the last used folder
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print every line of backend output
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not open the download folder when finished
    #[arg(long)]
    pub no_reveal: bool,

    /// Settings file holding the last used folder
    #[arg(long, default_value = "settings.json")]
    pub settings_file: PathBuf,
}
