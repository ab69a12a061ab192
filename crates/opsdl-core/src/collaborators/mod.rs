//! Hand-off to the steps after discovery: download, metadata rewrite, filing.
//!
//! The pipeline only depends on these traits. The default implementations
//! shell out to `yt-dlp` and `ffmpeg` and move files into the library.

mod filer;
mod tools;

use std::path::{Path, PathBuf};

use crate::episode::Episode;
use crate::error::Result;

pub use filer::SeasonFiler;
pub use tools::{Ffmpeg, YtDlp};

/// Fetches an episode's manifest into a local file under `work_dir`.
pub trait Downloader {
    fn download(&self, episode: &Episode, work_dir: &Path) -> Result<PathBuf>;
}

/// Rewrites container metadata (title) of `input`; returns the new file.
pub trait Encoder {
    fn rewrite_metadata(&self, episode: &Episode, input: &Path) -> Result<PathBuf>;
}

/// Moves a finished file to its final place; returns that path.
pub trait Filer {
    fn file(&self, episode: &Episode, input: &Path) -> Result<PathBuf>;
}
