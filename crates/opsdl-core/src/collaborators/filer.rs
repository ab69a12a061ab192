use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::episode::Episode;
use crate::error::{Result, SyncError};
use crate::library::MediaLibrary;

use super::Filer;

/// Files episodes into `<root>/<Type>/Season <year>/<canonical filename>`.
#[derive(Debug, Clone)]
pub struct SeasonFiler {
    library: MediaLibrary,
}

impl SeasonFiler {
    pub fn new(library: MediaLibrary) -> Self {
        Self { library }
    }
}

impl Filer for SeasonFiler {
    fn file(&self, episode: &Episode, input: &Path) -> Result<PathBuf> {
        let target = self.library.target_path(episode);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        move_file(input, &target)?;
        tracing::info!(file = %target.display(), "filed");
        Ok(target)
    }
}

/// Rename, falling back to copy + remove when crossing filesystems.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SyncError::io(from, e)),
        Err(_) => {
            fs::copy(from, to).map_err(|e| SyncError::io(to, e))?;
            fs::remove_file(from).map_err(|e| SyncError::io(from, e))
        }
    }
}
