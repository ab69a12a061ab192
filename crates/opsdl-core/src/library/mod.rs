//! Local media library: layout and "last synced episode" resolution.
//!
//! Layout: `<root>/<TypeLabel>/Season <year>/<canonical filename>`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::episode::{Episode, FilenamePattern, ProgramType, SyncedEpisode};
use crate::error::{Result, SyncError};

#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
}

impl MediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn season_dir(&self, ty: ProgramType, season: i32) -> PathBuf {
        self.root
            .join(ty.library_label())
            .join(format!("Season {season}"))
    }

    /// Where a finished episode is filed.
    pub fn target_path(&self, episode: &Episode) -> PathBuf {
        self.season_dir(episode.program_type, episode.season)
            .join(episode.canonical_filename())
    }

    /// Finds the synced episode with the highest internal number.
    ///
    /// Looks in the current season directory, or the previous season's if the
    /// current one does not exist. A season directory that exists but holds no
    /// matching files yields the empty value; it does not trigger the fallback.
    pub fn last_synced(&self, ty: ProgramType, current_season: i32) -> Result<SyncedEpisode> {
        for season in [current_season, current_season - 1] {
            let dir = self.season_dir(ty, season);
            if !dir_exists(&dir)? {
                tracing::debug!(kind = %ty, dir = %dir.display(), "season directory absent");
                continue;
            }
            let found = scan_season(&dir, ty, season)?;
            return Ok(found.unwrap_or_else(|| SyncedEpisode::empty(current_season)));
        }
        Ok(SyncedEpisode::empty(current_season))
    }
}

fn dir_exists(dir: &Path) -> Result<bool> {
    dir_presence(dir, fs::metadata(dir).map(|meta| meta.is_dir()))
}

/// `Ok(false)` only when the path truly does not exist; permission and other
/// I/O errors propagate.
fn dir_presence(dir: &Path, lookup: io::Result<bool>) -> Result<bool> {
    match lookup {
        Ok(is_dir) => Ok(is_dir),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SyncError::io(dir, e)),
    }
}

fn scan_season(dir: &Path, ty: ProgramType, season: i32) -> Result<Option<SyncedEpisode>> {
    let pattern = FilenamePattern::new(ty, season);
    let mut best: Option<SyncedEpisode> = None;

    let entries = fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SyncError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(parsed) = pattern.parse(name) else {
            continue;
        };
        let candidate = SyncedEpisode {
            internal_number: parsed.internal_number,
            remote_number: parsed.remote_number,
            season,
        };
        // Only a strictly higher number replaces; ties keep the first seen.
        match best {
            Some(current) if current.internal_number < candidate.internal_number => {
                best = Some(candidate)
            }
            Some(_) => {}
            None => best = Some(candidate),
        }
    }

    if let Some(b) = &best {
        tracing::info!(
            kind = %ty,
            season,
            internal = b.internal_number,
            remote = %b.remote_number,
            "last synced episode"
        );
    }
    Ok(best)
}
