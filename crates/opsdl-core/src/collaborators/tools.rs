//! `yt-dlp` and `ffmpeg` wrappers.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::episode::Episode;
use crate::error::{Result, SyncError};

use super::{Downloader, Encoder};

const YTDLP_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]";
const MERGE_FORMAT: &str = "mkv";

/// Runs `cmd`, mapping "binary not found" and non-zero exits to typed errors.
pub(crate) fn run_tool(tool: &str, cmd: &mut Command) -> Result<()> {
    tracing::debug!(tool, "running {:?}", cmd);
    let output = cmd.output().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SyncError::ToolMissing {
            tool: tool.to_string(),
        },
        _ => SyncError::io(tool, e),
    })?;

    if !output.status.success() {
        return Err(SyncError::ToolFailed {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Work-file stem for an episode: stable and free of title characters.
fn work_stem(episode: &Episode) -> String {
    format!(
        "{}-s{}e{}",
        episode.program_type.library_label(),
        episode.season,
        episode.internal_number
    )
}

/// Downloads the DASH manifest with `yt-dlp`, merging into mkv.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: OsString,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlp {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Downloader for YtDlp {
    fn download(&self, episode: &Episode, work_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(work_dir).map_err(|e| SyncError::io(work_dir, e))?;
        let stem = work_stem(episode);
        let template = work_dir.join(format!("{stem}.%(ext)s"));
        let expected = work_dir.join(format!("{stem}.{MERGE_FORMAT}"));

        run_tool(
            "yt-dlp",
            Command::new(&self.program)
                .arg("--no-progress")
                .args(["--merge-output-format", MERGE_FORMAT])
                .args(["-f", YTDLP_FORMAT])
                .arg("-o")
                .arg(&template)
                .arg(&episode.manifest_url),
        )?;

        if !expected.is_file() {
            return Err(SyncError::ToolFailed {
                tool: "yt-dlp".to_string(),
                code: Some(0),
                stderr: format!("expected output {} was not written", expected.display()),
            });
        }
        tracing::info!(file = %expected.display(), "downloaded");
        Ok(expected)
    }
}

/// Stream-copy remux that sets the container title.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: OsString,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Encoder for Ffmpeg {
    fn rewrite_metadata(&self, episode: &Episode, input: &Path) -> Result<PathBuf> {
        let dir = input.parent().unwrap_or_else(|| Path::new("."));
        let output = dir.join(episode.canonical_filename());

        run_tool(
            "ffmpeg",
            Command::new(&self.program)
                .args(["-nostdin", "-y", "-loglevel", "error"])
                .arg("-i")
                .arg(input)
                .args(["-map", "0", "-c", "copy"])
                .arg("-metadata")
                .arg(format!("title={}", episode.title))
                .arg(&output),
        )?;

        if let Err(e) = fs::remove_file(input) {
            tracing::warn!(file = %input.display(), "could not remove intermediate file: {e}");
        }
        Ok(output)
    }
}
