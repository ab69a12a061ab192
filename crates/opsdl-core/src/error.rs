//! Error taxonomy for a sync run.
//!
//! Contract violations (the remote site no longer looks the way the crawler
//! expects) are distinct variants so the CLI can print exactly which element
//! or condition was missing. Nothing in the core terminates the process;
//! callers decide what a failure means.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::episode::{ProgramType, RemoteNumber};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("timed out after {timeout:?} waiting for {what}")]
    ElementMissing { what: String, timeout: Duration },

    #[error("library link not found on {url}; the site layout changed")]
    LibraryEntryMissing { url: String },

    #[error("listing item has {found} text spans, expected exactly 2 (title, type/number)")]
    MalformedListing { found: usize },

    #[error("listing label {0:?} does not look like '<type> <number>'")]
    UnparseableLabel(String),

    #[error("unknown catalog type label {0:?}")]
    UnknownTypeLabel(String),

    #[error("no {kind} entries listed, not even after searching for {label:?}")]
    NoEntriesOfType { kind: ProgramType, label: String },

    #[error("listing item {title:?} has no link to its episode page")]
    MissingEpisodeLink { title: String },

    #[error("no unclaimed manifest request ({marker}) seen for {title:?} at {page_url}")]
    ManifestNotFound {
        title: String,
        page_url: String,
        marker: &'static str,
    },

    #[error(
        "backward search gave up after {steps} steps; lowest seen {lowest} is still above {threshold}"
    )]
    SearchLimitExceeded {
        steps: u32,
        lowest: RemoteNumber,
        threshold: RemoteNumber,
    },

    #[error("sync cancelled")]
    Cancelled,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external tool is missing: {tool}")]
    ToolMissing { tool: String },

    #[error("external tool failed: {tool} (code={code:?}) {stderr}")]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Driver-level failure (CDP connection lost, navigation error, ...).
    #[error(transparent)]
    Browser(#[from] anyhow::Error),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the variants that mean the remote site changed shape.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            SyncError::ElementMissing { .. }
                | SyncError::LibraryEntryMissing { .. }
                | SyncError::MalformedListing { .. }
                | SyncError::UnparseableLabel(_)
                | SyncError::UnknownTypeLabel(_)
                | SyncError::NoEntriesOfType { .. }
                | SyncError::MissingEpisodeLink { .. }
                | SyncError::ManifestNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
