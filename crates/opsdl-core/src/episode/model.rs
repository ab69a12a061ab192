use std::path::PathBuf;

use serde::Serialize;

use super::filename::canonical_filename;
use super::program_type::ProgramType;
use super::remote_number::RemoteNumber;

/// An episode as listed by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEpisodeRef {
    pub program_type: ProgramType,
    pub remote_number: RemoteNumber,
    pub title: String,
    /// Detail page; opening it is what makes the player request its manifest.
    pub catalog_page_url: String,
    /// Empty until the media locator resolves it.
    pub manifest_url: String,
}

impl RemoteEpisodeRef {
    pub fn new(
        program_type: ProgramType,
        remote_number: RemoteNumber,
        title: impl Into<String>,
        catalog_page_url: impl Into<String>,
    ) -> Self {
        Self {
            program_type,
            remote_number,
            title: title.into(),
            catalog_page_url: catalog_page_url.into(),
            manifest_url: String::new(),
        }
    }

    pub fn is_located(&self) -> bool {
        !self.manifest_url.is_empty()
    }
}

/// The newest episode already present in the local library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncedEpisode {
    pub internal_number: u32,
    pub remote_number: RemoteNumber,
    pub season: i32,
}

impl SyncedEpisode {
    /// "Nothing synchronized yet" for the given season.
    pub fn empty(season: i32) -> Self {
        Self {
            internal_number: 0,
            remote_number: RemoteNumber::ZERO,
            season,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.internal_number == 0 && self.remote_number == RemoteNumber::ZERO
    }
}

/// Unit of work handed to the download/encode/file collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    pub program_type: ProgramType,
    pub season: i32,
    pub internal_number: u32,
    pub title: String,
    #[serde(serialize_with = "serialize_display")]
    pub remote_number: RemoteNumber,
    pub catalog_page_url: String,
    pub manifest_url: String,
    /// Set once a collaborator has produced a file; empty before download.
    pub file: Option<PathBuf>,
}

impl Episode {
    pub fn from_ref(r: RemoteEpisodeRef, season: i32, internal_number: u32) -> Self {
        Self {
            program_type: r.program_type,
            season,
            internal_number,
            title: r.title,
            remote_number: r.remote_number,
            catalog_page_url: r.catalog_page_url,
            manifest_url: r.manifest_url,
            file: None,
        }
    }

    pub fn canonical_filename(&self) -> String {
        canonical_filename(
            self.program_type,
            self.season,
            self.internal_number,
            &self.title,
            self.remote_number,
        )
    }
}

fn serialize_display<S>(n: &RemoteNumber, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(n)
}
