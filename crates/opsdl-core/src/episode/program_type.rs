//! Program (content) types offered by the catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of catalog content categories.
///
/// `Unknown` is a sentinel for "not yet assigned"; it never appears in the
/// config file and never reaches the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProgramType {
    #[serde(rename = "QA")]
    Qa,
    #[serde(rename = "CLASS")]
    Class,
    #[default]
    #[serde(skip)]
    Unknown,
}

impl ProgramType {
    /// Types that can actually be synced.
    pub const ALL: [ProgramType; 2] = [ProgramType::Qa, ProgramType::Class];

    /// Label the catalog prints in front of the episode number ("Q&A 265.4").
    pub fn catalog_label(self) -> Option<&'static str> {
        match self {
            ProgramType::Qa => Some("Q&A"),
            ProgramType::Class => Some("Class"),
            ProgramType::Unknown => None,
        }
    }

    /// Maps a catalog label back to a type. Unrecognized labels are `None`;
    /// callers treat that as a site contract change rather than guessing.
    pub fn from_catalog_label(label: &str) -> Option<ProgramType> {
        match label {
            "Q&A" => Some(ProgramType::Qa),
            "Class" => Some(ProgramType::Class),
            _ => None,
        }
    }

    /// Directory and filename prefix in the local library.
    pub fn library_label(self) -> &'static str {
        match self {
            ProgramType::Qa => "QA",
            ProgramType::Class => "Class",
            ProgramType::Unknown => "Unknown",
        }
    }

    /// Parses the config/CLI spelling (`QA`, `CLASS`, case-insensitive).
    pub fn from_config_name(name: &str) -> Option<ProgramType> {
        if name.eq_ignore_ascii_case("qa") {
            Some(ProgramType::Qa)
        } else if name.eq_ignore_ascii_case("class") {
            Some(ProgramType::Class)
        } else {
            None
        }
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.library_label())
    }
}
