//! Canonical library filenames and their inverse.
//!
//! `<TypeLabel> - s<season>e<internal> - <sanitized title> (<remote>).mp4`

use regex::Regex;

use super::program_type::ProgramType;
use super::remote_number::RemoteNumber;
use super::sanitize::sanitize_title;

pub const VIDEO_EXTENSION: &str = "mp4";

/// Builds the canonical filename. Deterministic in all of its inputs.
pub fn canonical_filename(
    ty: ProgramType,
    season: i32,
    internal_number: u32,
    title: &str,
    remote_number: RemoteNumber,
) -> String {
    format!(
        "{} - s{}e{} - {} ({}).{}",
        ty.library_label(),
        season,
        internal_number,
        sanitize_title(title),
        remote_number,
        VIDEO_EXTENSION
    )
}

/// Fields recovered from a canonical filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub internal_number: u32,
    pub title: String,
    pub remote_number: RemoteNumber,
}

/// Matches canonical filenames for one (type, season) pair.
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    re: Regex,
}

impl FilenamePattern {
    pub fn new(ty: ProgramType, season: i32) -> Self {
        let pattern = format!(
            r"^{} - s{}e(\d+) - (.*) \((\d+(?:\.\d?)?)\)\.{}$",
            regex::escape(ty.library_label()),
            season,
            VIDEO_EXTENSION
        );
        // Built only from escaped labels and integers, so always valid.
        let re = Regex::new(&pattern).unwrap_or_else(|e| unreachable!("filename regex: {e}"));
        Self { re }
    }

    /// Parses `name`; `None` for anything that is not a canonical filename of
    /// this type and season. Zero-padded internal numbers are accepted.
    pub fn parse(&self, name: &str) -> Option<ParsedFilename> {
        let caps = self.re.captures(name)?;
        let internal_number = caps.get(1)?.as_str().parse().ok()?;
        let title = caps.get(2)?.as_str().to_string();
        let remote_number = caps.get(3)?.as_str().parse().ok()?;
        Some(ParsedFilename {
            internal_number,
            title,
            remote_number,
        })
    }
}

/// One-off parse; build a [`FilenamePattern`] when scanning a directory.
pub fn parse_filename(ty: ProgramType, season: i32, name: &str) -> Option<ParsedFilename> {
    FilenamePattern::new(ty, season).parse(name)
}
