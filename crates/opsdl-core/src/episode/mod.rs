//! Episode identity and the filename <-> identity mapping.
//!
//! Remote identity (catalog number, page link, manifest) and local identity
//! (season + sequential internal number) meet here. The canonical filename
//! is produced from an [`Episode`] and parsed back into a [`SyncedEpisode`]
//! by the library scanner, so both directions live in one place.

mod filename;
mod model;
mod program_type;
mod remote_number;
mod sanitize;

pub use filename::{
    canonical_filename, parse_filename, FilenamePattern, ParsedFilename, VIDEO_EXTENSION,
};
pub use model::{Episode, RemoteEpisodeRef, SyncedEpisode};
pub use program_type::ProgramType;
pub use remote_number::{ParseRemoteNumberError, RemoteNumber};
pub use sanitize::sanitize_title;

/// Season used for "now": the current calendar year in local time.
pub fn current_season() -> i32 {
    use chrono::Datelike;
    chrono::Local::now().year()
}
