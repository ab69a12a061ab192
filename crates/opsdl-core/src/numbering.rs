//! Sequential internal numbering with season rollover.

use crate::episode::{Episode, RemoteEpisodeRef, SyncedEpisode};

/// Assigns internal numbers to `discovered` in the order given.
///
/// Continues from `prior.internal_number + 1` when `prior` belongs to
/// `current_season`; otherwise the season rolled over and numbering restarts
/// at 1. `discovered` is expected to be sorted ascending by remote number,
/// which is the order the crawler produces.
pub fn assign_internal_numbers(
    discovered: Vec<RemoteEpisodeRef>,
    prior: &SyncedEpisode,
    current_season: i32,
) -> Vec<Episode> {
    let first = if prior.season == current_season {
        prior.internal_number + 1
    } else {
        tracing::info!(
            from = prior.season,
            to = current_season,
            "new season; numbering restarts at 1"
        );
        1
    };

    discovered
        .into_iter()
        .zip(first..)
        .map(|(r, internal)| Episode::from_ref(r, current_season, internal))
        .collect()
}
