//! Media locator: find each episode's manifest request in the network log.

use std::collections::HashSet;

use crate::browser::{self, Browser, Locator, NetworkRecord, Poll, WaitError};
use crate::episode::RemoteEpisodeRef;
use crate::error::{Result, SyncError};

use super::CatalogSession;

/// Substring identifying the player's manifest-descriptor request.
pub const MANIFEST_MARKER: &str = "master.json";

const DESCRIPTOR_QUERY: &str = ".json?base64_init=1";
const MANIFEST_SUFFIX: &str = ".mpd?";

/// Manifest URLs already handed out during this session.
///
/// The player re-requests descriptors and earlier episodes' requests stay
/// in the log, so a URL is claimed at most once. Scanning resumes after the
/// last match; the claimed set still guards against replays.
#[derive(Debug, Default)]
pub struct ManifestLedger {
    claimed: HashSet<String>,
    next_index: usize,
}

impl ManifestLedger {
    /// Claims the first unclaimed manifest request in `log`, if any.
    pub fn claim_next(&mut self, log: &[NetworkRecord]) -> Option<String> {
        // A shorter log means a different browser; rescan from the top.
        let start = if self.next_index > log.len() {
            0
        } else {
            self.next_index
        };
        for (i, record) in log.iter().enumerate().skip(start) {
            if !record.is_outgoing_request() || !record.url.contains(MANIFEST_MARKER) {
                continue;
            }
            if self.claimed.contains(&record.url) {
                continue;
            }
            self.claimed.insert(record.url.clone());
            self.next_index = i + 1;
            return Some(record.url.clone());
        }
        None
    }

    pub fn is_claimed(&self, url: &str) -> bool {
        self.claimed.contains(url)
    }

    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }
}

/// Rewrites the descriptor URL into the playable DASH manifest URL.
pub fn descriptor_to_manifest(url: &str) -> String {
    if url.contains(DESCRIPTOR_QUERY) {
        url.replacen(DESCRIPTOR_QUERY, MANIFEST_SUFFIX, 1)
    } else {
        url.replacen(MANIFEST_MARKER, "master.mpd", 1)
    }
}

impl<B: Browser> CatalogSession<B> {
    /// Opens the episode page, starts the player, and fills in
    /// `episode.manifest_url` from the first unclaimed manifest request.
    pub fn locate(&mut self, episode: &mut RemoteEpisodeRef) -> Result<()> {
        tracing::info!(remote = %episode.remote_number, title = %episode.title, "locating manifest");

        self.browser.navigate(&episode.catalog_page_url)?;
        self.settle(self.timing.page_load)?;

        let iframe = self.wait_for(&Locator::css("iframe"), "player iframe")?;
        self.browser.click(iframe)?;
        self.settle(self.timing.page_load)?;

        let browser = &mut self.browser;
        let ledger = &mut self.ledger;
        let outcome = browser::poll_until(
            self.timing.element_timeout,
            self.timing.poll_interval,
            &self.cancel,
            || {
                let log = browser.network_log()?;
                Ok::<_, anyhow::Error>(ledger.claim_next(&log).map_or(Poll::Pending, Poll::Ready))
            },
        );
        let descriptor = match outcome {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => return Err(SyncError::Browser(e)),
            Err(WaitError::TimedOut) => {
                return Err(SyncError::ManifestNotFound {
                    title: episode.title.clone(),
                    page_url: episode.catalog_page_url.clone(),
                    marker: MANIFEST_MARKER,
                })
            }
            Err(WaitError::Cancelled) => return Err(SyncError::Cancelled),
        };

        episode.manifest_url = descriptor_to_manifest(&descriptor);
        tracing::debug!(manifest = %episode.manifest_url, "manifest located");
        Ok(())
    }
}
