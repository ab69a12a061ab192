//! Backward crawl: list, search for the previous number, repeat.

use crate::browser::{Browser, Locator};
use crate::episode::{ProgramType, RemoteEpisodeRef, RemoteNumber};
use crate::error::{Result, SyncError};

use super::{CatalogSession, CrawlState};

const SEARCH_INPUT: &str = ".//input[@type=\"text\"]";

impl<B: Browser> CatalogSession<B> {
    /// Finds every episode of type `ty` newer than `threshold`, oldest first.
    ///
    /// Starts from the library landing view (newest episodes) and keeps
    /// searching for the number just below the lowest one seen until that
    /// lowest number is at or below `threshold`. Each probe is strictly lower
    /// than the previous one, and the number of searches is capped by
    /// `Timing::max_search_steps`. If no entry of `ty` is listed, one search
    /// for the type's catalog label narrows the view first; still finding
    /// none is [`SyncError::NoEntriesOfType`].
    pub fn discover(
        &mut self,
        ty: ProgramType,
        threshold: RemoteNumber,
    ) -> Result<Vec<RemoteEpisodeRef>> {
        tracing::info!(kind = %ty, after = %threshold, "discovering new episodes");
        let library = self.library_url()?;
        self.browser.navigate(library.as_str())?;
        self.settle(self.timing.page_load)?;

        let mut found: Vec<RemoteEpisodeRef> = Vec::new();
        let mut last_probe: Option<RemoteNumber> = None;
        let mut narrowed = false;
        let mut steps = 0u32;
        let mut view = 0u32;

        loop {
            self.transition(CrawlState::Browsing { view });
            let page = self.visible_episodes(ty)?;
            tracing::debug!(kind = %ty, view, count = page.len(), "view read");
            found.extend(page);

            let Some(lowest) = found.iter().map(|e| e.remote_number).min() else {
                // The landing view can be filled by the other type; narrow the
                // listing to this type's label once before giving up.
                let label = ty.catalog_label().unwrap_or_default().to_string();
                if narrowed || label.is_empty() {
                    return Err(SyncError::NoEntriesOfType { kind: ty, label });
                }
                tracing::debug!(kind = %ty, label = %label, "no entries of this type visible; narrowing");
                self.submit_search(&label)?;
                narrowed = true;
                view += 1;
                continue;
            };
            if lowest <= threshold {
                break;
            }

            // Searching for a number that is not listed leaves the lowest seen
            // unchanged; step below the last probe so the walk keeps moving.
            let probe = match (lowest.previous(), last_probe) {
                (Some(candidate), Some(prev)) if candidate >= prev => prev.previous(),
                (candidate, _) => candidate,
            };
            let Some(probe) = probe else {
                tracing::debug!(kind = %ty, "reached the start of the catalog");
                break;
            };
            if steps >= self.timing.max_search_steps {
                return Err(SyncError::SearchLimitExceeded {
                    steps,
                    lowest,
                    threshold,
                });
            }

            steps += 1;
            self.search(probe)?;
            last_probe = Some(probe);
            view += 1;
        }

        self.transition(CrawlState::Done);
        let out = finish_crawl(found, threshold);
        tracing::info!(kind = %ty, count = out.len(), searches = steps, "discovery done");
        Ok(out)
    }

    /// Types `probe` into the catalog search box and submits it.
    pub fn search(&mut self, probe: RemoteNumber) -> Result<()> {
        self.transition(CrawlState::SearchingBackward { probe });
        tracing::debug!(probe = %probe, "searching");
        self.submit_search(&probe.to_string())
    }

    fn submit_search(&mut self, query: &str) -> Result<()> {
        let input = self.wait_for(&Locator::xpath(SEARCH_INPUT), "search input")?;
        self.browser.clear(input)?;
        self.browser.type_text(input, query)?;
        self.browser.press_enter()?;
        self.settle(self.timing.page_load)?;
        Ok(())
    }
}

/// Keeps entries strictly newer than `threshold`, sorted ascending by remote
/// number. An episode seen on several views is kept once (first sighting).
pub fn finish_crawl(
    mut found: Vec<RemoteEpisodeRef>,
    threshold: RemoteNumber,
) -> Vec<RemoteEpisodeRef> {
    found.retain(|e| e.remote_number > threshold);
    found.sort_by_key(|e| e.remote_number);
    found.dedup_by_key(|e| e.remote_number);
    found
}
