//! Remote catalog session: login, backward crawl, and manifest location.
//!
//! A [`CatalogSession`] exclusively owns one browser. All crawl and locate
//! calls run sequentially against it because the page, the search position
//! and the claimed-manifest ledger are shared state. The browser is closed
//! when the session is dropped, on success and error paths alike.

mod crawl;
mod listing;
mod locate;
mod login;

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::browser::{self, Browser, ElementRef, Locator, NetworkRecord, Poll, WaitError};
use crate::control::CancelToken;
use crate::episode::RemoteNumber;
use crate::error::{Result, SyncError};

pub use crawl::finish_crawl;
pub use listing::parse_listing_label;
pub use locate::{descriptor_to_manifest, ManifestLedger, MANIFEST_MARKER};

/// Delays and limits for driving the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause after each UI action.
    pub settle: Duration,
    /// Pause after navigation or search, before reading the page.
    pub page_load: Duration,
    /// Ceiling for waiting on a required element or manifest request.
    pub element_timeout: Duration,
    pub poll_interval: Duration,
    /// Upper bound on backward searches per crawl.
    pub max_search_steps: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            page_load: Duration::from_secs(5),
            element_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(250),
            max_search_steps: 400,
        }
    }
}

/// Where the session is in the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    LoggedOut,
    Authenticating,
    /// Reading the `view`-th listing of the current crawl (0 = landing view).
    Browsing { view: u32 },
    SearchingBackward { probe: RemoteNumber },
    Done,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlState::LoggedOut => f.write_str("logged-out"),
            CrawlState::Authenticating => f.write_str("authenticating"),
            CrawlState::Browsing { view } => write!(f, "browsing(view {view})"),
            CrawlState::SearchingBackward { probe } => write!(f, "searching({probe})"),
            CrawlState::Done => f.write_str("done"),
        }
    }
}

pub struct CatalogSession<B: Browser> {
    browser: B,
    base_url: Url,
    timing: Timing,
    cancel: CancelToken,
    state: CrawlState,
    ledger: ManifestLedger,
}

impl<B: Browser> CatalogSession<B> {
    pub fn new(browser: B, base_url: Url, timing: Timing, cancel: CancelToken) -> Self {
        Self {
            browser,
            base_url,
            timing,
            cancel,
            state: CrawlState::LoggedOut,
            ledger: ManifestLedger::default(),
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Snapshot of everything the browser has logged so far.
    pub fn network_log(&mut self) -> Result<Vec<NetworkRecord>> {
        Ok(self.browser.network_log()?)
    }

    fn transition(&mut self, next: CrawlState) {
        tracing::debug!(from = %self.state, to = %next, "crawl state");
        self.state = next;
    }

    fn library_url(&self) -> Result<Url> {
        self.base_url
            .join("library")
            .map_err(|e| SyncError::Browser(anyhow::anyhow!("library url: {e}")))
    }

    fn settle(&self, delay: Duration) -> Result<()> {
        browser::settle(delay, &self.cancel).map_err(|_| SyncError::Cancelled)
    }

    /// Polls for `locator` until the element timeout; `what` names it in the
    /// error if it never shows up.
    fn wait_for(&mut self, locator: &Locator, what: &str) -> Result<ElementRef> {
        let timeout = self.timing.element_timeout;
        let browser = &mut self.browser;
        let outcome = browser::poll_until(timeout, self.timing.poll_interval, &self.cancel, || {
            browser
                .find(locator)
                .map(|found| found.map_or(Poll::Pending, Poll::Ready))
        });
        match outcome {
            Ok(Ok(el)) => Ok(el),
            Ok(Err(e)) => Err(SyncError::Browser(e)),
            Err(WaitError::TimedOut) => Err(SyncError::ElementMissing {
                what: what.to_string(),
                timeout,
            }),
            Err(WaitError::Cancelled) => Err(SyncError::Cancelled),
        }
    }
}

impl<B: Browser> Drop for CatalogSession<B> {
    fn drop(&mut self) {
        self.browser.close();
    }
}
