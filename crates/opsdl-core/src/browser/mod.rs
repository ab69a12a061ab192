//! Browser automation as a narrow capability.
//!
//! The crawler and the media locator only talk to [`Browser`]; the Chrome
//! implementation lives in [`chrome`] and tests substitute an in-memory site.
//! Element handles are opaque and only valid for the page that produced them.

pub mod chrome;
pub mod wait;

use serde::{Deserialize, Serialize};

pub use chrome::{ChromeOptions, ChromeSession};
pub use wait::{poll_until, settle, Poll, WaitError};

/// How to find an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
    /// `name` attribute of a form field.
    Name(String),
    /// Any element whose text contains the given string.
    Text(String),
}

impl Locator {
    pub fn css(s: impl Into<String>) -> Self {
        Locator::Css(s.into())
    }

    pub fn xpath(s: impl Into<String>) -> Self {
        Locator::XPath(s.into())
    }

    pub fn name(s: impl Into<String>) -> Self {
        Locator::Name(s.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Locator::Text(s.into())
    }
}

/// Opaque handle to an element on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub u32);

/// Method name of the CDP event emitted for an outgoing request.
pub const REQUEST_WILL_BE_SENT: &str = "Network.requestWillBeSent";

/// One entry of the browser's network-event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    /// Event method, e.g. [`REQUEST_WILL_BE_SENT`].
    pub method: String,
    pub url: String,
}

impl NetworkRecord {
    pub fn request(url: impl Into<String>) -> Self {
        Self {
            method: REQUEST_WILL_BE_SENT.to_string(),
            url: url.into(),
        }
    }

    pub fn is_outgoing_request(&self) -> bool {
        self.method == REQUEST_WILL_BE_SENT
    }
}

/// Everything the sync needs from a browser session.
///
/// Lookups never wait: `find*` return `None`/empty when nothing matches yet,
/// and callers wrap them in [`poll_until`] where the UI may still be
/// rendering. Errors mean the driver itself failed.
pub trait Browser {
    fn navigate(&mut self, url: &str) -> anyhow::Result<()>;

    fn find(&mut self, locator: &Locator) -> anyhow::Result<Option<ElementRef>>;

    fn find_all(&mut self, locator: &Locator) -> anyhow::Result<Vec<ElementRef>>;

    fn find_in(&mut self, scope: ElementRef, locator: &Locator)
        -> anyhow::Result<Option<ElementRef>>;

    fn find_all_in(&mut self, scope: ElementRef, locator: &Locator)
        -> anyhow::Result<Vec<ElementRef>>;

    fn click(&mut self, element: ElementRef) -> anyhow::Result<()>;

    fn clear(&mut self, element: ElementRef) -> anyhow::Result<()>;

    fn type_text(&mut self, element: ElementRef, text: &str) -> anyhow::Result<()>;

    /// Presses Enter in the focused element.
    fn press_enter(&mut self) -> anyhow::Result<()>;

    fn text(&mut self, element: ElementRef) -> anyhow::Result<String>;

    fn attribute(&mut self, element: ElementRef, name: &str) -> anyhow::Result<Option<String>>;

    /// The full network-event log since the session started. Grows over time
    /// and may contain repeated requests.
    fn network_log(&mut self) -> anyhow::Result<Vec<NetworkRecord>>;

    /// Releases the underlying browser. Must be idempotent.
    fn close(&mut self);
}
