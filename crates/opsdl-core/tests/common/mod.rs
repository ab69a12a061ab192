#![allow(dead_code)]

pub mod fake_site;

use std::time::Duration;

use opsdl_core::catalog::{CatalogSession, Timing};
use opsdl_core::control::CancelToken;
use url::Url;

use fake_site::{FakeSite, BASE_URL};

/// No settle delays, short element timeout, generous search cap.
pub fn fast_timing() -> Timing {
    Timing {
        settle: Duration::ZERO,
        page_load: Duration::ZERO,
        element_timeout: Duration::from_millis(30),
        poll_interval: Duration::from_millis(1),
        max_search_steps: 100,
    }
}

pub fn base_url() -> Url {
    Url::parse(BASE_URL).unwrap()
}

pub fn session(site: FakeSite, timing: Timing) -> CatalogSession<FakeSite> {
    CatalogSession::new(site, base_url(), timing, CancelToken::new())
}
