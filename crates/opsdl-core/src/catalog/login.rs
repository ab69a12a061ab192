use crate::browser::{Browser, Locator};
use crate::config::Credentials;
use crate::error::{Result, SyncError};

use super::{CatalogSession, CrawlState};

const LIBRARY_LINK: &str = ".//a[contains(@href,'/library')]";
const OPEN_LOGIN: &str = "Log In";
const SUBMIT_LOGIN: &str = "Log in";

impl<B: Browser> CatalogSession<B> {
    /// Logs in through the library page's login form.
    ///
    /// A missing library link means the landing page changed; that is
    /// reported as [`SyncError::LibraryEntryMissing`], not as a timeout.
    pub fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        self.transition(CrawlState::Authenticating);
        tracing::info!("logging in to {}", self.base_url);

        let base = self.base_url.to_string();
        self.browser.navigate(&base)?;
        self.settle(self.timing.settle)?;

        match self.wait_for(&Locator::xpath(LIBRARY_LINK), "library link") {
            Ok(_) => {}
            Err(SyncError::ElementMissing { .. }) => {
                return Err(SyncError::LibraryEntryMissing { url: base });
            }
            Err(e) => return Err(e),
        }

        let library = self.library_url()?;
        self.browser.navigate(library.as_str())?;
        self.settle(self.timing.settle)?;

        let open = self.wait_for(&Locator::text(OPEN_LOGIN), "login button")?;
        self.browser.click(open)?;
        self.settle(self.timing.settle)?;

        tracing::debug!("entering email");
        let email = self.wait_for(&Locator::name("email"), "email field")?;
        self.browser.type_text(email, &credentials.email)?;
        self.settle(self.timing.settle)?;

        tracing::debug!("entering password");
        let password = self.wait_for(&Locator::name("password"), "password field")?;
        self.browser.type_text(password, credentials.password())?;
        self.settle(self.timing.settle)?;

        let submit = self.wait_for(&Locator::text(SUBMIT_LOGIN), "login submit button")?;
        self.browser.click(submit)?;
        self.settle(self.timing.settle)?;
        self.settle(self.timing.page_load)?;

        tracing::info!("logged in");
        self.transition(CrawlState::Browsing { view: 0 });
        Ok(())
    }
}
