//! Headless Chrome implementation of [`Browser`] over CDP.
//!
//! Network events are captured by a listener registered on the tab and
//! appended to a shared log, which is what [`Browser::network_log`] replays.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{anyhow, Context};
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Network;
use headless_chrome::{Element, LaunchOptions, Tab};

use super::{Browser, ElementRef, Locator, NetworkRecord, REQUEST_WILL_BE_SENT};

/// Launch parameters for the Chrome process.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub window_size: (u32, u32),
    /// Off only where Chrome cannot create its sandbox (root in a container).
    pub sandbox: bool,
    /// Chrome exits on its own after this long without CDP traffic.
    pub idle_timeout: Duration,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_size: (1280, 1024),
            sandbox: true,
            idle_timeout: Duration::from_secs(120),
        }
    }
}

/// One Chrome process with one tab. Dropping it kills the process.
pub struct ChromeSession {
    browser: Option<headless_chrome::Browser>,
    tab: Option<Arc<Tab>>,
    log: Arc<Mutex<Vec<NetworkRecord>>>,
}

impl ChromeSession {
    pub fn launch(opts: &ChromeOptions) -> anyhow::Result<Self> {
        let launch = LaunchOptions::default_builder()
            .headless(opts.headless)
            .path(opts.chrome_path.clone())
            .window_size(Some(opts.window_size))
            .sandbox(opts.sandbox)
            .idle_browser_timeout(opts.idle_timeout)
            .args(launch_args())
            .build()
            .map_err(|e| anyhow!("chrome launch options: {e}"))?;

        let browser = headless_chrome::Browser::new(launch).context("launch chrome")?;
        let tab = browser.new_tab().context("open tab")?;

        tab.call_method(Network::Enable {
            max_total_buffer_size: None,
            max_resource_buffer_size: None,
            max_post_data_size: None,
        })
        .context("enable network events")?;

        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        tab.add_event_listener(Arc::new(move |event: &Event| {
            if let Event::NetworkRequestWillBeSent(e) = event {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(NetworkRecord {
                        method: REQUEST_WILL_BE_SENT.to_string(),
                        url: e.params.request.url.clone(),
                    });
            }
        }))
        .context("register network listener")?;

        tracing::debug!(
            headless = opts.headless,
            sandbox = opts.sandbox,
            "chrome session started"
        );
        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
            log,
        })
    }

    fn tab(&self) -> anyhow::Result<&Arc<Tab>> {
        self.tab.as_ref().ok_or_else(|| anyhow!("browser session is closed"))
    }

    fn element(&self, handle: ElementRef) -> anyhow::Result<Element<'_>> {
        let tab = self.tab()?;
        Element::new(tab, handle.0).context("element is no longer attached")
    }
}

/// The player is a cross-origin iframe. Without these, Chrome moves it into
/// its own renderer and its requests never reach the tab's network events.
fn launch_args() -> Vec<&'static OsStr> {
    vec![
        OsStr::new("--disable-dev-shm-usage"),
        OsStr::new("--disable-gpu"),
        OsStr::new("--lang=en-us"),
        OsStr::new("--disable-site-isolation-trials"),
        OsStr::new("--disable-features=IsolateOrigins,site-per-process"),
    ]
}

/// Lookups report "not found" as an error. Only that case becomes `None`
/// (the caller's timeout decides); a dead connection or protocol error
/// propagates.
fn not_found_is_none<T>(result: anyhow::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if is_not_found(&e) => Ok(None),
        Err(e) => Err(e),
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    if err.downcast_ref::<NoElementFound>().is_some() {
        return true;
    }
    let msg = format!("{err:#}");
    ["No element found", "Could not find node", "No node with given id"]
        .iter()
        .any(|m| msg.contains(m))
}

fn found(result: anyhow::Result<Element<'_>>) -> anyhow::Result<Option<ElementRef>> {
    Ok(not_found_is_none(result)?.map(|e| ElementRef(e.node_id)))
}

fn found_all(result: anyhow::Result<Vec<Element<'_>>>) -> anyhow::Result<Vec<ElementRef>> {
    Ok(not_found_is_none(result)?
        .unwrap_or_default()
        .into_iter()
        .map(|e| ElementRef(e.node_id))
        .collect())
}

fn css_for_name(name: &str) -> String {
    format!("[name=\"{name}\"]")
}

fn xpath_for_text(text: &str) -> String {
    format!(".//*[contains(text(), '{text}')]")
}

impl Browser for ChromeSession {
    fn navigate(&mut self, url: &str) -> anyhow::Result<()> {
        let tab = self.tab()?;
        tab.navigate_to(url)
            .with_context(|| format!("navigate to {url}"))?
            .wait_until_navigated()
            .with_context(|| format!("load {url}"))?;
        Ok(())
    }

    fn find(&mut self, locator: &Locator) -> anyhow::Result<Option<ElementRef>> {
        let tab = self.tab()?;
        match locator {
            Locator::Css(s) => found(tab.find_element(s)),
            Locator::XPath(x) => found(tab.find_element_by_xpath(x)),
            Locator::Name(n) => found(tab.find_element(&css_for_name(n))),
            Locator::Text(t) => found(tab.find_element_by_xpath(&xpath_for_text(t))),
        }
    }

    fn find_all(&mut self, locator: &Locator) -> anyhow::Result<Vec<ElementRef>> {
        let tab = self.tab()?;
        match locator {
            Locator::Css(s) => found_all(tab.find_elements(s)),
            Locator::XPath(x) => found_all(tab.find_elements_by_xpath(x)),
            Locator::Name(n) => found_all(tab.find_elements(&css_for_name(n))),
            Locator::Text(t) => found_all(tab.find_elements_by_xpath(&xpath_for_text(t))),
        }
    }

    fn find_in(
        &mut self,
        scope: ElementRef,
        locator: &Locator,
    ) -> anyhow::Result<Option<ElementRef>> {
        Ok(self.find_all_in(scope, locator)?.into_iter().next())
    }

    fn find_all_in(
        &mut self,
        scope: ElementRef,
        locator: &Locator,
    ) -> anyhow::Result<Vec<ElementRef>> {
        let el = self.element(scope)?;
        match locator {
            Locator::Css(s) => found_all(el.find_elements(s)),
            Locator::XPath(x) => found_all(el.find_elements_by_xpath(x)),
            Locator::Name(n) => found_all(el.find_elements(&css_for_name(n))),
            Locator::Text(t) => found_all(el.find_elements_by_xpath(&xpath_for_text(t))),
        }
    }

    fn click(&mut self, element: ElementRef) -> anyhow::Result<()> {
        self.element(element)?.click().context("click")?;
        Ok(())
    }

    fn clear(&mut self, element: ElementRef) -> anyhow::Result<()> {
        self.element(element)?
            .call_js_fn(
                "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
                vec![],
                false,
            )
            .context("clear input")?;
        Ok(())
    }

    fn type_text(&mut self, element: ElementRef, text: &str) -> anyhow::Result<()> {
        self.element(element)?.type_into(text).context("type text")?;
        Ok(())
    }

    fn press_enter(&mut self) -> anyhow::Result<()> {
        self.tab()?.press_key("Enter").context("press Enter")?;
        Ok(())
    }

    fn text(&mut self, element: ElementRef) -> anyhow::Result<String> {
        self.element(element)?.get_inner_text().context("read text")
    }

    fn attribute(&mut self, element: ElementRef, name: &str) -> anyhow::Result<Option<String>> {
        let attrs = self
            .element(element)?
            .get_attributes()
            .context("read attributes")?
            .unwrap_or_default();
        // CDP returns a flat [name, value, name, value, ...] list.
        Ok(attrs
            .chunks(2)
            .find(|kv| kv.len() == 2 && kv[0] == name)
            .map(|kv| kv[1].clone()))
    }

    fn network_log(&mut self) -> anyhow::Result<Vec<NetworkRecord>> {
        Ok(self
            .log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn close(&mut self) {
        if let Some(tab) = self.tab.take() {
            let _ = tab.close(false);
        }
        if self.browser.take().is_some() {
            tracing::debug!("chrome session closed");
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_keeps_cross_origin_frames_in_the_page_process() {
        let args = launch_args();
        assert!(args.contains(&OsStr::new("--disable-site-isolation-trials")));
        assert!(args.contains(&OsStr::new(
            "--disable-features=IsolateOrigins,site-per-process"
        )));
    }

    #[test]
    fn sandbox_is_on_by_default() {
        assert!(ChromeOptions::default().sandbox);
    }

    #[test]
    fn missing_element_is_none() {
        let typed: anyhow::Result<u32> = Err(NoElementFound {}.into());
        assert!(not_found_is_none(typed).unwrap().is_none());

        let wrapped: anyhow::Result<u32> =
            Err(anyhow!("Could not find node with given id")).context("find iframe");
        assert!(not_found_is_none(wrapped).unwrap().is_none());

        assert_eq!(not_found_is_none(Ok(7u32)).unwrap(), Some(7));
    }

    #[test]
    fn transport_failure_is_an_error() {
        let dead: anyhow::Result<u32> = Err(anyhow!("connection is closed"));
        let err = not_found_is_none(dead).unwrap_err();
        assert!(err.to_string().contains("connection is closed"));
    }
}
