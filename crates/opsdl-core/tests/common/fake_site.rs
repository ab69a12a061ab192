//! In-memory catalog site implementing the `Browser` capability.
//!
//! Pages: a landing page with a library link, a library page with a login
//! form (before login) or a listing plus search box (after login), and one
//! page per episode with a player iframe. Searching shows the items whose
//! label contains the typed text. Clicking a player appends its manifest
//! request to the network log, twice, after replaying the previously played
//! episode's request and some unrelated traffic.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use opsdl_core::browser::{Browser, ElementRef, Locator, NetworkRecord};
use opsdl_core::episode::RemoteNumber;

pub const BASE_URL: &str = "https://ops.test/";
pub const EMAIL: &str = "member@example.com";
pub const PASSWORD: &str = "correct horse";

#[derive(Debug, Clone)]
pub struct FakeEpisode {
    pub title: String,
    pub label: String,
    /// Used for the episode page and manifest URLs.
    pub slug: String,
    pub extra_span: bool,
    pub has_link: bool,
}

impl FakeEpisode {
    pub fn qa(number: &str, title: &str) -> Self {
        Self::labelled(&format!("Q&A {number}"), title)
    }

    pub fn class(number: &str, title: &str) -> Self {
        Self::labelled(&format!("Class {number}"), title)
    }

    pub fn labelled(label: &str, title: &str) -> Self {
        let slug = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        Self {
            title: title.to_string(),
            label: label.to_string(),
            slug,
            extra_span: false,
            has_link: true,
        }
    }

    pub fn with_extra_span(mut self) -> Self {
        self.extra_span = true;
        self
    }

    pub fn page_url(&self) -> String {
        format!("{BASE_URL}video/{}", self.slug)
    }

    pub fn descriptor_url(&self) -> String {
        format!("https://cdn.test/{}/sep/video/master.json?base64_init=1", self.slug)
    }

    pub fn manifest_url(&self) -> String {
        format!("https://cdn.test/{}/sep/video/master.mpd?", self.slug)
    }
}

/// What the test can observe after the browser has been moved into a session.
#[derive(Debug, Default)]
pub struct Observed {
    pub closed: bool,
    pub close_calls: u32,
    pub logged_in: bool,
    pub navigations: Vec<String>,
    pub searches: Vec<String>,
    pub email_typed: Option<String>,
    pub password_typed: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Blank,
    Home,
    Library,
    Episode(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    LibraryLink,
    OpenLogin,
    Email,
    Password,
    Submit,
    SearchInput,
    Item(usize),
    Span(usize, usize),
    Link(usize),
    Iframe(usize),
}

pub struct FakeSite {
    episodes: Vec<FakeEpisode>,
    page_size: usize,
    library_link: bool,
    emit_manifests: bool,
    page: Page,
    /// Indices of the listing currently shown on the library page.
    shown: Vec<usize>,
    nodes: Vec<Node>,
    focused: Option<Node>,
    login_open: bool,
    email: String,
    password: String,
    search_text: String,
    played: Vec<usize>,
    log: Vec<NetworkRecord>,
    observed: Arc<Mutex<Observed>>,
}

impl FakeSite {
    /// `episodes` in catalog order, newest first.
    pub fn new(episodes: Vec<FakeEpisode>, page_size: usize) -> Self {
        Self {
            episodes,
            page_size,
            library_link: true,
            emit_manifests: true,
            page: Page::Blank,
            shown: Vec::new(),
            nodes: Vec::new(),
            focused: None,
            login_open: false,
            email: String::new(),
            password: String::new(),
            search_text: String::new(),
            played: Vec::new(),
            log: Vec::new(),
            observed: Arc::new(Mutex::new(Observed::default())),
        }
    }

    pub fn without_library_link(mut self) -> Self {
        self.library_link = false;
        self
    }

    pub fn without_manifests(mut self) -> Self {
        self.emit_manifests = false;
        self
    }

    pub fn observed(&self) -> Arc<Mutex<Observed>> {
        Arc::clone(&self.observed)
    }

    fn logged_in(&self) -> bool {
        self.observed.lock().unwrap().logged_in
    }

    fn show(&mut self, page: Page) {
        self.page = page;
        self.nodes.clear();
        self.focused = None;
    }

    fn handle(&mut self, node: Node) -> ElementRef {
        self.nodes.push(node);
        ElementRef((self.nodes.len() - 1) as u32)
    }

    fn node(&self, el: ElementRef) -> Result<Node> {
        self.nodes
            .get(el.0 as usize)
            .copied()
            .ok_or_else(|| anyhow!("stale element handle {}", el.0))
    }

    fn landing_listing(&self) -> Vec<usize> {
        (0..self.episodes.len().min(self.page_size)).collect()
    }

    fn run_search(&mut self) {
        let query = self.search_text.trim().to_string();
        self.observed.lock().unwrap().searches.push(query.clone());
        self.shown = self
            .episodes
            .iter()
            .enumerate()
            .filter(|(_, e)| e.label.contains(&query))
            .map(|(i, _)| i)
            .take(self.page_size)
            .collect();
        self.show(Page::Library);
    }

    fn lookup(&self, locator: &Locator) -> Vec<Node> {
        match (self.page, locator) {
            (Page::Home, Locator::XPath(x)) if x.contains("/library") && self.library_link => {
                vec![Node::LibraryLink]
            }
            (Page::Library, _) if !self.logged_in() => match locator {
                Locator::Text(t) if t == "Log In" => vec![Node::OpenLogin],
                Locator::Name(n) if n == "email" && self.login_open => vec![Node::Email],
                Locator::Name(n) if n == "password" && self.login_open => vec![Node::Password],
                Locator::Text(t) if t == "Log in" && self.login_open => vec![Node::Submit],
                _ => Vec::new(),
            },
            (Page::Library, Locator::XPath(x)) if x.contains("input") => vec![Node::SearchInput],
            (Page::Library, Locator::XPath(x)) if x.contains("listitem") => {
                self.shown.iter().map(|&i| Node::Item(i)).collect()
            }
            (Page::Episode(i), Locator::Css(c)) if c == "iframe" => vec![Node::Iframe(i)],
            _ => Vec::new(),
        }
    }

    fn lookup_in(&self, scope: Node, locator: &Locator) -> Vec<Node> {
        let Node::Item(i) = scope else {
            return Vec::new();
        };
        let ep = &self.episodes[i];
        match locator {
            Locator::XPath(x) if x.contains("font_8") => {
                let count = if ep.extra_span { 3 } else { 2 };
                (0..count).map(|s| Node::Span(i, s)).collect()
            }
            Locator::Css(c) if c == "a" && ep.has_link => vec![Node::Link(i)],
            _ => Vec::new(),
        }
    }

    fn play(&mut self, i: usize) {
        if !self.emit_manifests {
            self.log
                .push(NetworkRecord::request(format!("https://player.test/embed/{}", self.episodes[i].slug)));
            return;
        }
        if let Some(&prev) = self.played.last() {
            self.log
                .push(NetworkRecord::request(self.episodes[prev].descriptor_url()));
        }
        let ep = &self.episodes[i];
        self.log
            .push(NetworkRecord::request(format!("https://player.test/embed/{}", ep.slug)));
        self.log.push(NetworkRecord {
            method: "Network.responseReceived".to_string(),
            url: ep.descriptor_url(),
        });
        self.log.push(NetworkRecord::request(ep.descriptor_url()));
        self.log.push(NetworkRecord::request(ep.descriptor_url()));
        self.played.push(i);
    }
}

impl Browser for FakeSite {
    fn navigate(&mut self, url: &str) -> Result<()> {
        if self.observed.lock().unwrap().closed {
            bail!("browser is closed");
        }
        self.observed.lock().unwrap().navigations.push(url.to_string());
        self.log.push(NetworkRecord::request(url));

        let library = format!("{BASE_URL}library");
        if url == BASE_URL {
            self.show(Page::Home);
        } else if url == library {
            self.shown = self.landing_listing();
            self.show(Page::Library);
        } else if let Some(i) = self.episodes.iter().position(|e| e.page_url() == url) {
            self.show(Page::Episode(i));
        } else {
            self.show(Page::Blank);
        }
        Ok(())
    }

    fn find(&mut self, locator: &Locator) -> Result<Option<ElementRef>> {
        let first = self.lookup(locator).into_iter().next();
        Ok(first.map(|n| self.handle(n)))
    }

    fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let nodes = self.lookup(locator);
        Ok(nodes.into_iter().map(|n| self.handle(n)).collect())
    }

    fn find_in(&mut self, scope: ElementRef, locator: &Locator) -> Result<Option<ElementRef>> {
        let scope = self.node(scope)?;
        let first = self.lookup_in(scope, locator).into_iter().next();
        Ok(first.map(|n| self.handle(n)))
    }

    fn find_all_in(&mut self, scope: ElementRef, locator: &Locator) -> Result<Vec<ElementRef>> {
        let scope = self.node(scope)?;
        let nodes = self.lookup_in(scope, locator);
        Ok(nodes.into_iter().map(|n| self.handle(n)).collect())
    }

    fn click(&mut self, element: ElementRef) -> Result<()> {
        match self.node(element)? {
            Node::OpenLogin => self.login_open = true,
            Node::Submit => {
                if self.email == EMAIL && self.password == PASSWORD {
                    self.observed.lock().unwrap().logged_in = true;
                    self.shown = self.landing_listing();
                    self.show(Page::Library);
                }
            }
            Node::Iframe(i) => self.play(i),
            _ => {}
        }
        Ok(())
    }

    fn clear(&mut self, element: ElementRef) -> Result<()> {
        match self.node(element)? {
            Node::SearchInput => self.search_text.clear(),
            Node::Email => self.email.clear(),
            Node::Password => self.password.clear(),
            _ => {}
        }
        Ok(())
    }

    fn type_text(&mut self, element: ElementRef, text: &str) -> Result<()> {
        let node = self.node(element)?;
        self.focused = Some(node);
        let mut observed = self.observed.lock().unwrap();
        match node {
            Node::Email => {
                self.email.push_str(text);
                observed.email_typed = Some(self.email.clone());
            }
            Node::Password => {
                self.password.push_str(text);
                observed.password_typed = Some(self.password.clone());
            }
            Node::SearchInput => self.search_text.push_str(text),
            other => bail!("cannot type into {other:?}"),
        }
        Ok(())
    }

    fn press_enter(&mut self) -> Result<()> {
        if self.focused == Some(Node::SearchInput) {
            self.run_search();
        }
        Ok(())
    }

    fn text(&mut self, element: ElementRef) -> Result<String> {
        match self.node(element)? {
            Node::Span(i, 0) => Ok(self.episodes[i].title.clone()),
            Node::Span(i, 1) => Ok(self.episodes[i].label.clone()),
            Node::Span(_, _) => Ok("bonus".to_string()),
            other => bail!("{other:?} has no text"),
        }
    }

    fn attribute(&mut self, element: ElementRef, name: &str) -> Result<Option<String>> {
        match (self.node(element)?, name) {
            (Node::Link(i), "href") => Ok(Some(format!("/video/{}", self.episodes[i].slug))),
            _ => Ok(None),
        }
    }

    fn network_log(&mut self) -> Result<Vec<NetworkRecord>> {
        Ok(self.log.clone())
    }

    fn close(&mut self) {
        let mut observed = self.observed.lock().unwrap();
        observed.closed = true;
        observed.close_calls += 1;
    }
}

/// Q&A episodes `from..=to`, newest first, titled `Episode <n>`.
pub fn qa_range(from: u32, to: u32) -> Vec<FakeEpisode> {
    (from..=to)
        .rev()
        .map(|n| FakeEpisode::qa(&n.to_string(), &format!("Episode {n}")))
        .collect()
}

pub fn remote(s: &str) -> RemoteNumber {
    s.parse().unwrap()
}
