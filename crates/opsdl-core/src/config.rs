use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::browser::ChromeOptions;
use crate::catalog::Timing;
use crate::episode::ProgramType;

pub const DEFAULT_BASE_URL: &str = "https://www.objectivepersonalitysystem.com";

/// Site login. `Debug` never prints the password.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Browser launch settings (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run Chrome without a window.
    #[serde(default = "default_true")]
    pub headless: bool,
    /// Chrome/Chromium binary; autodetected when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Chrome refuses to start sandboxed as root; set false in containers.
    #[serde(default = "default_true")]
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            sandbox: true,
        }
    }
}

/// Delays and limits for driving the site (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause after each UI action, in milliseconds.
    pub settle_ms: u64,
    /// Pause after navigation or search, in milliseconds.
    pub page_load_ms: u64,
    /// How long to wait for a required element or manifest request.
    pub element_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Give up the backward crawl after this many searches.
    pub max_search_steps: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 500,
            page_load_ms: 5_000,
            element_timeout_secs: 15,
            poll_interval_ms: 250,
            max_search_steps: 400,
        }
    }
}

impl From<&TimingConfig> for Timing {
    fn from(t: &TimingConfig) -> Self {
        Timing {
            settle: Duration::from_millis(t.settle_ms),
            page_load: Duration::from_millis(t.page_load_ms),
            element_timeout: Duration::from_secs(t.element_timeout_secs),
            poll_interval: Duration::from_millis(t.poll_interval_ms.max(1)),
            max_search_steps: t.max_search_steps,
        }
    }
}

/// Global configuration loaded from `~/.config/opsdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsdlConfig {
    /// Root of the media library (`<media_dir>/<Type>/Season <year>/...`).
    pub media_dir: PathBuf,
    /// Program types to sync, in order.
    #[serde(default = "default_types")]
    pub types: Vec<ProgramType>,
    /// Log filter used when neither RUST_LOG nor a CLI flag is given.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Catalog site root.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub browser: Option<BrowserConfig>,
    #[serde(default)]
    pub timing: Option<TimingConfig>,
}

impl Default for OpsdlConfig {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::new(),
            types: default_types(),
            log_level: None,
            base_url: default_base_url(),
            credentials: Credentials::default(),
            browser: None,
            timing: None,
        }
    }
}

impl OpsdlConfig {
    /// Checks everything a sync needs before any browser is started.
    pub fn validate(&self) -> Result<()> {
        if self.media_dir.as_os_str().is_empty() {
            bail!("missing 'media_dir' in configuration");
        }
        if self.types.is_empty() {
            bail!("'types' must list at least one of QA, CLASS");
        }
        if !self.credentials.is_complete() {
            bail!("missing [credentials] email/password in configuration");
        }
        self.base_url()?;
        Ok(())
    }

    /// Site root as a URL with a trailing slash, so relative joins land
    /// under it.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("invalid base_url: {}", self.base_url))
    }

    pub fn timing(&self) -> Timing {
        self.timing
            .as_ref()
            .map(Timing::from)
            .unwrap_or_else(|| Timing::from(&TimingConfig::default()))
    }

    pub fn chrome_options(&self) -> ChromeOptions {
        let b = self.browser.clone().unwrap_or_default();
        ChromeOptions {
            headless: b.headless,
            chrome_path: b.chrome_path,
            window_size: (b.window_width, b.window_height),
            sandbox: b.sandbox,
            ..ChromeOptions::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    1024
}

fn default_types() -> Vec<ProgramType> {
    ProgramType::ALL.to_vec()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("opsdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<OpsdlConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit path. Runs before logging is set
/// up, so the notice goes to stdout.
pub fn load_or_init_at(path: &Path) -> Result<OpsdlConfig> {
    if !path.exists() {
        write_default(path)?;
        println!("{}", created_notice(path));
        return Ok(OpsdlConfig::default());
    }
    load_from_path(path)
}

pub fn created_notice(path: &Path) -> String {
    format!(
        "Created default config at {}; set media_dir and [credentials] before syncing.",
        path.display()
    )
}

pub fn load_from_path(path: &Path) -> Result<OpsdlConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: OpsdlConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Writes the default configuration to `path`, creating parent directories.
pub fn write_default(path: &Path) -> Result<()> {
    let toml = toml::to_string_pretty(&OpsdlConfig::default())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = OpsdlConfig::default();
        assert_eq!(cfg.types, vec![ProgramType::Qa, ProgramType::Class]);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert!(cfg.validate().is_err(), "default has no media_dir or credentials");
        assert_eq!(cfg.timing(), Timing::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = OpsdlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: OpsdlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.types, cfg.types);
        assert_eq!(parsed.base_url, cfg.base_url);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            media_dir = "/srv/plex/ops"
            types = ["CLASS"]
            log_level = "debug"

            [credentials]
            email = "me@example.com"
            password = "hunter2"

            [browser]
            headless = false

            [timing]
            settle_ms = 100
            page_load_ms = 2000
            element_timeout_secs = 30
            poll_interval_ms = 100
            max_search_steps = 50
        "#;
        let cfg: OpsdlConfig = toml::from_str(toml).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.media_dir, PathBuf::from("/srv/plex/ops"));
        assert_eq!(cfg.types, vec![ProgramType::Class]);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.credentials.password(), "hunter2");
        let t = cfg.timing();
        assert_eq!(t.settle, Duration::from_millis(100));
        assert_eq!(t.element_timeout, Duration::from_secs(30));
        assert_eq!(t.max_search_steps, 50);
        let chrome = cfg.chrome_options();
        assert!(!chrome.headless);
        assert_eq!(chrome.window_size, (1280, 1024));
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("me@example.com", "hunter2");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("me@example.com"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let cfg = OpsdlConfig {
            base_url: "https://catalog.example.com/members".to_string(),
            ..OpsdlConfig::default()
        };
        assert_eq!(
            cfg.base_url().unwrap().join("library").unwrap().as_str(),
            "https://catalog.example.com/members/library"
        );
    }

    #[test]
    fn write_default_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_default(&path).unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert!(cfg.media_dir.as_os_str().is_empty());
        assert_eq!(cfg.types.len(), 2);
    }

    #[test]
    fn load_or_init_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opsdl").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.types, default_types());
        assert_eq!(load_or_init_at(&path).unwrap().base_url, DEFAULT_BASE_URL);
        assert!(created_notice(&path).contains(&path.display().to_string()));
    }

    #[test]
    fn sandbox_can_be_turned_off() {
        let cfg: OpsdlConfig = toml::from_str(
            r#"
            media_dir = "/m"

            [browser]
            sandbox = false
        "#,
        )
        .unwrap();
        let chrome = cfg.chrome_options();
        assert!(!chrome.sandbox);
        assert!(chrome.headless);
        assert!(OpsdlConfig::default().chrome_options().sandbox);
    }

    #[test]
    fn unknown_type_rejected() {
        let toml = r#"
            media_dir = "/m"
            types = ["PODCAST"]
        "#;
        assert!(toml::from_str::<OpsdlConfig>(toml).is_err());
    }
}
