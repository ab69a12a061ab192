//! One sync run: resolve local state, crawl, locate, number, hand off.
//!
//! All browser work for every configured type happens inside a single
//! [`CatalogSession`], which is dropped (and the browser closed) before the
//! first download starts. Downloads then run in ascending order so a failure
//! leaves the library consistent for the next run.

mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use url::Url;

use crate::browser::Browser;
use crate::catalog::{CatalogSession, Timing};
use crate::collaborators::{Downloader, Encoder, Ffmpeg, Filer, SeasonFiler, YtDlp};
use crate::config::{Credentials, OpsdlConfig};
use crate::control::CancelToken;
use crate::episode::{current_season, Episode, ProgramType};
use crate::error::{Result, SyncError};
use crate::library::MediaLibrary;
use crate::numbering::assign_internal_numbers;

pub use report::{SyncReport, TypeReport};

/// Per-run switches.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub types: Vec<ProgramType>,
    /// Season (calendar year) new episodes are filed under.
    pub season: i32,
    /// Plan only: discover, locate and number, but never download.
    pub pretend: bool,
    /// Scratch directory for downloads before they are filed.
    pub work_dir: PathBuf,
    /// Write the captured network log here (JSON) when the session ends.
    pub dump_network_log: Option<PathBuf>,
}

/// The three hand-off steps after numbering.
pub struct Collaborators {
    pub downloader: Box<dyn Downloader>,
    pub encoder: Box<dyn Encoder>,
    pub filer: Box<dyn Filer>,
}

impl Collaborators {
    /// `yt-dlp`, `ffmpeg` and the season-directory filer.
    pub fn external(library: &MediaLibrary) -> Self {
        Self {
            downloader: Box::new(YtDlp::default()),
            encoder: Box::new(Ffmpeg::default()),
            filer: Box::new(SeasonFiler::new(library.clone())),
        }
    }
}

pub struct SyncPipeline {
    library: MediaLibrary,
    credentials: Credentials,
    base_url: Url,
    timing: Timing,
    options: SyncOptions,
    collaborators: Collaborators,
}

impl SyncPipeline {
    pub fn new(
        library: MediaLibrary,
        credentials: Credentials,
        base_url: Url,
        timing: Timing,
        options: SyncOptions,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            library,
            credentials,
            base_url,
            timing,
            options,
            collaborators,
        }
    }

    /// Builds a pipeline with the external tools from a validated config.
    pub fn from_config(cfg: &OpsdlConfig, options: SyncOptions) -> anyhow::Result<Self> {
        cfg.validate()?;
        let library = MediaLibrary::new(&cfg.media_dir);
        let collaborators = Collaborators::external(&library);
        Ok(Self::new(
            library,
            cfg.credentials.clone(),
            cfg.base_url()?,
            cfg.timing(),
            options,
            collaborators,
        ))
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    /// Discovers, locates and numbers new episodes for every configured
    /// type, without downloading anything. Types are concatenated in
    /// configuration order; each type's episodes are in ascending order.
    pub fn plan<B, F>(&self, open: F, cancel: &CancelToken) -> Result<Vec<Episode>>
    where
        B: Browser,
        F: FnOnce() -> anyhow::Result<B>,
    {
        let reports = self.plan_types(open, cancel)?;
        Ok(reports.into_iter().flat_map(|r| r.episodes).collect())
    }

    /// Full run: plan, then (unless pretending) download, rewrite metadata
    /// and file every planned episode.
    pub fn run<B, F>(&self, open: F, cancel: &CancelToken) -> Result<SyncReport>
    where
        B: Browser,
        F: FnOnce() -> anyhow::Result<B>,
    {
        let mut types = self.plan_types(open, cancel)?;
        let mut report = SyncReport {
            season: self.options.season,
            pretend: self.options.pretend,
            types: Vec::with_capacity(types.len()),
        };

        if self.options.pretend {
            for t in &types {
                for ep in &t.episodes {
                    tracing::info!(
                        kind = %ep.program_type,
                        internal = ep.internal_number,
                        remote = %ep.remote_number,
                        "would sync {}",
                        ep.canonical_filename()
                    );
                }
            }
            report.types = types;
            return Ok(report);
        }

        for t in types.iter_mut() {
            for ep in t.episodes.iter_mut() {
                if cancel.is_cancelled() {
                    return Err(SyncError::Cancelled);
                }
                self.deliver(ep)?;
                t.filed += 1;
            }
        }
        report.types = types;
        tracing::info!(
            planned = report.total_planned(),
            filed = report.total_filed(),
            "sync finished"
        );
        Ok(report)
    }

    fn plan_types<B, F>(&self, open: F, cancel: &CancelToken) -> Result<Vec<TypeReport>>
    where
        B: Browser,
        F: FnOnce() -> anyhow::Result<B>,
    {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        let browser = open()?;
        let mut session =
            CatalogSession::new(browser, self.base_url.clone(), self.timing, cancel.clone());

        let result = self.plan_in_session(&mut session);
        if let Some(path) = &self.options.dump_network_log {
            if let Err(e) = dump_network_log(&mut session, path) {
                tracing::warn!(path = %path.display(), "could not write network log: {e:#}");
            }
        }
        result
    }

    fn plan_in_session<B: Browser>(
        &self,
        session: &mut CatalogSession<B>,
    ) -> Result<Vec<TypeReport>> {
        session.authenticate(&self.credentials)?;

        let season = self.options.season;
        let mut reports = Vec::with_capacity(self.options.types.len());
        for &ty in &self.options.types {
            let prior = self.library.last_synced(ty, season)?;
            let mut refs = session.discover(ty, prior.remote_number)?;
            for r in refs.iter_mut() {
                session.locate(r)?;
            }
            let episodes = assign_internal_numbers(refs, &prior, season);
            tracing::info!(kind = %ty, new = episodes.len(), "planned");
            reports.push(TypeReport {
                program_type: ty,
                prior,
                episodes,
                filed: 0,
            });
        }
        Ok(reports)
    }

    fn deliver(&self, ep: &mut Episode) -> Result<()> {
        tracing::info!(
            kind = %ep.program_type,
            internal = ep.internal_number,
            remote = %ep.remote_number,
            title = %ep.title,
            "syncing episode"
        );
        let downloaded = self
            .collaborators
            .downloader
            .download(ep, &self.options.work_dir)?;
        ep.file = Some(downloaded.clone());

        let encoded = self.collaborators.encoder.rewrite_metadata(ep, &downloaded)?;
        ep.file = Some(encoded.clone());

        let filed = self.collaborators.filer.file(ep, &encoded)?;
        ep.file = Some(filed);
        Ok(())
    }
}

impl SyncOptions {
    /// Options for the current season with a work dir under the XDG cache.
    pub fn for_types(types: Vec<ProgramType>) -> anyhow::Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("opsdl")?;
        Ok(Self {
            types,
            season: current_season(),
            pretend: false,
            work_dir: xdg_dirs.get_cache_home().join("work"),
            dump_network_log: None,
        })
    }
}

fn dump_network_log<B: Browser>(
    session: &mut CatalogSession<B>,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let log = session.network_log()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&log)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), records = log.len(), "network log written");
    Ok(())
}
