use std::sync::OnceLock;

use regex::Regex;

use crate::browser::{Browser, Locator};
use crate::episode::{ProgramType, RemoteEpisodeRef, RemoteNumber};
use crate::error::{Result, SyncError};

use super::CatalogSession;

const LIST_ITEM: &str = ".//div[contains(@role,'listitem')]";
const ITEM_SPANS: &str = ".//p[contains(@class,'font_8')]/span";

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([\w&]+) (\d+\.?\d?)").unwrap_or_else(|e| unreachable!("label regex: {e}"))
    })
}

/// Parses the second span of a listing item, e.g. `"Q&A 265.4"`.
///
/// A label that does not look like `<type> <number>` and a type label that
/// is not in the fixed lookup are both errors: the site changed.
pub fn parse_listing_label(label: &str) -> Result<(ProgramType, RemoteNumber)> {
    let label = label.trim();
    let caps = label_regex()
        .captures(label)
        .ok_or_else(|| SyncError::UnparseableLabel(label.to_string()))?;
    let type_label = &caps[1];
    let number: RemoteNumber = caps[2]
        .parse()
        .map_err(|_| SyncError::UnparseableLabel(label.to_string()))?;
    let ty = ProgramType::from_catalog_label(type_label)
        .ok_or_else(|| SyncError::UnknownTypeLabel(type_label.to_string()))?;
    Ok((ty, number))
}

impl<B: Browser> CatalogSession<B> {
    /// Reads every listing item currently shown and keeps those of type `ty`.
    pub fn visible_episodes(&mut self, ty: ProgramType) -> Result<Vec<RemoteEpisodeRef>> {
        let items = self.browser.find_all(&Locator::xpath(LIST_ITEM))?;
        let mut out = Vec::with_capacity(items.len());

        for item in items {
            let spans = self.browser.find_all_in(item, &Locator::xpath(ITEM_SPANS))?;
            if spans.len() != 2 {
                return Err(SyncError::MalformedListing { found: spans.len() });
            }
            let title = self.browser.text(spans[0])?.trim().to_string();
            let label = self.browser.text(spans[1])?;
            let (item_ty, number) = parse_listing_label(&label)?;
            if item_ty != ty {
                continue;
            }

            let missing_link = || SyncError::MissingEpisodeLink {
                title: title.clone(),
            };
            let link = self
                .browser
                .find_in(item, &Locator::css("a"))?
                .ok_or_else(missing_link)?;
            let href = self
                .browser
                .attribute(link, "href")?
                .filter(|h| !h.trim().is_empty())
                .ok_or_else(missing_link)?;
            let page_url = self
                .base_url
                .join(href.trim())
                .map_err(|_| missing_link())?;

            tracing::debug!(kind = %ty, remote = %number, title = %title, "listed");
            out.push(RemoteEpisodeRef::new(ty, number, title, page_url.to_string()));
        }

        Ok(out)
    }
}
