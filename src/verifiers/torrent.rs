use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use super::types::{CheckFailure, Verifier, VerifierKind, VerifierResult};
use crate::config::Settings;

pub const TORRENT_REASON: &str = "Torrent files detected on the website";

const MAGNET_PREFIX: &str = "magnet:?xt=";
const TORRENT_SUFFIX: &str = ".torrent";

/// Scans the page markup for `.torrent` downloads and magnet links.
///
/// Fails open: a page that cannot be fetched is not evidence of piracy.
pub struct TorrentVerifier {
    client: Client,
}

impl TorrentVerifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_markup(&self, url: &Url) -> Result<String, CheckFailure> {
        let response = self.client.get(url.as_str()).send().await?;
        Ok(response.text().await?)
    }
}

/// True if any `href` in the markup points at a torrent file or magnet URI.
///
/// Only real element attributes count. `href=` text inside scripts, comments
/// or attribute values of other names is not a link and is ignored.
pub fn contains_torrent_links(markup: &str) -> bool {
    let Ok(selector) = Selector::parse("[href]") else {
        return false;
    };
    let document = Html::parse_document(markup);
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .any(is_torrent_reference)
}

fn is_torrent_reference(href: &str) -> bool {
    let href = href.trim().to_ascii_lowercase();
    href.ends_with(TORRENT_SUFFIX) || href.starts_with(MAGNET_PREFIX)
}

#[async_trait]
impl Verifier for TorrentVerifier {
    fn kind(&self) -> VerifierKind {
        VerifierKind::Torrent
    }

    async fn verify(&self, url: &Url, _settings: &Settings) -> VerifierResult {
        match self.fetch_markup(url).await {
            Ok(markup) if contains_torrent_links(&markup) => {
                tracing::info!(url = %url, "torrent links found");
                VerifierResult::Triggered(TORRENT_REASON.into())
            }
            Ok(_) => VerifierResult::Clear,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "page fetch failed, assuming no torrents");
                VerifierResult::Clear
            }
        }
    }

    fn fallback(&self, _settings: &Settings) -> VerifierResult {
        VerifierResult::Clear
    }
}
