use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use log::debug;
use url::Url;

use crate::config::{Config, Session};
use crate::errors::FetchError;
use crate::fetcher::Fetch;

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static anchor selector"));

/// Finds the bill documents linked from a session's directory listing.
pub struct Locator<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    extension: &'a str,
    timeout: Duration,
}

impl<'a, F: Fetch + ?Sized> Locator<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a Config) -> Self {
        Locator {
            fetcher,
            extension: &config.document_extension,
            timeout: config.listing_timeout,
        }
    }

    /// Absolute URLs of every document in the listing, in listing order.
    pub fn list_documents(&self, session: &Session) -> Result<Vec<Url>, FetchError> {
        let base = Url::parse(&session.endpoint).map_err(|source| FetchError::InvalidUrl {
            url: session.endpoint.clone(),
            source,
        })?;
        let html = self.fetcher.fetch(base.as_str(), self.timeout)?;
        Ok(document_links(&html, &base, self.extension))
    }
}

/// Resolves every `<a href>` ending in `extension` against `base`.
pub fn document_links(html: &str, base: &Url, extension: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for element in document.select(&ANCHOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.ends_with(extension) {
            continue;
        }
        match base.join(href) {
            Ok(url) => links.push(url),
            Err(e) => debug!("Skipping unresolvable link '{}' on {}: {}", href, base, e),
        }
    }
    links
}
