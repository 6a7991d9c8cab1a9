use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::errors::{ConfigError, FetchError};
use crate::fetcher::Fetch;

static YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(20\d{2})\s+(?:Regular|1st|2nd|3rd)\s+Session").expect("static year pattern")
});
static BILL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bHOUSE\s+BILL\s+(\d{3,4})\b").expect("static bill number pattern")
});
static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bAN\s+ACT\s+Relating\s+to[^\n\r]*").expect("static title pattern")
});

/// Fields pulled from one bill document. Any of them may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRecord {
    pub year: Option<u32>,
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub matched: bool,
    pub source_url: String,
}

pub struct BillExtractor {
    filename_number: Regex,
    keywords: Vec<Regex>,
    timeout: Duration,
}

impl BillExtractor {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let filename_number = Regex::new(&format!(
            r"/(\d{{3,4}})[-\w]*{}$",
            regex::escape(&config.document_extension)
        ))
        .map_err(|source| ConfigError::Extension {
            extension: config.document_extension.clone(),
            source,
        })?;

        let keywords = config
            .keywords
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ConfigError::Keyword {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BillExtractor {
            filename_number,
            keywords,
            timeout: config.document_timeout,
        })
    }

    /// Downloads one bill and parses it.
    pub fn extract<F: Fetch + ?Sized>(
        &self,
        fetcher: &F,
        url: &Url,
    ) -> Result<ExtractionRecord, FetchError> {
        let text = fetcher.fetch(url.as_str(), self.timeout)?;
        Ok(self.parse(url.as_str(), &text))
    }

    /// Each field is looked up independently; a miss just leaves it `None`.
    pub fn parse(&self, url: &str, text: &str) -> ExtractionRecord {
        let year = YEAR
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());

        let identifier = BILL_NUMBER
            .captures(text)
            .or_else(|| self.filename_number.captures(url))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        let title = TITLE
            .find(text)
            .map(|m| html_escape::decode_html_entities(m.as_str()).trim().to_string());

        let matched = self.keywords.iter().any(|k| k.is_match(text));

        ExtractionRecord {
            year,
            identifier,
            title,
            matched,
            source_url: url.to_string(),
        }
    }
}
