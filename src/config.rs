use std::collections::BTreeSet;
use std::time::Duration;

use crate::errors::ConfigError;

/// One legislative biennium and the directory listing its House bill texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub label: String,
    pub endpoint: String,
}

impl Session {
    pub fn new(label: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Session {
            label: label.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Static settings shared by every component. Built once in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub sessions: Vec<Session>,
    /// Regex fragments, matched case-insensitively against the bill text.
    pub keywords: Vec<String>,
    pub user_agent: String,
    pub listing_timeout: Duration,
    pub document_timeout: Duration,
    /// Only listing links ending in this suffix are treated as bill documents.
    pub document_extension: String,
    pub bill_prefix: String,
    pub summary_url_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sessions: vec![
                Session::new(
                    "2023-24",
                    "https://app.leg.wa.gov/documents/billdocs/2023-24/Htm/Bills/House%20Bills/",
                ),
                Session::new(
                    "2025-26",
                    "https://app.leg.wa.gov/documents/billdocs/2025-26/Htm/Bills/House%20Bills/",
                ),
            ],
            keywords: vec![r"\bclimate\b".to_string()],
            user_agent: "WA-Leg-Scraper/1.0 (+github.com/you)".to_string(),
            listing_timeout: Duration::from_secs(30),
            document_timeout: Duration::from_secs(45),
            document_extension: ".htm".to_string(),
            bill_prefix: "HB".to_string(),
            summary_url_base: "https://app.leg.wa.gov/BillSummary/".to_string(),
        }
    }
}

/// Per-run knobs exposed on the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub years: BTreeSet<u32>,
    pub workers: usize,
    /// Pause after each accepted row. Zero disables it.
    pub delay: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            years: [2023, 2024, 2025].into_iter().collect(),
            workers: 8,
            delay: Duration::ZERO,
        }
    }
}

/// Parses `"2023,2024, 2025"` into a year set. Blank entries are ignored.
pub fn parse_years(input: &str) -> Result<BTreeSet<u32>, ConfigError> {
    let mut years = BTreeSet::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let year = part
            .parse::<u32>()
            .map_err(|_| ConfigError::Year(part.to_string()))?;
        years.insert(year);
    }
    if years.is_empty() {
        return Err(ConfigError::NoYears);
    }
    Ok(years)
}
