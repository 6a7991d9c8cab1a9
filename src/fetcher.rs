use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Duration;
use log::debug;

use crate::config::Config;
use crate::errors::FetchError;

/// Retrieves the body of a page as text.
///
/// Shared by every worker thread, so implementations must be `Sync`.
pub trait Fetch: Sync {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher backed by a single pooled `reqwest` client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(HttpFetcher {
            client: client_builder(config).build()?,
        })
    }
}

fn client_builder(config: &Config) -> ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|source| FetchError::Request { url: url.to_string(), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text()
            .map_err(|source| FetchError::Request { url: url.to_string(), source })
    }
}
