use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;
use reqwest::blocking::Client;

use crate::error::FetchError;

/// Anything that can hand back the raw body of a page.
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher with a per-request timeout.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("meta-aggregator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("remote: GET {}", url);
        let t0 = Instant::now();
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };
        let resp = self.client.get(url).send().map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text().map_err(transport)?;
        debug!(
            "remote: {} fetched in {:.3}s ({} bytes)",
            url,
            t0.elapsed().as_secs_f64(),
            body.len()
        );
        Ok(body)
    }
}

/// Canned pages keyed by URL. Unknown URLs fail like a 404.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    pages: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

impl PageSource for StaticSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// URL layout of the Limitless Labs tournament pages.
#[derive(Clone, Debug)]
pub struct LabsSite {
    base_url: String,
}

impl LabsSite {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn overall_url(&self, tid: &str) -> String {
        format!("{}/{}/decks", self.base_url, tid)
    }

    pub fn day2_url(&self, tid: &str) -> String {
        format!("{}?day=2", self.overall_url(tid))
    }

    pub fn conversion_url(&self, tid: &str) -> String {
        format!("{}?conversion=", self.overall_url(tid))
    }

    /// Path fragment shared by every deck-page link of a tournament.
    pub fn deck_path_segment(&self, tid: &str) -> String {
        format!("/{}/decks/", tid)
    }

    pub fn matchups_url(deck_url: &str) -> String {
        if deck_url.ends_with("/matchups") {
            deck_url.to_string()
        } else {
            format!("{}/matchups", deck_url.trim_end_matches('/'))
        }
    }
}
