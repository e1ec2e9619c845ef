// src/myneta/client.rs
use crate::myneta::links::{discover_candidates, discover_constituencies};
use crate::myneta::models::{CandidateLink, ConstituencyLink, Site};
use crate::utils::error::FetchError;
use reqwest::header;
use std::future::Future;
use std::time::Duration;

// The site serves an error page to non-browser agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_ATTEMPTS: u32 = 3;
/// Back-off after the n-th failed attempt is `n * 2 * BACKOFF_UNIT`.
const BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Runs `op` up to `attempts` times, sleeping `2 * n * unit` after the n-th
/// failure. Every failure is logged; exhaustion is an error.
pub async fn retry_with_backoff<T, F, Fut>(
    url: &str,
    attempts: u32,
    unit: Duration,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!("Attempt {} failed for {}: {}", attempt, url, e);
                if attempt < attempts {
                    tokio::time::sleep(unit * 2 * attempt).await;
                }
            }
        }
    }
    tracing::error!("Could not fetch: {}", url);
    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts,
    })
}

/// HTTP access to one election cycle of the site.
pub struct MynetaClient {
    http: reqwest::Client,
    site: Site,
    attempts: u32,
    backoff_unit: Duration,
}

impl MynetaClient {
    pub fn new(site: Site) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            site,
            attempts: DEFAULT_ATTEMPTS,
            backoff_unit: BACKOFF_UNIT,
        })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status,
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// GET `url` as text, retrying transient failures.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        retry_with_backoff(url, self.attempts, self.backoff_unit, || self.fetch_once(url)).await
    }

    /// Every constituency linked from the election home page.
    pub async fn all_constituencies(&self) -> Result<Vec<ConstituencyLink>, FetchError> {
        let html = self.fetch_page(&self.site.root_url()).await?;
        let found = discover_constituencies(&html, None);
        tracing::info!("Found {} constituencies", found.len());
        Ok(found)
    }

    pub async fn state_constituencies(&self, state_id: u32) -> Result<Vec<ConstituencyLink>, FetchError> {
        let html = self.fetch_page(&self.site.state_url(state_id)).await?;
        let found = discover_constituencies(&html, Some(state_id));
        tracing::info!("State {}: {} constituencies", state_id, found.len());
        Ok(found)
    }

    pub async fn constituency_candidates(&self, constituency_id: u32) -> Result<Vec<CandidateLink>, FetchError> {
        let html = self.fetch_page(&self.site.constituency_url(constituency_id)).await?;
        let found = discover_candidates(&html, constituency_id);
        tracing::info!("Constituency {}: {} candidates", constituency_id, found.len());
        Ok(found)
    }
}
