//! Upstream statistics API client
//!
//! The questionnaire backend exposes pre-aggregated statistics:
//! - `GET /stats` → `{"stats": [{section, moyenne, nb_reponses}, ...]}`
//! - `GET /stats/{id}` → same shape, one respondent
//! - `GET /export` → CSV of raw responses
//!
//! The dashboard only depends on the [`StatsProvider`] capability;
//! [`HttpStatsProvider`] talks to the real backend and
//! [`CachedStatsProvider`] puts a [`StatsCache`] in front of any provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::StatsCache;
use crate::model::{SectionStat, StatsEnvelope};

const USER_AGENT: &str = concat!("wbq-dashboard/", env!("CARGO_PKG_VERSION"));

/// Cache key of the population statistics
pub const POPULATION_KEY: &str = "stats";

/// Statistics API errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network communication error (connection, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// API answered with a non-2xx status
    #[error("API error {0}: {1}")]
    Status(u16, String),

    /// Failed to parse API response body
    #[error("Parse error: {0}")]
    Parse(String),

    /// Respondent identifier cannot be used as a path segment
    #[error("Invalid respondent id: {0}")]
    InvalidUserId(String),
}

/// Source of per-section statistics
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Statistics over all respondents
    async fn fetch_stats(&self) -> Result<Vec<SectionStat>, FetchError>;

    /// Statistics for one respondent
    async fn fetch_user_stats(&self, user_id: &str) -> Result<Vec<SectionStat>, FetchError>;

    /// Raw responses as CSV bytes
    async fn fetch_export(&self) -> Result<Vec<u8>, FetchError>;

    /// Short description for logs (e.g. base URL)
    fn describe(&self) -> String {
        "stats provider".to_string()
    }
}

/// Longest upstream error body kept in [`FetchError::Status`], in characters
pub const MAX_ERROR_BODY_CHARS: usize = 200;

/// Keep the first [`MAX_ERROR_BODY_CHARS`] characters of an error body
fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((end, _)) => format!("{}…", &body[..end]),
        None => body.to_string(),
    }
}

/// Check that a respondent id is safe to splice into `/stats/{id}`
///
/// Only ASCII alphanumerics, `-` and `_` are allowed.
pub fn is_valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id.len() <= 128
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// [`StatsProvider`] over the questionnaire backend's HTTP API
pub struct HttpStatsProvider {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpStatsProvider {
    /// Create new client for the API rooted at `base_url`
    ///
    /// A trailing `/` on `base_url` is ignored.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Querying statistics API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FetchError::Status(
                status.as_u16(),
                truncate_body(&error_text),
            ));
        }

        Ok(response)
    }

    async fn get_stats(&self, path: &str) -> Result<Vec<SectionStat>, FetchError> {
        let envelope: StatsEnvelope = self
            .get(path)
            .await?
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        info!(path, sections = envelope.stats.len(), "Statistics fetched");
        Ok(envelope.stats)
    }
}

#[async_trait]
impl StatsProvider for HttpStatsProvider {
    async fn fetch_stats(&self) -> Result<Vec<SectionStat>, FetchError> {
        self.get_stats("/stats").await
    }

    async fn fetch_user_stats(&self, user_id: &str) -> Result<Vec<SectionStat>, FetchError> {
        if !is_valid_user_id(user_id) {
            return Err(FetchError::InvalidUserId(user_id.to_string()));
        }
        self.get_stats(&format!("/stats/{}", user_id)).await
    }

    async fn fetch_export(&self) -> Result<Vec<u8>, FetchError> {
        let bytes = self
            .get("/export")
            .await?
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        info!(bytes = bytes.len(), "Export fetched");
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// [`StatsProvider`] that answers from a cache while entries are fresh
///
/// Failed fetches are never cached. Exports always go upstream.
pub struct CachedStatsProvider {
    inner: Arc<dyn StatsProvider>,
    cache: Arc<dyn StatsCache<Vec<SectionStat>>>,
    ttl: Duration,
}

impl CachedStatsProvider {
    pub fn new(
        inner: Arc<dyn StatsProvider>,
        cache: Arc<dyn StatsCache<Vec<SectionStat>>>,
        ttl: Duration,
    ) -> Self {
        Self { inner, cache, ttl }
    }

    /// Cache key of one respondent's statistics
    pub fn user_key(user_id: &str) -> String {
        format!("{}/{}", POPULATION_KEY, user_id)
    }

    async fn cached<F, Fut>(&self, key: &str, fetch: F) -> Result<Vec<SectionStat>, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<SectionStat>, FetchError>>,
    {
        if let Some(stats) = self.cache.get(key).await {
            debug!(key, "Statistics cache hit");
            return Ok(stats);
        }

        let stats = fetch().await?;
        self.cache.put(key, stats.clone(), self.ttl).await;
        Ok(stats)
    }
}

#[async_trait]
impl StatsProvider for CachedStatsProvider {
    async fn fetch_stats(&self) -> Result<Vec<SectionStat>, FetchError> {
        self.cached(POPULATION_KEY, || self.inner.fetch_stats())
            .await
    }

    async fn fetch_user_stats(&self, user_id: &str) -> Result<Vec<SectionStat>, FetchError> {
        if !is_valid_user_id(user_id) {
            return Err(FetchError::InvalidUserId(user_id.to_string()));
        }
        let key = Self::user_key(user_id);
        self.cached(&key, || self.inner.fetch_user_stats(user_id))
            .await
    }

    async fn fetch_export(&self) -> Result<Vec<u8>, FetchError> {
        self.inner.fetch_export().await
    }

    fn describe(&self) -> String {
        format!("{} (cached {}s)", self.inner.describe(), self.ttl.as_secs())
    }
}
