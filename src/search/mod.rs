//! Web search collaborators.
//!
//! Hits are returned as raw JSON objects carrying at least `title`, `url`
//! and `content` or `snippet`; [`crate::evidence::normalize`] takes it from
//! there.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::Value;

use crate::config::{SearchConfig, SearchProvider};
use crate::error::{Error, Result};

pub mod serper;
pub mod tavily;

pub use serper::SerperSearch;
pub use tavily::TavilySearch;

#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>>;
}

/// Build the searcher selected in config.
pub fn from_config(cfg: &SearchConfig) -> Result<Arc<dyn Searcher>> {
    let searcher: Arc<dyn Searcher> = match cfg.provider {
        SearchProvider::Tavily => Arc::new(TavilySearch::from_config(cfg)?),
        SearchProvider::Serper => Arc::new(SerperSearch::from_config(cfg)?),
    };
    Ok(searcher)
}

pub(crate) fn limiter(qps: u32) -> Result<DefaultDirectRateLimiter> {
    let qps = NonZeroU32::new(qps).ok_or_else(|| Error::Configuration("search.qps must be at least 1".into()))?;
    Ok(RateLimiter::direct(Quota::per_second(qps)))
}

pub(crate) fn http_client(timeout_ms: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| Error::Configuration(format!("http client: {e}")))
}

pub(crate) fn retrieval_error(provider: &str, e: reqwest::Error) -> Error {
    Error::EvidenceRetrieval(format!("{provider}: {e}"))
}
