// src/search/serper.rs
use async_trait::async_trait;
use governor::DefaultDirectRateLimiter;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{http_client, limiter, retrieval_error, Searcher};
use crate::config::SearchConfig;
use crate::error::{Error, Result};

pub const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

#[derive(Debug, Deserialize)]
pub struct SerperItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerperResp {
    organic: Vec<SerperItem>,
}

pub struct SerperSearch {
    http: Client,
    key: String,
    endpoint: String,
    limiter: DefaultDirectRateLimiter,
}

impl SerperSearch {
    pub fn new(key: String, qps: u32, timeout_ms: u64) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout_ms)?,
            key,
            endpoint: SERPER_ENDPOINT.to_string(),
            limiter: limiter(qps)?,
        })
    }

    pub fn from_config(cfg: &SearchConfig) -> Result<Self> {
        let key = cfg
            .serper_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Configuration("missing SERPER_API_KEY".into()))?;
        let mut search = Self::new(key, cfg.qps, cfg.timeout_ms)?;
        if let Some(endpoint) = &cfg.endpoint {
            search.endpoint = endpoint.clone();
        }
        Ok(search)
    }
}

/// Serper calls the url `link`; rename it so hits look like every other
/// provider's.
fn to_hit(item: SerperItem) -> Value {
    json!({ "title": item.title, "url": item.link, "snippet": item.snippet })
}

fn parse_body(body: &[u8], max_results: usize) -> Result<Vec<Value>> {
    let resp: SerperResp = serde_json::from_slice(body)
        .map_err(|e| Error::EvidenceRetrieval(format!("serper: unexpected response body: {e}")))?;
    Ok(resp.organic.into_iter().take(max_results).map(to_hit).collect())
}

#[async_trait]
impl Searcher for SerperSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>> {
        self.limiter.until_ready().await;
        let body = self
            .http
            .post(&self.endpoint)
            .header("X-API-KEY", &self.key)
            .json(&json!({ "q": query, "num": max_results }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| retrieval_error("serper", e))?
            .bytes()
            .await
            .map_err(|e| retrieval_error("serper", e))?;
        let hits = parse_body(&body, max_results)?;
        debug!(hits = hits.len(), "serper search complete");
        Ok(hits)
    }
}
