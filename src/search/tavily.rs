// src/search/tavily.rs
use async_trait::async_trait;
use governor::DefaultDirectRateLimiter;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{http_client, limiter, retrieval_error, Searcher};
use crate::config::{RawContent, SearchConfig, SearchDepth};
use crate::error::{Error, Result};

pub const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// Query options forwarded verbatim to Tavily.
#[derive(Debug, Clone, Default)]
pub struct TavilyOptions {
    pub topic: String,
    pub search_depth: SearchDepth,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub days: Option<u32>,
    pub include_raw_content: Option<RawContent>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    topic: &'a str,
    max_results: usize,
    search_depth: SearchDepth,
    #[serde(skip_serializing_if = "no_domains")]
    include_domains: &'a [String],
    #[serde(skip_serializing_if = "no_domains")]
    exclude_domains: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_raw_content: Option<RawContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<&'a str>,
}

fn no_domains(domains: &&[String]) -> bool {
    domains.is_empty()
}

pub struct TavilySearch {
    http: Client,
    key: String,
    endpoint: String,
    opts: TavilyOptions,
    limiter: DefaultDirectRateLimiter,
}

impl TavilySearch {
    pub fn new(key: String, opts: TavilyOptions, qps: u32, timeout_ms: u64) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout_ms)?,
            key,
            endpoint: TAVILY_ENDPOINT.to_string(),
            opts,
            limiter: limiter(qps)?,
        })
    }

    pub fn from_config(cfg: &SearchConfig) -> Result<Self> {
        let key = cfg
            .tavily_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Configuration("missing TAVILY_API_KEY".into()))?;
        let opts = TavilyOptions {
            topic: cfg.topic.clone(),
            search_depth: cfg.search_depth,
            include_domains: cfg.include_domains.clone(),
            exclude_domains: cfg.exclude_domains.clone(),
            days: cfg.days,
            include_raw_content: cfg.include_raw_content,
            start_date: cfg.start_date.clone(),
            end_date: cfg.end_date.clone(),
        };
        let mut search = Self::new(key, opts, cfg.qps, cfg.timeout_ms)?;
        if let Some(endpoint) = &cfg.endpoint {
            search.endpoint = endpoint.clone();
        }
        Ok(search)
    }

    fn request<'a>(&'a self, query: &'a str, max_results: usize) -> TavilyRequest<'a> {
        TavilyRequest {
            api_key: &self.key,
            query,
            topic: &self.opts.topic,
            max_results,
            search_depth: self.opts.search_depth,
            include_domains: &self.opts.include_domains,
            exclude_domains: &self.opts.exclude_domains,
            days: self.opts.days,
            include_raw_content: self.opts.include_raw_content,
            start_date: self.opts.start_date.as_deref(),
            end_date: self.opts.end_date.as_deref(),
        }
    }
}

fn parse_body(body: &[u8], max_results: usize) -> Result<Vec<Value>> {
    let v: Value = serde_json::from_slice(body)
        .map_err(|e| Error::EvidenceRetrieval(format!("tavily: response is not JSON: {e}")))?;
    let results = v
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::EvidenceRetrieval("tavily: response has no `results` array".into()))?;
    Ok(results.iter().take(max_results).cloned().collect())
}

#[async_trait]
impl Searcher for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>> {
        self.limiter.until_ready().await;
        let body = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.key)
            .json(&self.request(query, max_results))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| retrieval_error("tavily", e))?
            .bytes()
            .await
            .map_err(|e| retrieval_error("tavily", e))?;
        let hits = parse_body(&body, max_results)?;
        debug!(hits = hits.len(), "tavily search complete");
        Ok(hits)
    }
}
