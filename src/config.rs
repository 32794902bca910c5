//! Configuration for the fact-check service.
//!
//! Settings are layered, later layers winning:
//! 1. Built-in defaults (below)
//! 2. Optional TOML file (`--config`)
//! 3. Environment variables (API keys, `PORT`)
//! 4. Command-line flags (applied by `main.rs`)
//!
//! API keys are only ever read from the environment, never from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible chat endpoint.
    pub base_url: String,
    #[serde(skip)]
    pub api_key: Option<String>,
    pub classify_model: String,
    pub assess_model: String,
    pub classify_temperature: f32,
    pub assess_temperature: f32,
    /// Extra attempts after an unparseable response.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: None,
            classify_model: "gemini-2.5-flash".to_string(),
            assess_model: "gemini-2.5-pro".to_string(),
            classify_temperature: 0.1,
            assess_temperature: 0.2,
            max_retries: 2,
            retry_delay_ms: 300,
            timeout_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    #[default]
    Tavily,
    Serper,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

/// Format of the page body Tavily returns alongside each snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawContent {
    Markdown,
    Text,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub provider: SearchProvider,
    /// Overrides the provider's public endpoint.
    pub endpoint: Option<String>,
    pub max_results: usize,
    pub topic: String,
    pub search_depth: SearchDepth,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub days: Option<u32>,
    pub include_raw_content: Option<RawContent>,
    /// `YYYY-MM-DD`, inclusive.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub qps: u32,
    pub timeout_ms: u64,
    #[serde(skip)]
    pub tavily_api_key: Option<String>,
    #[serde(skip)]
    pub serper_api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProvider::Tavily,
            endpoint: None,
            max_results: 6,
            topic: "general".to_string(),
            search_depth: SearchDepth::Basic,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
            days: None,
            include_raw_content: None,
            start_date: None,
            end_date: None,
            qps: 5,
            timeout_ms: 60_000,
            tavily_api_key: None,
            serper_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Defaults, then the TOML file if given, then the process environment.
    /// Does not validate; call [`Config::validate`] once flags are applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_toml_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
            .map_err(|e| Error::Configuration(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("FACTCHECK_LLM_API_KEY").or_else(|| var("GOOGLE_API_KEY")) {
            self.llm.api_key = Some(key);
        }
        if let Some(key) = var("TAVILY_API_KEY") {
            self.search.tavily_api_key = Some(key);
        }
        if let Some(key) = var("SERPER_API_KEY") {
            self.search.serper_api_key = Some(key);
        }
        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Everything the pipeline needs before it can start.
    pub fn validate(&self) -> Result<()> {
        fn present(k: &Option<String>) -> bool {
            k.as_deref().is_some_and(|k| !k.is_empty())
        }

        if !present(&self.llm.api_key) {
            return Err(Error::Configuration("missing GOOGLE_API_KEY (or FACTCHECK_LLM_API_KEY)".into()));
        }
        match self.search.provider {
            SearchProvider::Tavily if !present(&self.search.tavily_api_key) => {
                return Err(Error::Configuration("missing TAVILY_API_KEY".into()));
            }
            SearchProvider::Serper if !present(&self.search.serper_api_key) => {
                return Err(Error::Configuration("missing SERPER_API_KEY".into()));
            }
            _ => {}
        }
        if self.search.max_results == 0 {
            return Err(Error::Configuration("search.max_results must be at least 1".into()));
        }
        if self.search.qps == 0 {
            return Err(Error::Configuration("search.qps must be at least 1".into()));
        }
        for (name, date) in [("start_date", &self.search.start_date), ("end_date", &self.search.end_date)] {
            if let Some(d) = date.as_deref().filter(|d| !is_iso_date(d)) {
                return Err(Error::Configuration(format!("search.{name} `{d}` is not YYYY-MM-DD")));
            }
        }
        Ok(())
    }
}

fn is_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter().enumerate().all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}
