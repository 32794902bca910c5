//! JSON-returning model calls.
//!
//! This is the only place raw model text is parsed. A response that does not
//! parse is retried with a stricter instruction after a fixed short delay.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::Llm;
use crate::error::{Error, Result};

pub const JSON_ONLY_SYSTEM: &str = "You are a function that returns JSON only. \
Do not include markdown fences or extra text. \
Return a single JSON object that validates against the caller's expectations.";

pub const STRICT_SUFFIX: &str = "\n\nReturn ONLY valid JSON, no prose.";

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(300);

#[derive(Clone)]
pub struct StructuredCaller {
    llm: Arc<dyn Llm>,
    retry_delay: Duration,
}

impl StructuredCaller {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm, retry_delay: DEFAULT_RETRY_DELAY }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Ask `model` for a JSON value. Makes at most `max_retries + 1`
    /// attempts; generation errors are not retried.
    pub async fn call(&self, model: &str, prompt: &str, temperature: f32, max_retries: u32) -> Result<Value> {
        let strict_prompt = format!("{prompt}{STRICT_SUFFIX}");
        let mut attempt = 0;

        loop {
            let current = if attempt == 0 { prompt } else { strict_prompt.as_str() };
            let raw = self.llm.generate(model, JSON_ONLY_SYSTEM, current, temperature).await?;
            let parsed = serde_json::from_str::<Value>(strip_code_fences(&raw));
            match parsed {
                Ok(v) => {
                    debug!(model, attempt, "parsed structured response");
                    return Ok(v);
                }
                Err(e) if attempt < max_retries => {
                    warn!(model, attempt, error = %e, raw = %raw, "unparseable model output, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    warn!(model, attempt, error = %e, raw = %raw, "unparseable model output, giving up");
                    return Err(Error::MalformedModelOutput { attempts: attempt + 1, raw });
                }
            }
        }
    }
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` fence and a trailing
/// ```` ``` ````, along with surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.strip_prefix("json").unwrap_or(rest).trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}
