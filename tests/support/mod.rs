#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use factcheck_rs::error::{Error, Result};
use factcheck_rs::llm::{Llm, StructuredCaller};
use factcheck_rs::search::Searcher;
use factcheck_rs::{ClaimPipeline, PipelineRunner, PipelineSettings};
use serde_json::Value;

/// Replays canned responses per model, recording every prompt it sees.
#[derive(Default)]
pub struct FakeLlm {
    replies: Mutex<VecDeque<(String, String)>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeLlm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue `reply` for the next call to `model`.
    pub fn reply(self: &Arc<Self>, model: &str, reply: &str) -> Arc<Self> {
        self.replies.lock().unwrap().push_back((model.to_string(), reply.to_string()));
        self.clone()
    }

    pub fn calls_to(&self, model: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(m, _)| m == model).count()
    }
}

#[async_trait]
impl Llm for FakeLlm {
    async fn generate(&self, model: &str, _system: &str, prompt: &str, _t: f32) -> Result<String> {
        self.calls.lock().unwrap().push((model.to_string(), prompt.to_string()));
        let mut q = self.replies.lock().unwrap();
        let pos = q
            .iter()
            .position(|(m, _)| m == model)
            .ok_or_else(|| Error::Generation(format!("no scripted reply for {model}")))?;
        Ok(q.remove(pos).map(|(_, r)| r).unwrap_or_default())
    }
}

pub struct FakeSearcher {
    pub results: Vec<Value>,
    pub fail: bool,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl FakeSearcher {
    pub fn with(results: Vec<Value>) -> Arc<Self> {
        Arc::new(Self { results, fail: false, queries: Mutex::new(Vec::new()) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { results: Vec::new(), fail: true, queries: Mutex::new(Vec::new()) })
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl Searcher for FakeSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>> {
        self.queries.lock().unwrap().push((query.to_string(), max_results));
        if self.fail {
            return Err(Error::EvidenceRetrieval("search backend unavailable".into()));
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

pub const CLASSIFY: &str = "classify-model";
pub const ASSESS: &str = "assess-model";

pub fn settings() -> PipelineSettings {
    PipelineSettings {
        classify_model: CLASSIFY.into(),
        assess_model: ASSESS.into(),
        classify_temperature: 0.1,
        assess_temperature: 0.2,
        max_retries: 2,
        max_results: 6,
    }
}

pub fn runner(llm: Arc<FakeLlm>, search: Arc<FakeSearcher>) -> PipelineRunner {
    let caller = StructuredCaller::new(llm).with_retry_delay(Duration::ZERO);
    PipelineRunner::new(ClaimPipeline::new(caller, search, settings()))
}
