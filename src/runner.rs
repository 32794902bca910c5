//! Entry point for a single fact-check invocation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, Instrument};

use crate::checkpoint::{Checkpoint, Checkpoints};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::llm::{OpenAiLlm, StructuredCaller};
use crate::pipeline::{ClaimPipeline, PipelineSettings, Stage};
use crate::search;
use crate::types::{Adjudication, FactCheckResponse, PipelineState, Verdict};

pub const DEFAULT_SESSION: &str = "session";

#[derive(Clone)]
pub struct PipelineRunner {
    pipeline: ClaimPipeline,
    checkpoints: Arc<Checkpoints>,
}

impl PipelineRunner {
    pub fn new(pipeline: ClaimPipeline) -> Self {
        Self { pipeline, checkpoints: Arc::new(Checkpoints::new()) }
    }

    /// Wire the real model and search clients. Fails only on configuration.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        cfg.validate()?;
        let llm = Arc::new(OpenAiLlm::from_config(&cfg.llm)?);
        let caller = StructuredCaller::new(llm).with_retry_delay(Duration::from_millis(cfg.llm.retry_delay_ms));
        let searcher = search::from_config(&cfg.search)?;
        let settings = PipelineSettings::from_config(&cfg.llm, &cfg.search);
        Ok(Self::new(ClaimPipeline::new(caller, searcher, settings)))
    }

    /// Check `text` from scratch. Any stage failure is returned unchanged.
    pub async fn run(&self, text: &str, session_id: &str) -> Result<FactCheckResponse> {
        let span = tracing::info_span!("fact_check", session = %session_id);
        let state = PipelineState::new(text);
        self.checkpoints.save(session_id, Stage::Start, &state).await;
        self.drive_from(session_id, Stage::Start, state).instrument(span).await
    }

    /// Continue `session_id` from the stage that last failed. Finished runs
    /// keep no checkpoint, so only failed sessions can be resumed.
    pub async fn resume(&self, session_id: &str) -> Result<FactCheckResponse> {
        let Checkpoint { next, state } = self
            .checkpoints
            .get(session_id)
            .await
            .ok_or_else(|| Error::UnknownSession(session_id.to_string()))?;
        let span = tracing::info_span!("fact_check", session = %session_id, resumed = true);
        self.drive_from(session_id, next, state).instrument(span).await
    }

    pub async fn checkpoint(&self, session_id: &str) -> Option<Checkpoint> {
        self.checkpoints.get(session_id).await
    }

    async fn drive_from(&self, session_id: &str, stage: Stage, mut state: PipelineState) -> Result<FactCheckResponse> {
        let mut last = None;
        let outcome = self
            .pipeline
            .drive(stage, &mut state, |next, s| last = Some((next, s.clone())))
            .await;
        // The drive callback is sync, so the snapshot is written afterwards.
        if let Err(e) = outcome {
            if let Some((next, snapshot)) = last {
                self.checkpoints.save(session_id, next, &snapshot).await;
            }
            return Err(e);
        }
        self.checkpoints.remove(session_id).await;

        let response = project(&state)?;
        info!(status = status_of(&response), "fact check complete");
        Ok(response)
    }
}

/// Map a finished state onto the response shape.
pub fn project(state: &PipelineState) -> Result<FactCheckResponse> {
    let adjudication = match state.verdict {
        Some(Verdict::NotAClaim) => {
            return Ok(FactCheckResponse::NotAClaim { reason: state.explanation.clone().unwrap_or_default() });
        }
        Some(Verdict::True) => Adjudication::True,
        Some(Verdict::False) => Adjudication::False,
        Some(Verdict::Unsubstantiated) => Adjudication::Unsubstantiated,
        None => return Err(Error::IncompleteRun(format!("no verdict for `{}`", state.input_text))),
    };
    Ok(FactCheckResponse::FactChecked {
        verdict: adjudication,
        explanation: state.explanation.clone().unwrap_or_default(),
        citations: state.citations.clone(),
    })
}

fn status_of(r: &FactCheckResponse) -> &'static str {
    match r {
        FactCheckResponse::NotAClaim { .. } => "not_a_claim",
        FactCheckResponse::FactChecked { .. } => "fact_checked",
    }
}
