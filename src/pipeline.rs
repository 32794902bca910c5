//! The claim-to-verdict state machine.
//!
//! ```text
//! Start -> Classifying -+-> Researching -> Assessing -+-> Finalizing -> Done
//!                       |                             |
//!                       +---------- not a claim ------+
//! ```
//!
//! Each stage runs to completion before the next begins. A stage only writes
//! to [`PipelineState`] after its work has succeeded, so a failed stage
//! leaves the state exactly as the previous stage left it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::classify;
use crate::config::{LlmConfig, SearchConfig};
use crate::error::Result;
use crate::llm::StructuredCaller;
use crate::retrieve::research;
use crate::search::Searcher;
use crate::types::{PipelineState, Verdict};
use crate::verification::assess;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Classifying,
    Researching,
    Assessing,
    Finalizing,
    Done,
}

impl Stage {
    /// The stage that follows `self` once its work is done.
    pub fn next(self, state: &PipelineState) -> Stage {
        use Stage::*;
        match self {
            Start => Classifying,
            Classifying if state.is_claim == Some(true) => Researching,
            Classifying => Finalizing,
            Researching => Assessing,
            Assessing => Finalizing,
            Finalizing | Done => Done,
        }
    }
}

/// Models, temperatures and limits used by the stages.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub classify_model: String,
    pub assess_model: String,
    pub classify_temperature: f32,
    pub assess_temperature: f32,
    pub max_retries: u32,
    pub max_results: usize,
}

impl PipelineSettings {
    pub fn from_config(llm: &LlmConfig, search: &SearchConfig) -> Self {
        Self {
            classify_model: llm.classify_model.clone(),
            assess_model: llm.assess_model.clone(),
            classify_temperature: llm.classify_temperature,
            assess_temperature: llm.assess_temperature,
            max_retries: llm.max_retries,
            max_results: search.max_results,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default(), &SearchConfig::default())
    }
}

#[derive(Clone)]
pub struct ClaimPipeline {
    caller: StructuredCaller,
    searcher: Arc<dyn Searcher>,
    settings: PipelineSettings,
}

impl ClaimPipeline {
    pub fn new(caller: StructuredCaller, searcher: Arc<dyn Searcher>, settings: PipelineSettings) -> Self {
        Self { caller, searcher, settings }
    }

    /// Run the work of `stage` against `state` and return the next stage.
    pub async fn step(&self, stage: Stage, state: &mut PipelineState) -> Result<Stage> {
        debug!(?stage, "entering stage");
        match stage {
            Stage::Classifying => self.classifying(state).await?,
            Stage::Researching => self.researching(state).await?,
            Stage::Assessing => self.assessing(state).await?,
            Stage::Start | Stage::Finalizing | Stage::Done => {}
        }
        Ok(stage.next(state))
    }

    /// Drive `state` from `stage` to [`Stage::Done`], calling `on_step` with
    /// the upcoming stage after each one completes.
    pub async fn drive<F>(&self, mut stage: Stage, state: &mut PipelineState, mut on_step: F) -> Result<()>
    where
        F: FnMut(Stage, &PipelineState),
    {
        while stage != Stage::Done {
            stage = self.step(stage, state).await?;
            on_step(stage, state);
        }
        Ok(())
    }

    async fn classifying(&self, state: &mut PipelineState) -> Result<()> {
        let s = &self.settings;
        let judged = classify(&self.caller, &s.classify_model, s.classify_temperature, s.max_retries, &state.input_text).await?;
        state.is_claim = Some(judged.is_claim);
        if !judged.is_claim {
            state.verdict = Some(Verdict::NotAClaim);
            state.explanation = Some(judged.reason.clone());
        }
        state.claim_reason = Some(judged.reason);
        Ok(())
    }

    async fn researching(&self, state: &mut PipelineState) -> Result<()> {
        state.research = research(self.searcher.as_ref(), &state.input_text, self.settings.max_results).await?;
        Ok(())
    }

    async fn assessing(&self, state: &mut PipelineState) -> Result<()> {
        let s = &self.settings;
        let out = assess(
            &self.caller,
            &s.assess_model,
            s.assess_temperature,
            s.max_retries,
            &state.input_text,
            &state.research,
        )
        .await?;
        state.verdict = Some(out.verdict.into());
        state.explanation = Some(out.explanation);
        state.citations = out.citations;
        Ok(())
    }
}
