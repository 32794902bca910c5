use serde::{Deserialize, Serialize};

/// A normalized search hit used as adjudication input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

impl From<&EvidenceItem> for Citation {
    fn from(item: &EvidenceItem) -> Self {
        Citation { title: item.title.clone(), url: item.url.clone() }
    }
}

/// Outcome the adjudicator may choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjudication {
    True,
    False,
    Unsubstantiated,
}

impl Adjudication {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "true" => Some(Adjudication::True),
            "false" => Some(Adjudication::False),
            "unsubstantiated" => Some(Adjudication::Unsubstantiated),
            _ => None,
        }
    }
}

/// Final verdict recorded on the pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    True,
    False,
    Unsubstantiated,
    NotAClaim,
}

impl From<Adjudication> for Verdict {
    fn from(a: Adjudication) -> Self {
        match a {
            Adjudication::True => Verdict::True,
            Adjudication::False => Verdict::False,
            Adjudication::Unsubstantiated => Verdict::Unsubstantiated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub is_claim: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictResult {
    pub verdict: Adjudication,
    pub explanation: String,
    pub citations: Vec<Citation>,
}

/// The record threaded through every stage of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    pub input_text: String,
    pub is_claim: Option<bool>,
    pub claim_reason: Option<String>,
    pub research: Vec<EvidenceItem>,
    pub verdict: Option<Verdict>,
    pub explanation: Option<String>,
    pub citations: Vec<Citation>,
}

impl PipelineState {
    pub fn new(input_text: impl Into<String>) -> Self {
        Self { input_text: input_text.into(), ..Default::default() }
    }
}

/// What a caller of the pipeline gets back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FactCheckResponse {
    NotAClaim {
        reason: String,
    },
    FactChecked {
        verdict: Adjudication,
        explanation: String,
        citations: Vec<Citation>,
    },
}
