//! Error types for the fact-check pipeline.
//!
//! Every failure that reaches a caller is one of these variants. Recoverable
//! conditions (absent titles, empty snippets, missing optional fields) are
//! defaulted where they occur and never show up here.

use thiserror::Error;

use crate::schema::ContractKind;

#[derive(Error, Debug)]
pub enum Error {
    /// The model never produced parseable JSON within the retry budget.
    #[error("model output was not valid JSON after {attempts} attempt(s)")]
    MalformedModelOutput { attempts: u32, raw: String },

    /// Parsed JSON does not satisfy the expected contract.
    #[error("{contract} contract violated: `{field}` {reason}")]
    Validation {
        contract: ContractKind,
        field: String,
        reason: String,
    },

    /// The search call failed or returned something unusable.
    #[error("evidence retrieval failed: {0}")]
    EvidenceRetrieval(String),

    /// Missing credentials or invalid settings at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The text-generation service itself could not be reached or refused.
    #[error("text generation failed: {0}")]
    Generation(String),

    /// Pipeline data could not be encoded for a prompt.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("pipeline finished without a verdict: {0}")]
    IncompleteRun(String),

    #[error("no checkpoint for session `{0}`")]
    UnknownSession(String),
}

impl Error {
    pub(crate) fn validation(
        contract: ContractKind,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Validation {
            contract,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
