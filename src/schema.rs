//! Contract checks for structured model output.
//!
//! The model's JSON is only trusted after it passes one of these. Failures
//! are final for the invocation; retrying is the structured caller's job.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::evidence::truncate_chars;
use crate::types::{Adjudication, Citation, ClassificationResult, VerdictResult};

pub const MAX_REASON_CHARS: usize = 200;
pub const MAX_EXPLANATION_CHARS: usize = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Classification,
    Verdict,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractKind::Classification => write!(f, "classification"),
            ContractKind::Verdict => write!(f, "verdict"),
        }
    }
}

pub fn validate_classification(obj: &Value) -> Result<ClassificationResult> {
    let kind = ContractKind::Classification;
    let map = as_object(obj, kind)?;

    let is_claim = match map.get("is_claim") {
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(Error::validation(kind, "is_claim", "must be a boolean")),
        None => return Err(Error::validation(kind, "is_claim", "is required")),
    };
    let reason = optional_string(map, "reason", kind)?.unwrap_or_default();

    Ok(ClassificationResult { is_claim, reason: truncate_chars(&reason, MAX_REASON_CHARS) })
}

pub fn validate_verdict(obj: &Value) -> Result<VerdictResult> {
    let kind = ContractKind::Verdict;
    let map = as_object(obj, kind)?;

    let verdict = match map.get("verdict") {
        Some(Value::String(s)) => Adjudication::parse(s).ok_or_else(|| {
            Error::validation(kind, "verdict", format!("`{s}` is not one of true, false, unsubstantiated"))
        })?,
        Some(_) => return Err(Error::validation(kind, "verdict", "must be a string")),
        None => return Err(Error::validation(kind, "verdict", "is required")),
    };

    let explanation = optional_string(map, "explanation", kind)?
        .ok_or_else(|| Error::validation(kind, "explanation", "is required"))?;
    let len = explanation.chars().count();
    if len > MAX_EXPLANATION_CHARS {
        return Err(Error::validation(
            kind,
            "explanation",
            format!("is {len} characters, limit is {MAX_EXPLANATION_CHARS}"),
        ));
    }

    let citations = match map.get("citations") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(coerce_citation).collect(),
        Some(_) => return Err(Error::validation(kind, "citations", "must be an array")),
    };

    Ok(VerdictResult { verdict, explanation, citations })
}

fn as_object(obj: &Value, kind: ContractKind) -> Result<&Map<String, Value>> {
    obj.as_object()
        .ok_or_else(|| Error::validation(kind, "<root>", "must be a JSON object"))
}

fn optional_string(map: &Map<String, Value>, field: &str, kind: ContractKind) -> Result<Option<String>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::validation(kind, field, "must be a string")),
    }
}

// Unknown keys are dropped; non-object entries are skipped.
fn coerce_citation(v: &Value) -> Option<Citation> {
    let m = v.as_object()?;
    let field = |k: &str| m.get(k).and_then(Value::as_str).unwrap_or_default().to_string();
    Some(Citation { title: field("title"), url: field("url") })
}
