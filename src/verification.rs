use tracing::info;

use crate::error::Result;
use crate::llm::StructuredCaller;
use crate::schema::validate_verdict;
use crate::types::{Citation, EvidenceItem, VerdictResult};

pub fn build_assess_prompt(claim: &str, research: &[EvidenceItem]) -> Result<String> {
    let research_json = serde_json::to_string(research)?;
    Ok(format!(
        "You are a concise fact-checker. Using ONLY the provided research, decide if the claim is \
'true', 'false', or 'unsubstantiated'.\n\
Return JSON: {{verdict, explanation (<=600 chars), citations (array of {{title,url}} from the research only)}}.\n\n\
Claim:\n```{claim}```\n\n\
Research JSON:\n{research_json}"
    ))
}

/// Adjudicate `claim` against `research`. When the model cites nothing,
/// every research item is cited in order instead.
pub async fn assess(
    caller: &StructuredCaller,
    model: &str,
    temperature: f32,
    max_retries: u32,
    claim: &str,
    research: &[EvidenceItem],
) -> Result<VerdictResult> {
    let prompt = build_assess_prompt(claim, research)?;
    let raw = caller.call(model, &prompt, temperature, max_retries).await?;
    let mut verdict = validate_verdict(&raw)?;
    if verdict.citations.is_empty() {
        verdict.citations = research.iter().map(Citation::from).collect();
    }
    info!(verdict = ?verdict.verdict, citations = verdict.citations.len(), "assessment done");
    Ok(verdict)
}
