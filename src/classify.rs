use tracing::info;

use crate::error::Result;
use crate::llm::StructuredCaller;
use crate::schema::validate_classification;
use crate::types::ClassificationResult;

const RUBRIC: &str = "\
Task: Determine if the text contains ANY fact-checkable claim, even if mixed with opinions or fragments.

Look for assertions about:
- Health/medical facts (e.g., 'Tylenol is not good', 'X increases autism risk')
- Government/policy actions (e.g., 'FDA announced...', 'President said...')
- Scientific facts (e.g., 'water on Mars', 'climate change causes...')
- Historical events or statistics
- Any other verifiable fact about the world

Be LENIENT with transcription fragments - extract the core claim even if incomplete.

CLAIMS (fact-checkable):
- 'The FDA announced new guidelines'
- 'Tylenol is not good' (health claim)
- 'increase risk of autism. So taking Tylenol not good' (fragments but contains checkable claim)
- 'Effective immediately the FDA will be notifying physicians' (policy claim)

NOT CLAIMS (pure filler with no factual assertions):
- 'Let me see how we say that'
- 'Is that okay?'
- 'I said it as well'
- 'Alright, uh, so...'

Return JSON with keys: is_claim (true/false), reason (string <= 200 chars).";

pub fn build_classification_prompt(text: &str) -> String {
    format!("{RUBRIC}\n\nText:\n```{text}```")
}

pub async fn classify(
    caller: &StructuredCaller,
    model: &str,
    temperature: f32,
    max_retries: u32,
    text: &str,
) -> Result<ClassificationResult> {
    info!(chars = text.chars().count(), "classifying input");
    let raw = caller.call(model, &build_classification_prompt(text), temperature, max_retries).await?;
    let judged = validate_classification(&raw)?;
    info!(is_claim = judged.is_claim, reason = %judged.reason, "classification done");
    Ok(judged)
}
