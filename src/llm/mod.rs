use async_trait::async_trait;

use crate::error::Result;

pub mod openai;
pub mod structured;

pub use openai::OpenAiLlm;
pub use structured::StructuredCaller;

/// A text-generation service. Implementations return the raw completion
/// text; parsing is left to [`StructuredCaller`].
#[async_trait]
pub trait Llm: Send + Sync {
    async fn generate(&self, model: &str, system: &str, prompt: &str, temperature: f32) -> Result<String>;
}
