use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::debug;

use super::Llm;
use crate::config::LlmConfig;
use crate::error::{Error, Result};

/// Client for any OpenAI-compatible chat endpoint (Gemini exposes one).
#[derive(Clone)]
pub struct OpenAiLlm {
    client: Client<OpenAIConfig>,
}

impl OpenAiLlm {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("http client: {e}")))?;
        let cfg = OpenAIConfig::new().with_api_base(base_url).with_api_key(api_key);
        Ok(Self { client: Client::with_config(cfg).with_http_client(http) })
    }

    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let key = cfg
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Configuration("missing GOOGLE_API_KEY (or FACTCHECK_LLM_API_KEY)".into()))?;
        Self::new(&cfg.base_url, key, Duration::from_millis(cfg.timeout_ms))
    }
}

fn build_messages(system: &str, prompt: &str) -> Result<Vec<ChatCompletionRequestMessage>> {
    let system: ChatCompletionRequestMessage = ChatCompletionRequestSystemMessageArgs::default()
        .content(system)
        .build()
        .map_err(|e| Error::Generation(e.to_string()))?
        .into();
    let user: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
        .content(prompt)
        .build()
        .map_err(|e| Error::Generation(e.to_string()))?
        .into();
    Ok(vec![system, user])
}

#[async_trait]
impl Llm for OpenAiLlm {
    async fn generate(&self, model: &str, system: &str, prompt: &str, temperature: f32) -> Result<String> {
        let req = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(build_messages(system, prompt)?)
            .temperature(temperature)
            .build()
            .map_err(|e| Error::Generation(e.to_string()))?;

        let resp = self
            .client
            .chat()
            .create(req)
            .await
            .map_err(|e| Error::Generation(format!("{model}: {e}")))?;

        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Generation(format!("{model}: response had no choices")))?;
        let text = choice.message.content.unwrap_or_default();
        debug!(model, chars = text.len(), "generation complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_configuration_error() {
        let cfg = LlmConfig { api_key: None, ..LlmConfig::default() };
        assert!(matches!(OpenAiLlm::from_config(&cfg), Err(Error::Configuration(_))));
    }

    #[test]
    fn builds_system_then_user() {
        let msgs = build_messages("json only", "classify this").unwrap();
        assert_eq!(msgs.len(), 2);
        assert!(matches!(msgs[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(msgs[1], ChatCompletionRequestMessage::User(_)));
    }
}
