use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use tracing::debug;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::AppConfig;

pub const COMPLETION_MODEL: &str = "gpt-3.5-turbo";
/// Greedy decoding so the same context and question give the same answer.
pub const TEMPERATURE: f64 = 0.0;

pub struct OpenAiLlm {
    client: openai::Client,
    model: String,
}

impl OpenAiLlm {
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let client = openai::Client::new(config.credentials.openai_api_key.as_str())
            .map_err(|e| DomainError::configuration(format!("openai client: {e}")))?;
        Ok(Self {
            client,
            model: COMPLETION_MODEL.to_string(),
        })
    }
}

#[async_trait]
impl LlmService for OpenAiLlm {
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        debug!(model = %self.model, "requesting completion");
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(TEMPERATURE)
            .build();
        agent
            .prompt(prompt)
            .await
            .map_err(|e| DomainError::external(e.to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
