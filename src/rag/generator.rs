//! Response generation via a chat completion service.

use crate::config::{GenerationProvider, GenerationSettings};
use crate::error::{BuddyError, Result};
use crate::openai::{create_azure_client, create_client};
use async_openai::config::Config;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Produces one completion for a composed prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Return the first completion, trimmed of surrounding whitespace.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Fixed decoding configuration applied to every completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    /// High repetition penalties keep answers and refusals short.
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_p: 1.0,
            max_tokens: 100,
            presence_penalty: 1.5,
            frequency_penalty: 1.5,
        }
    }
}

impl From<&GenerationSettings> for DecodingParams {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens: settings.max_tokens,
            presence_penalty: settings.presence_penalty,
            frequency_penalty: settings.frequency_penalty,
        }
    }
}

/// Generator over any OpenAI-protocol client (OpenAI or Azure OpenAI).
pub struct ChatGenerator<C: Config> {
    client: Client<C>,
    model: String,
    params: DecodingParams,
}

impl<C: Config> ChatGenerator<C> {
    pub fn new(client: Client<C>, model: &str, params: DecodingParams) -> Self {
        Self {
            client,
            model: model.to_string(),
            params,
        }
    }
}

/// Build the configured generator, reading credentials from the environment.
pub fn generator_from_settings(settings: &GenerationSettings) -> Result<Arc<dyn Generator>> {
    let api_key = settings.api_key()?;
    let endpoint = settings.endpoint()?;
    let timeout = Duration::from_secs(settings.timeout_secs);
    let params = DecodingParams::from(settings);

    let generator: Arc<dyn Generator> = match settings.provider {
        GenerationProvider::Azure => {
            let endpoint = endpoint.ok_or_else(|| {
                BuddyError::Config(format!("{} is required for Azure", settings.endpoint_env))
            })?;
            let client = create_azure_client(
                &endpoint,
                &api_key,
                &settings.model,
                &settings.api_version,
                timeout,
            )?;
            Arc::new(ChatGenerator::new(client, &settings.model, params))
        }
        GenerationProvider::OpenAI => {
            let client = create_client(endpoint.as_deref(), &api_key, timeout)?;
            Arc::new(ChatGenerator::new(client, &settings.model, params))
        }
    };

    Ok(generator)
}

#[async_trait]
impl<C> Generator for ChatGenerator<C>
where
    C: Config + Send + Sync + 'static,
{
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| BuddyError::Generation(e.to_string()))?
                .into(),
        ];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.params.temperature)
            .top_p(self.params.top_p)
            .max_tokens(self.params.max_tokens)
            .presence_penalty(self.params.presence_penalty)
            .frequency_penalty(self.params.frequency_penalty)
            .build()
            .map_err(|e| BuddyError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| BuddyError::Generation(format!("Completion API error: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| BuddyError::Generation("Empty response from model".to_string()))?
            .to_string();

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }
}
