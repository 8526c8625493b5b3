use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::configuration::ProviderSettings;

use super::{RecommendationError, RecommendationProvider};

const SYSTEM_PROMPT: &str = "You are a librarian recommending books. Reply with JSON only.";

pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiProvider {
    pub fn new(settings: &ProviderSettings) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(settings.api_key.expose_secret());
        if let Some(base_url) = &settings.base_url {
            config = config.with_api_base(base_url.trim_end_matches('/'));
        }

        OpenAiProvider {
            client: Client::with_config(config),
            model: settings.model.clone(),
        }
    }
}

#[async_trait]
impl RecommendationProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[tracing::instrument(name = "openai chat completion", skip_all, fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String, RecommendationError> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| RecommendationError::provider(self.name(), e))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| RecommendationError::provider(self.name(), e))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .temperature(0.7)
            .build()
            .map_err(|e| RecommendationError::provider(self.name(), e))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RecommendationError::provider(self.name(), e))?;

        answer_text(self.name(), response)
    }
}

/// Text content of the first choice.
fn answer_text(
    provider: &str,
    response: CreateChatCompletionResponse,
) -> Result<String, RecommendationError> {
    let malformed = |message: &str| RecommendationError::Malformed {
        provider: provider.to_string(),
        message: message.to_string(),
    };

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| malformed("no choices in completion"))?;

    choice
        .message
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| malformed("first choice has no text"))
}
