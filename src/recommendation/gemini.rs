use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::configuration::ProviderSettings;

use super::{RecommendationError, RecommendationProvider};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(serde::Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(serde::Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(serde::Deserialize)]
struct Part {
    text: Option<String>,
}

pub struct GeminiProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, settings: ProviderSettings) -> Self {
        GeminiProvider { client, settings }
    }
}

#[async_trait]
impl RecommendationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[tracing::instrument(name = "gemini generate content", skip_all, fields(model = %self.settings.model))]
    async fn complete(&self, prompt: &str) -> Result<String, RecommendationError> {
        let base_url = self
            .settings
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let response: GenerateContentResponse = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                base_url, self.settings.model
            ))
            .header("x-goog-api-key", self.settings.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| RecommendationError::provider(self.name(), e))?
            .json()
            .await
            .map_err(|e| RecommendationError::provider(self.name(), e))?;

        answer_text(self.name(), response)
    }
}

/// Joins the text parts of the first candidate.
fn answer_text(
    provider: &str,
    response: GenerateContentResponse,
) -> Result<String, RecommendationError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(RecommendationError::Malformed {
            provider: provider.to_string(),
            message: "empty candidate".to_string(),
        });
    }

    Ok(text)
}
