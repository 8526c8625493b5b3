//! AI book recommendations and article text extraction.
//!
//! Providers sit behind [`RecommendationProvider`] so the rest of the service
//! never depends on their availability. [`RecommendationChain`] asks them in
//! order, each under the same timeout, and returns the first usable answer.

pub mod gemini;
pub mod openai;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    configuration::{ProviderKind, RecommendationSettings},
    library::stats::tag_frequency,
    model::{Book, ReadingStatus},
};

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

const FAVOURITES_IN_PROMPT: usize = 10;
const TAGS_IN_PROMPT: usize = 5;
/// Longest page excerpt, in characters, sent for article extraction.
pub const ARTICLE_PAGE_LIMIT: usize = 60_000;

#[derive(thiserror::Error, Debug)]
pub enum RecommendationError {
    #[error("No AI provider is configured")]
    Unavailable,
    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },
    #[error("Provider {0} timed out")]
    Timeout(String),
    #[error("Provider {provider} returned an unreadable answer: {message}")]
    Malformed { provider: String, message: String },
    #[error("Every AI provider failed")]
    Exhausted(Vec<RecommendationError>),
}

impl RecommendationError {
    pub fn provider(provider: &str, error: impl std::fmt::Display) -> Self {
        RecommendationError::Provider {
            provider: provider.to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub reason: String,
}

#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Sends `prompt` to the model and returns its raw text answer.
    async fn complete(&self, prompt: &str) -> Result<String, RecommendationError>;
}

#[derive(Clone)]
pub struct RecommendationChain {
    providers: Vec<Arc<dyn RecommendationProvider>>,
    timeout: Duration,
}

impl RecommendationChain {
    pub fn new(providers: Vec<Arc<dyn RecommendationProvider>>, timeout: Duration) -> Self {
        RecommendationChain { providers, timeout }
    }

    pub fn from_settings(settings: &RecommendationSettings, client: reqwest::Client) -> Self {
        let providers = settings
            .providers
            .iter()
            .map(|provider| -> Arc<dyn RecommendationProvider> {
                match provider.kind {
                    ProviderKind::Gemini => {
                        Arc::new(GeminiProvider::new(client.clone(), provider.clone()))
                    }
                    ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(provider)),
                }
            })
            .collect();

        RecommendationChain::new(providers, Duration::from_secs(settings.timeout_seconds))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    #[tracing::instrument(name = "recommend books", skip(self, books), fields(books = books.len()))]
    pub async fn recommend(
        &self,
        books: &[Book],
        count: usize,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        let prompt = build_prompt(books, count);
        let recommendations = self.ask(&prompt, parse_recommendations).await?;

        Ok(drop_known(recommendations, books, count))
    }

    /// Asks the providers for the readable text of a fetched web page.
    #[tracing::instrument(name = "extract article", skip_all, fields(page = page.len()))]
    pub async fn extract_article(&self, page: &str) -> Result<String, RecommendationError> {
        let prompt = build_extraction_prompt(page);

        self.ask(&prompt, parse_article_text).await
    }

    async fn ask<T>(
        &self,
        prompt: &str,
        parse: impl Fn(&str, &str) -> Result<T, RecommendationError>,
    ) -> Result<T, RecommendationError> {
        if self.providers.is_empty() {
            return Err(RecommendationError::Unavailable);
        }

        let mut failures = Vec::new();

        for provider in &self.providers {
            let answer = tokio::time::timeout(self.timeout, provider.complete(prompt)).await;
            let error = match answer {
                Ok(Ok(answer)) => match parse(provider.name(), &answer) {
                    Ok(parsed) => {
                        tracing::info!(provider = provider.name(), "Provider answered");
                        return Ok(parsed);
                    }
                    Err(error) => error,
                },
                Ok(Err(error)) => error,
                Err(_) => RecommendationError::Timeout(provider.name().to_string()),
            };

            tracing::warn!(
                provider = provider.name(),
                err.msg = %error,
                "Provider failed, trying next"
            );
            failures.push(error);
        }

        Err(RecommendationError::Exhausted(failures))
    }
}

pub fn build_prompt(books: &[Book], count: usize) -> String {
    let mut favourites: Vec<&Book> = books
        .iter()
        .filter(|b| b.status == ReadingStatus::Read)
        .collect();
    favourites.sort_by(|a, b| {
        b.average_rating()
            .total_cmp(&a.average_rating())
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut prompt = format!(
        "Recommend {} books I have not read yet. Answer with only a JSON array of objects \
         with the keys \"title\", \"author\" and \"reason\".\n",
        count
    );

    if favourites.is_empty() {
        prompt.push_str("I have not finished any books yet; suggest widely loved titles.\n");
    } else {
        prompt.push_str("Books I have read:\n");
        for book in favourites.iter().take(FAVOURITES_IN_PROMPT) {
            if book.reviews.is_empty() {
                prompt.push_str(&format!("- {} by {}\n", book.title, book.author));
            } else {
                prompt.push_str(&format!(
                    "- {} by {} (rated {:.1}/5)\n",
                    book.title,
                    book.author,
                    book.average_rating()
                ));
            }
        }
    }

    let tags: Vec<String> = tag_frequency(books)
        .into_iter()
        .take(TAGS_IN_PROMPT)
        .map(|t| t.tag)
        .collect();
    if !tags.is_empty() {
        prompt.push_str(&format!("Favourite topics: {}\n", tags.join(", ")));
    }

    prompt
}

/// Extracts the first JSON array from a model answer, which often wraps it in
/// prose or a markdown fence.
pub fn parse_recommendations(
    provider: &str,
    answer: &str,
) -> Result<Vec<Recommendation>, RecommendationError> {
    let malformed = |message: String| RecommendationError::Malformed {
        provider: provider.to_string(),
        message,
    };

    let start = answer
        .find('[')
        .ok_or_else(|| malformed("no JSON array in answer".to_string()))?;
    let end = answer
        .rfind(']')
        .filter(|end| *end > start)
        .ok_or_else(|| malformed("unterminated JSON array".to_string()))?;

    serde_json::from_str(&answer[start..=end]).map_err(|e| malformed(e.to_string()))
}

pub fn build_extraction_prompt(page: &str) -> String {
    let excerpt: String = page.chars().take(ARTICLE_PAGE_LIMIT).collect();

    format!(
        "Extract the main article text from the web page below. Reply with the article \
         text only, as plain prose without markup, navigation or comments.\n\n{}",
        excerpt
    )
}

fn parse_article_text(provider: &str, answer: &str) -> Result<String, RecommendationError> {
    let text = answer.trim();
    if text.is_empty() {
        return Err(RecommendationError::Malformed {
            provider: provider.to_string(),
            message: "empty article text".to_string(),
        });
    }

    Ok(text.to_string())
}

fn drop_known(
    recommendations: Vec<Recommendation>,
    books: &[Book],
    count: usize,
) -> Vec<Recommendation> {
    recommendations
        .into_iter()
        .filter(|r| {
            !books
                .iter()
                .any(|b| b.title.trim().to_lowercase() == r.title.trim().to_lowercase())
        })
        .take(count)
        .collect()
}
