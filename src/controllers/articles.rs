use std::borrow::Cow;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    article::ArticleStats,
    db::articles::{delete_article, get_articles, insert_article},
    error::Error,
    library::LibraryError,
    model::Article,
    recommendation::RecommendationError,
    state::SharedAppState,
    telemetry::spawn_blocking_with_tracing,
};

use super::{IdPath, today};

#[derive(Deserialize, Debug, Validate)]
pub struct NewArticleRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(length(min = 1, max = 2000000))]
    pub content: Option<String>,
}

fn missing_content() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "content",
        ValidationError::new("content_required")
            .with_message(Cow::from("Either content or url is required")),
    );

    errors
}

/// Downloads the page at `url` and lets the AI providers pull out its
/// readable text.
#[tracing::instrument(name = "fetch article text", skip(app_state))]
async fn fetch_article_text(app_state: &SharedAppState, url: &str) -> Result<String, Error> {
    if app_state.recommender.is_empty() {
        return Err(RecommendationError::Unavailable.into());
    }

    let page = app_state
        .http_client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| RecommendationError::provider("article fetch", e))?
        .text()
        .await
        .map_err(|e| RecommendationError::provider("article fetch", e))?;

    let text = app_state.recommender.extract_article(&page).await?;

    Ok(text)
}

#[tracing::instrument(name = "[GET] articles", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Vec<Article>>, Error> {
    let articles = get_articles(&app_state.pool).await?;

    Ok(Json(articles))
}

/// Counts the pasted text, or the text extracted from `url` when nothing was
/// pasted, and stores only the counts.
#[tracing::instrument(name = "[POST] articles", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<NewArticleRequest>,
) -> Result<(StatusCode, Json<Article>), Error> {
    request.validate().map_err(Error::Validation)?;

    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::Library(LibraryError::EmptyField("title")));
    }

    let content = match (request.content, request.url.as_deref()) {
        (Some(content), _) => content,
        (None, Some(url)) => fetch_article_text(&app_state, url).await?,
        (None, None) => return Err(Error::Validation(missing_content())),
    };
    let stats = spawn_blocking_with_tracing(move || ArticleStats::count(&content))
        .await
        .map_err(|e| Error::Other(e.into()))?;

    let article = insert_article(
        &app_state.pool,
        &title,
        request.url.as_deref(),
        stats,
        today(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(article)))
}

#[tracing::instrument(name = "[DELETE] articles/{id}", skip_all, fields(path.id = path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, Error> {
    delete_article(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
