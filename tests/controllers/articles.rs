use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    Router,
    http::{Method, StatusCode},
    response::Html,
    routing,
};
use readlog::{
    model::Article,
    recommendation::{RecommendationChain, RecommendationError, RecommendationProvider},
};
use serde_json::json;
use tokio::net::TcpListener;

use crate::{AppStateTest, delete, get, json_request, read_json};

const PAGE: &str =
    "<html><body><nav>Home</nav><article><p>Hello readers of the stub page</p></article></body></html>";

/// Answers with the paragraph text when the prompt carries the stub page.
struct ParagraphExtractor;

#[async_trait]
impl RecommendationProvider for ParagraphExtractor {
    fn name(&self) -> &str {
        "paragraph"
    }

    async fn complete(&self, prompt: &str) -> Result<String, RecommendationError> {
        if prompt.contains("<p>Hello readers of the stub page</p>") {
            Ok("  Hello readers of the stub page  ".to_string())
        } else {
            Err(RecommendationError::provider("paragraph", "page missing from prompt"))
        }
    }
}

/// Serves [`PAGE`] on a random local port and returns its url.
async fn serve_page() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let router = Router::new()
        .route("/post", routing::get(|| async { Html(PAGE) }))
        .route("/gone", routing::get(|| async { StatusCode::NOT_FOUND }));

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{address}")
}

fn extractor_chain() -> RecommendationChain {
    let provider: Arc<dyn RecommendationProvider> = Arc::new(ParagraphExtractor);

    RecommendationChain::new(vec![provider], Duration::from_secs(5))
}

#[tokio::test]
async fn store_should_count_words_pages_and_minutes() {
    let test_state = AppStateTest::new().await;
    let content = "word ".repeat(501);

    let request = json_request(
        Method::POST,
        "/articles",
        json!({
            "title": "Long read",
            "url": "https://example.com/long-read",
            "content": content,
        }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let article: Article = read_json(response).await;
    assert_eq!(article.word_count, 501);
    assert_eq!(article.page_count, 3);
    assert_eq!(article.reading_minutes, 3);

    let response = test_state.generate_response(get("/articles")).await;
    let articles: Vec<Article> = read_json(response).await;
    assert_eq!(articles, vec![article]);
}

#[tokio::test]
async fn store_should_be_error_when_body_invalid() {
    let test_state = AppStateTest::new().await;

    // -----------------------------------------------------------------------------
    let request = json_request(
        Method::POST,
        "/articles",
        json!({ "title": "T", "url": "nope", "content": "text" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // -----------------------------------------------------------------------------
    let request = json_request(
        Method::POST,
        "/articles",
        json!({ "title": "  ", "content": "text" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn destroy_should_remove_article() {
    let test_state = AppStateTest::new().await;

    let request = json_request(
        Method::POST,
        "/articles",
        json!({ "title": "Short", "content": "one two three" }),
    );
    let response = test_state.generate_response(request).await;
    let article: Article = read_json(response).await;

    let uri = format!("/articles/{}", article.id);
    let response = test_state.generate_response(delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state.generate_response(delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_should_count_text_extracted_from_url() {
    let test_state = AppStateTest::with_recommender(extractor_chain()).await;
    let base = serve_page().await;

    let request = json_request(
        Method::POST,
        "/articles",
        json!({ "title": "Stub", "url": format!("{base}/post") }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let article: Article = read_json(response).await;
    assert_eq!(article.word_count, 6);
    assert_eq!(article.page_count, 1);
    assert_eq!(article.url, Some(format!("{base}/post")));
}

#[tokio::test]
async fn store_should_be_error_when_url_cannot_be_read() {
    let base = serve_page().await;

    // -----------------------------------------------------------------------------
    let test_state = AppStateTest::new().await;
    let request = json_request(
        Method::POST,
        "/articles",
        json!({ "title": "Stub", "url": format!("{base}/post") }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // -----------------------------------------------------------------------------
    let test_state = AppStateTest::with_recommender(extractor_chain()).await;
    let request = json_request(
        Method::POST,
        "/articles",
        json!({ "title": "Stub", "url": format!("{base}/gone") }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // -----------------------------------------------------------------------------
    let request = json_request(Method::POST, "/articles", json!({ "title": "Nothing" }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
