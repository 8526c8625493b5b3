use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use readlog::recommendation::{
    Recommendation, RecommendationChain, RecommendationError, RecommendationProvider,
};
use serde_json::json;

use crate::{AppStateTest, create_simple_book, json_request, read_json};

struct CannedProvider {
    answer: Option<&'static str>,
}

#[async_trait]
impl RecommendationProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, RecommendationError> {
        self.answer
            .map(str::to_string)
            .ok_or_else(|| RecommendationError::provider("canned", "upstream returned 500"))
    }
}

fn chain(answer: Option<&'static str>) -> RecommendationChain {
    let provider: Arc<dyn RecommendationProvider> = Arc::new(CannedProvider { answer });

    RecommendationChain::new(vec![provider], Duration::from_secs(5))
}

#[tokio::test]
async fn store_should_be_unavailable_without_providers() {
    let test_state = AppStateTest::new().await;

    let request = json_request(Method::POST, "/recommendations", json!({}));
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn store_should_return_unknown_books_only() {
    let test_state = AppStateTest::with_recommender(chain(Some(
        r#"Here you go:
        [
            {"title": "Dune", "author": "Frank Herbert", "reason": "Already read"},
            {"title": "Hyperion", "author": "Dan Simmons", "reason": "Epic sci-fi"}
        ]"#,
    )))
    .await;
    create_simple_book(&test_state, "Dune", "read").await;

    let request = json_request(Method::POST, "/recommendations", json!({ "count": 3 }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let recommendations: Vec<Recommendation> = read_json(response).await;
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].title, "Hyperion");
}

#[tokio::test]
async fn store_should_be_bad_gateway_when_every_provider_fails() {
    let test_state = AppStateTest::with_recommender(chain(None)).await;

    // -----------------------------------------------------------------------------
    let request = json_request(Method::POST, "/recommendations", json!({}));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // -----------------------------------------------------------------------------
    let request = json_request(Method::POST, "/recommendations", json!({ "count": 0 }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
