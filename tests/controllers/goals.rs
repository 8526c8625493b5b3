use axum::http::{Method, StatusCode};
use readlog::model::ReadingGoal;
use serde_json::json;

use crate::{AppStateTest, create_simple_book, get, json_request, read_json};

#[tokio::test]
async fn show_should_report_default_target_for_new_year() {
    let test_state = AppStateTest::new().await;

    let response = test_state.generate_response(get("/goals/2031")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let goal: ReadingGoal = read_json(response).await;
    assert_eq!(
        goal,
        ReadingGoal {
            year: 2031,
            target: 24,
            current: 0,
        }
    );
}

#[tokio::test]
async fn update_should_keep_target_across_syncs() {
    let test_state = AppStateTest::new().await;
    create_simple_book(&test_state, "Dune", "read").await;
    create_simple_book(&test_state, "Emma", "reading").await;

    // -----------------------------------------------------------------------------
    let request = json_request(Method::PUT, "/goals/2030", json!({ "target": 12 }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let goal: ReadingGoal = read_json(response).await;
    assert_eq!(goal.target, 12);
    assert_eq!(goal.current, 1);

    // -----------------------------------------------------------------------------
    let request = json_request(Method::POST, "/goals/2030/sync", json!({}));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let goal: ReadingGoal = read_json(response).await;
    assert_eq!(goal.target, 12);
    assert_eq!(goal.current, 1);

    // -----------------------------------------------------------------------------
    let request = json_request(Method::PUT, "/goals/2030", json!({ "target": 0 }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
