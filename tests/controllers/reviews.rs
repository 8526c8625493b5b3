use axum::http::{Method, StatusCode};
use readlog::model::{Book, Review};
use serde_json::json;

use crate::{AppStateTest, create_simple_book, delete, get, json_request, read_json};

#[tokio::test]
async fn store_should_attach_review_to_book() {
    let test_state = AppStateTest::new().await;
    let book = create_simple_book(&test_state, "Dune", "read").await;

    let request = json_request(
        Method::POST,
        &format!("/books/{}/reviews", book.id),
        json!({ "content": "  Great world building  ", "rating": 5 }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let review: Review = read_json(response).await;
    assert!(review.id > 0);
    assert_eq!(review.content, "Great world building");
    assert_eq!(review.rating, 5);

    let response = test_state
        .generate_response(get(&format!("/books/{}", book.id)))
        .await;
    let stored: Book = read_json(response).await;
    assert_eq!(stored.reviews, vec![review]);
}

#[tokio::test]
async fn store_should_be_error_when_rating_out_of_range() {
    let test_state = AppStateTest::new().await;
    let book = create_simple_book(&test_state, "Dune", "read").await;
    let uri = format!("/books/{}/reviews", book.id);

    // -----------------------------------------------------------------------------
    let request = json_request(Method::POST, &uri, json!({ "rating": 0 }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // -----------------------------------------------------------------------------
    let request = json_request(Method::POST, &uri, json!({ "rating": 6 }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // -----------------------------------------------------------------------------
    let request = json_request(Method::POST, "/books/999/reviews", json!({ "rating": 3 }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_and_destroy_should_change_only_that_review() {
    let test_state = AppStateTest::new().await;
    let book = create_simple_book(&test_state, "Dune", "read").await;
    let uri = format!("/books/{}/reviews", book.id);

    let response = test_state
        .generate_response(json_request(Method::POST, &uri, json!({ "rating": 2 })))
        .await;
    let first: Review = read_json(response).await;
    let response = test_state
        .generate_response(json_request(
            Method::POST,
            &uri,
            json!({ "content": "Second read", "rating": 4 }),
        ))
        .await;
    let second: Review = read_json(response).await;

    // -----------------------------------------------------------------------------
    let request = json_request(
        Method::PATCH,
        &format!("{uri}/{}", first.id),
        json!({ "rating": 3 }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Review = read_json(response).await;
    assert_eq!(updated.rating, 3);
    assert_eq!(updated.content, first.content);

    // -----------------------------------------------------------------------------
    let response = test_state
        .generate_response(delete(&format!("{uri}/{}", first.id)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(delete(&format!("{uri}/{}", first.id)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test_state
        .generate_response(get(&format!("/books/{}", book.id)))
        .await;
    let stored: Book = read_json(response).await;
    assert_eq!(stored.reviews, vec![second]);
}
