use axum::http::{Method, StatusCode};
use readlog::{
    db::{acquire, goals::get_goal},
    model::{Book, ReadingGoal, ReadingStatus, Shelf},
};
use serde_json::json;

use crate::{AppStateTest, create_book, create_simple_book, delete, get, json_request, read_json};

#[tokio::test]
async fn index_should_be_ok_with_empty_library() {
    let test_state = AppStateTest::new().await;

    let response = test_state.generate_response(get("/books")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let books: Vec<Book> = read_json(response).await;
    assert!(books.is_empty());
}

#[tokio::test]
async fn store_should_normalize_new_book() {
    let test_state = AppStateTest::new().await;

    let book = create_book(
        &test_state,
        json!({
            "title": "  Dune  ",
            "author": "Frank Herbert",
            "status": "read",
            "totalPages": 412,
            "progress": null,
            "tags": ["sci-fi", " classic ", "sci-fi", ""],
            "isbn": "9780441013593",
        }),
    )
    .await;

    assert!(book.id > 0);
    assert_eq!(book.title, "Dune");
    assert_eq!(book.status, ReadingStatus::Read);
    assert_eq!(book.progress, Some(412));
    assert_eq!(book.tags, vec!["sci-fi", "classic"]);

    let response = test_state
        .generate_response(get(&format!("/books/{}", book.id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored: Book = read_json(response).await;
    assert_eq!(stored, book);
}

#[tokio::test]
async fn store_should_be_error_when_body_invalid() {
    let test_state = AppStateTest::new().await;

    // -----------------------------------------------------------------------------
    let request = json_request(
        Method::POST,
        "/books",
        json!({ "title": "", "author": "A", "status": "reading" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // -----------------------------------------------------------------------------
    let request = json_request(
        Method::POST,
        "/books",
        json!({ "title": "   ", "author": "A", "status": "reading" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // -----------------------------------------------------------------------------
    let request = json_request(
        Method::POST,
        "/books",
        json!({ "title": "T", "author": "A", "status": "reading", "totalPages": 0 }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // -----------------------------------------------------------------------------
    let request = json_request(
        Method::POST,
        "/books",
        json!({ "title": "T", "author": "A", "status": "reading", "totalPages": 10, "progress": 11 }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // -----------------------------------------------------------------------------
    let request = json_request(
        Method::POST,
        "/books",
        json!({ "title": "T", "author": "A", "status": "reading", "shelfId": 99 }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test_state.generate_response(get("/books")).await;
    let books: Vec<Book> = read_json(response).await;
    assert!(books.is_empty());
}

#[tokio::test]
async fn index_should_filter_and_sort() {
    let test_state = AppStateTest::new().await;

    create_book(
        &test_state,
        json!({ "title": "Dune", "author": "Frank Herbert", "status": "read", "tags": ["sci-fi"] }),
    )
    .await;
    create_book(
        &test_state,
        json!({ "title": "emma", "author": "Jane Austen", "status": "want_to_read", "tags": ["classic"] }),
    )
    .await;
    create_book(
        &test_state,
        json!({ "title": "Hyperion", "author": "Dan Simmons", "status": "reading", "tags": ["sci-fi"] }),
    )
    .await;

    // -----------------------------------------------------------------------------
    let response = test_state
        .generate_response(get("/books?sort_by=title&sort_direction=asc"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let books: Vec<Book> = read_json(response).await;
    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "emma", "Hyperion"]);

    // -----------------------------------------------------------------------------
    let response = test_state.generate_response(get("/books?tag=sci-fi")).await;
    let books: Vec<Book> = read_json(response).await;
    assert_eq!(books.len(), 2);

    // -----------------------------------------------------------------------------
    let response = test_state.generate_response(get("/books?query=austen")).await;
    let books: Vec<Book> = read_json(response).await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "emma");

    // -----------------------------------------------------------------------------
    let response = test_state
        .generate_response(get("/books?status=reading&tag=sci-fi"))
        .await;
    let books: Vec<Book> = read_json(response).await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Hyperion");

    // -----------------------------------------------------------------------------
    let response = test_state
        .generate_response(get("/books?sort_by=pages"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn index_should_filter_by_custom_shelf() {
    let test_state = AppStateTest::new().await;

    let request = json_request(Method::POST, "/shelves", json!({ "name": "Favourites" }));
    let response = test_state.generate_response(request).await;
    let shelf: Shelf = read_json(response).await;

    create_book(
        &test_state,
        json!({ "title": "On shelf", "author": "A", "status": "read", "shelfId": shelf.id }),
    )
    .await;
    create_simple_book(&test_state, "Loose", "read").await;

    let response = test_state
        .generate_response(get(&format!("/books?shelf={}", shelf.id)))
        .await;
    let books: Vec<Book> = read_json(response).await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "On shelf");
}

#[tokio::test]
async fn update_should_follow_status_rules_and_sync_goal() {
    let test_state = AppStateTest::new().await;
    let book = create_simple_book(&test_state, "Dune", "want_to_read").await;
    let uri = format!("/books/{}", book.id);

    // -----------------------------------------------------------------------------
    let request = json_request(Method::PATCH, &uri, json!({ "progress": 10 }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // -----------------------------------------------------------------------------
    let request = json_request(
        Method::PATCH,
        &uri,
        json!({ "status": "reading", "progress": 120 }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Book = read_json(response).await;
    assert_eq!(updated.status, ReadingStatus::Reading);
    assert_eq!(updated.progress, Some(120));

    // -----------------------------------------------------------------------------
    let request = json_request(Method::PATCH, &uri, json!({ "status": "read" }));
    let response = test_state.generate_response(request).await;
    let updated: Book = read_json(response).await;
    assert_eq!(updated.progress, Some(300));

    let response = test_state
        .generate_response(json_request(
            Method::POST,
            &format!("/goals/{}/sync", chrono::Utc::now().format("%Y")),
            json!({}),
        ))
        .await;
    let goal: ReadingGoal = read_json(response).await;
    assert_eq!(goal.current, 1);

    // -----------------------------------------------------------------------------
    let request = json_request(Method::PATCH, &uri, json!({ "status": "want_to_read" }));
    let response = test_state.generate_response(request).await;
    let updated: Book = read_json(response).await;
    assert_eq!(updated.progress, None);
}

#[tokio::test]
async fn update_should_clear_nullable_fields() {
    let test_state = AppStateTest::new().await;
    let book = create_book(
        &test_state,
        json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "status": "reading",
            "isbn": "123",
            "description": "Spice",
        }),
    )
    .await;

    let request = json_request(
        Method::PATCH,
        &format!("/books/{}", book.id),
        json!({ "isbn": null, "title": "Dune Messiah" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Book = read_json(response).await;
    assert_eq!(updated.isbn, None);
    assert_eq!(updated.description.as_deref(), Some("Spice"));
    assert_eq!(updated.title, "Dune Messiah");
}

#[tokio::test]
async fn show_and_update_should_be_not_found_for_unknown_book() {
    let test_state = AppStateTest::new().await;

    let response = test_state.generate_response(get("/books/42")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = json_request(Method::PATCH, "/books/42", json!({ "title": "X" }));
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test_state.generate_response(delete("/books/42")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn destroy_should_remove_book_and_recount_goal() {
    let test_state = AppStateTest::new().await;
    let year = chrono::Utc::now().format("%Y").to_string();

    let book = create_simple_book(&test_state, "Dune", "read").await;
    create_simple_book(&test_state, "Emma", "read").await;

    let response = test_state
        .generate_response(get(&format!("/goals/{year}")))
        .await;
    let goal: ReadingGoal = read_json(response).await;
    assert_eq!(goal.current, 2);

    let response = test_state
        .generate_response(delete(&format!("/books/{}", book.id)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(get(&format!("/books/{}", book.id)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test_state
        .generate_response(get(&format!("/goals/{year}")))
        .await;
    let goal: ReadingGoal = read_json(response).await;
    assert_eq!(goal.current, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_should_not_lose_writes() {
    let test_state = AppStateTest::new().await;
    let year = chrono::Datelike::year(&chrono::Utc::now());

    for round in 0..30 {
        let first = create_simple_book(&test_state, &format!("First {round}"), "want_to_read").await;
        let second =
            create_simple_book(&test_state, &format!("Second {round}"), "want_to_read").await;
        let first_uri = format!("/books/{}", first.id);
        let second_uri = format!("/books/{}", second.id);

        let (renamed, first_read, second_read) = tokio::join!(
            test_state.generate_response(json_request(
                Method::PATCH,
                &first_uri,
                json!({ "title": "Renamed" }),
            )),
            test_state.generate_response(json_request(
                Method::PATCH,
                &first_uri,
                json!({ "status": "read" }),
            )),
            test_state.generate_response(json_request(
                Method::PATCH,
                &second_uri,
                json!({ "status": "read" }),
            )),
        );
        assert_eq!(renamed.status(), StatusCode::OK);
        assert_eq!(first_read.status(), StatusCode::OK);
        assert_eq!(second_read.status(), StatusCode::OK);

        let response = test_state.generate_response(get(&first_uri)).await;
        let book: Book = read_json(response).await;
        assert_eq!(book.title, "Renamed", "round {round}");
        assert_eq!(book.status, ReadingStatus::Read, "round {round}");
    }

    let response = test_state.generate_response(get("/books?status=read")).await;
    let read_books: Vec<Book> = read_json(response).await;
    assert_eq!(read_books.len(), 60);

    let mut conn = acquire(&test_state.app_state.pool).await.unwrap();
    let stored = get_goal(&mut conn, year).await.unwrap().unwrap();
    assert_eq!(stored.current as usize, read_books.len());
}
