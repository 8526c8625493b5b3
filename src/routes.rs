use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{HeaderName, Request, header},
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{controllers, state::AppState};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn init_router(app_state: AppState) -> Router {
    let state = Arc::new(app_state);

    let app = Router::new()
        .route("/", get(controllers::home::index))
        .route("/stats", get(controllers::stats::index))
        .route(
            "/profile",
            get(controllers::profile::show).put(controllers::profile::update),
        )
        .route("/recommendations", post(controllers::recommendations::store));

    let books_route = Router::new()
        .route(
            "/",
            get(controllers::books::index).post(controllers::books::store),
        )
        .route(
            "/{id}",
            get(controllers::books::show)
                .patch(controllers::books::update)
                .delete(controllers::books::destroy),
        )
        .route("/{id}/reviews", post(controllers::reviews::store))
        .route(
            "/{id}/reviews/{review_id}",
            patch(controllers::reviews::update).delete(controllers::reviews::destroy),
        );

    let shelves_route = Router::new()
        .route(
            "/",
            get(controllers::shelves::index).post(controllers::shelves::store),
        )
        .route(
            "/{id}",
            patch(controllers::shelves::rename).delete(controllers::shelves::destroy),
        );

    let goals_route = Router::new()
        .route(
            "/{year}",
            get(controllers::goals::show).put(controllers::goals::update),
        )
        .route("/{year}/sync", post(controllers::goals::sync));

    let articles_route = Router::new()
        .route("/", post(controllers::articles::store))
        .layer(DefaultBodyLimit::max(10_485_760)) // 10MB of pasted text
        .route("/", get(controllers::articles::index))
        .route("/{id}", axum::routing::delete(controllers::articles::destroy));

    let x_request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or_default();
                let user_agent = request
                    .headers()
                    .get(header::USER_AGENT)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or_default();

                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::info_span!(
                    "http_request",
                    request_id,
                    method = ?request.method(),
                    uri = ?request.uri(),
                    path = matched_path,
                    version = ?request.version(),
                    user_agent,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id_header));

    app.nest("/books", books_route)
        .nest("/shelves", shelves_route)
        .nest("/goals", goals_route)
        .nest("/articles", articles_route)
        .layer(CompressionLayer::new())
        .layer(request_id_middleware)
        .with_state(state)
}
