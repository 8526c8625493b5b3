use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    db::{
        begin_write,
        books::load_library,
        error::DatabaseError,
        reviews::{delete_review, insert_review, update_review},
    },
    error::Error,
    library::{Change, ReviewUpdate},
    model::{BookId, Review, ReviewId},
    state::SharedAppState,
};

use super::{IdPath, today};

#[derive(Deserialize, Debug)]
pub struct ReviewPath {
    pub id: BookId,
    pub review_id: ReviewId,
}

#[derive(Deserialize, Debug, Validate)]
pub struct NewReviewRequest {
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub content: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
}

#[derive(Deserialize, Debug, Validate)]
pub struct UpdateReviewRequest {
    #[validate(length(max = 10000))]
    pub content: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<u8>,
}

#[tracing::instrument(name = "[POST] books/{id}/reviews", skip_all, fields(path.id = path.id))]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Path(path): Path<IdPath>,
    Json(request): Json<NewReviewRequest>,
) -> Result<(StatusCode, Json<Review>), Error> {
    request.validate().map_err(Error::Validation)?;

    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    let (library, _) = library.apply(Change::AddReview {
        book_id: path.id,
        review: Review {
            id: 0,
            content: request.content,
            rating: request.rating,
            date_added: today(),
        },
    })?;

    let mut review = library
        .book(path.id)?
        .reviews
        .last()
        .cloned()
        .ok_or_else(|| Error::Other(anyhow::anyhow!("added review missing from book")))?;
    review.id = insert_review(&mut tx, path.id, &review).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok((StatusCode::CREATED, Json(review)))
}

#[tracing::instrument(
    name = "[PATCH] books/{id}/reviews/{review_id}",
    skip_all,
    fields(path.id = path.id, path.review_id = path.review_id)
)]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<ReviewPath>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, Error> {
    request.validate().map_err(Error::Validation)?;

    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    let (library, _) = library.apply(Change::UpdateReview {
        book_id: path.id,
        review_id: path.review_id,
        update: ReviewUpdate {
            content: request.content,
            rating: request.rating,
        },
    })?;

    let review = library
        .book(path.id)?
        .reviews
        .iter()
        .find(|r| r.id == path.review_id)
        .cloned()
        .ok_or_else(|| Error::Other(anyhow::anyhow!("updated review missing from book")))?;
    update_review(&mut tx, path.id, &review).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(Json(review))
}

#[tracing::instrument(
    name = "[DELETE] books/{id}/reviews/{review_id}",
    skip_all,
    fields(path.id = path.id, path.review_id = path.review_id)
)]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<ReviewPath>,
) -> Result<StatusCode, Error> {
    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    library.apply(Change::DeleteReview {
        book_id: path.id,
        review_id: path.review_id,
    })?;

    delete_review(&mut tx, path.id, path.review_id).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(StatusCode::NO_CONTENT)
}
