use sqlx::SqliteConnection;

use crate::{
    error::Error,
    model::{BookId, Review, ReviewId},
};

use super::error::DatabaseError;

#[tracing::instrument(name = "insert review", skip(conn, review), fields(rating = review.rating))]
pub async fn insert_review(
    conn: &mut SqliteConnection,
    book_id: BookId,
    review: &Review,
) -> Result<ReviewId, Error> {
    let review_id: ReviewId = sqlx::query_scalar(
        r#"
        INSERT INTO reviews
            (book_id, content, rating, date_added)
        VALUES
            ($1, $2, $3, $4)
        RETURNING id;
    "#,
    )
    .bind(book_id)
    .bind(&review.content)
    .bind(review.rating)
    .bind(review.date_added)
    .fetch_one(&mut *conn)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(review_id)
}

#[tracing::instrument(name = "update review", skip(conn, review), fields(review_id = review.id))]
pub async fn update_review(conn: &mut SqliteConnection, book_id: BookId, review: &Review) -> Result<(), Error> {
    let result = sqlx::query(
        r#"
        UPDATE reviews
        SET
            content = $1,
            rating = $2
        WHERE
            id = $3 AND book_id = $4;
    "#,
    )
    .bind(&review.content)
    .bind(review.rating)
    .bind(review.id)
    .bind(book_id)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Review")));
    }

    Ok(())
}

#[tracing::instrument(name = "delete review", skip(conn))]
pub async fn delete_review(
    conn: &mut SqliteConnection,
    book_id: BookId,
    review_id: ReviewId,
) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND book_id = $2;")
        .bind(review_id)
        .bind(book_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Review")));
    }

    Ok(())
}
