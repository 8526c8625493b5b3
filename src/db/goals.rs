use sqlx::SqliteConnection;

use crate::{
    error::Error,
    library::goal,
    model::{Book, ReadingGoal},
};

use super::error::DatabaseError;

#[tracing::instrument(name = "get reading goal", skip(conn))]
pub async fn get_goal(conn: &mut SqliteConnection, year: i32) -> Result<Option<ReadingGoal>, Error> {
    sqlx::query_as::<_, ReadingGoal>(
        r#"
        SELECT
            year, target, current
        FROM
            reading_goals
        WHERE
            year = $1;
    "#,
    )
    .bind(year)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

#[tracing::instrument(name = "save reading goal", skip(conn))]
pub async fn save_goal(conn: &mut SqliteConnection, goal: &ReadingGoal) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO reading_goals
            (year, target, current)
        VALUES
            ($1, $2, $3)
        ON CONFLICT (year)
        DO UPDATE SET
            target = EXCLUDED.target,
            current = EXCLUDED.current;
    "#,
    )
    .bind(goal.year)
    .bind(goal.target)
    .bind(goal.current)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}

/// Recounts the goal of `year` from `books` and stores it, creating the goal
/// with the default target when the year has none.
#[tracing::instrument(name = "sync stored reading goal", skip(conn, books))]
pub async fn sync_goal(conn: &mut SqliteConnection, year: i32, books: &[Book]) -> Result<ReadingGoal, Error> {
    let existing = get_goal(conn, year).await?;
    let goal = goal::sync(year, books, existing);
    save_goal(conn, &goal).await?;

    tracing::info!(year, current = goal.current, target = goal.target, "Reading goal synced");

    Ok(goal)
}
