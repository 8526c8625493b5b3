use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::{article::ArticleStats, error::Error, model::Article};

use super::error::DatabaseError;

#[tracing::instrument(name = "get articles", skip_all)]
pub async fn get_articles(pool: &SqlitePool) -> Result<Vec<Article>, Error> {
    sqlx::query_as::<_, Article>(
        r#"
        SELECT
            id, title, url,
            word_count, page_count, reading_minutes,
            date_added
        FROM
            articles
        ORDER BY date_added DESC, id DESC
    "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

#[tracing::instrument(name = "insert article", skip(pool, stats))]
pub async fn insert_article(
    pool: &SqlitePool,
    title: &str,
    url: Option<&str>,
    stats: ArticleStats,
    date_added: NaiveDate,
) -> Result<Article, Error> {
    sqlx::query_as::<_, Article>(
        r#"
        INSERT INTO articles
            (title, url, word_count, page_count, reading_minutes, date_added)
        VALUES
            ($1, $2, $3, $4, $5, $6)
        RETURNING id, title, url, word_count, page_count, reading_minutes, date_added;
    "#,
    )
    .bind(title)
    .bind(url)
    .bind(stats.word_count)
    .bind(stats.page_count)
    .bind(stats.reading_minutes)
    .bind(date_added)
    .fetch_one(pool)
    .await
    .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

#[tracing::instrument(name = "delete article", skip(pool))]
pub async fn delete_article(pool: &SqlitePool, article_id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM articles WHERE id = $1;")
        .bind(article_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Article")));
    }

    Ok(())
}
