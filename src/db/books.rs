use std::collections::HashMap;

use chrono::NaiveDate;
use futures::TryStreamExt;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    error::Error,
    library::Library,
    model::{Book, BookId, ReadingStatus, Review, ShelfId},
};

use super::{error::DatabaseError, shelves::get_shelves};

#[derive(sqlx::FromRow)]
struct BookRow {
    id: BookId,
    title: String,
    author: String,
    status: ReadingStatus,
    progress: Option<u32>,
    total_pages: Option<u32>,
    shelf_id: Option<ShelfId>,
    cover_url: Option<String>,
    isbn: Option<String>,
    description: Option<String>,
    date_added: NaiveDate,
}

#[derive(sqlx::FromRow)]
struct TagRow {
    book_id: BookId,
    tag: String,
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    book_id: BookId,
    content: String,
    rating: u8,
    date_added: NaiveDate,
}

impl BookRow {
    fn into_book(self, tags: Vec<String>, reviews: Vec<Review>) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            status: self.status,
            progress: self.progress,
            total_pages: self.total_pages,
            tags,
            shelf_id: self.shelf_id,
            reviews,
            date_added: self.date_added,
            cover_url: self.cover_url,
            isbn: self.isbn,
            description: self.description,
        }
    }
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            content: row.content,
            rating: row.rating,
            date_added: row.date_added,
        }
    }
}

const SELECT_BOOKS: &str = r#"
    SELECT
        id, title, author,
        status, progress, total_pages,
        shelf_id, cover_url, isbn,
        description, date_added
    FROM
        books
"#;

/// Loads the whole collection with tags, reviews and shelves as one snapshot.
#[tracing::instrument(name = "load library", skip_all)]
pub async fn load_library(conn: &mut SqliteConnection) -> Result<Library, Error> {
    let mut tags: HashMap<BookId, Vec<String>> = HashMap::new();
    let mut tag_stream = sqlx::query_as::<_, TagRow>(
        r#"
        SELECT
            book_id, tag
        FROM
            book_tags
        ORDER BY book_id, position
    "#,
    )
    .fetch(&mut *conn);
    while let Some(row) = tag_stream
        .try_next()
        .await
        .map_err(DatabaseError::DatabaseError)?
    {
        tags.entry(row.book_id).or_default().push(row.tag);
    }
    drop(tag_stream);

    let mut reviews: HashMap<BookId, Vec<Review>> = HashMap::new();
    let mut review_stream = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT
            id, book_id, content, rating, date_added
        FROM
            reviews
        ORDER BY id
    "#,
    )
    .fetch(&mut *conn);
    while let Some(row) = review_stream
        .try_next()
        .await
        .map_err(DatabaseError::DatabaseError)?
    {
        reviews.entry(row.book_id).or_default().push(row.into());
    }
    drop(review_stream);

    let rows = sqlx::query_as::<_, BookRow>(&format!("{} ORDER BY id", SELECT_BOOKS))
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    let books = rows
        .into_iter()
        .map(|row| {
            let book_tags = tags.remove(&row.id).unwrap_or_default();
            let book_reviews = reviews.remove(&row.id).unwrap_or_default();
            row.into_book(book_tags, book_reviews)
        })
        .collect();

    let shelves = get_shelves(conn).await?;

    Ok(Library::new(books, shelves))
}

#[tracing::instrument(name = "get book by id", skip(conn))]
pub async fn get_book_by_id(conn: &mut SqliteConnection, book_id: BookId) -> Result<Book, Error> {
    let row = sqlx::query_as::<_, BookRow>(&format!("{} WHERE id = $1", SELECT_BOOKS))
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::DatabaseError)?
        .ok_or(DatabaseError::NotFound("Book"))?;

    let tags = sqlx::query_scalar::<_, String>(
        r#"
        SELECT
            tag
        FROM
            book_tags
        WHERE
            book_id = $1
        ORDER BY position
    "#,
    )
    .bind(book_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    let reviews = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT
            id, book_id, content, rating, date_added
        FROM
            reviews
        WHERE
            book_id = $1
        ORDER BY id
    "#,
    )
    .bind(book_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(DatabaseError::DatabaseError)?
    .into_iter()
    .map(Review::from)
    .collect();

    Ok(row.into_book(tags, reviews))
}

/// Inserts a new book with its tags and returns the assigned id. Reviews are
/// stored separately.
#[tracing::instrument(name = "insert book", skip_all, fields(title = %book.title))]
pub async fn insert_book(conn: &mut SqliteConnection, book: &Book) -> Result<BookId, Error> {
    let book_id: BookId = sqlx::query_scalar(
        r#"
        INSERT INTO books
            (title, author, status, progress, total_pages, shelf_id, cover_url, isbn, description, date_added)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id;
    "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.status)
    .bind(book.progress)
    .bind(book.total_pages)
    .bind(book.shelf_id)
    .bind(&book.cover_url)
    .bind(&book.isbn)
    .bind(&book.description)
    .bind(book.date_added)
    .fetch_one(&mut *conn)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    replace_book_tags(conn, book_id, &book.tags).await?;

    Ok(book_id)
}

#[tracing::instrument(name = "update book", skip_all, fields(book_id = book.id))]
pub async fn update_book(conn: &mut SqliteConnection, book: &Book) -> Result<(), Error> {
    let result = sqlx::query(
        r#"
        UPDATE books
        SET
            title = $1,
            author = $2,
            status = $3,
            progress = $4,
            total_pages = $5,
            shelf_id = $6,
            cover_url = $7,
            isbn = $8,
            description = $9
        WHERE
            id = $10;
    "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.status)
    .bind(book.progress)
    .bind(book.total_pages)
    .bind(book.shelf_id)
    .bind(&book.cover_url)
    .bind(&book.isbn)
    .bind(&book.description)
    .bind(book.id)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Book")));
    }

    replace_book_tags(conn, book.id, &book.tags).await?;

    Ok(())
}

#[tracing::instrument(name = "delete book", skip(conn))]
pub async fn delete_book(conn: &mut SqliteConnection, book_id: BookId) -> Result<(), Error> {
    for statement in [
        "DELETE FROM reviews WHERE book_id = $1;",
        "DELETE FROM book_tags WHERE book_id = $1;",
    ] {
        sqlx::query(statement)
            .bind(book_id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::DatabaseError)?;
    }

    let result = sqlx::query("DELETE FROM books WHERE id = $1;")
        .bind(book_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Book")));
    }

    Ok(())
}

async fn replace_book_tags(
    conn: &mut SqliteConnection,
    book_id: BookId,
    tags: &[String],
) -> Result<(), Error> {
    sqlx::query("DELETE FROM book_tags WHERE book_id = $1;")
        .bind(book_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if tags.is_empty() {
        return Ok(());
    }

    let mut tag_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        INSERT INTO book_tags
            (book_id, position, tag)
    "#,
    );
    tag_builder.push_values(tags.iter().enumerate(), |mut b, (position, tag)| {
        b.push_bind(book_id).push_bind(position as i64).push_bind(tag);
    });

    tag_builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}
