use std::borrow::Cow;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Datelike;
use serde::Deserialize;
use sqlx::SqliteConnection;
use validator::{Validate, ValidateLength, ValidateUrl, ValidationError, ValidationErrors};

use crate::{
    db::{
        acquire, begin_write,
        books::{delete_book, get_book_by_id, insert_book, load_library, update_book},
        error::DatabaseError,
        goals::sync_goal,
    },
    error::Error,
    library::{
        BookUpdate, Change, Library, UpdateOutcome,
        view::{ViewQuery, build_view},
    },
    model::{Book, ReadingStatus, ShelfId},
    state::SharedAppState,
};

use super::{IdPath, deserialize_some, today};

#[derive(Deserialize, Debug, Default)]
pub struct BookListQuery {
    pub query: Option<String>,
    pub status: Option<String>,
    pub shelf: Option<String>,
    pub tag: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

impl BookListQuery {
    pub fn into_view_query(self) -> Result<ViewQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut view = ViewQuery {
            query: self.query.unwrap_or_default(),
            tag: self.tag.filter(|tag| tag != "none" && !tag.is_empty()),
            ..Default::default()
        };

        parse_into(&mut errors, "status", self.status, &mut view.status);
        parse_into(&mut errors, "shelf", self.shelf, &mut view.shelf);
        parse_into(&mut errors, "sort_by", self.sort_by, &mut view.sort_by);
        parse_into(
            &mut errors,
            "sort_direction",
            self.sort_direction,
            &mut view.direction,
        );

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(view)
    }
}

fn parse_into<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<String>,
    target: &mut T,
) where
    T: std::str::FromStr<Err = String>,
{
    let Some(value) = value else {
        return;
    };

    match value.parse() {
        Ok(parsed) => *target = parsed,
        Err(message) => errors.add(
            field,
            ValidationError::new("invalid_value").with_message(Cow::from(message)),
        ),
    }
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBookRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, max = 300))]
    pub author: String,
    pub status: ReadingStatus,
    pub progress: Option<u32>,
    #[validate(range(min = 1))]
    pub total_pages: Option<u32>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub tags: Vec<String>,
    pub shelf_id: Option<ShelfId>,
    #[validate(url)]
    pub cover_url: Option<String>,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    pub description: Option<String>,
}

impl NewBookRequest {
    fn into_book(self) -> Book {
        Book {
            id: 0,
            title: self.title,
            author: self.author,
            status: self.status,
            progress: self.progress,
            total_pages: self.total_pages,
            tags: self.tags,
            shelf_id: self.shelf_id,
            reviews: Vec::new(),
            date_added: today(),
            cover_url: self.cover_url,
            isbn: self.isbn,
            description: self.description,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<ReadingStatus>,
    pub progress: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub total_pages: Option<Option<u32>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub shelf_id: Option<Option<ShelfId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub cover_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub isbn: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

impl Validate for UpdateBookRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(title) = &self.title {
            if !title.validate_length(Some(1), Some(500), None) {
                errors.add(
                    "title",
                    ValidationError::new("title_length")
                        .with_message(Cow::from("Title length must be between 1 and 500")),
                );
            }
        }
        if let Some(author) = &self.author {
            if !author.validate_length(Some(1), Some(300), None) {
                errors.add(
                    "author",
                    ValidationError::new("author_length")
                        .with_message(Cow::from("Author length must be between 1 and 300")),
                );
            }
        }
        if let Some(tags) = &self.tags {
            if tags.len() > 50 {
                errors.add(
                    "tags",
                    ValidationError::new("tags_length")
                        .with_message(Cow::from("A book can carry at most 50 tags")),
                );
            }
        }
        if let Some(Some(cover_url)) = &self.cover_url {
            if !cover_url.validate_url() {
                errors.add(
                    "coverUrl",
                    ValidationError::new("cover_url_url")
                        .with_message(Cow::from("Cover url must be a valid url")),
                );
            }
        }
        if let Some(Some(isbn)) = &self.isbn {
            if !isbn.validate_length(None, Some(20), None) {
                errors.add(
                    "isbn",
                    ValidationError::new("isbn_length")
                        .with_message(Cow::from("ISBN must be at most 20 characters")),
                );
            }
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

impl From<UpdateBookRequest> for BookUpdate {
    fn from(request: UpdateBookRequest) -> Self {
        BookUpdate {
            title: request.title,
            author: request.author,
            status: request.status,
            progress: request.progress,
            total_pages: request.total_pages,
            tags: request.tags,
            shelf_id: request.shelf_id,
            cover_url: request.cover_url,
            isbn: request.isbn,
            description: request.description,
        }
    }
}

/// Recounts the current year's goal from the post-change library. Runs on
/// the write transaction that persisted the change.
async fn sync_goal_if_affected(
    conn: &mut SqliteConnection,
    outcome: UpdateOutcome,
    library: &Library,
) -> Result<(), Error> {
    if outcome.goal_affected {
        sync_goal(conn, today().year(), &library.books).await?;
    }

    Ok(())
}

#[tracing::instrument(name = "[GET] books", skip_all, fields(query = ?query))]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(query): Query<BookListQuery>,
) -> Result<Json<Vec<Book>>, Error> {
    let view = query.into_view_query().map_err(Error::Validation)?;

    let mut conn = acquire(&app_state.pool).await?;
    let library = load_library(&mut conn).await?;
    let books = build_view(&library.books, &view)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(books))
}

#[tracing::instrument(name = "[GET] books/{id}", skip_all, fields(path.id = path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<IdPath>,
) -> Result<Json<Book>, Error> {
    let mut conn = acquire(&app_state.pool).await?;
    let book = get_book_by_id(&mut conn, path.id).await?;

    Ok(Json(book))
}

#[tracing::instrument(name = "[POST] books", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<NewBookRequest>,
) -> Result<(StatusCode, Json<Book>), Error> {
    request.validate().map_err(Error::Validation)?;

    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    let (library, outcome) = library.apply(Change::AddBook(request.into_book()))?;

    let mut book = library
        .books
        .last()
        .cloned()
        .ok_or_else(|| Error::Other(anyhow::anyhow!("added book missing from library")))?;
    book.id = insert_book(&mut tx, &book).await?;

    sync_goal_if_affected(&mut tx, outcome, &library).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok((StatusCode::CREATED, Json(book)))
}

#[tracing::instrument(name = "[PATCH] books/{id}", skip_all, fields(path.id = path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<IdPath>,
    Json(request): Json<UpdateBookRequest>,
) -> Result<Json<Book>, Error> {
    request.validate().map_err(Error::Validation)?;

    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    let (library, outcome) = library.apply(Change::UpdateBook {
        id: path.id,
        update: request.into(),
    })?;

    let book = library.book(path.id)?.clone();
    update_book(&mut tx, &book).await?;

    sync_goal_if_affected(&mut tx, outcome, &library).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(Json(book))
}

#[tracing::instrument(name = "[DELETE] books/{id}", skip_all, fields(path.id = path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, Error> {
    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    let (library, outcome) = library.apply(Change::DeleteBook(path.id))?;

    delete_book(&mut tx, path.id).await?;

    sync_goal_if_affected(&mut tx, outcome, &library).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(StatusCode::NO_CONTENT)
}
