//! Derived views over the book collection.
//!
//! [`Library`] is an immutable snapshot of books and custom shelves. Every
//! mutation goes through [`Library::apply`], which consumes the snapshot and
//! returns the next one together with an [`UpdateOutcome`] telling the caller
//! whether the reading goal has to be recounted. Statistics, filtered views and
//! goal synchronization are pure functions over a snapshot.

pub mod error;
pub mod goal;
pub mod stats;
pub mod view;

use crate::model::{Book, BookId, ReadingStatus, Review, ReviewId, Shelf, ShelfId};

pub use error::LibraryError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Library {
    pub books: Vec<Book>,
    pub shelves: Vec<Shelf>,
}

/// Field-level edit of a book. `None` leaves the field untouched, `Some(None)`
/// clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<ReadingStatus>,
    pub progress: Option<u32>,
    pub total_pages: Option<Option<u32>>,
    pub tags: Option<Vec<String>>,
    pub shelf_id: Option<Option<ShelfId>>,
    pub cover_url: Option<Option<String>>,
    pub isbn: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewUpdate {
    pub content: Option<String>,
    pub rating: Option<u8>,
}

#[derive(Debug, Clone)]
pub enum Change {
    AddBook(Book),
    UpdateBook {
        id: BookId,
        update: BookUpdate,
    },
    DeleteBook(BookId),
    AddReview {
        book_id: BookId,
        review: Review,
    },
    UpdateReview {
        book_id: BookId,
        review_id: ReviewId,
        update: ReviewUpdate,
    },
    DeleteReview {
        book_id: BookId,
        review_id: ReviewId,
    },
    AddShelf(Shelf),
    RenameShelf {
        id: ShelfId,
        name: String,
    },
    DeleteShelf(ShelfId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The count of `read` books may have changed; the reading goal must be synced.
    pub goal_affected: bool,
}

impl Library {
    pub fn new(books: Vec<Book>, shelves: Vec<Shelf>) -> Self {
        Library { books, shelves }
    }

    pub fn book(&self, id: BookId) -> Result<&Book, LibraryError> {
        self.books
            .iter()
            .find(|b| b.id == id)
            .ok_or(LibraryError::BookNotFound(id))
    }

    pub fn shelf(&self, id: ShelfId) -> Result<&Shelf, LibraryError> {
        self.shelves
            .iter()
            .find(|s| s.id == id)
            .ok_or(LibraryError::ShelfNotFound(id))
    }

    #[tracing::instrument(name = "apply library change", skip_all)]
    pub fn apply(mut self, change: Change) -> Result<(Library, UpdateOutcome), LibraryError> {
        let mut outcome = UpdateOutcome::default();

        match change {
            Change::AddBook(book) => {
                let book = self.prepare_new_book(book)?;
                outcome.goal_affected = book.status == ReadingStatus::Read;
                self.books.push(book);
            }
            Change::UpdateBook { id, update } => {
                let position = self.book_position(id)?;
                let updated = self.updated_book(&self.books[position], update)?;
                outcome.goal_affected = (self.books[position].status == ReadingStatus::Read)
                    != (updated.status == ReadingStatus::Read);
                self.books[position] = updated;
            }
            Change::DeleteBook(id) => {
                let position = self.book_position(id)?;
                self.books.remove(position);
                outcome.goal_affected = true;
            }
            Change::AddReview { book_id, mut review } => {
                validate_rating(review.rating)?;
                review.content = review.content.trim().to_string();
                let position = self.book_position(book_id)?;
                self.books[position].reviews.push(review);
            }
            Change::UpdateReview {
                book_id,
                review_id,
                update,
            } => {
                let position = self.book_position(book_id)?;
                let review = self.books[position]
                    .reviews
                    .iter_mut()
                    .find(|r| r.id == review_id)
                    .ok_or(LibraryError::ReviewNotFound(review_id))?;

                if let Some(rating) = update.rating {
                    validate_rating(rating)?;
                    review.rating = rating;
                }
                if let Some(content) = update.content {
                    review.content = content.trim().to_string();
                }
            }
            Change::DeleteReview { book_id, review_id } => {
                let position = self.book_position(book_id)?;
                let reviews = &mut self.books[position].reviews;
                let review_position = reviews
                    .iter()
                    .position(|r| r.id == review_id)
                    .ok_or(LibraryError::ReviewNotFound(review_id))?;
                reviews.remove(review_position);
            }
            Change::AddShelf(mut shelf) => {
                shelf.name = self.checked_shelf_name(&shelf.name, None)?;
                self.shelves.push(shelf);
            }
            Change::RenameShelf { id, name } => {
                let name = self.checked_shelf_name(&name, Some(id))?;
                let shelf = self
                    .shelves
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or(LibraryError::ShelfNotFound(id))?;
                shelf.name = name;
            }
            Change::DeleteShelf(id) => {
                let position = self
                    .shelves
                    .iter()
                    .position(|s| s.id == id)
                    .ok_or(LibraryError::ShelfNotFound(id))?;
                self.shelves.remove(position);

                for book in self.books.iter_mut().filter(|b| b.shelf_id == Some(id)) {
                    book.shelf_id = None;
                }
            }
        }

        Ok((self, outcome))
    }

    fn book_position(&self, id: BookId) -> Result<usize, LibraryError> {
        self.books
            .iter()
            .position(|b| b.id == id)
            .ok_or(LibraryError::BookNotFound(id))
    }

    fn prepare_new_book(&self, mut book: Book) -> Result<Book, LibraryError> {
        book.title = required_text("title", &book.title)?;
        book.author = required_text("author", &book.author)?;
        book.tags = normalize_tags(book.tags);
        if book.total_pages == Some(0) {
            return Err(LibraryError::InvalidTotalPages);
        }
        if let Some(shelf_id) = book.shelf_id {
            self.shelf(shelf_id)?;
        }
        for review in &book.reviews {
            validate_rating(review.rating)?;
        }

        let progress = book.progress.take();
        normalize_progress(&mut book);
        if let Some(progress) = progress {
            set_progress(&mut book, progress)?;
        }

        Ok(book)
    }

    fn updated_book(&self, current: &Book, update: BookUpdate) -> Result<Book, LibraryError> {
        let mut book = current.clone();

        if let Some(title) = update.title {
            book.title = required_text("title", &title)?;
        }
        if let Some(author) = update.author {
            book.author = required_text("author", &author)?;
        }
        if let Some(total_pages) = update.total_pages {
            if total_pages == Some(0) {
                return Err(LibraryError::InvalidTotalPages);
            }
            book.total_pages = total_pages;
        }
        if let Some(tags) = update.tags {
            book.tags = normalize_tags(tags);
        }
        if let Some(shelf_id) = update.shelf_id {
            if let Some(id) = shelf_id {
                self.shelf(id)?;
            }
            book.shelf_id = shelf_id;
        }
        if let Some(cover_url) = update.cover_url {
            book.cover_url = cover_url;
        }
        if let Some(isbn) = update.isbn {
            book.isbn = isbn;
        }
        if let Some(description) = update.description {
            book.description = description;
        }
        if let Some(status) = update.status {
            book.status = status;
        }

        normalize_progress(&mut book);
        if let Some(progress) = update.progress {
            set_progress(&mut book, progress)?;
        }

        Ok(book)
    }

    fn checked_shelf_name(
        &self,
        name: &str,
        renaming: Option<ShelfId>,
    ) -> Result<String, LibraryError> {
        let name = required_text("name", name)?;
        let taken = self
            .shelves
            .iter()
            .filter(|s| Some(s.id) != renaming)
            .any(|s| s.name.to_lowercase() == name.to_lowercase());
        if taken {
            return Err(LibraryError::DuplicateShelf(name));
        }

        Ok(name)
    }
}

/// Enforces the progress rules tied to the status: cleared for `want_to_read`,
/// pinned to the page count for `read`.
fn normalize_progress(book: &mut Book) {
    match book.status {
        ReadingStatus::WantToRead => book.progress = None,
        ReadingStatus::Reading => {
            if let (Some(progress), Some(total)) = (book.progress, book.total_pages) {
                book.progress = Some(progress.min(total));
            }
        }
        ReadingStatus::Read => {
            if book.total_pages.is_some() {
                book.progress = book.total_pages;
            }
        }
    }
}

fn set_progress(book: &mut Book, progress: u32) -> Result<(), LibraryError> {
    if book.status != ReadingStatus::Reading {
        return Err(LibraryError::ProgressRequiresReading);
    }
    if let Some(total) = book.total_pages {
        if progress > total {
            return Err(LibraryError::ProgressExceedsTotal { progress, total });
        }
    }
    book.progress = Some(progress);

    Ok(())
}

fn required_text(field: &'static str, value: &str) -> Result<String, LibraryError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LibraryError::EmptyField(field));
    }

    Ok(value.to_string())
}

fn validate_rating(rating: u8) -> Result<(), LibraryError> {
    if !(1..=5).contains(&rating) {
        return Err(LibraryError::InvalidRating(rating));
    }

    Ok(())
}

/// Trims tags, drops empty ones and keeps the first occurrence of duplicates.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|t| t == tag) {
            continue;
        }
        normalized.push(tag.to_string());
    }

    normalized
}
