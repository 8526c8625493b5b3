use crate::model::{BookId, ReviewId, ShelfId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Book {0} not found")]
    BookNotFound(BookId),
    #[error("Review {0} not found")]
    ReviewNotFound(ReviewId),
    #[error("Shelf {0} not found")]
    ShelfNotFound(ShelfId),
    #[error("Shelf `{0}` already exists")]
    DuplicateShelf(String),
    #[error("Field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("Rating {0} is outside 1..=5")]
    InvalidRating(u8),
    #[error("Total pages must be positive")]
    InvalidTotalPages,
    #[error("Progress can only be set while reading")]
    ProgressRequiresReading,
    #[error("Progress {progress} exceeds total pages {total}")]
    ProgressExceedsTotal { progress: u32, total: u32 },
}

impl LibraryError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LibraryError::BookNotFound(_)
                | LibraryError::ReviewNotFound(_)
                | LibraryError::ShelfNotFound(_)
        )
    }
}
