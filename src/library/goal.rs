use crate::model::{Book, ReadingGoal, ReadingStatus};

pub const DEFAULT_GOAL_TARGET: u32 = 24;

/// Recounts `current` for the goal of `year`.
///
/// All `read` books count, whatever year they were added in. The count is
/// always rebuilt from the collection, never adjusted incrementally. A goal
/// that does not exist yet is created with [`DEFAULT_GOAL_TARGET`]; an
/// existing one keeps its target.
#[tracing::instrument(name = "sync reading goal", skip(books, existing), fields(books = books.len()))]
pub fn sync(year: i32, books: &[Book], existing: Option<ReadingGoal>) -> ReadingGoal {
    let current = books
        .iter()
        .filter(|b| b.status == ReadingStatus::Read)
        .count() as u32;

    match existing {
        Some(goal) => ReadingGoal { current, ..goal },
        None => ReadingGoal {
            year,
            target: DEFAULT_GOAL_TARGET,
            current,
        },
    }
}
