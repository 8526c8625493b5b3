use std::cmp::Ordering;

use crate::model::{Book, ReadingStatus, ShelfId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReadingStatus),
}

/// Either one of the built-in status pseudo-shelves or a custom shelf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShelfFilter {
    #[default]
    All,
    Status(ReadingStatus),
    Custom(ShelfId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    DateAdded,
    Rating,
    Title,
    Author,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub query: String,
    pub status: StatusFilter,
    pub shelf: ShelfFilter,
    pub tag: Option<String>,
    pub sort_by: SortKey,
    pub direction: SortDirection,
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

impl std::str::FromStr for ShelfFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        if let Ok(status) = s.parse::<ReadingStatus>() {
            return Ok(Self::Status(status));
        }

        s.parse::<ShelfId>().map(Self::Custom).map_err(|_| {
            format!(
                "{} is not a shelf. Use `all`, a reading status or a shelf id.",
                s
            )
        })
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_added" => Ok(Self::DateAdded),
            "rating" => Ok(Self::Rating),
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            other => Err(format!(
                "{} is not a sort key. Use `date_added`, `rating`, `title` or `author`.",
                other
            )),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!(
                "{} is not a sort direction. Use `asc` or `desc`.",
                other
            )),
        }
    }
}

/// Returns the books matching every filter of `view`, sorted by its sort key.
///
/// Filters compose with a plain AND: a status filter and a status pseudo-shelf
/// that disagree produce an empty list. Ties on the sort key fall back to the
/// book id, so `Desc` is always the exact reverse of `Asc`.
#[tracing::instrument(name = "build view", skip(books), fields(books = books.len()))]
pub fn build_view<'a>(books: &'a [Book], view: &ViewQuery) -> Vec<&'a Book> {
    let needle = view.query.to_lowercase();

    let mut visible: Vec<&Book> = books
        .iter()
        .filter(|b| needle.is_empty() || matches_text(b, &needle))
        .filter(|b| match view.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => b.status == status,
        })
        .filter(|b| match view.shelf {
            ShelfFilter::All => true,
            ShelfFilter::Status(status) => b.status == status,
            ShelfFilter::Custom(id) => b.shelf_id == Some(id),
        })
        .filter(|b| view.tag.as_deref().is_none_or(|tag| b.has_tag(tag)))
        .collect();

    visible.sort_by(|a, b| {
        let ordering = compare(a, b, view.sort_by);
        match view.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    visible
}

fn matches_text(book: &Book, needle: &str) -> bool {
    book.title.to_lowercase().contains(needle)
        || book.author.to_lowercase().contains(needle)
        || book.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

fn compare(a: &Book, b: &Book, key: SortKey) -> Ordering {
    let ordering = match key {
        SortKey::DateAdded => a.date_added.cmp(&b.date_added),
        SortKey::Rating => a.average_rating().total_cmp(&b.average_rating()),
        SortKey::Title => compare_text(&a.title, &b.title),
        SortKey::Author => compare_text(&a.author, &b.author),
    };

    ordering.then_with(|| a.id.cmp(&b.id))
}

// Case-insensitive first so "apple" sorts next to "Apple", then by raw text
// to keep distinct strings apart.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
