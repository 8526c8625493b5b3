use chrono::NaiveDate;

pub type BookId = i64;
pub type ReviewId = i64;
pub type ShelfId = i64;

#[derive(
    serde::Serialize, serde::Deserialize, sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReadingStatus {
    WantToRead,
    Reading,
    Read,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 3] = [
        ReadingStatus::WantToRead,
        ReadingStatus::Reading,
        ReadingStatus::Read,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "want_to_read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Read => "read",
        }
    }
}

impl std::str::FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "want_to_read" => Ok(Self::WantToRead),
            "reading" => Ok(Self::Reading),
            "read" => Ok(Self::Read),
            other => Err(format!(
                "{} is not a reading status. Use `want_to_read`, `reading` or `read`.",
                other
            )),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub content: String,
    pub rating: u8,
    pub date_added: NaiveDate,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub status: ReadingStatus,
    pub progress: Option<u32>,
    pub total_pages: Option<u32>,
    pub tags: Vec<String>,
    pub shelf_id: Option<ShelfId>,
    pub reviews: Vec<Review>,
    pub date_added: NaiveDate,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
}

impl Book {
    /// Mean of all review ratings, `0.0` when the book has no reviews.
    pub fn average_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }

        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        f64::from(sum) / self.reviews.len() as f64
    }

    /// Review with the latest `date_added`. On equal dates the one stored last wins.
    pub fn latest_review(&self) -> Option<&Review> {
        self.reviews
            .iter()
            .enumerate()
            .max_by_key(|(position, review)| (review.date_added, *position))
            .map(|(_, review)| review)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(serde::Serialize, serde::Deserialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    pub id: ShelfId,
    pub name: String,
}

#[derive(serde::Serialize, serde::Deserialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingGoal {
    pub year: i32,
    pub target: u32,
    pub current: u32,
}

#[derive(
    serde::Serialize, serde::Deserialize, sqlx::FromRow, Debug, Clone, Default, PartialEq, Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub url: Option<String>,
    pub word_count: u32,
    pub page_count: u32,
    pub reading_minutes: u32,
    pub date_added: NaiveDate,
}
