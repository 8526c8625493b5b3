use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::model::{Book, ReadingStatus};

#[derive(serde::Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub want_to_read: u32,
    pub reading: u32,
    pub read: u32,
}

impl StatusCounts {
    fn increment(&mut self, status: ReadingStatus) {
        match status {
            ReadingStatus::WantToRead => self.want_to_read += 1,
            ReadingStatus::Reading => self.reading += 1,
            ReadingStatus::Read => self.read += 1,
        }
    }
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

/// Books per rounded average rating. Index 0 holds one-star books.
#[derive(serde::Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct RatingDistribution([u32; 5]);

impl RatingDistribution {
    pub fn count(&self, stars: u8) -> u32 {
        match stars {
            1..=5 => self.0[usize::from(stars) - 1],
            _ => 0,
        }
    }

    pub fn buckets(&self) -> [u32; 5] {
        self.0
    }

    fn add(&mut self, average: f64) {
        let stars = (average + 0.5).floor().clamp(1.0, 5.0) as usize;
        self.0[stars - 1] += 1;
    }
}

/// Read-only snapshot of metrics derived from the whole collection.
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub count_by_status: StatusCounts,
    pub average_rating: f64,
    pub total_pages_read: u64,
    pub pages_in_progress: u64,
    pub books_by_month: [u32; 12],
    pub tag_frequency: Vec<TagCount>,
    pub rating_distribution: RatingDistribution,
    pub total_reviews: u32,
}

impl Statistics {
    /// Recomputes every metric from scratch. `today` decides which calendar
    /// year `books_by_month` covers.
    #[tracing::instrument(name = "compute statistics", skip(books), fields(books = books.len()))]
    pub fn compute(books: &[Book], today: NaiveDate) -> Self {
        let mut count_by_status = StatusCounts::default();
        let mut rated_read_sum = 0.0;
        let mut rated_read_count = 0u32;
        let mut total_pages_read = 0u64;
        let mut pages_in_progress = 0u64;
        let mut books_by_month = [0u32; 12];
        let mut rating_distribution = RatingDistribution::default();
        let mut total_reviews = 0u32;

        for book in books {
            count_by_status.increment(book.status);
            total_reviews += book.reviews.len() as u32;

            if !book.reviews.is_empty() {
                let average = book.average_rating();
                rating_distribution.add(average);

                if book.status == ReadingStatus::Read {
                    rated_read_sum += average;
                    rated_read_count += 1;
                }
            }

            match book.status {
                ReadingStatus::Read => {
                    total_pages_read += u64::from(book.total_pages.unwrap_or(0));
                    if book.date_added.year() == today.year() {
                        books_by_month[book.date_added.month0() as usize] += 1;
                    }
                }
                ReadingStatus::Reading => {
                    pages_in_progress += u64::from(book.progress.unwrap_or(0));
                }
                ReadingStatus::WantToRead => {}
            }
        }

        let average_rating = if rated_read_count == 0 {
            0.0
        } else {
            rated_read_sum / f64::from(rated_read_count)
        };

        Statistics {
            count_by_status,
            average_rating,
            total_pages_read,
            pages_in_progress,
            books_by_month,
            tag_frequency: tag_frequency(books),
            rating_distribution,
            total_reviews,
        }
    }

    pub fn top_tags(&self, n: usize) -> &[TagCount] {
        &self.tag_frequency[..n.min(self.tag_frequency.len())]
    }
}

/// Tag occurrences across all books, most frequent first. Equal counts keep
/// the order in which the tags were first seen.
pub fn tag_frequency(books: &[Book]) -> Vec<TagCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TagCount> = Vec::new();

    for tag in books.iter().flat_map(|b| b.tags.iter()) {
        match index.get(tag.as_str()) {
            Some(&position) => counts[position].count += 1,
            None => {
                index.insert(tag.as_str(), counts.len());
                counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
