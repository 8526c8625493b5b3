pub mod articles;
pub mod books;
pub mod goals;
pub mod home;
pub mod profile;
pub mod recommendations;
pub mod reviews;
pub mod shelves;
pub mod stats;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

pub(crate) fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Lets a PATCH body tell "field absent" (`None`) apart from "field set to
/// null" (`Some(None)`).
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(serde::Deserialize, Debug)]
pub struct IdPath {
    pub id: i64,
}
