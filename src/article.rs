pub const WORDS_PER_PAGE: u32 = 250;
pub const WORDS_PER_MINUTE: u32 = 200;

#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStats {
    pub word_count: u32,
    pub page_count: u32,
    pub reading_minutes: u32,
}

impl ArticleStats {
    /// Counts whitespace separated tokens holding at least one letter or digit,
    /// so stray punctuation such as `--` is not a word.
    pub fn count(text: &str) -> Self {
        let word_count = text
            .split_whitespace()
            .filter(|token| token.chars().any(char::is_alphanumeric))
            .count() as u32;

        ArticleStats {
            word_count,
            page_count: word_count.div_ceil(WORDS_PER_PAGE),
            reading_minutes: word_count.div_ceil(WORDS_PER_MINUTE),
        }
    }
}
