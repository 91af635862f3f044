use chrono::NaiveDate;

use super::{NotableQuote, WorkExperience};

/// Best-effort fields produced by one extraction strategy for one document.
///
/// Empty strings and vectors mean "nothing found"; the record assembler
/// decides which of these win over filename-derived values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub date: Option<NaiveDate>,
    pub series: String,
    pub episode_number: String,
    pub episode_title: String,
    pub hosts: Vec<String>,
    pub guests: Vec<String>,
    pub guest_work_experience: Vec<WorkExperience>,
    pub key_topics: Vec<String>,
    pub notable_quotes: Vec<NotableQuote>,
    pub summary: String,
    /// Word count guessed by the extractor. Never copied into a record.
    pub word_count_guess: Option<usize>,
}
