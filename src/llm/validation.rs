use chrono::NaiveDate;
use serde::Deserialize;

use super::OracleError;
use crate::models::{
    present, ExtractedFields, NotableQuote, WorkExperience, MAX_KEY_TOPICS, MAX_NOTABLE_QUOTES,
};

/// The record shape the oracle is asked to produce
///
/// Every field is optional, but a field that is present with the wrong type
/// rejects the whole reply.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OracleRecord {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    series: Option<String>,
    #[serde(default, alias = "episode_number")]
    episode_number: Option<String>,
    #[serde(default, alias = "episode_title")]
    episode_title: Option<String>,
    #[serde(default)]
    hosts: Option<Vec<String>>,
    #[serde(default)]
    guests: Option<Vec<String>>,
    #[serde(default, alias = "guest_work_experience")]
    guest_work_experience: Option<Vec<WorkExperience>>,
    #[serde(default, alias = "key_topics")]
    key_topics: Option<Vec<String>>,
    #[serde(default, alias = "notable_quotes")]
    notable_quotes: Option<Vec<NotableQuote>>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, alias = "word_count")]
    word_count: Option<u64>,
}

/// Parse a raw oracle reply into extracted fields
///
/// Markdown code fences and any prose around the outermost JSON object are
/// ignored. Anything that is not a well-formed record is an error, never a
/// partial success.
pub fn parse_oracle_reply(raw: &str) -> Result<ExtractedFields, OracleError> {
    let json = json_object_span(raw)
        .ok_or_else(|| OracleError::Malformed("no JSON object in reply".to_string()))?;
    let record: OracleRecord =
        serde_json::from_str(json).map_err(|e| OracleError::Malformed(e.to_string()))?;

    Ok(record.into_fields())
}

/// Slice from the first `{` to the last `}`
fn json_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

fn text(value: Option<String>) -> String {
    value.and_then(present).unwrap_or_default()
}

fn names(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter_map(present)
        .collect()
}

impl OracleRecord {
    fn into_fields(self) -> ExtractedFields {
        let date = self
            .date
            .and_then(present)
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());

        let mut key_topics = names(self.key_topics);
        key_topics.truncate(MAX_KEY_TOPICS);

        let mut notable_quotes: Vec<NotableQuote> = self
            .notable_quotes
            .unwrap_or_default()
            .into_iter()
            .filter(|q| !q.quote.trim().is_empty())
            .collect();
        notable_quotes.truncate(MAX_NOTABLE_QUOTES);

        ExtractedFields {
            date,
            series: text(self.series),
            episode_number: text(self.episode_number),
            episode_title: text(self.episode_title),
            hosts: names(self.hosts),
            guests: names(self.guests),
            guest_work_experience: self.guest_work_experience.unwrap_or_default(),
            key_topics,
            notable_quotes,
            summary: text(self.summary),
            word_count_guess: self.word_count.map(|n| n as usize),
        }
    }
}
