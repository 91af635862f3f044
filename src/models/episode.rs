use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Upper bound on `keyTopics` per episode
pub const MAX_KEY_TOPICS: usize = 6;
/// Upper bound on `notableQuotes` per episode
pub const MAX_NOTABLE_QUOTES: usize = 3;

/// One professional affiliation discovered for a person in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
}

/// A quote with optional attribution.
///
/// An unattributed quote carries `speaker: None`; older records that stored
/// the placeholder "Unknown" or a bare string are read into the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "QuoteRepr")]
pub struct NotableQuote {
    pub quote: String,
    pub speaker: Option<String>,
}

impl NotableQuote {
    pub fn new(quote: impl Into<String>, speaker: Option<String>) -> Self {
        Self {
            quote: quote.into(),
            speaker,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuoteRepr {
    Text(String),
    Attributed {
        quote: String,
        #[serde(default)]
        speaker: Option<String>,
    },
}

impl From<QuoteRepr> for NotableQuote {
    fn from(repr: QuoteRepr) -> Self {
        match repr {
            QuoteRepr::Text(quote) => NotableQuote::new(quote, None),
            QuoteRepr::Attributed { quote, speaker } => {
                NotableQuote::new(quote, speaker.and_then(present))
            }
        }
    }
}

/// Canonical record describing one transcript document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    id: String,
    file_name: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub series: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub episode_number: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub episode_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hosts: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub guests: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub guest_work_experience: Vec<WorkExperience>,
    #[serde(default, deserialize_with = "null_as_default")]
    key_topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    notable_quotes: Vec<NotableQuote>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    transcript: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub audio_link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    word_count: usize,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub extracted_at: DateTime<Utc>,
    /// Keys written by other tools, carried through untouched
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Episode {
    /// Create a record for a document; everything but the identity and
    /// transcript starts empty.
    pub fn new(
        id: impl Into<String>,
        file_name: impl Into<String>,
        transcript: impl Into<String>,
        extracted_at: DateTime<Utc>,
    ) -> Self {
        let transcript = transcript.into();
        Self {
            id: id.into(),
            file_name: file_name.into(),
            date: None,
            series: String::new(),
            episode_number: String::new(),
            episode_title: String::new(),
            hosts: Vec::new(),
            guests: Vec::new(),
            guest_work_experience: Vec::new(),
            key_topics: Vec::new(),
            notable_quotes: Vec::new(),
            summary: String::new(),
            word_count: word_count(&transcript),
            transcript,
            audio_link: String::new(),
            extracted_at,
            extra: serde_json::Map::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn key_topics(&self) -> &[String] {
        &self.key_topics
    }

    pub fn notable_quotes(&self) -> &[NotableQuote] {
        &self.notable_quotes
    }

    /// Replace the transcript; the word count follows it.
    pub fn set_transcript(&mut self, transcript: impl Into<String>) {
        self.transcript = transcript.into();
        self.word_count = word_count(&self.transcript);
    }

    pub fn set_key_topics(&mut self, mut topics: Vec<String>) {
        topics.truncate(MAX_KEY_TOPICS);
        self.key_topics = topics;
    }

    pub fn set_notable_quotes(&mut self, mut quotes: Vec<NotableQuote>) {
        quotes.truncate(MAX_NOTABLE_QUOTES);
        self.notable_quotes = quotes;
    }

    /// Recount words after reading a record whose `wordCount` may be stale
    pub(crate) fn with_counted_words(mut self) -> Self {
        self.word_count = word_count(&self.transcript);
        self
    }

    /// Extra keys preserved from the persisted form
    pub fn extra(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extra
    }

    /// Apply a field-level update. Only the fields set on `update` change.
    pub fn apply_update(&mut self, update: EpisodeFieldUpdate) {
        if let Some(transcript) = update.transcript {
            self.set_transcript(transcript);
        }
        if let Some(topics) = update.key_topics {
            self.set_key_topics(topics);
        }
        if let Some(quotes) = update.notable_quotes {
            self.set_notable_quotes(quotes);
        }
        if let Some(summary) = update.summary {
            self.summary = summary;
        }
        if let Some(extracted_at) = update.extracted_at {
            self.extracted_at = extracted_at;
        }
    }
}

/// A partial update addressed to one stored episode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeFieldUpdate {
    pub transcript: Option<String>,
    pub key_topics: Option<Vec<String>>,
    pub notable_quotes: Option<Vec<NotableQuote>>,
    pub summary: Option<String>,
    pub extracted_at: Option<DateTime<Utc>>,
}

impl EpisodeFieldUpdate {
    /// The derived fields a re-extraction is allowed to overwrite on an
    /// already persisted record.
    pub fn enhancement_from(episode: &Episode) -> Self {
        Self {
            transcript: None,
            key_topics: Some(episode.key_topics.clone()),
            notable_quotes: Some(episode.notable_quotes.clone()),
            summary: Some(episode.summary.clone()),
            extracted_at: Some(episode.extracted_at),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_none()
            && self.key_topics.is_none()
            && self.notable_quotes.is_none()
            && self.summary.is_none()
            && self.extracted_at.is_none()
    }
}

/// Whitespace-token count of a transcript
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Filter out placeholder values that stand in for "no data".
pub(crate) fn present(value: String) -> Option<String> {
    let trimmed = value.trim();
    let placeholder = ["", "unknown", "n/a", "na", "none", "null"]
        .iter()
        .any(|p| trimmed.eq_ignore_ascii_case(p));
    if placeholder {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

/// Other writers store `null`, `""`, `"2025-02-04"` or `20250204`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };
    let raw = raw.trim();
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok())
}

/// Scalar text that may have been written as a number or `null`
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 as well as naive ISO timestamps (read as UTC).
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
