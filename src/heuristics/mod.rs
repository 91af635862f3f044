pub mod people;
pub mod quotes;
pub mod summary;
pub mod title;
pub mod topics;

pub use people::*;
pub use quotes::*;
pub use summary::*;
pub use title::*;
pub use topics::*;

use regex::Regex;

use crate::models::{Episode, ExtractedFields, NotableQuote, WorkExperience};

/// A named regular expression in an ordered rule table
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub name: &'static str,
    pub pattern: &'static str,
}

impl PatternRule {
    pub const fn new(name: &'static str, pattern: &'static str) -> Self {
        Self { name, pattern }
    }
}

/// A rule ready to run; order is preserved from the source table
#[derive(Debug)]
pub struct CompiledRule {
    pub name: &'static str,
    pub regex: Regex,
}

/// Compile a static rule table. The tables are constants covered by tests,
/// so a bad pattern is a programming error.
pub(crate) fn compile_rules(rules: &[PatternRule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .map(|rule| CompiledRule {
            name: rule.name,
            regex: Regex::new(rule.pattern)
                .unwrap_or_else(|e| panic!("invalid pattern for rule {}: {}", rule.name, e)),
        })
        .collect()
}

/// Fields derived from an already known cast and transcript
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancements {
    pub key_topics: Vec<String>,
    pub notable_quotes: Vec<NotableQuote>,
    pub summary: String,
}

/// Derive topics, quotes and summary
///
/// Shared by first-pass extraction and the enhancement pass over persisted
/// records, which supplies its stored title and cast instead of re-guessing.
pub fn derive_enhancements(
    transcript: &str,
    title: &str,
    hosts: &[String],
    guests: &[String],
    work_experience: &[WorkExperience],
) -> Enhancements {
    let key_topics = extract_topics(transcript);
    let speaker = quote_speaker(hosts, guests);
    let notable_quotes = extract_quotes(transcript, speaker.as_deref());
    let summary = build_summary(title, hosts, guests, &key_topics, work_experience);

    Enhancements {
        key_topics,
        notable_quotes,
        summary,
    }
}

/// Recompute the derived fields of a stored episode from its own data
pub fn enhance_episode(episode: &Episode) -> Enhancements {
    derive_enhancements(
        episode.transcript(),
        &episode.episode_title,
        &episode.hosts,
        &episode.guests,
        &episode.guest_work_experience,
    )
}

/// Run every heuristic over the transcript text
///
/// Pure and infallible: a rule that does not match leaves its field empty.
/// Date, series and episode number are left to the filename parser.
pub fn extract_heuristic_fields(text: &str) -> ExtractedFields {
    let episode_title = extract_title(text);
    let People { hosts, guests } = extract_people(text);
    let guest_work_experience = extract_work_experience(text);
    let Enhancements {
        key_topics,
        notable_quotes,
        summary,
    } = derive_enhancements(text, &episode_title, &hosts, &guests, &guest_work_experience);

    ExtractedFields {
        episode_title,
        hosts,
        guests,
        guest_work_experience,
        key_topics,
        notable_quotes,
        summary,
        ..Default::default()
    }
}
