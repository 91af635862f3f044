//! Transcript line-format rewriting
//!
//! Transcripts arrive as `[00:00:23] Marcie: Welcome...` and are stored as
//! `Marcie: [00:00:23] Welcome...`. Both transforms here are line/paragraph
//! scoped and idempotent.

use std::sync::OnceLock;

use regex::Regex;

/// `[HH:MM:SS] Speaker: rest` at the start of a line
fn timestamp_first() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(\d{2}:\d{2}:\d{2})\][ \t]*([^:]+):[ \t]*(.*)$").unwrap())
}

/// A paragraph that opens with a bare timestamp
fn bare_timestamp() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\d{2}:\d{2}:\d{2}\]").unwrap())
}

/// A paragraph that opens with a speaker label
fn speaker_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^:\[]+):").unwrap())
}

/// Whether any line still has the timestamp-before-speaker shape
pub fn needs_reformat(transcript: &str) -> bool {
    transcript.split('\n').any(|line| timestamp_first().is_match(line))
}

/// Rewrite a single line, or return it unchanged when it does not match
pub fn reformat_line(line: &str) -> String {
    let Some(caps) = timestamp_first().captures(line) else {
        return line.to_string();
    };

    let timestamp = &caps[1];
    let speaker = caps[2].trim();
    let rest = &caps[3];

    if rest.is_empty() {
        format!("{}: [{}]", speaker, timestamp)
    } else {
        format!("{}: [{}] {}", speaker, timestamp, rest)
    }
}

/// Move speaker names in front of timestamps, line by line
///
/// Lines are neither merged nor reordered, and the original line endings are
/// kept. Applying this to its own output changes nothing.
pub fn reformat_transcript(transcript: &str) -> String {
    transcript
        .split('\n')
        .map(reformat_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Label paragraphs that start with a bare timestamp with the last speaker
///
/// Paragraphs are separated by a blank line. A paragraph of the form
/// `Speaker: ...` sets the current speaker; `[00:01:02] text` paragraphs
/// after it become `Speaker: [00:01:02] text`.
pub fn fill_missing_speakers(transcript: &str) -> String {
    let mut last_speaker: Option<String> = None;
    let mut paragraphs = Vec::new();

    for paragraph in transcript.split("\n\n") {
        if bare_timestamp().is_match(paragraph) {
            match &last_speaker {
                Some(speaker) => paragraphs.push(format!("{}: {}", speaker, paragraph)),
                None => paragraphs.push(paragraph.to_string()),
            }
            continue;
        }
        if let Some(caps) = speaker_label().captures(paragraph) {
            last_speaker = Some(caps[1].trim().to_string());
        }
        paragraphs.push(paragraph.to_string());
    }

    paragraphs.join("\n\n")
}

/// The full clean-up applied by the reformatting utility
pub fn normalize_transcript(transcript: &str, fill_speakers: bool) -> String {
    let reformatted = reformat_transcript(transcript);
    if fill_speakers {
        fill_missing_speakers(&reformatted)
    } else {
        reformatted
    }
}
