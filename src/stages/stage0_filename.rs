use std::path::Path;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Metadata recoverable from a transcript document's name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameInfo {
    pub date: Option<NaiveDate>,
    pub series: String,
    pub episode_number: String,
}

/// Strip the document extension, giving the stable episode id
///
/// `20250204-MBS-0506-V1.docx` becomes `20250204-MBS-0506-V1`. Names without
/// an extension are returned as-is.
pub fn document_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/// Parse date, series and episode number out of a document name
///
/// Each field degrades to empty independently; this never fails.
pub fn parse_filename(name: &str) -> FilenameInfo {
    let base = document_stem(name);
    let (series, episode_number) = parse_series(base).unwrap_or_default();

    FilenameInfo {
        date: parse_date(base),
        series,
        episode_number,
    }
}

/// First eight consecutive digits, read as `YYYYMMDD`
fn parse_date(base: &str) -> Option<NaiveDate> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d{8}").unwrap());

    let digits = re.find(base)?;
    NaiveDate::parse_from_str(digits.as_str(), "%Y%m%d").ok()
}

/// Series rules in precedence order: `-CODE-123`, then `Present_123`
fn parse_series(base: &str) -> Option<(String, String)> {
    static CODED: OnceLock<Regex> = OnceLock::new();
    static PRESENT: OnceLock<Regex> = OnceLock::new();
    let coded = CODED.get_or_init(|| Regex::new(r"(?i)-([a-z]+)-(\d+)").unwrap());
    let present = PRESENT.get_or_init(|| Regex::new(r"(?i)present_(\d+)").unwrap());

    if let Some(caps) = coded.captures(base) {
        return Some((caps[1].to_uppercase(), caps[2].to_string()));
    }
    present
        .captures(base)
        .map(|caps| ("Present".to_string(), caps[1].to_string()))
}
