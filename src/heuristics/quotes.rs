use std::sync::OnceLock;

use super::{compile_rules, CompiledRule, PatternRule};
use crate::models::{NotableQuote, MAX_NOTABLE_QUOTES};

/// Quote detectors. Capture group 1 is the quote when present, otherwise the
/// whole match.
pub const QUOTE_RULES: &[PatternRule] = &[
    PatternRule::new("double_quoted", r#""([^"]{50,200})""#),
    PatternRule::new("curly_quoted", r"“([^”]{50,200})”"),
    PatternRule::new("culture_strategy", r"(?i)culture eating strategy for breakfast"),
    PatternRule::new("trusted_advisors", r"(?i)trusted advisors"),
    PatternRule::new("iron_sharpens_iron", r"(?i)iron sharpens iron"),
];

const MATCHES_PER_RULE: usize = 2;
const MIN_QUOTE_CHARS: usize = 30;

fn quote_rules() -> &'static [CompiledRule] {
    static RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();
    RULES.get_or_init(|| compile_rules(QUOTE_RULES))
}

/// Who a detected quote is attributed to: first guest, else first host
pub fn quote_speaker(hosts: &[String], guests: &[String]) -> Option<String> {
    guests.first().or_else(|| hosts.first()).cloned()
}

/// Detect notable quotes
///
/// Each rule contributes at most two of its first matches, and only matches
/// longer than 30 characters count. Overlapping rules may yield the same
/// quote twice.
pub fn extract_quotes(text: &str, speaker: Option<&str>) -> Vec<NotableQuote> {
    let mut quotes = Vec::new();

    for rule in quote_rules() {
        for caps in rule.regex.captures_iter(text).take(MATCHES_PER_RULE) {
            let matched = caps.get(1).or_else(|| caps.get(0));
            let Some(matched) = matched else { continue };
            if matched.as_str().chars().count() > MIN_QUOTE_CHARS {
                quotes.push(NotableQuote::new(
                    matched.as_str().trim(),
                    speaker.map(str::to_string),
                ));
            }
        }
    }

    quotes.truncate(MAX_NOTABLE_QUOTES);
    quotes
}
