use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::{compile_rules, CompiledRule, PatternRule};
use crate::models::WorkExperience;

/// Self-introductions. Whole templates match case-insensitively, so the two
/// captured words need not be capitalized; their casing is kept as written.
pub const HOST_INTRO_RULES: &[PatternRule] = &[
    PatternRule::new("im", r"(?i)\bI(?:'|’)m ([A-Z][a-z]+ [A-Z][a-z]+)"),
    PatternRule::new("my_name_is", r"(?i)\bMy name is ([A-Z][a-z]+ [A-Z][a-z]+)"),
    PatternRule::new("this_is", r"(?i)\bThis is ([A-Z][a-z]+ [A-Z][a-z]+)"),
    PatternRule::new("i_am", r"(?i)\bI am ([A-Z][a-z]+ [A-Z][a-z]+)"),
];

/// Guest introductions
pub const GUEST_INTRO_RULES: &[PatternRule] = &[
    PatternRule::new("joined_by", r"(?i)\bjoined by ([A-Z][a-z]+ [A-Z][a-z]+)"),
    PatternRule::new("with_us_today", r"(?i)\bwith us today ([A-Z][a-z]+ [A-Z][a-z]+)"),
    PatternRule::new("welcome", r"(?i)\bwelcome ([A-Z][a-z]+ [A-Z][a-z]+)"),
    PatternRule::new("guest", r"(?i)\bguest ([A-Z][a-z]+ [A-Z][a-z]+)"),
];

const TITLE_WORDS: &str =
    "CEO|CTO|CFO|VP|Vice President|President|Director|Manager|Chief|Senior|Principal";

/// Name, then a company-like span, then a title word
/// Name, then a title word, then "at Company"
fn work_rules() -> &'static [Regex] {
    static RULES: OnceLock<Vec<Regex>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Regex::new(&format!(
                r"([A-Z][a-z]+ [A-Z][a-z]+).*?([A-Z][A-Z][A-Z]|[A-Z][a-z]+\s+[A-Z][a-z]+).*?((?i:{TITLE_WORDS}))"
            ))
            .unwrap(),
            Regex::new(&format!(
                r"([A-Z][a-z]+ [A-Z][a-z]+).*?((?i:{TITLE_WORDS})).*?\b(?i:at) ([A-Z][a-z]+)"
            ))
            .unwrap(),
        ]
    })
}

fn title_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"(?i)\b(?:{TITLE_WORDS})\b")).unwrap())
}

fn intro_rules() -> &'static [CompiledRule] {
    static RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let mut rules = compile_rules(HOST_INTRO_RULES);
        rules.extend(compile_rules(GUEST_INTRO_RULES));
        rules
    })
}

/// Hosts and guests found in the transcript
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct People {
    pub hosts: Vec<String>,
    pub guests: Vec<String>,
}

/// Every distinct introduced name, in discovery order
///
/// Rules are scanned in declaration order (host rules first), each rule's
/// matches in text order; a name is kept at its first sighting.
pub fn discover_names(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for rule in intro_rules() {
        for caps in rule.regex.captures_iter(text) {
            let name = &caps[1];
            if seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }
    }

    names
}

/// Split discovered names into hosts and guests
///
/// The text gives no reliable role signal, so the first two names are taken
/// as hosts and the rest as guests.
pub fn split_roles(mut names: Vec<String>) -> People {
    if names.len() < 2 {
        return People {
            hosts: names,
            guests: Vec::new(),
        };
    }
    let guests = names.split_off(2);
    People {
        hosts: names,
        guests,
    }
}

pub fn extract_people(text: &str) -> People {
    split_roles(discover_names(text))
}

/// One `{name, title, company}` per match of each work rule, duplicates kept
pub fn extract_work_experience(text: &str) -> Vec<WorkExperience> {
    let mut entries = Vec::new();

    for rule in work_rules() {
        for caps in rule.captures_iter(text) {
            let name = caps[1].to_string();
            let middle = caps[2].to_string();
            let last = caps[3].to_string();

            let (title, company) = if title_word().is_match(&middle) {
                (middle, last)
            } else {
                (last, middle)
            };
            entries.push(WorkExperience {
                name,
                title,
                company,
            });
        }
    }

    entries
}
