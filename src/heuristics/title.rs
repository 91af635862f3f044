use std::sync::OnceLock;

use super::{compile_rules, CompiledRule, PatternRule};

/// Title templates, tried in order; the first one that matches anywhere wins.
pub const TITLE_RULES: &[PatternRule] = &[
    PatternRule::new("welcome_to_podcast", r"(?i)Welcome to (.+?) podcast"),
    PatternRule::new("welcome_to_sentence", r"(?i)Welcome to (.+?)\."),
    PatternRule::new("this_is_podcast", r"(?i)This is (.+?) podcast"),
    PatternRule::new("listening_to_podcast", r"(?i)You(?:'|’)re listening to (.+?) podcast"),
    PatternRule::new("named_podcast", r"(?i)(.+?) podcast"),
];

fn title_rules() -> &'static [CompiledRule] {
    static RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();
    RULES.get_or_init(|| compile_rules(TITLE_RULES))
}

/// Guess the episode title from the transcript text
pub fn extract_title(text: &str) -> String {
    title_rules()
        .iter()
        .find_map(|rule| rule.regex.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_phrase() {
        let text = "[00:00:01] Jane: Hello and Welcome to My Best Shift podcast. I'm Jane Doe.";
        assert_eq!(extract_title(text), "My Best Shift");
    }

    #[test]
    fn test_rule_order_beats_text_order() {
        // "named_podcast" matches earlier in the text but ranks last.
        let text = "Our weekly podcast starts now. This is Next in Health podcast.";
        assert_eq!(extract_title(text), "Next in Health");
    }

    #[test]
    fn test_welcome_sentence_without_podcast() {
        assert_eq!(extract_title("welcome to PWC Pulse. Today we talk."), "PWC Pulse");
    }

    #[test]
    fn test_curly_apostrophe() {
        let text = "You’re listening to the Leadership podcast";
        assert_eq!(extract_title(text), "the Leadership");
    }

    #[test]
    fn test_no_title() {
        assert_eq!(extract_title("Just a conversation between friends."), "");
        assert_eq!(extract_title(""), "");
    }
}
