use crate::models::MAX_KEY_TOPICS;

/// Topic label and the keyword variants that signal it, in declaration order
pub const TOPIC_TABLE: &[(&str, &[&str])] = &[
    ("Leadership", &["leadership", "leader", "leading", "management", "manager"]),
    (
        "Technology",
        &["technology", "tech", "AI", "artificial intelligence", "digital", "innovation"],
    ),
    (
        "Healthcare",
        &["health", "healthcare", "medical", "patient", "clinical", "hospital"],
    ),
    (
        "Business Strategy",
        &["strategy", "strategic", "business", "growth", "transformation"],
    ),
    (
        "Procurement",
        &["procurement", "sourcing", "supplier", "vendor", "supply chain"],
    ),
    (
        "Career Development",
        &["career", "professional", "development", "skills", "training"],
    ),
    (
        "Culture",
        &["culture", "cultural", "organizational", "workplace", "team"],
    ),
    (
        "Purpose & Faith",
        &["purpose", "faith", "calling", "spiritual", "God", "belief"],
    ),
    (
        "Diversity & Inclusion",
        &["diversity", "inclusion", "diverse", "inclusive", "equity"],
    ),
    (
        "Consulting",
        &["consulting", "consultant", "advisory", "client", "engagement"],
    ),
];

/// Topics whose keywords appear anywhere in the text (plain substring,
/// case-insensitive), first six in table order
pub fn extract_topics(text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();

    TOPIC_TABLE
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| haystack.contains(&keyword.to_lowercase()))
        })
        .map(|(label, _)| label.to_string())
        .take(MAX_KEY_TOPICS)
        .collect()
}
