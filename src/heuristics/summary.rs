use crate::models::WorkExperience;

/// Used when there is no title or no topic to build a sentence around
pub const FALLBACK_SUMMARY: &str =
    "A podcast episode featuring discussions on business and professional topics.";

const SUMMARY_TOPICS: usize = 3;
const SUMMARY_COMPANIES: usize = 2;

/// Build the templated episode summary
pub fn build_summary(
    title: &str,
    hosts: &[String],
    guests: &[String],
    topics: &[String],
    work_experience: &[WorkExperience],
) -> String {
    if title.is_empty() || topics.is_empty() {
        return FALLBACK_SUMMARY.to_string();
    }

    let mut summary = format!("In this episode of {}, ", title);
    if guests.is_empty() {
        summary.push_str(&format!("{} discuss ", hosts.join(", ")));
    } else {
        summary.push_str(&format!(
            "host(s) {} interview {} ",
            hosts.join(", "),
            guests.join(", ")
        ));
    }

    let topics: Vec<&str> = topics
        .iter()
        .take(SUMMARY_TOPICS)
        .map(String::as_str)
        .collect();
    summary.push_str(&format!("key topics including {}. ", topics.join(", ")));

    let companies = distinct_companies(work_experience);
    if !companies.is_empty() {
        summary.push_str(&format!(
            "The conversation covers insights from experience at {}.",
            companies.join(", ")
        ));
    }

    summary
}

/// First two distinct company names, in order of appearance
fn distinct_companies(work_experience: &[WorkExperience]) -> Vec<&str> {
    let mut companies: Vec<&str> = Vec::new();
    for entry in work_experience {
        if companies.len() == SUMMARY_COMPANIES {
            break;
        }
        if !companies.contains(&entry.company.as_str()) {
            companies.push(&entry.company);
        }
    }
    companies
}
