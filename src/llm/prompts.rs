use super::OracleRequest;

/// Default number of transcript characters sent to the oracle
pub const DEFAULT_PROMPT_CHAR_BUDGET: usize = 4000;

/// System prompt for episode extraction
pub const SYSTEM_PROMPT: &str = "You are a data extraction expert for podcast transcripts. \
Return only valid JSON, with no commentary before or after it.";

/// Build the extraction prompt for one document
pub fn build_extraction_prompt(
    transcript: &str,
    document_name: &str,
    char_budget: usize,
) -> OracleRequest {
    let mut prompt = String::new();

    prompt.push_str("Extract the following information from this podcast transcript and return it as a single JSON object:\n\n");
    prompt.push_str("```json\n");
    prompt.push_str(&format!(
        r#"{{
  "date": "YYYY-MM-DD, from the document name ({document_name}) or the transcript",
  "series": "the podcast series name",
  "episodeNumber": "episode number if mentioned, as a string",
  "episodeTitle": "full episode title",
  "hosts": ["host names"],
  "guests": ["guest names"],
  "guestWorkExperience": [{{"name": "guest name", "title": "job title", "company": "company name"}}],
  "keyTopics": ["up to 6 main topics"],
  "notableQuotes": [{{"quote": "an impactful quote", "speaker": "who said it"}}],
  "summary": "2-3 sentence summary of the episode"
}}"#
    ));
    prompt.push_str("\n```\n\n");

    prompt.push_str("## Rules\n");
    prompt.push_str("1. Hosts are the people who introduce the show or say \"welcome to\"; everyone else interviewed is a guest.\n");
    prompt.push_str("2. Extract guest work experience from introductions or the conversation.\n");
    prompt.push_str("3. For the series, find the actual podcast name in the transcript (e.g. \"My Best Shift podcast\", \"Present Navigating and Enduring Life Events\", \"Heidrick & Struggles Leadership Podcast\", \"PWC Pulse\", \"Next in Health\") instead of inferring it from a code in the document name.\n");
    prompt.push_str("4. If you see \"Mya Shift\" or similar, the correct name is \"My Best Shift podcast\".\n");
    prompt.push_str("5. Never use \"Unknown\" for any field. If information is missing, use an empty string or an empty array.\n");
    prompt.push_str("6. At most 6 key topics and at most 3 notable quotes.\n");
    prompt.push_str("7. Return only valid JSON, no extra text.\n\n");

    prompt.push_str(&format!("## Document\n{}\n\n", document_name));
    prompt.push_str("## Transcript\n");
    let prefix = transcript_prefix(transcript, char_budget);
    prompt.push_str(prefix);
    if prefix.len() < transcript.len() {
        prompt.push_str("...");
    }
    prompt.push('\n');

    OracleRequest {
        system: SYSTEM_PROMPT.to_string(),
        user: prompt,
    }
}

/// The first `budget` characters of the transcript, cut on a char boundary
pub fn transcript_prefix(transcript: &str, budget: usize) -> &str {
    match transcript.char_indices().nth(budget) {
        Some((idx, _)) => &transcript[..idx],
        None => transcript,
    }
}
