use tracing::{debug, info, warn};

use crate::heuristics::extract_heuristic_fields;
use crate::llm::{
    build_extraction_prompt, parse_oracle_reply, Oracle, OracleError, DEFAULT_PROMPT_CHAR_BUDGET,
};
use crate::models::ExtractedFields;

/// Configuration for oracle-assisted extraction
#[derive(Debug, Clone)]
pub struct OracleExtractionConfig {
    /// Transcript characters included in the prompt
    pub prompt_char_budget: usize,
    /// Extra attempts after a failed or malformed reply
    pub max_retries: u32,
}

impl Default for OracleExtractionConfig {
    fn default() -> Self {
        Self {
            prompt_char_budget: DEFAULT_PROMPT_CHAR_BUDGET,
            max_retries: 0,
        }
    }
}

/// How the free-text fields of an episode are guessed
pub enum ExtractionStrategy<'a> {
    /// Deterministic keyword and pattern rules
    Heuristic,
    /// An external oracle, given a bounded prefix of the transcript
    Oracle {
        oracle: &'a dyn Oracle,
        config: OracleExtractionConfig,
    },
}

impl ExtractionStrategy<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::Heuristic => "heuristic",
            ExtractionStrategy::Oracle { .. } => "oracle",
        }
    }

    /// Extract fields for one document
    ///
    /// Oracle failures are absorbed here: the document keeps going with
    /// every oracle-supplied field left at its default.
    pub async fn extract(&self, transcript: &str, document_name: &str) -> ExtractedFields {
        match self {
            ExtractionStrategy::Heuristic => extract_heuristic_fields(transcript),
            ExtractionStrategy::Oracle { oracle, config } => {
                match extract_with_oracle(*oracle, transcript, document_name, config).await {
                    Ok(fields) => fields,
                    Err(e) => {
                        warn!("{}: no oracle data ({})", document_name, e);
                        ExtractedFields::default()
                    }
                }
            }
        }
    }
}

/// Ask the oracle for a structured guess and validate the reply
///
/// Retries up to `max_retries` times on any failure, then returns the last
/// error.
pub async fn extract_with_oracle(
    oracle: &dyn Oracle,
    transcript: &str,
    document_name: &str,
    config: &OracleExtractionConfig,
) -> Result<ExtractedFields, OracleError> {
    let request = build_extraction_prompt(transcript, document_name, config.prompt_char_budget);

    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            info!(
                "{}: oracle retry {} of {}",
                document_name, attempt, config.max_retries
            );
        }

        let result = match oracle.request(&request).await {
            Ok(reply) => {
                debug!("{}: oracle replied with {} chars", document_name, reply.len());
                parse_oracle_reply(&reply)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(fields) => return Ok(fields),
            Err(e) => {
                warn!("{}: oracle attempt {} failed: {}", document_name, attempt + 1, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(OracleError::EmptyReply))
}
