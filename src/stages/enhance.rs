use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::heuristics::{enhance_episode, Enhancements};
use crate::models::{Episode, EpisodeFieldUpdate};

/// Result of the enhancement pass
#[derive(Debug, Default)]
pub struct EnhanceResult {
    /// Records whose derived fields changed
    pub changed: usize,
    /// Records visited
    pub total: usize,
}

/// Regenerate topics, quotes and summary for every stored record
///
/// Each record is re-derived from its own transcript, title and cast. Every
/// visited record gets `extractedAt` set to `now`.
pub fn enhance_all(episodes: &mut [Episode], now: DateTime<Utc>) -> EnhanceResult {
    let mut result = EnhanceResult {
        total: episodes.len(),
        ..Default::default()
    };

    for episode in episodes.iter_mut() {
        let Enhancements {
            key_topics,
            notable_quotes,
            summary,
        } = enhance_episode(episode);

        let changed = key_topics != episode.key_topics()
            || notable_quotes != episode.notable_quotes()
            || summary != episode.summary;
        if changed {
            debug!("{}: derived fields changed", episode.id());
            result.changed += 1;
        }

        episode.apply_update(EpisodeFieldUpdate {
            key_topics: Some(key_topics),
            notable_quotes: Some(notable_quotes),
            summary: Some(summary),
            extracted_at: Some(now),
            ..Default::default()
        });
    }

    info!(
        "Enhanced {} of {} records",
        result.changed, result.total
    );

    result
}
