use std::collections::HashMap;

use tracing::{debug, info};

use crate::models::{Episode, EpisodeFieldUpdate};

/// Result of merging a batch into the persisted collection
#[derive(Debug)]
pub struct ReconcileResult {
    /// The merged collection, existing order first
    pub episodes: Vec<Episode>,
    /// Number of batch records merged into an existing id
    pub updated: usize,
    /// Number of batch records appended as new
    pub added: usize,
}

/// Merge a freshly extracted batch into the existing collection
///
/// A batch record whose id is already known only refreshes the derived
/// fields (`keyTopics`, `notableQuotes`, `summary`, `extractedAt`). Unknown
/// ids are appended in batch order. A repeated id within the batch merges
/// into its first occurrence under the same rule, so ids stay unique.
pub fn reconcile(existing: Vec<Episode>, batch: Vec<Episode>) -> ReconcileResult {
    let mut episodes = existing;
    let mut index: HashMap<String, usize> = episodes
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id().to_string(), i))
        .collect();

    let mut updated = 0;
    let mut added = 0;

    for episode in batch {
        match index.get(episode.id()) {
            Some(&i) => {
                debug!("Refreshing derived fields of {}", episode.id());
                episodes[i].apply_update(EpisodeFieldUpdate::enhancement_from(&episode));
                updated += 1;
            }
            None => {
                debug!("Adding {}", episode.id());
                index.insert(episode.id().to_string(), episodes.len());
                episodes.push(episode);
                added += 1;
            }
        }
    }

    info!(
        "Reconciled batch: {} updated, {} added, {} total",
        updated,
        added,
        episodes.len()
    );

    ReconcileResult {
        episodes,
        updated,
        added,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::models::NotableQuote;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    fn episode(id: &str, summary: &str, hour: u32) -> Episode {
        let mut e = Episode::new(id, id, format!("transcript of {}", id), at(hour));
        e.summary = summary.to_string();
        e
    }

    #[test]
    fn test_existing_record_only_refreshes_derived_fields() {
        let mut stored = episode("a", "old summary", 1);
        stored.series = "MBS".to_string();
        stored.hosts = vec!["Jane Doe".to_string()];
        stored.audio_link = "https://example.com/a.mp3".to_string();
        stored.date = NaiveDate::from_ymd_opt(2025, 2, 4);

        let mut fresh = Episode::new("a", "a", "a different transcript entirely", at(5));
        fresh.series = "OTHER".to_string();
        fresh.hosts = vec!["Someone Else".to_string()];
        fresh.summary = "new summary".to_string();
        fresh.set_key_topics(vec!["Leadership".to_string()]);
        fresh.set_notable_quotes(vec![NotableQuote::new("q", None)]);

        let result = reconcile(vec![stored], vec![fresh]);

        assert_eq!(result.updated, 1);
        assert_eq!(result.added, 0);
        let merged = &result.episodes[0];
        assert_eq!(merged.summary, "new summary");
        assert_eq!(merged.key_topics(), ["Leadership"]);
        assert_eq!(merged.notable_quotes().len(), 1);
        assert_eq!(merged.extracted_at, at(5));
        assert_eq!(merged.series, "MBS");
        assert_eq!(merged.hosts, vec!["Jane Doe"]);
        assert_eq!(merged.audio_link, "https://example.com/a.mp3");
        assert_eq!(merged.date, NaiveDate::from_ymd_opt(2025, 2, 4));
        assert_eq!(merged.transcript(), "transcript of a");
        assert_eq!(merged.word_count(), 3);
    }

    #[test]
    fn test_order_preserved_and_new_appended() {
        let existing = vec![episode("b", "", 1), episode("a", "", 1)];
        let batch = vec![episode("d", "", 2), episode("a", "", 2), episode("c", "", 2)];

        let result = reconcile(existing, batch);

        let ids: Vec<_> = result.episodes.iter().map(|e| e.id()).collect();
        assert_eq!(ids, ["b", "a", "d", "c"]);
        assert_eq!(result.updated, 1);
        assert_eq!(result.added, 2);
    }

    #[test]
    fn test_empty_batch_is_identity() {
        let existing = vec![episode("a", "s", 1), episode("b", "t", 1)];
        let result = reconcile(existing.clone(), Vec::new());
        assert_eq!(result.episodes, existing);
        assert_eq!(result.updated + result.added, 0);
    }

    #[test]
    fn test_duplicate_ids_in_batch_merge() {
        let batch = vec![episode("x", "first", 1), episode("x", "second", 2)];
        let result = reconcile(Vec::new(), batch);

        assert_eq!(result.episodes.len(), 1);
        assert_eq!(result.added, 1);
        assert_eq!(result.updated, 1);
        assert_eq!(result.episodes[0].summary, "second");
    }

    #[test]
    fn test_ids_stay_unique() {
        let existing = vec![episode("a", "", 1), episode("b", "", 1)];
        let batch = vec![
            episode("b", "", 2),
            episode("c", "", 2),
            episode("a", "", 2),
            episode("c", "", 3),
        ];
        let result = reconcile(existing, batch);
        let ids: HashSet<_> = result.episodes.iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), result.episodes.len());
        assert_eq!(result.episodes.len(), 3);
    }
}
