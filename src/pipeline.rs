use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::io::{load_existing, DocumentSource, EpisodeStore};
use crate::models::{Episode, EpisodeFieldUpdate};
use crate::reformat::{needs_reformat, normalize_transcript};
use crate::stages::{
    assemble_episode, enhance_all, parse_filename, reconcile, EnhanceResult, ExtractionStrategy,
};

/// Outcome of one extraction run
#[derive(Debug)]
pub struct ExtractionReport {
    /// Records assembled in this run, in document order
    pub batch: Vec<Episode>,
    /// Documents skipped because they could not be read or were empty
    pub skipped: usize,
    pub updated: usize,
    pub added: usize,
    /// Size of the collection after the run
    pub total: usize,
}

/// Extract every document of a source into a batch of records
///
/// Unreadable and empty documents are skipped with a warning. Only a source
/// that cannot be listed is an error.
pub async fn extract_batch(
    source: &dyn DocumentSource,
    strategy: &ExtractionStrategy<'_>,
    now: DateTime<Utc>,
) -> Result<(Vec<Episode>, usize)> {
    let documents = source
        .list_documents()
        .context("Document source unavailable")?;
    info!(
        "Extracting {} documents with the {} strategy",
        documents.len(),
        strategy.name()
    );

    let mut batch = Vec::with_capacity(documents.len());
    let mut skipped = 0;

    for document in &documents {
        let text = match source.read_text(document) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {}: {:#}", document.name, e);
                skipped += 1;
                continue;
            }
        };
        if text.trim().is_empty() {
            warn!("Skipping {}: no text", document.name);
            skipped += 1;
            continue;
        }

        let filename = parse_filename(&document.name);
        let extracted = strategy.extract(&text, &document.name).await;
        let episode = assemble_episode(&document.name, &text, &filename, extracted, now);

        info!(
            "{}: series={:?} episode={:?} hosts={} guests={} words={}",
            episode.id(),
            episode.series,
            episode.episode_number,
            episode.hosts.len(),
            episode.guests.len(),
            episode.word_count()
        );
        batch.push(episode);
    }

    Ok((batch, skipped))
}

/// Extract a source, merge the batch into the store and rewrite it
pub async fn run_extraction(
    source: &dyn DocumentSource,
    strategy: &ExtractionStrategy<'_>,
    store: &dyn EpisodeStore,
    now: DateTime<Utc>,
) -> Result<ExtractionReport> {
    let existing = load_existing(store).context("Failed to read episode store")?;
    let (batch, skipped) = extract_batch(source, strategy, now).await?;

    let merged = reconcile(existing, batch.clone());
    store
        .write_all(&merged.episodes)
        .context("Failed to write episode store")?;

    Ok(ExtractionReport {
        batch,
        skipped,
        updated: merged.updated,
        added: merged.added,
        total: merged.episodes.len(),
    })
}

/// Regenerate derived fields for every stored record and rewrite the store
pub fn run_enhance(store: &dyn EpisodeStore, now: DateTime<Utc>) -> Result<EnhanceResult> {
    let mut episodes = load_existing(store).context("Failed to read episode store")?;
    let result = enhance_all(&mut episodes, now);
    store
        .write_all(&episodes)
        .context("Failed to write episode store")?;
    Ok(result)
}

/// Options for the transcript reformatting pass
#[derive(Debug, Clone, Default)]
pub struct ReformatOptions {
    /// Also label bare-timestamp paragraphs with the previous speaker
    pub fill_missing_speakers: bool,
    /// Report what would change without writing
    pub dry_run: bool,
}

/// Outcome of the reformatting pass
#[derive(Debug, Default)]
pub struct ReformatReport {
    /// Ids of records whose transcript changed
    pub fixed: Vec<String>,
    pub total: usize,
}

/// Rewrite stored transcripts into `Speaker: [timestamp] text` form
///
/// Only records whose transcript actually changes are touched. Each one gets
/// a field-level update of `transcript` (which recomputes `wordCount`) and
/// `extractedAt = now`.
pub fn run_reformat(
    store: &dyn EpisodeStore,
    options: &ReformatOptions,
    now: DateTime<Utc>,
) -> Result<ReformatReport> {
    let episodes = load_existing(store).context("Failed to read episode store")?;
    let mut report = ReformatReport {
        total: episodes.len(),
        ..Default::default()
    };

    for episode in &episodes {
        if !options.fill_missing_speakers && !needs_reformat(episode.transcript()) {
            continue;
        }
        let transcript = normalize_transcript(episode.transcript(), options.fill_missing_speakers);
        if transcript == episode.transcript() {
            continue;
        }

        report.fixed.push(episode.id().to_string());
        if options.dry_run {
            info!("{}: transcript would be reformatted", episode.id());
            continue;
        }

        let update = EpisodeFieldUpdate {
            transcript: Some(transcript),
            extracted_at: Some(now),
            ..Default::default()
        };
        let found = store
            .update_fields(episode.id(), update)
            .with_context(|| format!("Failed to update {}", episode.id()))?;
        if found {
            info!("{}: transcript reformatted", episode.id());
        } else {
            warn!("{}: record disappeared before it could be updated", episode.id());
        }
    }

    if options.dry_run {
        info!("Dry run: {} of {} transcripts would change", report.fixed.len(), report.total);
    }

    Ok(report)
}

/// Summary statistics over a collection
#[derive(Debug, Default, PartialEq)]
pub struct CollectionStats {
    pub episodes: usize,
    pub distinct_hosts: usize,
    pub distinct_guests: usize,
    pub total_words: usize,
    /// Episode count per series; an empty series is reported as ""
    pub series: BTreeMap<String, usize>,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

pub fn collection_stats(episodes: &[Episode]) -> CollectionStats {
    let hosts: BTreeSet<&str> = episodes
        .iter()
        .flat_map(|e| e.hosts.iter().map(String::as_str))
        .collect();
    let guests: BTreeSet<&str> = episodes
        .iter()
        .flat_map(|e| e.guests.iter().map(String::as_str))
        .collect();

    let mut series = BTreeMap::new();
    for episode in episodes {
        *series.entry(episode.series.clone()).or_insert(0) += 1;
    }

    let dates = episodes.iter().filter_map(|e| e.date);

    CollectionStats {
        episodes: episodes.len(),
        distinct_hosts: hosts.len(),
        distinct_guests: guests.len(),
        total_words: episodes.iter().map(Episode::word_count).sum(),
        series,
        earliest: dates.clone().min(),
        latest: dates.max(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::io::{DirectoryDocumentSource, JsonFileStore, StoreError};
    use crate::stages::stage1_extract::tests::ScriptedOracle;
    use crate::stages::OracleExtractionConfig;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    const MBS_TEXT: &str = "Welcome to My Best Shift podcast. I'm Jane Doe and I'm John Smith. \
Today we talk about leadership on the night shift.";

    fn fixture() -> (tempfile::TempDir, DirectoryDocumentSource, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::fs::write(docs.join("20250204-MBS-0506-V1.txt"), MBS_TEXT).unwrap();
        std::fs::write(docs.join("empty.txt"), "  \n").unwrap();
        let store = JsonFileStore::new(dir.path().join("episodes.json"));
        (dir, DirectoryDocumentSource::new(docs), store)
    }

    #[tokio::test]
    async fn test_extraction_skips_empty_documents() {
        let (_dir, source, store) = fixture();

        let report = run_extraction(&source, &ExtractionStrategy::Heuristic, &store, at(1))
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.added, 1);
        assert_eq!(report.total, 1);
        let stored = store.read_all().unwrap();
        assert_eq!(stored[0].id(), "20250204-MBS-0506-V1");
        assert_eq!(stored[0].hosts, vec!["Jane Doe", "John Smith"]);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent_on_ids() {
        let (_dir, source, store) = fixture();

        run_extraction(&source, &ExtractionStrategy::Heuristic, &store, at(1))
            .await
            .unwrap();
        let report = run_extraction(&source, &ExtractionStrategy::Heuristic, &store, at(2))
            .await
            .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.added, 0);
        let stored = store.read_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].extracted_at, at(2));
    }

    #[tokio::test]
    async fn test_oracle_failure_keeps_filename_fields() {
        let (_dir, source, store) = fixture();
        let oracle = ScriptedOracle::new(vec![Ok("no json here".to_string())]);
        let strategy = ExtractionStrategy::Oracle {
            oracle: &oracle,
            config: OracleExtractionConfig::default(),
        };

        let report = run_extraction(&source, &strategy, &store, at(1)).await.unwrap();

        let episode = &report.batch[0];
        assert_eq!(episode.series, "MBS");
        assert_eq!(episode.episode_number, "0506");
        assert_eq!(episode.date, NaiveDate::from_ymd_opt(2025, 2, 4));
        assert!(episode.hosts.is_empty());
        assert_eq!(episode.episode_title, "");
        assert_eq!(episode.word_count(), 22);
    }

    #[tokio::test]
    async fn test_unlistable_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryDocumentSource::new(dir.path().join("missing"));
        let store = JsonFileStore::new(dir.path().join("episodes.json"));

        let result = run_extraction(&source, &ExtractionStrategy::Heuristic, &store, at(1)).await;

        assert!(result.is_err());
        assert!(!store.path().exists());
    }

    fn store_with(transcripts: &[(&str, &str)]) -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("episodes.json"));
        let episodes: Vec<_> = transcripts
            .iter()
            .map(|(id, text)| Episode::new(*id, *id, *text, at(1)))
            .collect();
        store.write_all(&episodes).unwrap();
        (dir, store)
    }

    #[test]
    fn test_reformat_updates_only_changed_records() {
        let (_dir, store) = store_with(&[
            ("a", "[00:00:01] Jane Doe:   hello there\nplain line"),
            ("b", "Jane Doe: [00:00:01] already fine"),
        ]);

        let report = run_reformat(&store, &ReformatOptions::default(), at(3)).unwrap();

        assert_eq!(report.fixed, vec!["a"]);
        assert_eq!(report.total, 2);
        let stored = store.read_all().unwrap();
        assert_eq!(stored[0].transcript(), "Jane Doe: [00:00:01] hello there\nplain line");
        assert_eq!(stored[0].word_count(), 7);
        assert_eq!(stored[0].extracted_at, at(3));
        assert_eq!(stored[1].extracted_at, at(1));
    }

    #[test]
    fn test_reformat_dry_run_writes_nothing() {
        let (_dir, store) = store_with(&[("a", "[00:00:01] Jane: hi")]);
        let options = ReformatOptions {
            dry_run: true,
            ..Default::default()
        };

        let report = run_reformat(&store, &options, at(3)).unwrap();

        assert_eq!(report.fixed.len(), 1);
        assert_eq!(store.read_all().unwrap()[0].transcript(), "[00:00:01] Jane: hi");
    }

    #[test]
    fn test_reformat_fill_missing_speakers() {
        let (_dir, store) = store_with(&[("a", "Jane: [00:00:01] hi\n\n[00:00:05] still me")]);
        let options = ReformatOptions {
            fill_missing_speakers: true,
            ..Default::default()
        };

        let report = run_reformat(&store, &options, at(3)).unwrap();

        assert_eq!(report.fixed, vec!["a"]);
        assert_eq!(
            store.read_all().unwrap()[0].transcript(),
            "Jane: [00:00:01] hi\n\nJane: [00:00:05] still me"
        );
    }

    #[test]
    fn test_enhance_rewrites_store() {
        let (_dir, store) = store_with(&[("a", "leadership talk")]);
        let result = run_enhance(&store, at(4)).unwrap();
        assert_eq!(result.total, 1);
        let stored = store.read_all().unwrap();
        assert_eq!(stored[0].key_topics(), ["Leadership"]);
        assert_eq!(stored[0].extracted_at, at(4));
    }

    #[test]
    fn test_enhance_keeps_loosely_typed_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("episodes.json"));
        std::fs::write(
            store.path(),
            r#"[
  {"id": "a", "fileName": "a", "transcript": "leadership talk", "hosts": ["Jane Doe"],
   "extractedAt": "2025-01-01T00:00:00Z"},
  {"id": "b", "fileName": "b", "transcript": "more leadership talk", "episodeNumber": 12,
   "hosts": null, "extractedAt": "2025-01-01T00:00:00Z", "firestoreId": "xyz"}
]"#,
        )
        .unwrap();

        let result = run_enhance(&store, at(4)).unwrap();

        assert_eq!(result.total, 2);
        let stored = store.read_all().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].hosts, vec!["Jane Doe"]);
        assert_eq!(stored[1].episode_number, "12");
        assert_eq!(stored[1].word_count(), 3);
        assert_eq!(stored[1].extra()["firestoreId"], "xyz");
        assert_eq!(stored[1].extracted_at, at(4));
    }

    #[tokio::test]
    async fn test_unreadable_store_is_never_overwritten() {
        let (_dir, source, store) = fixture();
        let corrupt = r#"[{"id": "a", "fileName": "a", "hosts": 5}]"#;
        std::fs::write(store.path(), corrupt).unwrap();

        assert!(run_enhance(&store, at(2)).is_err());
        assert!(run_reformat(&store, &ReformatOptions::default(), at(2)).is_err());
        assert!(
            run_extraction(&source, &ExtractionStrategy::Heuristic, &store, at(2))
                .await
                .is_err()
        );

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), corrupt);
    }

    /// Keeps records in memory and records how they were written
    #[derive(Default)]
    struct MemoryStore {
        episodes: RefCell<Vec<Episode>>,
        full_writes: Cell<usize>,
        updated: RefCell<Vec<String>>,
    }

    impl EpisodeStore for MemoryStore {
        fn read_all(&self) -> Result<Vec<Episode>, StoreError> {
            Ok(self.episodes.borrow().clone())
        }

        fn write_all(&self, episodes: &[Episode]) -> Result<(), StoreError> {
            self.full_writes.set(self.full_writes.get() + 1);
            *self.episodes.borrow_mut() = episodes.to_vec();
            Ok(())
        }

        fn update_fields(&self, id: &str, update: EpisodeFieldUpdate) -> Result<bool, StoreError> {
            self.updated.borrow_mut().push(id.to_string());
            let mut episodes = self.episodes.borrow_mut();
            match episodes.iter_mut().find(|e| e.id() == id) {
                Some(episode) => {
                    episode.apply_update(update);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[test]
    fn test_reformat_uses_field_updates() {
        let store = MemoryStore::default();
        *store.episodes.borrow_mut() = vec![
            Episode::new("a", "a", "[00:00:01] Jane: hi", at(1)),
            Episode::new("b", "b", "Jane: [00:00:01] fine", at(1)),
            Episode::new("c", "c", "[00:00:02] John: hello there", at(1)),
        ];

        let report = run_reformat(&store, &ReformatOptions::default(), at(3)).unwrap();

        assert_eq!(report.fixed, vec!["a", "c"]);
        assert_eq!(*store.updated.borrow(), vec!["a", "c"]);
        assert_eq!(store.full_writes.get(), 0);
        assert_eq!(store.episodes.borrow()[2].transcript(), "John: [00:00:02] hello there");
    }

    #[test]
    fn test_collection_stats() {
        let mut a = Episode::new("a", "a", "one two", at(1));
        a.series = "MBS".to_string();
        a.hosts = vec!["Jane Doe".to_string()];
        a.guests = vec!["Maria Garcia".to_string()];
        a.date = NaiveDate::from_ymd_opt(2025, 2, 4);
        let mut b = Episode::new("b", "b", "three", at(1));
        b.series = "MBS".to_string();
        b.hosts = vec!["Jane Doe".to_string(), "John Smith".to_string()];
        b.date = NaiveDate::from_ymd_opt(2024, 10, 21);
        let c = Episode::new("c", "c", "", at(1));

        let stats = collection_stats(&[a, b, c]);

        assert_eq!(stats.episodes, 3);
        assert_eq!(stats.distinct_hosts, 2);
        assert_eq!(stats.distinct_guests, 1);
        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.series.get("MBS"), Some(&2));
        assert_eq!(stats.series.get(""), Some(&1));
        assert_eq!(stats.earliest, NaiveDate::from_ymd_opt(2024, 10, 21));
        assert_eq!(stats.latest, NaiveDate::from_ymd_opt(2025, 2, 4));
    }
}
