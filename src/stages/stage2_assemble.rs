use chrono::{DateTime, Utc};

use super::stage0_filename::{document_stem, FilenameInfo};
use crate::models::{Episode, ExtractedFields};

/// Build the canonical record for one document
///
/// `date`, `series` and `episodeNumber` prefer the filename, then the
/// extractor. Every other field comes from the extractor as-is. The word
/// count is always recomputed from `transcript`.
pub fn assemble_episode(
    document_name: &str,
    transcript: &str,
    filename: &FilenameInfo,
    extracted: ExtractedFields,
    extracted_at: DateTime<Utc>,
) -> Episode {
    let id = document_stem(document_name);
    let mut episode = Episode::new(id, id, transcript, extracted_at);

    episode.date = filename.date.or(extracted.date);
    episode.series = prefer_filename(&filename.series, extracted.series);
    episode.episode_number = prefer_filename(&filename.episode_number, extracted.episode_number);

    episode.episode_title = extracted.episode_title;
    episode.hosts = extracted.hosts;
    episode.guests = extracted.guests;
    episode.guest_work_experience = extracted.guest_work_experience;
    episode.set_key_topics(extracted.key_topics);
    episode.set_notable_quotes(extracted.notable_quotes);
    episode.summary = extracted.summary;

    episode
}

fn prefer_filename(from_filename: &str, from_extractor: String) -> String {
    if from_filename.trim().is_empty() {
        from_extractor
    } else {
        from_filename.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::models::word_count;
    use crate::stages::parse_filename;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_filename_wins_when_present() {
        let filename = parse_filename("20241021-cls-062-V1-TRX.txt");
        let extracted = ExtractedFields {
            series: "Heidrick & Struggles Leadership Podcast".to_string(),
            episode_number: "99".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 1, 1),
            episode_title: "Leading Through Change".to_string(),
            ..Default::default()
        };

        let episode = assemble_episode("20241021-cls-062-V1-TRX.txt", "a b c", &filename, extracted, at());

        assert_eq!(episode.id(), "20241021-cls-062-V1-TRX");
        assert_eq!(episode.file_name(), "20241021-cls-062-V1-TRX");
        assert_eq!(episode.series, "CLS");
        assert_eq!(episode.episode_number, "062");
        assert_eq!(episode.date, NaiveDate::from_ymd_opt(2024, 10, 21));
        assert_eq!(episode.episode_title, "Leading Through Change");
        assert_eq!(episode.extracted_at, at());
    }

    #[test]
    fn test_extractor_fills_missing_filename_fields() {
        let filename = parse_filename("interview.txt");
        let extracted = ExtractedFields {
            series: "PWC Pulse".to_string(),
            episode_number: "12".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 5, 6),
            ..Default::default()
        };

        let episode = assemble_episode("interview.txt", "", &filename, extracted, at());

        assert_eq!(episode.series, "PWC Pulse");
        assert_eq!(episode.episode_number, "12");
        assert_eq!(episode.date, NaiveDate::from_ymd_opt(2023, 5, 6));
    }

    #[test]
    fn test_absent_everywhere_stays_empty() {
        let episode = assemble_episode(
            "interview.txt",
            "",
            &FilenameInfo::default(),
            ExtractedFields::default(),
            at(),
        );
        assert_eq!(episode.series, "");
        assert_eq!(episode.episode_number, "");
        assert_eq!(episode.date, None);
        assert_eq!(episode.audio_link, "");
    }

    #[test]
    fn test_word_count_ignores_extractor_guess() {
        let transcript = "one two three\n four  five";
        let extracted = ExtractedFields {
            word_count_guess: Some(9000),
            ..Default::default()
        };

        let episode = assemble_episode("x.txt", transcript, &FilenameInfo::default(), extracted, at());

        assert_eq!(episode.word_count(), 5);
        assert_eq!(episode.word_count(), word_count(episode.transcript()));
    }

    #[test]
    fn test_oversized_extractor_lists_are_capped() {
        let extracted = ExtractedFields {
            key_topics: (0..9).map(|i| i.to_string()).collect(),
            ..Default::default()
        };
        let episode = assemble_episode("x.txt", "", &FilenameInfo::default(), extracted, at());
        assert_eq!(episode.key_topics().len(), 6);
    }
}
