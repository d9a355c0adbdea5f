//! Left-join enrichment results back onto the chart table.

use hitparade_core::model::{
    ChartTable, EnrichedRow, EnrichedTable, Enrichment, EnrichmentMap, ParsedFeatureRow,
    TrackFeatures,
};

/// Attach each chart row's enrichment outcome.
///
/// Every base row is kept, in order. A row whose key is absent from `map`
/// is marked [`Enrichment::Missing`].
pub fn merge<T: Clone>(base: &ChartTable, map: &EnrichmentMap<T>) -> EnrichedTable<T> {
    let rows = base
        .iter()
        .map(|entry| EnrichedRow {
            entry: entry.clone(),
            enrichment: map.get(&entry.key()).cloned().unwrap_or(Enrichment::Missing),
        })
        .collect();

    EnrichedTable {
        source: map.source,
        fetched_at: map.fetched_at,
        rows,
    }
}

/// Keep rows whose audio features are known, ordered by chart date.
pub fn parse_features(raw: &EnrichedTable<TrackFeatures>) -> Vec<ParsedFeatureRow> {
    let mut parsed: Vec<ParsedFeatureRow> = raw
        .rows
        .iter()
        .filter_map(|row| {
            let track = row.enrichment.payload()?;
            let features = track.features?;
            Some(ParsedFeatureRow {
                entry: row.entry.clone(),
                uri: track.uri.clone(),
                features,
            })
        })
        .collect();

    parsed.sort_by_key(|row| row.entry.date);

    let dropped = raw.len() - parsed.len();
    if dropped > 0 {
        log::info!("Dropped {} rows without audio features", dropped);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hitparade_core::model::{AudioFeatures, ChartEntry, SongKey};
    use hitparade_core::provenance::Source;

    fn entry(day: u32, title: &str, artist: &str) -> ChartEntry {
        ChartEntry::new(
            NaiveDate::from_ymd_opt(2000, 1, day).unwrap(),
            title,
            artist,
            1,
        )
    }

    fn features(tempo: f64) -> AudioFeatures {
        AudioFeatures {
            danceability: 0.5,
            energy: 0.5,
            key: 1.0,
            loudness: -5.0,
            mode: 1.0,
            speechiness: 0.05,
            acousticness: 0.1,
            instrumentalness: 0.0,
            liveness: 0.1,
            valence: 0.5,
            tempo,
            duration_ms: 200_000.0,
            time_signature: 4.0,
        }
    }

    fn found(uri: &str, tempo: Option<f64>) -> Enrichment<TrackFeatures> {
        Enrichment::Found(TrackFeatures::new(uri, tempo.map(features)))
    }

    #[test]
    fn test_merge_preserves_row_count_with_empty_map() {
        let base = ChartTable::new(vec![entry(1, "A", "X"), entry(2, "B", "Y")]);
        let map: EnrichmentMap<String> = EnrichmentMap::new(Source::Genius);

        let merged = merge(&base, &map);
        assert_eq!(merged.len(), base.len());
        assert!(merged
            .rows
            .iter()
            .all(|row| row.enrichment == Enrichment::Missing));
        assert_eq!(merged.source, Source::Genius);
    }

    #[test]
    fn test_merge_repeats_payload_for_repeated_songs() {
        let entries = vec![entry(1, "A", "X"), entry(2, "B", "Y"), entry(3, "A", "X")];
        let base = ChartTable::new(entries);
        let mut map = EnrichmentMap::new(Source::Genius);
        map.insert(
            SongKey::new("A", "X"),
            Enrichment::Found("la la".to_string()),
        );
        map.insert(
            SongKey::new("B", "Y"),
            Enrichment::Failed("timeout".to_string()),
        );

        let merged = merge(&base, &map);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.rows[0].enrichment.payload_or_default(), "la la");
        assert_eq!(merged.rows[1].enrichment.payload_or_default(), "");
        assert_eq!(merged.rows[1].enrichment.status(), "failed");
        assert_eq!(merged.rows[2].enrichment.payload_or_default(), "la la");
        assert_eq!(
            merged.rows[2].entry.date,
            NaiveDate::from_ymd_opt(2000, 1, 3).unwrap()
        );
        assert_eq!(merged.gaps().count(), 1);
    }

    #[test]
    fn test_parse_features_keeps_known_features_sorted_by_date() {
        let base = ChartTable::new(vec![
            entry(5, "Late", "X"),
            entry(1, "Early", "Y"),
            entry(3, "No Features", "Z"),
            entry(2, "Unknown", "W"),
        ]);
        let mut map = EnrichmentMap::new(Source::Spotify);
        map.insert(SongKey::new("Late", "X"), found("late", Some(90.0)));
        map.insert(SongKey::new("Early", "Y"), found("early", Some(120.0)));
        map.insert(SongKey::new("No Features", "Z"), found("bare", None));
        map.insert(SongKey::new("Unknown", "W"), Enrichment::NotFound);

        let raw = merge(&base, &map);
        let parsed = parse_features(&raw);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].entry.title, "Early");
        assert_eq!(parsed[0].uri, "early");
        assert_eq!(parsed[1].entry.title, "Late");
        assert!((parsed[1].features.tempo - 90.0).abs() < f64::EPSILON);
    }
}
