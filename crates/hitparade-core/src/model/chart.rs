use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::key::SongKey;
use crate::provenance::Source;

/// One stint at number one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub date: NaiveDate,
    pub title: String,
    pub artist: String,
    pub weeks_at_number_one: u32,
}

impl ChartEntry {
    #[must_use]
    pub fn new(
        date: NaiveDate,
        title: impl Into<String>,
        artist: impl Into<String>,
        weeks_at_number_one: u32,
    ) -> Self {
        Self {
            date,
            title: title.into(),
            artist: artist.into(),
            weeks_at_number_one,
        }
    }

    #[must_use]
    pub fn key(&self) -> SongKey {
        SongKey::new(self.title.clone(), self.artist.clone())
    }
}

/// The historical number-one table, in source order.
///
/// Re-entries at number one are separate entries; nothing here enforces
/// uniqueness of (title, artist).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartTable {
    #[serde(default = "chart_source")]
    pub source: Source,

    /// Page the table was scraped from.
    #[serde(default)]
    pub source_url: Option<String>,

    /// "Correct as of" date printed on the source page, if one was found.
    #[serde(default)]
    pub site_updated: Option<NaiveDate>,

    pub entries: Vec<ChartEntry>,
}

impl ChartTable {
    #[must_use]
    pub fn new(entries: Vec<ChartEntry>) -> Self {
        Self {
            source: chart_source(),
            source_url: None,
            site_updated: None,
            entries,
        }
    }

    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_site_updated(mut self, date: Option<NaiveDate>) -> Self {
        self.site_updated = date;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChartEntry> {
        self.entries.iter()
    }

    /// Distinct song keys in order of first appearance.
    pub fn distinct_keys(&self) -> Vec<SongKey> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(ChartEntry::key)
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }
}

impl Default for ChartTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn chart_source() -> Source {
    Source::OfficialCharts
}

impl<'a> IntoIterator for &'a ChartTable {
    type Item = &'a ChartEntry;
    type IntoIter = std::slice::Iter<'a, ChartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_distinct_keys_keeps_first_appearance_order() {
        let table = ChartTable::new(vec![
            ChartEntry::new(date(1990, 1, 1), "B", "Y", 2),
            ChartEntry::new(date(1990, 2, 1), "A", "X", 1),
            ChartEntry::new(date(1991, 5, 1), "B", "Y", 1),
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.distinct_keys(),
            vec![SongKey::new("B", "Y"), SongKey::new("A", "X")]
        );
    }

    #[test]
    fn test_chart_table_builder() {
        let table = ChartTable::default()
            .with_source_url("https://example.com/number-ones")
            .with_site_updated(Some(date(2019, 1, 3)));

        assert!(table.is_empty());
        assert_eq!(table.source, Source::OfficialCharts);
        assert_eq!(table.site_updated, Some(date(2019, 1, 3)));
        assert_eq!(
            table.source_url.as_deref(),
            Some("https://example.com/number-ones")
        );
    }

    #[test]
    fn test_chart_entry_serializes_iso_date() {
        let entry = ChartEntry::new(date(2000, 1, 2), "Song", "Artist", 3);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2000-01-02");
        assert_eq!(json["weeks_at_number_one"], 3);
    }

    #[test]
    fn test_chart_table_source_defaults_to_official_charts() {
        let json = r#"{"entries": [{"date": "2000-01-02", "title": "Song",
            "artist": "Artist", "weeks_at_number_one": 3}]}"#;
        let table: ChartTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.source, Source::OfficialCharts);
        assert_eq!(table.len(), 1);

        let json = serde_json::to_value(ChartTable::default()).unwrap();
        assert_eq!(json["source"], "OfficialCharts");
    }
}
