//! Enrichment results and the tables they are merged into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::chart::ChartEntry;
use crate::model::key::SongKey;
use crate::provenance::Source;

/// Flattening of an enrichment payload into named text columns.
pub trait Columns {
    fn column_names() -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

impl Columns for String {
    fn column_names() -> Vec<&'static str> {
        vec!["lyrics"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.clone()]
    }
}

/// Outcome of one lookup for one song.
///
/// `NotFound` and `Failed` are kept apart so a rerun can target transient
/// failures; `Missing` marks a row whose key never reached the lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum Enrichment<T> {
    Found(T),
    NotFound,
    Failed(String),
    Missing,
}

impl<T> Enrichment<T> {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::NotFound => "not_found",
            Self::Failed(_) => "failed",
            Self::Missing => "missing",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Found(payload) => Some(payload),
            _ => None,
        }
    }
}

impl<T: Default + Clone> Enrichment<T> {
    /// The payload, or the payload type's empty value when absent.
    pub fn payload_or_default(&self) -> T {
        self.payload().cloned().unwrap_or_default()
    }
}

/// Results of one enrichment sweep, keyed by song.
///
/// Holds at most one entry per distinct key in the swept table.
#[derive(Debug, Clone)]
pub struct EnrichmentMap<T> {
    pub source: Source,
    pub fetched_at: DateTime<Utc>,
    entries: BTreeMap<SongKey, Enrichment<T>>,
}

impl<T> EnrichmentMap<T> {
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self {
            source,
            fetched_at: Utc::now(),
            entries: BTreeMap::new(),
        }
    }

    /// Record the outcome for a key, replacing any earlier one.
    pub fn insert(&mut self, key: SongKey, enrichment: Enrichment<T>) {
        self.entries.insert(key, enrichment);
    }

    pub fn get(&self, key: &SongKey) -> Option<&Enrichment<T>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SongKey, &Enrichment<T>)> {
        self.entries.iter()
    }

    /// Number of entries per status, for run summaries.
    pub fn status_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for enrichment in self.entries.values() {
            *counts.entry(enrichment.status()).or_insert(0) += 1;
        }
        counts
    }
}

/// A chart entry with its enrichment outcome attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow<T> {
    #[serde(flatten)]
    pub entry: ChartEntry,
    pub enrichment: Enrichment<T>,
}

/// The chart table left-joined with one enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTable<T> {
    pub source: Source,
    pub fetched_at: DateTime<Utc>,
    pub rows: Vec<EnrichedRow<T>>,
}

impl<T> EnrichedTable<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows without a usable payload, for manual follow-up.
    pub fn gaps(&self) -> impl Iterator<Item = &EnrichedRow<T>> {
        self.rows.iter().filter(|row| !row.enrichment.is_found())
    }
}

impl<T: Columns + Default + Clone> EnrichedTable<T> {
    /// Header row for a flat export: chart columns, status, then payload
    /// columns.
    pub fn column_names() -> Vec<&'static str> {
        let mut names = vec!["date", "title", "artist", "weeks", "status"];
        names.extend(T::column_names());
        names
    }

    /// Flat text rows matching [`Self::column_names`]; absent payloads
    /// export as their empty value.
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(|row| {
            let mut record = vec![
                row.entry.date.to_string(),
                row.entry.title.clone(),
                row.entry.artist.clone(),
                row.entry.weeks_at_number_one.to_string(),
                row.enrichment.status().to_string(),
            ];
            record.extend(row.enrichment.payload_or_default().cells());
            record
        })
    }
}
