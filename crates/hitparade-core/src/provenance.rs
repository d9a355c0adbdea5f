use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a piece of data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Scraped from the chart-history page.
    OfficialCharts,
    /// Genius lyrics search.
    Genius,
    /// Spotify track search and audio features.
    Spotify,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OfficialCharts => "Official Charts",
            Self::Genius => "Genius",
            Self::Spotify => "Spotify",
        };
        f.write_str(name)
    }
}

/// A persisted stage output with the time it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub created_at: DateTime<Utc>,
    pub data: T,
}

impl<T> Snapshot<T> {
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            created_at: Utc::now(),
            data,
        }
    }
}
