use serde::{Deserialize, Serialize};
use std::fmt;

/// The join key between the chart table and enrichment results.
///
/// Matching is exact: two entries with the same title and artist text share
/// one lookup, whatever their dates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SongKey {
    pub title: String,
    pub artist: String,
}

impl SongKey {
    #[must_use]
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

impl fmt::Display for SongKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}
