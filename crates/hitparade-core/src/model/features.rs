use serde::{Deserialize, Serialize};

use crate::model::chart::ChartEntry;
use crate::model::enrichment::Columns;

/// Audio-feature field names, in column order.
pub const AUDIO_FEATURE_FIELDS: [&str; 13] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "duration_ms",
    "time_signature",
];

/// Numeric audio features for one track.
///
/// Integer-valued fields (`key`, `mode`, `duration_ms`, `time_signature`)
/// are held as `f64` so every field flattens to the same column type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub key: f64,
    pub loudness: f64,
    pub mode: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: f64,
    pub time_signature: f64,
}

impl AudioFeatures {
    /// Field values paired with their names, in [`AUDIO_FEATURE_FIELDS`] order.
    pub fn fields(&self) -> [(&'static str, f64); 13] {
        [
            ("danceability", self.danceability),
            ("energy", self.energy),
            ("key", self.key),
            ("loudness", self.loudness),
            ("mode", self.mode),
            ("speechiness", self.speechiness),
            ("acousticness", self.acousticness),
            ("instrumentalness", self.instrumentalness),
            ("liveness", self.liveness),
            ("valence", self.valence),
            ("tempo", self.tempo),
            ("duration_ms", self.duration_ms),
            ("time_signature", self.time_signature),
        ]
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields()
            .into_iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }
}

/// Result of the two-step audio-feature lookup.
///
/// The track URI can resolve while the feature call fails; the URI is kept
/// in that case and `features` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackFeatures {
    pub uri: String,
    pub features: Option<AudioFeatures>,
}

impl TrackFeatures {
    #[must_use]
    pub fn new(uri: impl Into<String>, features: Option<AudioFeatures>) -> Self {
        Self {
            uri: uri.into(),
            features,
        }
    }
}

impl Columns for TrackFeatures {
    fn column_names() -> Vec<&'static str> {
        std::iter::once("uri").chain(AUDIO_FEATURE_FIELDS).collect()
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(AUDIO_FEATURE_FIELDS.len() + 1);
        cells.push(self.uri.clone());
        match &self.features {
            Some(features) => cells.extend(features.fields().iter().map(|(_, v)| v.to_string())),
            None => cells.extend(AUDIO_FEATURE_FIELDS.iter().map(|_| String::new())),
        }
        cells
    }
}

/// A chart entry whose audio features are known; one row of the cleaned
/// feature table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFeatureRow {
    #[serde(flatten)]
    pub entry: ChartEntry,
    pub uri: String,
    pub features: AudioFeatures,
}
