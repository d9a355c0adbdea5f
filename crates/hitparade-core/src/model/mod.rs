pub mod chart;
pub mod enrichment;
pub mod features;
pub mod key;

pub use chart::{ChartEntry, ChartTable};
pub use enrichment::{Columns, EnrichedRow, EnrichedTable, Enrichment, EnrichmentMap};
pub use features::{AudioFeatures, ParsedFeatureRow, TrackFeatures, AUDIO_FEATURE_FIELDS};
pub use key::SongKey;
