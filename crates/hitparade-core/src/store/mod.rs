pub mod export;
pub mod snapshot;

pub use export::{write_chart_csv, write_enriched_csv, write_parsed_features_csv, write_records};
pub use snapshot::{Artifact, SnapshotStore};
