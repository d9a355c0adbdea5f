use anyhow::Result;
use hitparade_core::store::SnapshotStore;
use hitparade_etl::{pipeline, Config};

use super::lyrics::print_enrich_report;

pub fn run_features(config: &Config, store: &SnapshotStore) -> Result<()> {
    log::info!("Starting audio-feature enrichment");
    println!("  ⏳ [features] Looking up audio features on Spotify...");

    let report = pipeline::run_features(config, store)?;

    print_enrich_report("features", &report.raw);
    println!(
        "✓ Saved {} ({} rows with features)",
        report.parsed_path.display(),
        report.parsed_rows
    );
    Ok(())
}
