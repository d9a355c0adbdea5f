use std::collections::BTreeMap;

use anyhow::Result;
use hitparade_core::store::SnapshotStore;
use hitparade_etl::pipeline::{self, EnrichReport};
use hitparade_etl::Config;

pub fn run_lyrics(config: &Config, store: &SnapshotStore) -> Result<()> {
    log::info!("Starting lyrics enrichment");
    println!("  ⏳ [lyrics] Looking up lyrics on Genius...");

    let report = pipeline::run_lyrics(config, store)?;

    print_enrich_report("lyrics", &report);
    Ok(())
}

/// Row totals per status, then where the snapshot went.
pub(crate) fn print_enrich_report(stage: &str, report: &EnrichReport) {
    println!(
        "  ✓ [{stage}] {} rows ({})",
        report.rows,
        format_counts(&report.status_counts)
    );

    let failed = report.status_counts.get("failed").copied().unwrap_or(0);
    if failed > 0 {
        println!("    {failed} rows failed; rerun `hitparade {stage}` to retry them");
    }
    println!("\n✓ Saved {}", report.path.display());
}

pub(crate) fn format_counts(counts: &BTreeMap<&'static str, usize>) -> String {
    if counts.is_empty() {
        return "none".to_string();
    }
    counts
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}
