use anyhow::Result;
use hitparade_core::store::SnapshotStore;
use hitparade_etl::{pipeline, Config};

pub fn run_chart(config: &Config, store: &SnapshotStore) -> Result<()> {
    log::info!("Starting chart scrape");
    println!("  ⏳ [chart] Scraping {}", config.chart_url);

    let report = pipeline::run_chart(config, store)?;

    println!(
        "  ✓ [chart] {} number-one singles from {}",
        report.entries, report.source
    );
    if let Some(updated) = report.site_updated {
        println!("    Source correct as of {updated}");
    }
    println!("\n✓ Saved {}", report.path.display());
    Ok(())
}
