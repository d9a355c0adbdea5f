use anyhow::Result;
use hitparade_core::store::SnapshotStore;
use hitparade_etl::pipeline;

pub fn run_export(store: &SnapshotStore) -> Result<()> {
    let written = pipeline::export(store)?;

    if written.is_empty() {
        println!("No snapshots to export. Run 'hitparade chart' first.");
        return Ok(());
    }

    for (path, rows) in &written {
        println!("  ✓ {} ({} rows)", path.display(), rows);
    }
    println!("\n✓ Exported {} files", written.len());
    Ok(())
}
