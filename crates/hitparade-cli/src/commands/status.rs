use anyhow::Result;
use hitparade_core::store::SnapshotStore;
use hitparade_etl::pipeline;

use super::lyrics::format_counts;

pub fn show_status(store: &SnapshotStore) -> Result<()> {
    let statuses = pipeline::status(store)?;

    println!("\n📊 Hitparade Status\n");
    println!("  Data directory: {}\n", store.dir().display());

    for status in &statuses {
        let name = status.artifact.file_stem();
        match (status.rows, status.created_at) {
            (Some(rows), Some(created_at)) => {
                print!(
                    "  {name:<16} {rows:>5} rows  {}",
                    created_at.format("%Y-%m-%d %H:%M")
                );
                if status.status_counts.is_empty() {
                    println!();
                } else {
                    println!("  ({})", format_counts(&status.status_counts));
                }
            }
            _ => {
                println!(
                    "  {name:<16} missing  (run `hitparade {}`)",
                    status.artifact.produced_by()
                );
            }
        }
    }

    Ok(())
}
