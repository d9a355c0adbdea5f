use anyhow::Result;
use hitparade_core::store::SnapshotStore;
use hitparade_etl::{pipeline, Config};

pub fn run_analyze(config: &Config, store: &SnapshotStore) -> Result<()> {
    let report = pipeline::analyze(config, store)?;

    println!("\n🏆 Most weeks at number one\n");
    for (rank, entry) in report.leaderboard.iter().enumerate() {
        println!(
            "  {:>2}. {:>2} weeks  {} - {} ({})",
            rank + 1,
            entry.weeks_at_number_one,
            entry.artist,
            entry.title,
            entry.date
        );
    }

    println!("\n🎤 Top artists by total weeks\n");
    for summary in report.artists.iter().take(config.leaderboard_size) {
        println!(
            "  {:>3} weeks  {:>2} number ones  {}",
            summary.total_weeks, summary.number_ones, summary.artist
        );
    }

    match report.trends {
        Some((path, rows)) => {
            println!(
                "\n✓ Feature trends (rolling median over {} songs): {} ({} rows)",
                config.rolling_window,
                path.display(),
                rows
            );
        }
        None => {
            println!("\nNo audio features yet. Run 'hitparade features' for trend data.");
        }
    }

    Ok(())
}
