//! Stage runners behind the CLI commands.
//!
//! Each stage reads its inputs from the snapshot store, does its work, and
//! writes its outputs back, so stages can be rerun independently:
//!
//! ```text
//! chart ──► chart.json ──┬─► lyrics ──► lyrics.json
//!                        └─► features ─► raw_features.json ─► parsed_features.json
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use hitparade_core::model::{
    ChartEntry, ChartTable, EnrichedTable, ParsedFeatureRow, TrackFeatures,
};
use hitparade_core::provenance::{Snapshot, Source};
use hitparade_core::store::{
    write_chart_csv, write_enriched_csv, write_parsed_features_csv, Artifact, SnapshotStore,
};

use crate::analysis::{self, ArtistSummary};
use crate::config::Config;
use crate::dates::DateParser;
use crate::enrich::{AudioFeatureLookup, Enricher, LyricsLookup, SongLookup};
use crate::extract::ChartScraper;
use crate::merge::{merge, parse_features};
use crate::normalize::{normalize, NormalizeOptions};

/// Outcome of `chart`.
#[derive(Debug, Clone)]
pub struct ChartReport {
    pub source: Source,
    pub entries: usize,
    pub site_updated: Option<NaiveDate>,
    pub path: PathBuf,
}

/// Outcome of one enrichment sweep.
#[derive(Debug, Clone)]
pub struct EnrichReport {
    pub rows: usize,
    pub status_counts: BTreeMap<&'static str, usize>,
    pub path: PathBuf,
}

/// Outcome of `features`.
#[derive(Debug, Clone)]
pub struct FeaturesReport {
    pub raw: EnrichReport,
    pub parsed_rows: usize,
    pub parsed_path: PathBuf,
}

/// Scrape the chart page, normalize it, and save `chart.json`.
pub fn run_chart(config: &Config, store: &SnapshotStore) -> Result<ChartReport> {
    let dates = DateParser::new(config.day_first);
    let scraper = ChartScraper::new(config.request_timeout())?;

    log::info!("Scraping {}", config.chart_url);
    let page = scraper
        .scrape(&config.chart_url, &dates)
        .context("Failed to scrape chart page")?;

    let options = NormalizeOptions::new(config.skip_end, dates);
    let table = normalize(&page.tables, &options)
        .context("Failed to normalize chart tables")?
        .with_source_url(&config.chart_url)
        .with_site_updated(page.site_updated);

    log::info!("Normalized {} {} entries", table.len(), table.source);
    let path = store.save(Artifact::Chart, &table)?;
    Ok(ChartReport {
        source: table.source,
        entries: table.len(),
        site_updated: table.site_updated,
        path,
    })
}

/// Look up lyrics for every song in `chart.json` and save `lyrics.json`.
pub fn run_lyrics(config: &Config, store: &SnapshotStore) -> Result<EnrichReport> {
    let lookup = LyricsLookup::from_token(
        config.genius_access_token.as_deref(),
        config.request_timeout(),
    )?;
    enrich_lyrics(store, &Enricher::from_config(config), &lookup)
}

/// Lyrics stage with an injected lookup.
pub fn enrich_lyrics<L>(
    store: &SnapshotStore,
    enricher: &Enricher,
    lookup: &L,
) -> Result<EnrichReport>
where
    L: SongLookup<Output = String>,
{
    let chart = load_chart(store)?;
    let map = enricher.enrich(&chart, lookup);
    let merged = merge(&chart, &map);
    save_enriched(store, Artifact::Lyrics, &merged)
}

/// Look up audio features for every song in `chart.json`, then save both
/// the raw and the cleaned feature snapshots.
pub fn run_features(config: &Config, store: &SnapshotStore) -> Result<FeaturesReport> {
    let lookup = AudioFeatureLookup::from_credentials(
        config.spotify_client_id.as_deref(),
        config.spotify_client_secret.as_deref(),
        config.request_timeout(),
    )?;
    enrich_features(store, &Enricher::from_config(config), &lookup)
}

/// Features stage with an injected lookup.
pub fn enrich_features<L>(
    store: &SnapshotStore,
    enricher: &Enricher,
    lookup: &L,
) -> Result<FeaturesReport>
where
    L: SongLookup<Output = TrackFeatures>,
{
    let chart = load_chart(store)?;
    let map = enricher.enrich(&chart, lookup);
    let merged = merge(&chart, &map);
    let raw = save_enriched(store, Artifact::RawFeatures, &merged)?;

    let parsed = parse_features(&merged);
    let parsed_path = store.save(Artifact::ParsedFeatures, &parsed)?;

    Ok(FeaturesReport {
        raw,
        parsed_rows: parsed.len(),
        parsed_path,
    })
}

fn load_chart(store: &SnapshotStore) -> Result<ChartTable> {
    Ok(store.load::<ChartTable>(Artifact::Chart)?.data)
}

fn save_enriched<T: serde::Serialize>(
    store: &SnapshotStore,
    artifact: Artifact,
    table: &EnrichedTable<T>,
) -> Result<EnrichReport> {
    let path = store.save(artifact, table)?;
    Ok(EnrichReport {
        rows: table.len(),
        status_counts: row_status_counts(table),
        path,
    })
}

/// Rows per enrichment status.
pub fn row_status_counts<T>(table: &EnrichedTable<T>) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for row in &table.rows {
        *counts.entry(row.enrichment.status()).or_insert(0) += 1;
    }
    counts
}

/// Write a CSV next to every snapshot that exists.
///
/// Returns the written files with their row counts. Missing snapshots are
/// skipped.
pub fn export(store: &SnapshotStore) -> Result<Vec<(PathBuf, usize)>> {
    let mut written = Vec::new();

    for artifact in Artifact::ALL {
        if !store.exists(artifact) {
            log::info!("No {} snapshot; skipping export", artifact.file_stem());
            continue;
        }

        let path = store.csv_path(artifact.file_stem());
        let rows = match artifact {
            Artifact::Chart => {
                let chart: Snapshot<ChartTable> = store.load(artifact)?;
                write_chart_csv(&path, &chart.data)?
            }
            Artifact::Lyrics => {
                let lyrics: Snapshot<EnrichedTable<String>> = store.load(artifact)?;
                write_enriched_csv(&path, &lyrics.data)?
            }
            Artifact::RawFeatures => {
                let raw: Snapshot<EnrichedTable<TrackFeatures>> = store.load(artifact)?;
                write_enriched_csv(&path, &raw.data)?
            }
            Artifact::ParsedFeatures => {
                let parsed: Snapshot<Vec<ParsedFeatureRow>> = store.load(artifact)?;
                write_parsed_features_csv(&path, &parsed.data)?
            }
        };
        written.push((path, rows));
    }

    Ok(written)
}

/// Outcome of `analyze`.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub leaderboard: Vec<ChartEntry>,
    pub artists: Vec<ArtistSummary>,
    /// `trends.csv` and its row count, when feature data exists.
    pub trends: Option<(PathBuf, usize)>,
}

/// Chart statistics, plus feature trends when `parsed_features.json` exists.
pub fn analyze(config: &Config, store: &SnapshotStore) -> Result<AnalysisReport> {
    let chart = load_chart(store)?;
    let leaderboard = analysis::weeks_leaderboard(&chart, config.leaderboard_size)
        .into_iter()
        .cloned()
        .collect();
    let artists = analysis::artist_summary(&chart);

    let trends = if store.exists(Artifact::ParsedFeatures) {
        let parsed: Snapshot<Vec<ParsedFeatureRow>> = store.load(Artifact::ParsedFeatures)?;
        let trends = analysis::feature_trends(&parsed.data, config.rolling_window);
        let path = store.csv_path("trends");
        let rows = analysis::write_trends_csv(&path, &trends)?;
        Some((path, rows))
    } else {
        log::info!("No parsed_features snapshot; skipping feature trends");
        None
    };

    Ok(AnalysisReport {
        leaderboard,
        artists,
        trends,
    })
}

/// State of one snapshot on disk.
#[derive(Debug, Clone)]
pub struct ArtifactStatus {
    pub artifact: Artifact,
    pub path: PathBuf,
    pub created_at: Option<DateTime<Utc>>,
    pub rows: Option<usize>,
    /// Per-status row counts for enrichment snapshots.
    pub status_counts: BTreeMap<&'static str, usize>,
}

/// Inspect every snapshot in `store`.
pub fn status(store: &SnapshotStore) -> Result<Vec<ArtifactStatus>> {
    Artifact::ALL
        .into_iter()
        .map(|artifact| artifact_status(store, artifact))
        .collect()
}

fn artifact_status(store: &SnapshotStore, artifact: Artifact) -> Result<ArtifactStatus> {
    let mut status = ArtifactStatus {
        artifact,
        path: store.path(artifact),
        created_at: None,
        rows: None,
        status_counts: BTreeMap::new(),
    };
    if !store.exists(artifact) {
        return Ok(status);
    }

    match artifact {
        Artifact::Chart => {
            let s: Snapshot<ChartTable> = store.load(artifact)?;
            status.created_at = Some(s.created_at);
            status.rows = Some(s.data.len());
        }
        Artifact::Lyrics => {
            let s: Snapshot<EnrichedTable<String>> = store.load(artifact)?;
            status.created_at = Some(s.created_at);
            status.rows = Some(s.data.len());
            status.status_counts = row_status_counts(&s.data);
        }
        Artifact::RawFeatures => {
            let s: Snapshot<EnrichedTable<TrackFeatures>> = store.load(artifact)?;
            status.created_at = Some(s.created_at);
            status.rows = Some(s.data.len());
            status.status_counts = row_status_counts(&s.data);
        }
        Artifact::ParsedFeatures => {
            let s: Snapshot<Vec<ParsedFeatureRow>> = store.load(artifact)?;
            status.created_at = Some(s.created_at);
            status.rows = Some(s.data.len());
        }
    }
    Ok(status)
}
