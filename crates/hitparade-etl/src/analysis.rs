//! Derived statistics over the chart and cleaned feature snapshots.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use hitparade_core::model::{ChartEntry, ChartTable, ParsedFeatureRow, AUDIO_FEATURE_FIELDS};
use hitparade_core::store::write_records;

const TREND_COLUMNS: [&str; 4] = ["feature", "date", "value", "rolling_median"];

/// Chart entries with the most weeks at number one, longest first.
///
/// Ties keep chart order.
pub fn weeks_leaderboard(table: &ChartTable, n: usize) -> Vec<&ChartEntry> {
    let mut entries: Vec<&ChartEntry> = table.iter().collect();
    entries.sort_by(|a, b| b.weeks_at_number_one.cmp(&a.weeks_at_number_one));
    entries.truncate(n);
    entries
}

/// Number-one totals for one artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistSummary {
    pub artist: String,
    pub number_ones: usize,
    pub total_weeks: u32,
}

/// Per-artist totals, most weeks first, then by name.
pub fn artist_summary(table: &ChartTable) -> Vec<ArtistSummary> {
    let mut by_artist: HashMap<&str, ArtistSummary> = HashMap::new();
    for entry in table {
        let summary = by_artist
            .entry(entry.artist.as_str())
            .or_insert_with(|| ArtistSummary {
                artist: entry.artist.clone(),
                number_ones: 0,
                total_weeks: 0,
            });
        summary.number_ones += 1;
        summary.total_weeks += entry.weeks_at_number_one;
    }

    let mut summaries: Vec<ArtistSummary> = by_artist.into_values().collect();
    summaries.sort_by(|a, b| {
        b.total_weeks
            .cmp(&a.total_weeks)
            .then_with(|| a.artist.cmp(&b.artist))
    });
    summaries
}

/// Trailing rolling median.
///
/// Position `i` holds the median of `values[i + 1 - window..=i]`, or `None`
/// while fewer than `window` values are available.
pub fn rolling_median(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let mut slice = values[i + 1 - window..=i].to_vec();
            slice.sort_by(f64::total_cmp);
            let mid = window / 2;
            Some(if window % 2 == 0 {
                (slice[mid - 1] + slice[mid]) / 2.0
            } else {
                slice[mid]
            })
        })
        .collect()
}

/// One point of a feature's time series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub rolling_median: Option<f64>,
}

/// A feature's values over chart time.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTrend {
    pub feature: &'static str,
    pub points: Vec<TrendPoint>,
}

/// One trend per audio-feature field, in row order.
///
/// `rows` is expected sorted by date, as produced by
/// [`crate::merge::parse_features`].
pub fn feature_trends(rows: &[ParsedFeatureRow], window: usize) -> Vec<FeatureTrend> {
    AUDIO_FEATURE_FIELDS
        .iter()
        .map(|&feature| {
            let values: Vec<f64> = rows
                .iter()
                .map(|row| row.features.get(feature).unwrap_or(f64::NAN))
                .collect();
            let medians = rolling_median(&values, window);
            let points = rows
                .iter()
                .zip(values)
                .zip(medians)
                .map(|((row, value), rolling_median)| TrendPoint {
                    date: row.entry.date,
                    value,
                    rolling_median,
                })
                .collect();
            FeatureTrend { feature, points }
        })
        .collect()
}

/// Write trends in long form: one line per (feature, date).
pub fn write_trends_csv(path: &Path, trends: &[FeatureTrend]) -> hitparade_core::Result<usize> {
    let records = trends.iter().flat_map(|trend| {
        trend.points.iter().map(move |point| {
            vec![
                trend.feature.to_string(),
                point.date.to_string(),
                point.value.to_string(),
                point
                    .rolling_median
                    .map(|m| m.to_string())
                    .unwrap_or_default(),
            ]
        })
    });
    write_records(path, &TREND_COLUMNS, records)
}
