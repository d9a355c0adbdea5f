//! Flat CSV exports of snapshots, for manual inspection and plotting.

use std::path::Path;

use crate::error::Result;
use crate::model::{
    ChartTable, Columns, EnrichedTable, ParsedFeatureRow, AUDIO_FEATURE_FIELDS,
};

/// Write a header row followed by `records` to `path`.
pub fn write_records<I>(path: &Path, headers: &[&str], records: I) -> Result<usize>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;

    let mut count = 0;
    for record in records {
        writer.write_record(&record)?;
        count += 1;
    }
    writer.flush()?;

    log::info!("Exported {} rows to {}", count, path.display());
    Ok(count)
}

pub fn write_chart_csv(path: &Path, table: &ChartTable) -> Result<usize> {
    let records = table.iter().map(|entry| {
        vec![
            entry.date.to_string(),
            entry.title.clone(),
            entry.artist.clone(),
            entry.weeks_at_number_one.to_string(),
        ]
    });
    write_records(path, &["date", "title", "artist", "weeks"], records)
}

pub fn write_enriched_csv<T>(path: &Path, table: &EnrichedTable<T>) -> Result<usize>
where
    T: Columns + Default + Clone,
{
    write_records(path, &EnrichedTable::<T>::column_names(), table.records())
}

pub fn write_parsed_features_csv(path: &Path, rows: &[ParsedFeatureRow]) -> Result<usize> {
    let mut headers = vec!["date", "title", "artist", "weeks", "uri"];
    headers.extend(AUDIO_FEATURE_FIELDS);

    let records = rows.iter().map(|row| {
        let mut record = vec![
            row.entry.date.to_string(),
            row.entry.title.clone(),
            row.entry.artist.clone(),
            row.entry.weeks_at_number_one.to_string(),
            row.uri.clone(),
        ];
        record.extend(row.features.fields().iter().map(|(_, v)| v.to_string()));
        record
    });
    write_records(path, &headers, records)
}
