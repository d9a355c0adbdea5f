//! Chart normalization: raw page tables to a typed [`ChartTable`].
//!
//! Matching is two-stage. The extractor has already kept only tables with
//! an "artist" header; here each table's columns are relabeled purely by
//! position as date, title, artist, weeks. A source layout change that keeps
//! the "artist" header but reorders columns is not detected.

use hitparade_core::model::{ChartEntry, ChartTable};

use crate::dates::DateParser;
use crate::error::NormalizeError;
use crate::extract::RawTable;

/// Number of columns in the fixed chart schema.
const CHART_COLUMNS: usize = 4;

/// Normalization settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Trailing rows to drop after concatenation.
    pub skip_end: usize,
    pub dates: DateParser,
}

impl NormalizeOptions {
    #[must_use]
    pub fn new(skip_end: usize, dates: DateParser) -> Self {
        Self { skip_end, dates }
    }
}

/// Merge `tables` into one chart table.
///
/// Rows keep their page order across tables. `skip_end` rows are dropped
/// from the end before any cell is parsed, so a malformed trailing row can
/// be trimmed away. Any unparseable date or weeks cell fails the whole
/// table.
pub fn normalize(
    tables: &[RawTable],
    options: &NormalizeOptions,
) -> Result<ChartTable, NormalizeError> {
    if tables.is_empty() {
        return Err(NormalizeError::NoChartTables);
    }

    let mut rows: Vec<&[String]> = Vec::new();
    for (idx, table) in tables.iter().enumerate() {
        if table.headers.len() != CHART_COLUMNS {
            return Err(NormalizeError::ColumnCount {
                table: idx,
                found: table.headers.len(),
            });
        }
        rows.extend(table.rows.iter().map(Vec::as_slice));
    }

    let keep = rows.len().saturating_sub(options.skip_end);
    if keep < rows.len() {
        log::info!("Dropping {} trailing chart rows", rows.len() - keep);
    }
    rows.truncate(keep);

    let entries = rows
        .into_iter()
        .enumerate()
        .map(|(row, cells)| parse_row(row, cells, &options.dates))
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("Normalized {} chart entries", entries.len());
    Ok(ChartTable::new(entries))
}

/// Relabel one row positionally. Missing cells read as empty.
fn parse_row(
    row: usize,
    cells: &[String],
    dates: &DateParser,
) -> Result<ChartEntry, NormalizeError> {
    let cell = |i: usize| cells.get(i).map(|s| s.trim()).unwrap_or_default();

    let date_text = cell(0);
    let date = dates
        .parse(date_text)
        .ok_or_else(|| NormalizeError::DateParse {
            row,
            text: date_text.to_string(),
        })?;

    let weeks_text = cell(3);
    let weeks = weeks_text
        .parse::<u32>()
        .map_err(|_| NormalizeError::InvalidWeeks {
            row,
            text: weeks_text.to_string(),
        })?;

    Ok(ChartEntry::new(date, cell(1), cell(2), weeks))
}
