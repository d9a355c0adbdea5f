//! Error types for the scrape, normalize, and enrich stages.
//!
//! [`ScrapeError`] and [`NormalizeError`] are pipeline-fatal: they mean the
//! chart source changed shape or went away. [`EnrichError`] is per record and
//! is recorded against the song it happened on.

use thiserror::Error;

/// Errors fetching the chart page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The page could not be fetched or answered with a non-2xx status.
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// The HTTP client could not be built.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

/// Errors turning raw page tables into a chart table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// No table on the page had an "artist" column.
    #[error("no chart tables found (no table has an \"artist\" column)")]
    NoChartTables,

    /// A matched table cannot be relabeled to date/title/artist/weeks.
    #[error("chart table {table} has {found} columns, expected 4")]
    ColumnCount { table: usize, found: usize },

    /// A date cell could not be parsed.
    #[error("unparseable date in row {row}: {text:?}")]
    DateParse { row: usize, text: String },

    /// A weeks cell is not a non-negative integer.
    #[error("invalid weeks-at-number-one in row {row}: {text:?}")]
    InvalidWeeks { row: usize, text: String },
}

/// Errors that can occur during a single enrichment lookup.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// An HTTP request to an external source failed.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        status: Option<u16>,
        message: String,
    },

    /// The external source returned a rate-limit response.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// The external source rejected our credentials.
    #[error("authentication failed for {source_name}: {message}")]
    Auth {
        source_name: String,
        message: String,
    },

    /// The requested song was not found at the external source.
    #[error("not found: {entity} at {source_name}")]
    NotFound { entity: String, source_name: String },

    /// A response from an external source could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// A required credential is not configured.
    #[error("{source_name} requires `{setting}` to be configured")]
    MissingCredentials {
        source_name: String,
        setting: String,
    },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl EnrichError {
    /// Returns `true` when the error is transient and the operation may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => status.map_or(true, |s| s >= 500),
            Self::RateLimited { .. } => true,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` when the error indicates the song was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias for enrichment results.
pub type EnrichResult<T> = std::result::Result<T, EnrichError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: Option<u16>) -> EnrichError {
        EnrichError::Http {
            source_name: "Genius".to_string(),
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(http(Some(503)).is_transient());
        assert!(http(None).is_transient());
        assert!(!http(Some(400)).is_transient());

        let rate_limited = EnrichError::RateLimited {
            source_name: "Spotify".to_string(),
        };
        assert!(rate_limited.is_transient());

        let parse = EnrichError::Parse {
            source_name: "Spotify".to_string(),
            message: "bad json".to_string(),
        };
        assert!(!parse.is_transient());
    }

    #[test]
    fn test_not_found_is_not_transient() {
        let err = EnrichError::NotFound {
            entity: "Song - Artist".to_string(),
            source_name: "Genius".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_normalize_error_messages() {
        let err = NormalizeError::DateParse {
            row: 7,
            text: "soon".to_string(),
        };
        assert_eq!(err.to_string(), "unparseable date in row 7: \"soon\"");
        assert_eq!(
            NormalizeError::ColumnCount { table: 1, found: 3 }.to_string(),
            "chart table 1 has 3 columns, expected 4"
        );
    }
}
