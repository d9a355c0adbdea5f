//! Scrape, normalize, enrich, and merge stages for hitparade.
//!
//! The chart page is scraped into raw tables ([`extract`]), relabeled into a
//! typed chart table ([`normalize`]), looked up song by song against Genius
//! and Spotify ([`enrich`]), and left-joined back onto the chart
//! ([`merge`]). [`pipeline`] wires those into the stages the CLI runs.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod analysis;
pub mod config;
pub mod dates;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod merge;
pub mod normalize;
pub mod pipeline;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use dates::DateParser;
pub use enrich::{Enricher, SongLookup};
pub use error::{EnrichError, EnrichResult, NormalizeError, ScrapeError};
pub use extract::{ChartScraper, RawTable};
pub use merge::{merge, parse_features};
pub use normalize::{normalize, NormalizeOptions};
