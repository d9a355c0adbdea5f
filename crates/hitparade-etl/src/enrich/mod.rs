//! Per-song enrichment from external sources.
//!
//! - [`genius`]: lyrics via the Genius search API and song pages
//! - [`spotify`]: track URI and audio features via the Spotify Web API
//!
//! [`Enricher`] drives any [`SongLookup`] over a chart table with pacing and
//! an opt-in retry policy for transient failures.

pub mod enricher;
pub mod genius;
pub mod http;
pub mod lookup;
pub mod resilience;
pub mod spotify;

pub use enricher::Enricher;
pub use genius::{GeniusClient, LyricsLookup};
pub use lookup::SongLookup;
pub use resilience::{RateLimiter, RetryPolicy};
pub use spotify::{AudioFeatureLookup, SpotifyClient};
