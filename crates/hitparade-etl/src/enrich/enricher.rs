//! Per-record enrichment sweep.
//!
//! Every distinct song in the chart table is looked up once, in order of
//! first appearance. A failed lookup is recorded against its own song and
//! the sweep moves on.

use std::time::Duration;

use hitparade_core::model::{ChartTable, Enrichment, EnrichmentMap};

use crate::config::Config;
use crate::enrich::lookup::SongLookup;
use crate::enrich::resilience::{RateLimiter, RetryPolicy};

/// Drives a [`SongLookup`] across a chart table.
#[derive(Debug, Clone)]
pub struct Enricher {
    retry: RetryPolicy,
    limiter: RateLimiter,
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new(RetryPolicy::never(), RateLimiter::new(Duration::ZERO))
    }
}

impl Enricher {
    pub fn new(retry: RetryPolicy, limiter: RateLimiter) -> Self {
        Self { retry, limiter }
    }

    /// Build an enricher from the retry and pacing settings in `config`.
    pub fn from_config(config: &Config) -> Self {
        let retry = if config.transient_retries == 0 {
            RetryPolicy::never()
        } else {
            let min_delay = config.request_delay().max(Duration::from_millis(100));
            RetryPolicy::transient(config.transient_retries, min_delay)
        };
        Self::new(retry, RateLimiter::new(config.request_delay()))
    }

    /// Look up every distinct (title, artist) in `table`.
    ///
    /// The returned map has exactly one entry per distinct key.
    pub fn enrich<L: SongLookup>(
        &self,
        table: &ChartTable,
        lookup: &L,
    ) -> EnrichmentMap<L::Output> {
        let source = lookup.source();
        let keys = table.distinct_keys();
        let total = keys.len();
        let mut map = EnrichmentMap::new(source);

        log::info!("Enriching {} songs from {}", total, source);

        for (idx, key) in keys.into_iter().enumerate() {
            let progress = format!("[{}/{}]", idx + 1, total);
            self.limiter.acquire();

            let outcome = match self.retry.run(|| lookup.lookup(&key.title, &key.artist)) {
                Ok(Some(payload)) => {
                    log::info!("{} {}: found {}", progress, source, key);
                    Enrichment::Found(payload)
                }
                Ok(None) => {
                    log::warn!("{} {}: nothing for {}", progress, source, key);
                    Enrichment::NotFound
                }
                Err(e) if e.is_not_found() => {
                    log::warn!("{} {}: nothing for {}", progress, source, key);
                    Enrichment::NotFound
                }
                Err(e) => {
                    log::warn!("{} {}: lookup failed for {}: {}", progress, source, key, e);
                    Enrichment::Failed(e.to_string())
                }
            };
            map.insert(key, outcome);
        }

        log::info!("{} enrichment done: {:?}", source, map.status_counts());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hitparade_core::model::{ChartEntry, SongKey};
    use hitparade_core::provenance::Source;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use crate::error::{EnrichError, EnrichResult};

    /// Lyrics double: answers from a table, errors for anything listed in
    /// `failing`, and records every call.
    #[derive(Debug, Default)]
    struct FakeLyrics {
        lyrics: HashMap<SongKey, String>,
        failing: Vec<SongKey>,
        calls: RefCell<Vec<SongKey>>,
    }

    impl FakeLyrics {
        fn with(mut self, title: &str, artist: &str, lyrics: &str) -> Self {
            self.lyrics
                .insert(SongKey::new(title, artist), lyrics.to_string());
            self
        }

        fn failing(mut self, title: &str, artist: &str) -> Self {
            self.failing.push(SongKey::new(title, artist));
            self
        }
    }

    impl SongLookup for FakeLyrics {
        type Output = String;

        fn source(&self) -> Source {
            Source::Genius
        }

        fn lookup(&self, title: &str, artist: &str) -> EnrichResult<Option<String>> {
            let key = SongKey::new(title, artist);
            self.calls.borrow_mut().push(key.clone());
            if self.failing.contains(&key) {
                return Err(EnrichError::Http {
                    source_name: "Genius".to_string(),
                    status: Some(500),
                    message: "server error".to_string(),
                });
            }
            Ok(self.lyrics.get(&key).cloned())
        }
    }

    fn chart(rows: &[(&str, &str)]) -> ChartTable {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        ChartTable::new(
            rows.iter()
                .map(|(title, artist)| ChartEntry::new(date, *title, *artist, 1))
                .collect(),
        )
    }

    #[test]
    fn test_failing_lookup_is_isolated() {
        let table = chart(&[("A", "X"), ("B", "Y")]);
        let lookup = FakeLyrics::default()
            .with("A", "X", "real lyrics")
            .failing("B", "Y");

        let map = Enricher::default().enrich(&table, &lookup);

        assert_eq!(map.len(), 2);
        let a = map.get(&SongKey::new("A", "X")).unwrap();
        let b = map.get(&SongKey::new("B", "Y")).unwrap();
        assert_eq!(a.payload_or_default(), "real lyrics");
        assert_eq!(b.payload_or_default(), "");
        assert!(matches!(b, Enrichment::Failed(_)));
    }

    #[test]
    fn test_each_distinct_key_looked_up_once() {
        let table = chart(&[("A", "X"), ("B", "Y"), ("A", "X"), ("A", "X")]);
        let lookup = FakeLyrics::default().with("A", "X", "la");

        let map = Enricher::default().enrich(&table, &lookup);

        assert_eq!(map.len(), 2);
        assert!(map.len() <= table.distinct_keys().len());
        assert_eq!(
            *lookup.calls.borrow(),
            vec![SongKey::new("A", "X"), SongKey::new("B", "Y")]
        );
    }

    #[test]
    fn test_not_found_is_distinct_from_failure() {
        let table = chart(&[("Unknown Song", "Unknown Artist")]);
        let map = Enricher::default().enrich(&table, &FakeLyrics::default());

        let outcome = map
            .get(&SongKey::new("Unknown Song", "Unknown Artist"))
            .unwrap();
        assert_eq!(*outcome, Enrichment::NotFound);
        assert_eq!(map.source, Source::Genius);
    }

    #[test]
    fn test_empty_table_yields_empty_map() {
        let map = Enricher::default().enrich(&ChartTable::default(), &FakeLyrics::default());
        assert!(map.is_empty());
    }

    #[test]
    fn test_default_policy_never_retries() {
        let table = chart(&[("B", "Y")]);
        let lookup = FakeLyrics::default().failing("B", "Y");
        Enricher::default().enrich(&table, &lookup);
        assert_eq!(lookup.calls.borrow().len(), 1);
    }

    #[test]
    fn test_transient_retries_are_configurable() {
        let table = chart(&[("B", "Y")]);
        let lookup = FakeLyrics::default().failing("B", "Y");
        let enricher = Enricher::new(
            RetryPolicy::transient(2, Duration::from_millis(1)),
            RateLimiter::new(Duration::ZERO),
        );

        let map = enricher.enrich(&table, &lookup);

        assert_eq!(lookup.calls.borrow().len(), 3);
        assert!(matches!(
            map.get(&SongKey::new("B", "Y")),
            Some(Enrichment::Failed(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            transient_retries: 2,
            request_delay_ms: 0,
            ..Config::default()
        };
        let enricher = Enricher::from_config(&config);
        assert_eq!(enricher.retry.transient_retries, 2);
        assert_eq!(enricher.limiter.interval(), Duration::ZERO);
    }
}
