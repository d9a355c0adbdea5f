//! Genius lyrics lookup.
//!
//! Searches the Genius API for "title artist", picks the best song hit, and
//! scrapes the lyrics text from that song's page (the API itself does not
//! serve lyrics).

use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Deserialize;

use hitparade_core::provenance::Source;

use crate::enrich::http;
use crate::enrich::lookup::SongLookup;
use crate::error::{EnrichError, EnrichResult};

const GENIUS_API_BASE: &str = "https://api.genius.com";
const SOURCE_NAME: &str = "Genius";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "type")]
    hit_type: String,
    result: GeniusSong,
}

/// A song as returned by the Genius search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GeniusSong {
    pub id: u64,
    pub title: String,
    /// Song page holding the lyrics.
    pub url: String,
    pub primary_artist: GeniusArtist,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusArtist {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Genius API client authenticated with a client access token.
#[derive(Debug, Clone)]
pub struct GeniusClient {
    http: Client,
    access_token: String,
    api_base: String,
}

impl GeniusClient {
    /// Create a new Genius client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> EnrichResult<Self> {
        Ok(Self {
            http: http::build_client(timeout)?,
            access_token: access_token.into(),
            api_base: GENIUS_API_BASE.to_string(),
        })
    }

    /// Send API requests to `base` instead of the public Genius API.
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Search for songs matching `title` and `artist`.
    pub fn search(&self, title: &str, artist: &str) -> EnrichResult<Vec<GeniusSong>> {
        let query = format!("{title} {artist}");
        let response = self
            .http
            .get(format!("{}/search", self.api_base))
            .bearer_auth(&self.access_token)
            .query(&[("q", query.as_str())])
            .send()?;

        let response = http::check_status(SOURCE_NAME, response)?;
        let result: SearchResponse = http::json(SOURCE_NAME, response)?;

        Ok(result
            .response
            .hits
            .into_iter()
            .filter(|hit| hit.hit_type == "song")
            .map(|hit| hit.result)
            .collect())
    }

    /// Fetch a song page and pull out its lyrics.
    pub fn lyrics(&self, song: &GeniusSong) -> EnrichResult<Option<String>> {
        let response = self.http.get(&song.url).send()?;
        let html = http::text(SOURCE_NAME, http::check_status(SOURCE_NAME, response)?)?;
        Ok(extract_lyrics(&html))
    }
}

/// Lyrics text from a Genius song page.
///
/// Lyrics are split across `data-lyrics-container` blocks with `<br>` line
/// breaks. Returns `None` when the page has no non-empty container.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"div[data-lyrics-container="true"]"#).ok()?;

    let blocks: Vec<String> = document
        .select(&selector)
        .map(container_text)
        .filter(|text| !text.is_empty())
        .collect();

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n"))
    }
}

fn container_text(container: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in container.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(el) if el.name() == "br" => text.push('\n'),
            _ => {}
        }
    }
    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Pick the hit for `title` by `artist`.
///
/// An exact (title, artist) match wins, then a title match whose artist
/// credit contains the artist, then the first hit.
pub fn best_match<'a>(
    songs: &'a [GeniusSong],
    title: &str,
    artist: &str,
) -> Option<&'a GeniusSong> {
    let title = simplify(title);
    let artist = simplify(artist);
    let same_title = |song: &&GeniusSong| simplify(&song.title) == title;

    songs
        .iter()
        .filter(same_title)
        .find(|song| simplify(&song.primary_artist.name) == artist)
        .or_else(|| {
            songs
                .iter()
                .filter(same_title)
                .find(|song| simplify(&song.primary_artist.name).contains(&artist))
        })
        .or_else(|| songs.first())
}

fn simplify(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Lyrics by (title, artist).
#[derive(Debug, Clone)]
pub struct LyricsLookup {
    client: GeniusClient,
}

impl LyricsLookup {
    pub fn new(client: GeniusClient) -> Self {
        Self { client }
    }

    /// Build from an optional configured token.
    pub fn from_token(token: Option<&str>, timeout: Duration) -> EnrichResult<Self> {
        let token = token.ok_or_else(|| EnrichError::MissingCredentials {
            source_name: SOURCE_NAME.to_string(),
            setting: "genius_access_token".to_string(),
        })?;
        Ok(Self::new(GeniusClient::new(token, timeout)?))
    }
}

impl SongLookup for LyricsLookup {
    type Output = String;

    fn source(&self) -> Source {
        Source::Genius
    }

    fn lookup(&self, title: &str, artist: &str) -> EnrichResult<Option<String>> {
        let songs = self.client.search(title, artist)?;
        let Some(song) = best_match(&songs, title, artist) else {
            return Ok(None);
        };
        log::debug!("Genius match for {} - {}: {}", artist, title, song.url);
        self.client.lyrics(song)
    }
}
