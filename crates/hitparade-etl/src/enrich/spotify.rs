//! Spotify audio-feature lookup.
//!
//! Uses the client-credentials flow: one access token per run, refreshed
//! shortly before it expires. A track search yields the URI; the
//! audio-features endpoint then yields the 13 numeric features.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;

use hitparade_core::model::{AudioFeatures, TrackFeatures};
use hitparade_core::provenance::Source;

use crate::enrich::http;
use crate::enrich::lookup::SongLookup;
use crate::error::{EnrichError, EnrichResult};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";
const SOURCE_NAME: &str = "Spotify";

/// Refresh this long before the token's stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct FeaturesResponse {
    #[serde(default)]
    audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// A track found by search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyTrack {
    pub id: String,
    pub uri: String,
}

/// Spotify Web API client using client credentials.
#[derive(Debug)]
pub struct SpotifyClient {
    http: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base: String,
    token: RefCell<Option<AccessToken>>,
}

impl SpotifyClient {
    /// Create a new Spotify client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> EnrichResult<Self> {
        Ok(Self {
            http: http::build_client(timeout)?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: TOKEN_URL.to_string(),
            api_base: API_BASE.to_string(),
            token: RefCell::new(None),
        })
    }

    /// Send token and API requests to `base` instead of Spotify. The token
    /// endpoint becomes `{base}/api/token` and the API lives under
    /// `{base}/v1`.
    #[must_use]
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.token_url = format!("{base}/api/token");
        self.api_base = format!("{base}/v1");
        self
    }

    fn access_token(&self) -> EnrichResult<String> {
        if let Some(token) = self.token.borrow().as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        log::debug!("Requesting Spotify access token");
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()?;
        let response = http::check_status(SOURCE_NAME, response)?;
        let token: TokenResponse = http::json(SOURCE_NAME, response)?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        *self.token.borrow_mut() = Some(AccessToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    /// Best track for `title` by `artist`, if any.
    pub fn search_track(&self, title: &str, artist: &str) -> EnrichResult<Option<SpotifyTrack>> {
        let token = self.access_token()?;
        let query = format!("{title} {artist}");
        let response = self
            .http
            .get(format!("{}/search", self.api_base))
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("type", "track"), ("limit", "1")])
            .send()?;

        let response = http::check_status(SOURCE_NAME, response)?;
        let result: SearchResponse = http::json(SOURCE_NAME, response)?;
        Ok(result
            .tracks
            .items
            .into_iter()
            .next()
            .map(|item| SpotifyTrack {
                id: item.id,
                uri: item.uri,
            }))
    }

    /// Audio features for one track id. `None` when Spotify has none.
    pub fn audio_features(&self, track_id: &str) -> EnrichResult<Option<AudioFeatures>> {
        let token = self.access_token()?;
        let response = self
            .http
            .get(format!("{}/audio-features", self.api_base))
            .bearer_auth(token)
            .query(&[("ids", track_id)])
            .send()?;

        let response = http::check_status(SOURCE_NAME, response)?;
        let result: FeaturesResponse = http::json(SOURCE_NAME, response)?;
        Ok(result.audio_features.into_iter().next().flatten())
    }
}

/// Track URI plus audio features by (title, artist).
///
/// A song counts as found once its track URI is known. If the feature call
/// then fails, the URI is kept and the features stay empty.
#[derive(Debug)]
pub struct AudioFeatureLookup {
    client: SpotifyClient,
}

impl AudioFeatureLookup {
    pub fn new(client: SpotifyClient) -> Self {
        Self { client }
    }

    /// Build from optional configured credentials.
    pub fn from_credentials(
        client_id: Option<&str>,
        client_secret: Option<&str>,
        timeout: Duration,
    ) -> EnrichResult<Self> {
        let missing = |setting: &str| EnrichError::MissingCredentials {
            source_name: SOURCE_NAME.to_string(),
            setting: setting.to_string(),
        };
        let id = client_id.ok_or_else(|| missing("spotify_client_id"))?;
        let secret = client_secret.ok_or_else(|| missing("spotify_client_secret"))?;
        Ok(Self::new(SpotifyClient::new(id, secret, timeout)?))
    }
}

impl SongLookup for AudioFeatureLookup {
    type Output = TrackFeatures;

    fn source(&self) -> Source {
        Source::Spotify
    }

    fn lookup(&self, title: &str, artist: &str) -> EnrichResult<Option<TrackFeatures>> {
        let Some(track) = self.client.search_track(title, artist)? else {
            return Ok(None);
        };

        let features = match self.client.audio_features(&track.id) {
            Ok(features) => features,
            Err(e) => {
                log::warn!("No audio features for {} ({}): {}", track.uri, title, e);
                None
            }
        };
        Ok(Some(TrackFeatures::new(track.uri, features)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockServer, Route};

    const TOKEN: &str = r#"{"access_token": "abc", "token_type": "Bearer", "expires_in": 3600}"#;
    const ONE_TRACK: &str = r#"{"tracks": {"items": [
        {"id": "3z8h0TU7ReDPLIbEnYhWZb", "uri": "spotify:track:3z8h0TU7ReDPLIbEnYhWZb"}
    ]}}"#;

    fn lookup(base: &str) -> AudioFeatureLookup {
        let client = SpotifyClient::new("id", "secret", Duration::from_secs(5))
            .unwrap()
            .with_base_url(base);
        AudioFeatureLookup::new(client)
    }

    #[test]
    fn test_token_response_deserialize() {
        let token: TokenResponse = serde_json::from_str(TOKEN).unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn test_search_response_deserialize() {
        let json = r#"{"tracks": {"href": "x", "items": [
            {"id": "3z8h0TU7ReDPLIbEnYhWZb", "uri": "spotify:track:3z8h0TU7ReDPLIbEnYhWZb",
             "name": "Bohemian Rhapsody", "popularity": 80}
        ], "limit": 1, "total": 1}}"#;
        let result: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(result.tracks.items.len(), 1);
        assert_eq!(
            result.tracks.items[0].uri,
            "spotify:track:3z8h0TU7ReDPLIbEnYhWZb"
        );

        let empty: SearchResponse =
            serde_json::from_str(r#"{"tracks": {"items": []}}"#).unwrap();
        assert!(empty.tracks.items.is_empty());
    }

    #[test]
    fn test_features_response_deserialize() {
        let json = r#"{"audio_features": [{
            "danceability": 0.392, "energy": 0.402, "key": 0, "loudness": -9.961,
            "mode": 0, "speechiness": 0.0536, "acousticness": 0.288,
            "instrumentalness": 0.0, "liveness": 0.243, "valence": 0.228,
            "tempo": 143.883, "duration_ms": 354320, "time_signature": 4,
            "type": "audio_features", "id": "3z8h0TU7ReDPLIbEnYhWZb",
            "uri": "spotify:track:3z8h0TU7ReDPLIbEnYhWZb"
        }]}"#;
        let result: FeaturesResponse = serde_json::from_str(json).unwrap();
        let features = result.audio_features[0].as_ref().unwrap();
        assert!((features.tempo - 143.883).abs() < 1e-9);
        assert!((features.duration_ms - 354_320.0).abs() < 1e-9);
        assert!((features.time_signature - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_features_response_null_entry() {
        let result: FeaturesResponse =
            serde_json::from_str(r#"{"audio_features": [null]}"#).unwrap();
        assert_eq!(result.audio_features.into_iter().next().flatten(), None);
    }

    #[test]
    fn test_lookup_requires_both_credentials() {
        let timeout = Duration::from_secs(1);
        let err = AudioFeatureLookup::from_credentials(Some("id"), None, timeout).unwrap_err();
        assert!(matches!(
            err,
            EnrichError::MissingCredentials { ref setting, .. } if setting == "spotify_client_secret"
        ));
        assert!(AudioFeatureLookup::from_credentials(None, None, timeout).is_err());
        assert!(AudioFeatureLookup::from_credentials(Some("id"), Some("secret"), timeout).is_ok());
    }

    #[test]
    fn test_lookup_without_search_hits_is_none() {
        let server = MockServer::bind();
        let base = server.serve(vec![
            Route::new("/api/token", 200, TOKEN),
            Route::new("/v1/search", 200, r#"{"tracks": {"items": []}}"#),
        ]);
        assert_eq!(lookup(&base).lookup("Nothing", "Nobody").unwrap(), None);
    }

    #[test]
    fn test_failed_feature_call_keeps_uri() {
        let server = MockServer::bind();
        let base = server.serve(vec![
            Route::new("/api/token", 200, TOKEN),
            Route::new("/v1/search", 200, ONE_TRACK),
            Route::new("/v1/audio-features", 500, "oops"),
        ]);

        let found = lookup(&base)
            .lookup("Bohemian Rhapsody", "Queen")
            .unwrap()
            .unwrap();
        assert_eq!(found.uri, "spotify:track:3z8h0TU7ReDPLIbEnYhWZb");
        assert_eq!(found.features, None);
    }

    #[test]
    fn test_rejected_credentials_fail_the_lookup() {
        let server = MockServer::bind();
        let base = server.serve(vec![Route::new("/api/token", 401, "")]);
        let err = lookup(&base).lookup("Any", "One").unwrap_err();
        assert!(matches!(err, EnrichError::Auth { .. }));
    }
}
