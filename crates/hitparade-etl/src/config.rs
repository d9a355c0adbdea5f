use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default chart-history page.
pub const DEFAULT_CHART_URL: &str =
    "https://www.officialcharts.com/chart-news/all-the-number-1-singles__7931/";

/// Configuration for hitparade.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (HITPARADE_* prefix)
/// 3. Config file (~/.config/hitparade/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page listing every number-one single.
    pub chart_url: String,

    /// Directory holding the JSON snapshots and CSV exports.
    ///
    /// Can be set via:
    /// - CLI: --data-dir /path/to/dir
    /// - ENV: HITPARADE_DATA_DIR
    /// - Config: data_dir = "/path/to/dir"
    /// - Default: ~/.local/share/hitparade
    pub data_dir: PathBuf,

    /// Trailing chart rows to drop; the newest entries on the source page
    /// are often incomplete when scraped.
    pub skip_end: usize,

    /// Read ambiguous numeric dates such as `01/02/2000` day-first.
    pub day_first: bool,

    /// Genius API client access token (lyrics).
    ///
    /// Can be set via:
    /// - ENV: HITPARADE_GENIUS_ACCESS_TOKEN
    /// - Config: genius_access_token = "..."
    pub genius_access_token: Option<String>,

    /// Spotify client id (audio features).
    pub spotify_client_id: Option<String>,

    /// Spotify client secret (audio features).
    pub spotify_client_secret: Option<String>,

    /// Per-request timeout for every external call.
    pub request_timeout_secs: u64,

    /// Minimum pause between consecutive lookups against one source.
    pub request_delay_ms: u64,

    /// Retries for transient lookup failures (5xx, 429, timeouts).
    /// Zero means every song is looked up exactly once.
    pub transient_retries: usize,

    /// Window of the rolling median in `hitparade analyze`.
    pub rolling_window: usize,

    /// Rows shown in the weeks-at-number-one leaderboard.
    pub leaderboard_size: usize,

    /// Logging setup passed to twyg.
    pub logging: twyg::Opts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chart_url: DEFAULT_CHART_URL.to_string(),
            data_dir: default_data_dir(),
            skip_end: 1,
            day_first: false,
            genius_access_token: None,
            spotify_client_id: None,
            spotify_client_secret: None,
            request_timeout_secs: 30,
            request_delay_ms: 250,
            transient_retries: 0,
            rolling_window: 20,
            leaderboard_size: 10,
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/hitparade/config.toml
    /// Reads environment variables with HITPARADE_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("hitparade");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom data directory.
    ///
    /// This is used when the --data-dir CLI flag is provided.
    pub fn load_with_data_dir(data_dir: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.data_dir = data_dir;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Get the default snapshot directory.
///
/// Returns: ~/.local/share/hitparade (or platform equivalent)
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hitparade")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/hitparade/config.toml
/// - macOS: ~/Library/Application Support/hitparade/config.toml
/// - Windows: %APPDATA%\hitparade\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hitparade")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Hitparade Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (HITPARADE_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Chart-history page to scrape
#chart_url = "https://www.officialcharts.com/chart-news/all-the-number-1-singles__7931/"

# Where snapshots (chart.json, lyrics.json, raw_features.json,
# parsed_features.json) and CSV exports are written
#
# Can also be set via:
# - CLI: hitparade --data-dir /custom/dir chart
# - Environment: HITPARADE_DATA_DIR=/custom/dir
#data_dir = "/path/to/hitparade"

# Drop this many rows from the end of the scraped chart; the newest
# entries are often incomplete at scrape time
skip_end = 1

# Read ambiguous numeric dates (01/02/2000) as day-first
day_first = false

# Genius API access token, used by `hitparade lyrics`
# Create one at: https://genius.com/api-clients
#
# Can also be set via:
# - Environment: HITPARADE_GENIUS_ACCESS_TOKEN=your-token-here
genius_access_token = "your-genius-access-token-here"

# Spotify client credentials, used by `hitparade features`
# Create an app at: https://developer.spotify.com/dashboard
spotify_client_id = "your-spotify-client-id-here"
spotify_client_secret = "your-spotify-client-secret-here"

# Per-request timeout in seconds
request_timeout_secs = 30

# Pause between lookups against one source, in milliseconds
request_delay_ms = 250

# Retries for transient failures (server errors, rate limits, timeouts).
# Songs that are simply not found are never retried.
transient_retries = 0

# Rolling-median window for `hitparade analyze`
rolling_window = 20

# Rows in the weeks-at-number-one leaderboard
leaderboard_size = 10
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
