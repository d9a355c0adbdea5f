use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use hitparade_core::store::SnapshotStore;
use hitparade_etl::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "hitparade", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for snapshots and exports (default: ~/.local/share/hitparade)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Scrape the number-one singles chart
    ///
    /// Fetches the configured chart page and keeps every table with an
    /// "Artist" column. Rows are concatenated in page order, the last
    /// `skip_end` rows are dropped, and each remaining row is read as
    /// date, title, artist, weeks at number one.
    ///
    /// Any date or weeks cell that cannot be parsed aborts the run; nothing
    /// is written in that case.
    ///
    /// Output: chart.json in the data directory.
    Chart,
    /// Fetch lyrics from Genius for every charted song
    ///
    /// Each distinct (title, artist) is looked up once. A song whose lookup
    /// fails is recorded with empty lyrics and the run carries on.
    ///
    /// Requires: genius_access_token (HITPARADE_GENIUS_ACCESS_TOKEN)
    ///
    /// Output: lyrics.json in the data directory.
    Lyrics,
    /// Fetch Spotify audio features for every charted song
    ///
    /// Requires: spotify_client_id and spotify_client_secret
    ///
    /// Output: raw_features.json (every chart row) and parsed_features.json
    /// (rows with features, sorted by date).
    Features,
    /// Write a CSV next to every snapshot
    Export,
    /// Chart leaderboards and rolling audio-feature trends
    Analyze,
    /// Show which snapshots exist and how complete they are
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole config file when no key is given
    Get {
        /// Config key (e.g. skip_end)
        key: Option<String>,
    },
    /// Set a value in the config file
    Set {
        /// Config key (e.g. genius_access_token)
        key: String,
        /// New value
        value: String,
    },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.data_dir {
        Some(dir) => Config::load_with_data_dir(dir)?,
        None => Config::load()?,
    };

    let _logger = match twyg::setup(config.logging.clone()) {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("Failed to set up logging: {e:?}");
            None
        }
    };

    match cli.command {
        Commands::Chart => commands::run_chart(&config, &open_store(&config)?)?,
        Commands::Lyrics => commands::run_lyrics(&config, &open_store(&config)?)?,
        Commands::Features => commands::run_features(&config, &open_store(&config)?)?,
        Commands::Export => commands::run_export(&open_store(&config)?)?,
        Commands::Analyze => commands::run_analyze(&config, &open_store(&config)?)?,
        Commands::Status => commands::show_status(&open_store(&config)?)?,
        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::config::show_config(&config),
            ConfigCommand::Get { key } => commands::config::get_config(&config, key)?,
            ConfigCommand::Set { key, value } => commands::config::set_config(&key, &value)?,
            ConfigCommand::Path => commands::config::show_path(),
            ConfigCommand::Example => commands::config::show_example(),
            ConfigCommand::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<SnapshotStore> {
    Ok(SnapshotStore::open(&config.data_dir)?)
}
