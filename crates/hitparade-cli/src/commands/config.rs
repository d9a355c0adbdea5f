use anyhow::{Context, Result};
use hitparade_etl::{config, Config};
use toml_edit::{value, DocumentMut, Item};

/// Settings `config get` and `config set` accept.
const KEYS: [&str; 12] = [
    "chart_url",
    "data_dir",
    "skip_end",
    "day_first",
    "genius_access_token",
    "spotify_client_id",
    "spotify_client_secret",
    "request_timeout_secs",
    "request_delay_ms",
    "transient_retries",
    "rolling_window",
    "leaderboard_size",
];

const SECRET_KEYS: [&str; 2] = ["genius_access_token", "spotify_client_secret"];

/// Show the current effective configuration.
pub fn show_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================\n");

    let config_path = config::config_file_path();
    println!("Config file: {}", config_path.display());
    println!(
        "File exists: {}\n",
        if config_path.exists() {
            "yes"
        } else {
            "no (using defaults)"
        }
    );

    println!("Settings:");
    for key in KEYS {
        let shown = match lookup(config, key) {
            Some(v) if SECRET_KEYS.contains(&key) && v != NOT_SET => "<set>".to_string(),
            Some(v) => v,
            None => continue,
        };
        println!("  {key}: {shown}");
    }
    println!("  logging.level: {:?}", config.logging.level());
    println!("  logging.coloured: {}", config.logging.coloured());
    println!("  logging.output: {:?}", config.logging.output());

    println!("\nPriority: CLI args > ENV vars (HITPARADE_*) > Config file > Defaults");
}

/// Get a specific config value.
pub fn get_config(config: &Config, key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let Some(v) = lookup(config, &key) else {
            anyhow::bail!(
                "Unknown config key: {}\n\nValid keys: {}",
                key,
                KEYS.join(", ")
            );
        };
        println!("{v}");
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'hitparade config init' to create it.");
        }
    }

    Ok(())
}

const NOT_SET: &str = "<not set>";

fn lookup(config: &Config, key: &str) -> Option<String> {
    let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_SET.to_string());
    Some(match key {
        "chart_url" => config.chart_url.clone(),
        "data_dir" => config.data_dir.display().to_string(),
        "skip_end" => config.skip_end.to_string(),
        "day_first" => config.day_first.to_string(),
        "genius_access_token" => optional(&config.genius_access_token),
        "spotify_client_id" => optional(&config.spotify_client_id),
        "spotify_client_secret" => optional(&config.spotify_client_secret),
        "request_timeout_secs" => config.request_timeout_secs.to_string(),
        "request_delay_ms" => config.request_delay_ms.to_string(),
        "transient_retries" => config.transient_retries.to_string(),
        "rolling_window" => config.rolling_window.to_string(),
        "leaderboard_size" => config.leaderboard_size.to_string(),
        _ => return None,
    })
}

/// Set a config value, keeping the file's comments and layout.
pub fn set_config(key: &str, new_value: &str) -> Result<()> {
    let config_path = config::config_file_path();

    // Ensure config file exists
    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path).context("Failed to read config file")?;
    let updated = update_document(&contents, key, new_value)?;
    std::fs::write(&config_path, updated).context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, new_value);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Apply one `key = value` edit to TOML text. Numeric and boolean settings
/// are written with their TOML types; everything else as a string.
fn update_document(contents: &str, key: &str, new_value: &str) -> Result<String> {
    if !KEYS.contains(&key) {
        anyhow::bail!(
            "Unknown config key: {}\n\nValid keys: {}",
            key,
            KEYS.join(", ")
        );
    }

    let mut doc = contents
        .parse::<DocumentMut>()
        .context("Config file is not valid TOML")?;

    let item: Item = match key {
        "skip_end" | "request_timeout_secs" | "request_delay_ms" | "transient_retries"
        | "rolling_window" | "leaderboard_size" => {
            let n: i64 = new_value
                .parse()
                .ok()
                .filter(|n| *n >= 0)
                .with_context(|| format!("{key} must be a non-negative integer"))?;
            value(n)
        }
        "day_first" => {
            let b: bool = new_value
                .parse()
                .with_context(|| format!("{key} must be true or false"))?;
            value(b)
        }
        _ => value(new_value),
    };
    doc[key] = item;

    Ok(doc.to_string())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure hitparade.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_keeps_comments_and_types_values() {
        let updated = update_document(config::example_config(), "skip_end", "2").unwrap();
        assert!(updated.contains("skip_end = 2"));
        assert!(updated.contains("# Hitparade Configuration File"));

        let updated = update_document(&updated, "genius_access_token", "abc123").unwrap();
        assert!(updated.contains("genius_access_token = \"abc123\""));

        let updated = update_document(&updated, "day_first", "true").unwrap();
        assert!(updated.contains("day_first = true"));
    }

    #[test]
    fn test_update_adds_missing_key() {
        let updated = update_document("", "data_dir", "/tmp/hp").unwrap();
        assert_eq!(updated.trim(), "data_dir = \"/tmp/hp\"");
    }

    #[test]
    fn test_update_rejects_bad_input() {
        assert!(update_document("", "database_path", "x").is_err());
        assert!(update_document("", "skip_end", "-1").is_err());
        assert!(update_document("", "skip_end", "lots").is_err());
        assert!(update_document("", "day_first", "maybe").is_err());
    }

    #[test]
    fn test_lookup_known_and_unknown_keys() {
        let config = Config::default();
        assert_eq!(lookup(&config, "skip_end").as_deref(), Some("1"));
        assert_eq!(
            lookup(&config, "genius_access_token").as_deref(),
            Some(NOT_SET)
        );
        assert!(lookup(&config, "acoustid_api_key").is_none());
        assert!(KEYS.iter().all(|key| lookup(&config, key).is_some()));
    }
}
