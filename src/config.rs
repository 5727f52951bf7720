use std::{collections::HashMap, path::Path, time::Duration};

use anyhow::{Context, Result};

use crate::chat::ChatConfig;

/// Path prefix under which the relay serves tiles.
pub const TILE_RELAY_PREFIX: &str = "/raster/tiles";

#[derive(Clone, Debug)]
pub struct TileConfig {
    /// Base URL the relay calls.
    pub titiler_url: String,
    /// Base URL the tile service writes into its own descriptors.
    pub public_url: String,
    /// Raster every request is made against.
    pub cog_url: String,
    pub request_timeout: Duration,
}

/// Service configuration loaded from defaults, an optional TOML file and the
/// process environment, in increasing order of precedence.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_path: String,
    pub tiles: TileConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut values = match config_file {
            Some(path) => read_config_file(path)?,
            None => HashMap::new(),
        };
        for (key, _) in Self::tracked_keys() {
            if let Ok(value) = std::env::var(key) {
                if !value.is_empty() {
                    values.insert(key.to_string(), value);
                }
            }
        }
        Ok(Self::from_map(&values))
    }

    pub fn from_map(values: &HashMap<String, String>) -> Self {
        let titiler_url = read(values, "TITILER_URL", "http://localhost:8080")
            .trim_end_matches('/')
            .to_string();
        let public_url = values
            .get("TITILER_PUBLIC_URL")
            .filter(|value| !value.is_empty())
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| titiler_url.clone());

        let tiles = TileConfig {
            titiler_url,
            public_url,
            cog_url: read(values, "DASHBOARD_COG_URL", "/data/raster_web_mercator.tif"),
            request_timeout: Duration::from_secs(read_secs(values, "TITILER_TIMEOUT_SECS", 30)),
        };

        Self {
            database_path: read(values, "DASHBOARD_DATABASE", "dashboard.db"),
            tiles,
            chat: ChatConfig::from_map(values),
        }
    }

    fn tracked_keys() -> Vec<(&'static str, &'static str)> {
        let mut keys = vec![
            ("DASHBOARD_DATABASE", "dashboard.db"),
            ("TITILER_URL", "http://localhost:8080"),
            ("TITILER_PUBLIC_URL", ""),
            ("DASHBOARD_COG_URL", "/data/raster_web_mercator.tif"),
            ("TITILER_TIMEOUT_SECS", "30"),
        ];
        keys.extend(ChatConfig::tracked_keys());
        keys
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_map(&HashMap::new())
    }
}

/// Reads a flat TOML table whose keys mirror the environment variables.
fn read_config_file(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let table: HashMap<String, toml::Value> = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    Ok(table
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect())
}

pub(crate) fn read(values: &HashMap<String, String>, key: &str, default: &str) -> String {
    values
        .get(key)
        .cloned()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn read_secs(values: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    values
        .get(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_to_an_empty_map() {
        let config = AppConfig::from_map(&HashMap::new());
        assert_eq!(config.database_path, "dashboard.db");
        assert_eq!(config.tiles.titiler_url, "http://localhost:8080");
        assert_eq!(config.tiles.public_url, "http://localhost:8080");
        assert_eq!(config.tiles.cog_url, "/data/raster_web_mercator.tif");
        assert_eq!(config.tiles.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let mut values = HashMap::new();
        values.insert("TITILER_URL".to_string(), "http://titiler:8000/".to_string());
        let config = AppConfig::from_map(&values);
        assert_eq!(config.tiles.titiler_url, "http://titiler:8000");
        assert_eq!(config.tiles.public_url, "http://titiler:8000");
    }

    #[test]
    fn bad_numbers_fall_back_to_defaults() {
        let mut values = HashMap::new();
        values.insert("TITILER_TIMEOUT_SECS".to_string(), "soon".to_string());
        let config = AppConfig::from_map(&values);
        assert_eq!(config.tiles.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn config_file_values_are_flattened() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "TITILER_URL = \"http://tiles.internal\"\nTITILER_TIMEOUT_SECS = 5"
        )
        .unwrap();

        let values = read_config_file(file.path()).unwrap();
        let config = AppConfig::from_map(&values);
        assert_eq!(config.tiles.titiler_url, "http://tiles.internal");
        assert_eq!(config.tiles.request_timeout, Duration::from_secs(5));
    }
}
