//! TOML configuration for the `vandir` binary and REST server.
//!
//! Every section has defaults, so an empty file is a valid configuration
//! backed by `./data/builders.json`. See `config/vandir.example.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use van_directory_core::directory::IdStrategy;
use van_directory_core::offset::OffsetStrategy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ids: IdsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which persistence backend holds the collection.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Defaults to a `backups/` directory next to `path`.
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Json,
            path: default_store_path(),
            backup_dir: None,
        }
    }
}

impl StoreConfig {
    pub fn backup_dir(&self) -> PathBuf {
        match &self.backup_dir {
            Some(dir) => dir.clone(),
            None => self
                .path
                .parent()
                .map(|p| p.join("backups"))
                .unwrap_or_else(|| PathBuf::from("backups")),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/builders.json")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IdsConfig {
    #[serde(default)]
    pub strategy: IdStrategy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_radius")]
    pub default_radius_miles: f64,
    #[serde(default = "default_zip_radius")]
    pub zip_radius_miles: f64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_miles: default_radius(),
            zip_radius_miles: default_zip_radius(),
            default_limit: default_limit(),
        }
    }
}

fn default_radius() -> f64 {
    50.0
}
fn default_zip_radius() -> f64 {
    100.0
}
fn default_limit() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MapConfig {
    #[serde(default)]
    pub offset: OffsetStrategy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl GeocodingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_endpoint() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_user_agent() -> String {
    format!("van-directory/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

/// Parse and validate a configuration document.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    // Validate search
    let radius = config.search.default_radius_miles;
    if !radius.is_finite() || radius <= 0.0 {
        anyhow::bail!("search.default_radius_miles must be > 0");
    }
    let zip_radius = config.search.zip_radius_miles;
    if !zip_radius.is_finite() || zip_radius <= 0.0 {
        anyhow::bail!("search.zip_radius_miles must be > 0");
    }
    if config.search.default_limit < 1 {
        anyhow::bail!("search.default_limit must be >= 1");
    }

    // Validate geocoding
    match config.geocoding.provider.as_str() {
        "disabled" | "nominatim" => {}
        other => anyhow::bail!(
            "Unknown geocoding provider: '{}'. Must be disabled or nominatim.",
            other
        ),
    }
    if config.geocoding.is_enabled() {
        if config.geocoding.timeout_secs == 0 {
            anyhow::bail!("geocoding.timeout_secs must be > 0");
        }
        if config.geocoding.endpoint.trim().is_empty() {
            anyhow::bail!(
                "geocoding.endpoint must be set when provider is '{}'",
                config.geocoding.provider
            );
        }
    }

    if config.store.path.as_os_str().is_empty() {
        anyhow::bail!("store.path must not be empty");
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.store.backend, Backend::Json);
        assert_eq!(cfg.store.path, PathBuf::from("./data/builders.json"));
        assert_eq!(cfg.store.backup_dir(), PathBuf::from("./data/backups"));
        assert_eq!(cfg.ids.strategy, IdStrategy::Sequential);
        assert_eq!(cfg.search.default_radius_miles, 50.0);
        assert_eq!(cfg.search.zip_radius_miles, 100.0);
        assert_eq!(cfg.map.offset, OffsetStrategy::Circular);
        assert!(!cfg.geocoding.is_enabled());
        assert_eq!(cfg.server.bind, "127.0.0.1:3001");
    }

    #[test]
    fn full_file() {
        let cfg = parse_config(
            r#"
[store]
backend = "sqlite"
path = "/tmp/van/builders.sqlite"
backup_dir = "/tmp/van/snapshots"

[ids]
strategy = "uuid"

[search]
default_radius_miles = 25.0
zip_radius_miles = 75.0
default_limit = 10

[map]
offset = "linear"

[geocoding]
provider = "nominatim"
timeout_secs = 2

[server]
bind = "0.0.0.0:8080"
"#,
        )
        .unwrap();
        assert_eq!(cfg.store.backend, Backend::Sqlite);
        assert_eq!(cfg.store.backup_dir(), PathBuf::from("/tmp/van/snapshots"));
        assert_eq!(cfg.ids.strategy, IdStrategy::Uuid);
        assert_eq!(cfg.search.default_limit, 10);
        assert_eq!(cfg.map.offset, OffsetStrategy::Linear);
        assert!(cfg.geocoding.is_enabled());
        assert_eq!(cfg.geocoding.timeout_secs, 2);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_config("[search]\ndefault_radius_miles = 0.0\n").is_err());
        assert!(parse_config("[search]\nzip_radius_miles = -1.0\n").is_err());
        assert!(parse_config("[search]\ndefault_limit = 0\n").is_err());
        assert!(parse_config("[geocoding]\nprovider = \"google\"\n").is_err());
        assert!(
            parse_config("[geocoding]\nprovider = \"nominatim\"\ntimeout_secs = 0\n").is_err()
        );
        assert!(parse_config("[store]\nbackend = \"postgres\"\n").is_err());
        assert!(parse_config("[map]\noffset = \"spiral\"\n").is_err());
    }
}
