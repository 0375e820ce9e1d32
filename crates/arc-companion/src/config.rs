//! Configuration loading

use anyhow::{Context, Result, bail};
use arc_core::{CacheTtlConfig, EngineConfig, FetchConfig, Resource, SourceConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheTtlConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Upstream APIs; the built-in pair is used when the key is absent
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Cross-origin settings for browser clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` allows any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            name: "metaforge".to_string(),
            display_name: Some("MetaForge".to_string()),
            url: "https://metaforge.app/api/arc-raiders".to_string(),
            priority: 10,
            enabled: true,
            resources: vec![],
            page_limit: Some(1000),
        },
        SourceConfig {
            name: "ardb".to_string(),
            display_name: Some("ARDB".to_string()),
            url: "https://ardb.app/api".to_string(),
            priority: 20,
            enabled: true,
            resources: vec![Resource::Items, Resource::Quests, Resource::Maps],
            page_limit: None,
        },
    ]
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Parse and validate TOML configuration
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for source in &self.sources {
            if !names.insert(source.name.as_str()) {
                bail!("Source with name '{}' is configured twice", source.name);
            }
            let url = Url::parse(&source.url)
                .with_context(|| format!("Invalid URL for source '{}'", source.name))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!(
                    "Source '{}' must use http or https, got {}",
                    source.name,
                    url.scheme()
                );
            }
        }

        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be greater than zero");
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            bail!(
                "Unknown logging format '{}', expected \"pretty\" or \"json\"",
                self.logging.format
            );
        }

        Ok(())
    }

    /// The part of the configuration the engine consumes
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sources: self.sources.clone(),
            cache: self.cache.clone(),
            fetch: self.fetch.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cache: CacheTtlConfig::default(),
            fetch: FetchConfig::default(),
            sources: default_sources(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.cache.items_ttl_secs, 3600);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].name, "metaforge");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_full_file() {
        let config = Config::parse(
            r#"
            [server]
            port = 9000

            [cache]
            items_ttl_secs = 60
            events_ttl_secs = 30

            [fetch]
            timeout_secs = 5

            [[sources]]
            name = "local"
            url = "http://localhost:4000/api"
            priority = 1
            resources = ["items", "quests"]

            [logging]
            level = "debug"
            format = "json"

            [cors]
            allowed_origins = ["*"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.cache.items_ttl_secs, 60);
        assert_eq!(config.cache.quests_ttl_secs, 3600);
        assert_eq!(config.cache.events_ttl_secs, 30);

        let engine = config.engine_config();
        assert_eq!(engine.fetch.timeout_secs, 5);
        assert_eq!(engine.sources.len(), 1);
        assert_eq!(
            engine.sources[0].resources,
            vec![Resource::Items, Resource::Quests]
        );
        assert_eq!(config.cors.allowed_origins, vec!["*"]);
    }

    #[test]
    fn test_explicitly_empty_sources() {
        let config = Config::parse("sources = []").unwrap();
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_rejects_invalid_sources() {
        let duplicate = r#"
            [[sources]]
            name = "a"
            url = "http://a.test"

            [[sources]]
            name = "a"
            url = "http://b.test"
        "#;
        assert!(Config::parse(duplicate).is_err());

        let bad_scheme = r#"
            [[sources]]
            name = "ftp"
            url = "ftp://files.test"
        "#;
        assert!(Config::parse(bad_scheme).is_err());
    }

    #[test]
    fn test_rejects_zero_fetch_timeout() {
        assert!(Config::parse("[fetch]\ntimeout_secs = 0").is_err());
    }

    #[test]
    fn test_shipped_file_matches_builtin_defaults() {
        let shipped = Config::parse(include_str!("../../../config/default.toml")).unwrap();
        let builtin = Config::default();

        assert_eq!(shipped.sources, builtin.sources);
        assert_eq!(shipped.server.port, builtin.server.port);
        assert_eq!(shipped.fetch.timeout_secs, builtin.fetch.timeout_secs);
        assert_eq!(shipped.cache.events_ttl_secs, builtin.cache.events_ttl_secs);
        assert_eq!(shipped.cors.allowed_origins, builtin.cors.allowed_origins);
        assert!(!builtin.sources[1].serves(Resource::Events));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        assert!(Config::parse("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("does/not/exist.toml").unwrap();
        assert_eq!(config.sources.len(), 2);
    }
}
