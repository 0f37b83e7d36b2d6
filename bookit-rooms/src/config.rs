//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: BOOKIT_, nested keys separated by `__`,
//!    e.g. `BOOKIT_LISTING__RESULTS_PER_PAGE=8`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/bookit-rooms/{service_name}/config.toml
//! 4. System directory: /etc/bookit-rooms/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

const ENV_PREFIX: &str = "BOOKIT_";
const CONFIG_DIR: &str = "bookit-rooms";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Room listing behaviour
    #[serde(default)]
    pub listing: ListingConfig,

    /// In-memory store options
    #[serde(default)]
    pub store: StoreConfig,

    /// SurrealDB configuration (optional, used with the `surrealdb` feature)
    #[serde(default)]
    pub surrealdb: Option<SurrealDbConfig>,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error) or a full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl ServiceConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Maximum request body size in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// CORS mode: "permissive", "restrictive", or "disabled"
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            cors_mode: default_cors_mode(),
        }
    }
}

/// Room listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Number of rooms returned per page by `GET /api/rooms`
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u64,

    /// Document field matched by the `keyword` query parameter
    #[serde(default = "default_search_field")]
    pub search_field: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            results_per_page: default_results_per_page(),
            search_field: default_search_field(),
        }
    }
}

/// In-memory store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding an array of rooms loaded at startup
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

/// SurrealDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurrealDbConfig {
    /// Connection URL (ws://, wss://, http://, https://, mem://)
    #[serde(default = "default_surrealdb_url")]
    pub url: String,

    /// Namespace to select after connecting
    #[serde(default = "default_surrealdb_namespace")]
    pub namespace: String,

    /// Database to select after connecting
    #[serde(default = "default_surrealdb_namespace")]
    pub database: String,

    /// Table holding room documents
    #[serde(default = "default_surrealdb_table")]
    pub table: String,

    /// Root username (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Root password (optional)
    #[serde(default)]
    pub password: Option<String>,

    /// Maximum retry attempts for establishing the connection
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retry attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for SurrealDbConfig {
    fn default() -> Self {
        Self {
            url: default_surrealdb_url(),
            namespace: default_surrealdb_namespace(),
            database: default_surrealdb_namespace(),
            table: default_surrealdb_table(),
            username: None,
            password: None,
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_body_limit_mb() -> usize {
    10
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_results_per_page() -> u64 {
    4
}

fn default_search_field() -> String {
    "address".to_string()
}

fn default_surrealdb_url() -> String {
    "mem://".to_string()
}

fn default_surrealdb_namespace() -> String {
    "bookit".to_string()
}

fn default_surrealdb_table() -> String {
    "rooms".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is taken from the binary name, falling back to `bookit-rooms`.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| CONFIG_DIR.to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the XDG and system directories. Environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Candidate config file paths, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR);
        if let Some(path) = xdg_dirs.find_config_file(Path::new(service_name).join("config.toml")) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_DIR)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: CONFIG_DIR.to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            middleware: MiddlewareConfig::default(),
            listing: ListingConfig::default(),
            store: StoreConfig::default(),
            surrealdb: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.listing.results_per_page, 4);
        assert_eq!(config.listing.search_field, "address");
        assert!(config.store.seed_path.is_none());
        assert!(config.surrealdb.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "rooms-test"
port = 9191

[listing]
results_per_page = 12

[surrealdb]
url = "ws://localhost:8000"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "rooms-test");
        assert_eq!(config.service.port, 9191);
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.listing.results_per_page, 12);
        assert_eq!(config.listing.search_field, "address");
        assert_eq!(config.middleware.cors_mode, "permissive");

        let surreal = config.surrealdb.unwrap();
        assert_eq!(surreal.url, "ws://localhost:8000");
        assert_eq!(surreal.namespace, "bookit");
        assert_eq!(surreal.table, "rooms");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.service.name, "bookit-rooms");
    }

    #[test]
    fn test_service_timeout_duration() {
        let config = Config::default();
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
    }
}
