//! Configuration loading and resolution
//!
//! Every setting is resolved with the same priority order:
//! 1. Command-line argument (highest priority; clap also folds in its `env` fallbacks)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error. Storage credentials have no compiled
//! default, so resolution fails if no tier supplies them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3001;

/// Default bind address
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default request body limit for multipart submissions (64 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Environment variables read during resolution
pub const ENV_STORAGE_URL: &str = "SUPABASE_URL";
pub const ENV_STORAGE_KEY: &str = "SUPABASE_KEY";
pub const ENV_STORAGE_BUCKET: &str = "SUPABASE_BUCKET_NAME";
pub const ENV_ADMIN_TOKEN: &str = "ADMIN_TOKEN";

// ============================================================================
// TOML file schema
// ============================================================================

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub path: Option<PathBuf>,
}

/// Asset store (Supabase Storage) settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    pub url: Option<String>,
    pub key: Option<String>,
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSection {
    pub admin_token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file if present, otherwise fall back to defaults
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

/// Default config file path: `<config dir>/catchlog/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("catchlog").join("config.toml"))
}

/// Default database location: `<local data dir>/catchlog/catchlog.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("catchlog"))
        .unwrap_or_else(|| PathBuf::from("./catchlog_data"))
        .join("catchlog.db")
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// Values taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
}

/// Asset store connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub url: String,
    pub key: String,
    pub bucket: String,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_upload_bytes: usize,
    pub storage: StorageConfig,
    /// `None` disables admin authentication
    pub admin_token: Option<String>,
    pub log_level: String,
}

impl ServiceConfig {
    /// Resolve the final configuration from CLI, environment, and TOML tiers
    pub fn resolve(cli: &CliOverrides, file: &TomlConfig) -> Result<Self> {
        let bind = cli
            .bind
            .clone()
            .or_else(|| file.server.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let port = cli.port.or(file.server.port).unwrap_or(DEFAULT_PORT);

        let database_path = cli
            .database
            .clone()
            .or_else(|| file.database.path.clone())
            .unwrap_or_else(default_database_path);

        let max_upload_bytes = file
            .server
            .max_upload_bytes
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let url = pick(ENV_STORAGE_URL, file.storage.url.as_deref());
        let key = pick(ENV_STORAGE_KEY, file.storage.key.as_deref());
        let bucket = pick(ENV_STORAGE_BUCKET, file.storage.bucket.as_deref());

        let storage = match (url, key, bucket) {
            (Some(url), Some(key), Some(bucket)) => StorageConfig {
                url: url.trim_end_matches('/').to_string(),
                key,
                bucket,
            },
            (url, key, bucket) => {
                let missing: Vec<&str> = [
                    (url.is_none(), "storage.url / SUPABASE_URL"),
                    (key.is_none(), "storage.key / SUPABASE_KEY"),
                    (bucket.is_none(), "storage.bucket / SUPABASE_BUCKET_NAME"),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                return Err(Error::Config(format!(
                    "Asset storage not configured, missing: {}",
                    missing.join(", ")
                )));
            }
        };

        let admin_token = pick(ENV_ADMIN_TOKEN, file.auth.admin_token.as_deref());

        Ok(Self {
            bind,
            port,
            database_path,
            max_upload_bytes,
            storage,
            admin_token,
            log_level: file.logging.level.clone(),
        })
    }
}

/// Environment variable first, then TOML value; blank values count as absent
fn pick(env_var: &str, toml_value: Option<&str>) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|v| is_set(v))
        .or_else(|| toml_value.filter(|v| is_set(v)).map(str::to_string))
}

/// Non-empty, non-whitespace
pub fn is_set(value: &str) -> bool {
    !value.trim().is_empty()
}
