//! Configuration for the builder dashboard

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::addresses::Allowlist;
use crate::bitquery::{BITQUERY_URL, DEFAULT_LIMIT, REQUEST_TIMEOUT};
use crate::cache::CACHE_TTL;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
    pub builders: Option<BuildersConfig>,
    /// Write each fetched envelope here for debugging
    pub dump_path: Option<PathBuf>,
}

/// Bitquery API settings
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub endpoint: String,
    /// Bearer token (can also come from `BITQUERY_TOKEN`)
    pub token: Option<String>,
    /// Trades requested per fetch
    pub limit: usize,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: BITQUERY_URL.to_string(),
            token: None,
            limit: DEFAULT_LIMIT,
            timeout_secs: REQUEST_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: CACHE_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// Override for the built-in builder list
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildersConfig {
    pub addresses: Vec<String>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Resolved settings with defaults applied and the allowlist validated.
#[derive(Debug)]
pub struct Config {
    pub endpoint: String,
    pub token: String,
    pub limit: usize,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub bind_addr: String,
    pub allowlist: Allowlist,
    pub dump_path: Option<PathBuf>,
}

impl Config {
    /// Resolve a file config. `token` and `bind_addr` (CLI/env) take precedence over the file.
    pub fn from_file(file: FileConfig, token: Option<String>, bind_addr: Option<String>) -> Result<Self> {
        let Some(token) = token.or(file.api.token).filter(|t| !t.trim().is_empty()) else {
            bail!("No Bitquery token configured. Set BITQUERY_TOKEN, pass --token, or add api.token to config.toml");
        };

        if file.api.limit == 0 {
            bail!("api.limit must be at least 1");
        }
        if file.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be at least 1");
        }

        let allowlist = match file.builders {
            Some(builders) => Allowlist::new(&builders.addresses).context("Invalid [builders] addresses")?,
            None => Allowlist::default(),
        };

        Ok(Self {
            endpoint: file.api.endpoint,
            token,
            limit: file.api.limit,
            request_timeout: Duration::from_secs(file.api.timeout_secs),
            cache_ttl: Duration::from_secs(file.cache.ttl_secs),
            bind_addr: bind_addr.unwrap_or(file.server.addr),
            allowlist,
            dump_path: file.dump_path,
        })
    }

    /// Trades to request, with an optional command-line override.
    pub fn fetch_limit(&self, requested: Option<usize>) -> Result<usize> {
        match requested {
            Some(0) => bail!("--limit must be at least 1"),
            Some(limit) => Ok(limit),
            None => Ok(self.limit),
        }
    }
}
