use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PocketeerError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pocket: PocketConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PocketConfig {
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the browser lands after authorizing. Empty means "the URL the
    /// caller used to reach /authen".
    #[serde(default)]
    pub redirect_url: String,
    /// `redirect_uri` sent when minting a request token.
    #[serde(default = "default_request_redirect_uri")]
    pub request_redirect_uri: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://getpocket.com".to_string()
}

fn default_request_redirect_uri() -> String {
    "https://www.google.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for PocketConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            base_url: default_base_url(),
            redirect_url: String::new(),
            request_redirect_uri: default_request_redirect_uri(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_hostname")]
    pub hostname: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn default_redis_hostname() -> String {
    "127.0.0.1".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            hostname: default_redis_hostname(),
            port: default_redis_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Mounts `/debug/state`. Operator use only.
    #[serde(default)]
    pub diagnostics: bool,
}

fn default_server_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            diagnostics: false,
        }
    }
}

impl Config {
    /// Load config: defaults → pocketeer.toml → env vars (env wins).
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| PocketeerError::Config(format!("failed to read config: {e}")))?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PocketeerError::Config(format!("failed to parse config: {e}")))
    }

    /// Override fields from the environment. `lookup` is `std::env::var` in
    /// production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CONSUMER_KEY") {
            self.pocket.consumer_key = v;
        }
        if let Some(v) = lookup("POCKET_BASE_URL") {
            self.pocket.base_url = v;
        }
        if let Some(v) = lookup("REDIRECT_URL") {
            self.pocket.redirect_url = v;
        }
        if let Some(v) = lookup("REDIS_HOSTNAME") {
            self.redis.hostname = v;
        }
        if let Some(v) = lookup("REDIS_PORT") {
            self.redis.port = parse_port("REDIS_PORT", &v)?;
        }
        if let Some(v) = lookup("REDIS_USER") {
            self.redis.username = v;
        }
        if let Some(v) = lookup("REDIS_PASS") {
            self.redis.password = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_port("PORT", &v)?;
        }
        Ok(())
    }
}

fn parse_port(name: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|e| PocketeerError::Config(format!("invalid {name} '{value}': {e}")))
}
