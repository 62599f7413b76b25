//! TOML configuration parsing.
//!
//! Every field has a default, and the configuration file itself is optional:
//! `sitechat serve` with no `--config` runs with the defaults below. The
//! `PORT` environment variable overrides the bind port either way, so the
//! common "drop it on a PaaS" deployment needs no file at all.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub log: LogConfig,
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
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Minimum seconds between syncs of the same site.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: i64,
    /// Items requested per content collection (`per_page` query parameter).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Documents whose cleaned body is shorter than this are discarded.
    #[serde(default = "default_min_body_chars")]
    pub min_body_chars: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            per_page: default_per_page(),
            min_body_chars: default_min_body_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_cooldown_secs() -> i64 {
    300
}
fn default_per_page() -> u32 {
    100
}
fn default_min_body_chars() -> usize {
    40
}
fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Query tokens shorter than this are ignored.
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    /// Points awarded per query token found in a document body.
    #[serde(default = "default_match_points")]
    pub match_points: u32,
    /// Reply snippet length in characters.
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_token_len: default_min_token_len(),
            match_points: default_match_points(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

fn default_top_k() -> usize {
    3
}
fn default_min_token_len() -> usize {
    3
}
fn default_match_points() -> u32 {
    2
}
fn default_snippet_chars() -> usize {
    320
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_requests() -> u32 {
    60
}
fn default_window_secs() -> i64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Chat log ring buffer capacity.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    200
}

impl Config {
    /// Loads configuration from a TOML file, or returns the defaults when no
    /// path is given.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {}", p.display()))?;
                let config: Config = toml::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file: {}", p.display()))?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }

    /// Effective bind address: `[server].bind`, with the port replaced by the
    /// `PORT` environment variable when set.
    pub fn bind_addr(&self) -> String {
        match std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            Some(port) => {
                let host = self
                    .server
                    .bind
                    .rsplit_once(':')
                    .map(|(h, _)| h)
                    .unwrap_or("0.0.0.0");
                format!("{}:{}", host, port)
            }
            None => self.server.bind.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.sync.cooldown_secs, 300);
        assert_eq!(config.sync.min_body_chars, 40);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.rate_limit.max_requests, 60);
        assert_eq!(config.log.capacity, 200);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
bind = "127.0.0.1:8080"

[rate_limit]
max_requests = 5
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.rate_limit.max_requests, 5);
        // Untouched sections keep their defaults
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.sync.per_page, 100);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/sitechat.toml")));
        assert!(result.is_err());
    }
}
