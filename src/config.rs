//! Configuration Module
//!
//! Handles loading and managing server configuration from environment
//! variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// This node's own base URL as it appears in the peer list
    pub self_url: String,
    /// Peer base URLs, this node included; empty means standalone
    pub peers: Vec<String>,
    /// Database ids to create at startup
    pub databases: Vec<u8>,
    /// Byte budget per database cache
    pub max_bytes: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SELF_URL` - Own base URL (default: `http://127.0.0.1:<port>`)
    /// - `PEERS` - Comma-separated peer base URLs (default: none)
    /// - `DATABASES` - Comma-separated database ids (default: 0)
    /// - `MAX_BYTES` - Cache budget per database, accepts `kb`/`mb`/`gb`
    ///   suffixes (default: 64mb)
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let self_url = env::var("SELF_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", server_port));

        let peers = env::var("PEERS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let databases = env::var("DATABASES")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|s| s.trim().parse().ok())
                    .collect::<Vec<u8>>()
            })
            .filter(|dbs| !dbs.is_empty())
            .unwrap_or_else(|| vec![0]);

        let max_bytes = env::var("MAX_BYTES")
            .ok()
            .and_then(|v| parse_size(&v))
            .unwrap_or(64 << 20);

        Self {
            server_port,
            self_url,
            peers,
            databases,
            max_bytes,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            self_url: "http://127.0.0.1:3000".to_string(),
            peers: Vec::new(),
            databases: vec![0],
            max_bytes: 64 << 20,
        }
    }
}

// == Size Parsing ==
/// Parses a byte size with an optional `kb`/`mb`/`gb` suffix.
fn parse_size(value: &str) -> Option<u64> {
    let value = value.trim().to_ascii_lowercase();
    let (digits, shift) = if let Some(v) = value.strip_suffix("kb") {
        (v, 10)
    } else if let Some(v) = value.strip_suffix("mb") {
        (v, 20)
    } else if let Some(v) = value.strip_suffix("gb") {
        (v, 30)
    } else {
        (value.as_str(), 0)
    };
    digits.trim().parse::<u64>().ok().map(|n| n << shift)
}
