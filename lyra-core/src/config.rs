//! Centralized configuration for Lyra.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

use crate::catalog::Quality;

/// Central configuration for all Lyra components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct LyraConfig {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub streaming: StreamingConfig,
}

/// HTTP listener and cross-origin configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Origins allowed by CORS; empty means any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            allowed_origins: [
                "https://aryandoes.tech",
                "https://www.aryandoes.tech",
                "http://aryandoes.tech",
                "http://www.aryandoes.tech",
                "http://localhost:5173",
                "http://localhost:4173",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl ServerConfig {
    /// Socket address the server listens on.
    ///
    /// # Errors
    ///
    /// - `std::net::AddrParseError` - Host is not a valid IP address
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Location of the track catalog and the media tree it points into.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Root of the media tree (`<root>/flac`, `<root>/ogg`, flat legacy files)
    pub media_root: PathBuf,
    /// JSON listing of track entries, re-read on every request
    pub catalog_path: PathBuf,
    /// Tier served when a request does not name one
    pub default_quality: Quality,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("music"),
            catalog_path: PathBuf::from("music/tracks.json"),
            default_quality: Quality::Flac,
        }
    }
}

/// Byte-range streaming configuration.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Size of each body chunk read from disk
    pub chunk_size: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024, // 64 KiB
        }
    }
}

impl LyraConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup.
    ///
    /// Values that fail to parse are ignored and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("LYRA_HOST") {
            config.server.host = host;
        }

        if let Some(port) = lookup("LYRA_PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!("Ignoring invalid LYRA_PORT: {port}"),
            }
        }

        if let Some(origins) = lookup("LYRA_ALLOWED_ORIGINS") {
            config.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(root) = lookup("LYRA_MEDIA_ROOT") {
            config.media.media_root = PathBuf::from(root);
        }

        if let Some(catalog) = lookup("LYRA_CATALOG") {
            config.media.catalog_path = PathBuf::from(catalog);
        }

        if let Some(quality) = lookup("LYRA_DEFAULT_QUALITY") {
            match quality.parse::<Quality>() {
                Ok(quality) => config.media.default_quality = quality,
                Err(_) => warn!("Ignoring invalid LYRA_DEFAULT_QUALITY: {quality}"),
            }
        }

        if let Some(chunk_size) = lookup("LYRA_CHUNK_SIZE") {
            match chunk_size.parse::<usize>() {
                Ok(size) if size > 0 => config.streaming.chunk_size = size,
                _ => warn!("Ignoring invalid LYRA_CHUNK_SIZE: {chunk_size}"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LyraConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.media.default_quality, Quality::Flac);
        assert_eq!(config.streaming.chunk_size, 65536);
        assert!(!config.server.allowed_origins.is_empty());
    }

    #[test]
    fn test_overrides_applied() {
        let config = LyraConfig::from_lookup(lookup_from(&[
            ("LYRA_PORT", "8080"),
            ("LYRA_MEDIA_ROOT", "/srv/music"),
            ("LYRA_DEFAULT_QUALITY", "ogg"),
            ("LYRA_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
        ]));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.media.media_root, PathBuf::from("/srv/music"));
        assert_eq!(config.media.default_quality, Quality::Ogg);
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let config = LyraConfig::from_lookup(lookup_from(&[
            ("LYRA_PORT", "not-a-port"),
            ("LYRA_CHUNK_SIZE", "0"),
            ("LYRA_DEFAULT_QUALITY", "mp3"),
        ]));

        assert_eq!(config.server.port, 3001);
        assert_eq!(config.streaming.chunk_size, 65536);
        assert_eq!(config.media.default_quality, Quality::Flac);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 3001);
    }
}
