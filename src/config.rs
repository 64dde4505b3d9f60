use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

pub const DEFAULT_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required field '{0}'")]
    MissingField(String),

    #[error("Field '{0}' must not be empty")]
    EmptyField(String),

    #[error("Invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Field '{0}' must be at least 1 second")]
    ZeroDuration(&'static str),
}

/// The file as written by the user. Every field is optional here so that
/// validation can report missing fields by name.
#[derive(Debug, Deserialize)]
struct RawConfig {
    interval: Option<u64>,
    request_timeout: Option<u64>,
    url: Option<String>,
    api_key: Option<String>,
    albums: Option<Vec<RawAlbum>>,
}

#[derive(Debug, Deserialize)]
struct RawAlbum {
    album_id: Option<String>,
    search_params: Option<Map<String, Value>>,
}

/// One smart album: the album to fill and the search that selects its assets.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumRule {
    pub album_id: String,
    /// Passed verbatim as the body of `POST /api/search/metadata`.
    pub search_params: Map<String, Value>,
}

/// Application configuration, loaded once at startup.
pub struct Config {
    pub url: Url,
    pub api_key: String,
    pub albums: Vec<AlbumRule>,
    pub interval: Duration,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url.as_str())
            .field("api_key", &"<redacted>")
            .field("albums", &self.albums)
            .field("interval", &self.interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

impl Config {
    /// Read and validate a TOML config file. `api_key_override` (from the
    /// command line or environment) replaces `api_key` from the file.
    pub fn load(path: &Path, api_key_override: Option<String>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, api_key_override)
    }

    pub fn from_toml_str(
        contents: &str,
        api_key_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents)?;
        Self::validate(raw, api_key_override)
    }

    fn validate(raw: RawConfig, api_key_override: Option<String>) -> Result<Self, ConfigError> {
        let url = parse_base_url(required(raw.url, "url")?)?;
        let api_key = non_empty(required(api_key_override.or(raw.api_key), "api_key")?, "api_key")?;

        let albums = required(raw.albums, "albums")?
            .into_iter()
            .enumerate()
            .map(|(i, album)| -> Result<AlbumRule, ConfigError> {
                let album_id = non_empty(
                    required(album.album_id, &format!("albums[{i}].album_id"))?,
                    &format!("albums[{i}].album_id"),
                )?;
                let search_params =
                    required(album.search_params, &format!("albums[{i}].search_params"))?;
                Ok(AlbumRule {
                    album_id,
                    search_params,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            url,
            api_key,
            albums,
            interval: seconds(raw.interval.unwrap_or(DEFAULT_INTERVAL_SECS), "interval")?,
            request_timeout: seconds(
                raw.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
                "request_timeout",
            )?,
        })
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingField(field.to_string()))
}

fn non_empty(value: String, field: &str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyField(field.to_string()));
    }
    Ok(value.trim().to_owned())
}

fn seconds(secs: u64, field: &'static str) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::ZeroDuration(field));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_base_url(raw: String) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            reason: format!("unsupported scheme '{}'", url.scheme()),
            url: raw,
        });
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl {
            url: raw,
            reason: "base URL must not carry a query or fragment".to_string(),
        });
    }
    Ok(url)
}
