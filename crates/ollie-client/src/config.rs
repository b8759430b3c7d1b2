//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local development backend.

use std::path::PathBuf;
use std::time::Duration;

use ollie_shared::constants::{DEFAULT_API_URL, DEFAULT_LOGIN_PATH, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without trailing slash.
    /// Env: `OLLIE_API_URL`
    /// Default: `http://localhost:5000`
    pub api_url: String,

    /// Directory holding the client database.
    /// Env: `OLLIE_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout.
    /// Env: `OLLIE_REQUEST_TIMEOUT_SECS`
    /// Default: 30 seconds.
    pub request_timeout: Duration,

    /// Route announced when the backend rejects the credential.
    /// Env: `OLLIE_LOGIN_PATH`
    /// Default: `/login`
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("OLLIE_API_URL") {
            match normalize_api_url(&url) {
                Some(url) => config.api_url = url,
                None => tracing::warn!(value = %url, "Invalid OLLIE_API_URL, using default"),
            }
        }

        if let Some(dir) = lookup("OLLIE_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(val) = lookup("OLLIE_REQUEST_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    value = %val,
                    "Invalid OLLIE_REQUEST_TIMEOUT_SECS, using default"
                ),
            }
        }

        if let Some(path) = lookup("OLLIE_LOGIN_PATH") {
            if path.starts_with('/') {
                config.login_path = path;
            } else {
                tracing::warn!(value = %path, "Invalid OLLIE_LOGIN_PATH, using default");
            }
        }

        config
    }

    /// Config pointing at `api_url`, everything else default.
    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            api_url: normalize_api_url(api_url).unwrap_or_else(|| api_url.to_string()),
            ..Self::default()
        }
    }
}

fn normalize_api_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        None
    }
}
