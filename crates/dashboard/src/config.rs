//! Dashboard configuration loaded from environment variables.

use std::time::Duration;

use bulkwatch_client::PusherConfig;

/// Default REST request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime settings for the `bulkwatch` binary.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL for the REST API and the log stream.
    pub backend_url: String,
    /// Push channel settings. `None` means fetch-only mode.
    pub pusher: Option<PusherConfig>,
    /// REST request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl DashboardConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Required | Default                   |
    /// |------------------------|----------|---------------------------|
    /// | `BACKEND_URL`          | yes      | --                        |
    /// | `PUSHER_KEY`           | no       | --                        |
    /// | `PUSHER_CLUSTER`       | no       | --                        |
    /// | `PUSHER_HOST`          | no       | `ws-{cluster}.pusher.com` |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`                      |
    ///
    /// Without both `PUSHER_KEY` and `PUSHER_CLUSTER` the dashboard runs
    /// in fetch-only mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend_url = get("BACKEND_URL").ok_or(ConfigError::Missing("BACKEND_URL"))?;

        let request_timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                expected: "a whole number of seconds",
                value: raw,
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let pusher = match (get("PUSHER_KEY"), get("PUSHER_CLUSTER")) {
            (Some(key), Some(cluster)) => {
                let config = PusherConfig::new(key, cluster);
                Some(match get("PUSHER_HOST") {
                    Some(host) => config.with_host(host),
                    None => config,
                })
            }
            _ => {
                tracing::warn!(
                    "PUSHER_KEY or PUSHER_CLUSTER not set; live updates disabled (fetch-only mode)"
                );
                None
            }
        };

        Ok(Self {
            backend_url,
            pusher,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_fetch_only(&self) -> bool {
        self.pusher.is_none()
    }
}
