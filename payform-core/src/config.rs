//! Payment service endpoints and polling cadence.
//!
//! Values come from the environment (see [`GatewayConfig::from_env`]) and can
//! be overridden field by field by the caller.

use std::time::Duration;

use envconfig::Envconfig;
use thiserror::Error;
use url::Url;

use crate::types::Pid;

pub const DEFAULT_API_URL: &str = "http://localhost:2050/";
pub const DEFAULT_RPC_PATH: &str = "api";
pub const DEFAULT_CHECK_PATH: &str = "pay/check";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envconfig::Error),

    #[error("invalid url '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("url '{0}' cannot carry path segments")]
    NotABase(String),

    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

/// Where the payment service lives and how often to ask it for a status.
#[derive(Envconfig, Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL of the payment service.
    #[envconfig(from = "PAYFORM_API_URL", default = "http://localhost:2050/")]
    pub api_url: String,

    /// JSON-RPC endpoint, relative to `api_url`.
    #[envconfig(from = "PAYFORM_RPC_PATH", default = "api")]
    pub rpc_path: String,

    /// Status endpoint prefix, relative to `api_url`. The pid is appended.
    #[envconfig(from = "PAYFORM_CHECK_PATH", default = "pay/check")]
    pub check_path: String,

    #[envconfig(from = "PAYFORM_POLL_INTERVAL_MS", default = "1000")]
    pub poll_interval_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            rpc_path: DEFAULT_RPC_PATH.to_string(),
            check_path: DEFAULT_CHECK_PATH.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::init_from_env()?)
    }

    fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|source| ConfigError::Url {
            url: self.api_url.clone(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::NotABase(self.api_url.clone()));
        }
        Ok(url)
    }

    fn join(&self, path: &str) -> Result<Url, ConfigError> {
        let base = self.base_url()?;
        base.join(path.trim_start_matches('/'))
            .map_err(|source| ConfigError::Url {
                url: path.to_string(),
                source,
            })
    }

    /// Endpoint that receives `pay` envelopes.
    pub fn rpc_url(&self) -> Result<Url, ConfigError> {
        self.join(&self.rpc_path)
    }

    /// Status URL for one payment, with the pid as a single escaped segment.
    pub fn check_url(&self, pid: &Pid) -> Result<Url, ConfigError> {
        let mut url = self.join(&self.check_path)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ConfigError::NotABase(self.api_url.clone()))?;
            segments.pop_if_empty().push(pid.as_str());
        }
        Ok(url)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check that every URL can be built before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rpc_url()?;
        self.join(&self.check_path)?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}
