//! Client configuration.
//!
//! # Design
//! `ClientConfig` is a plain value with consuming `with_*` builders. It is
//! read once when a transport is constructed and when requests are built;
//! nothing in it changes while a client is in use. `from_env` layers
//! `DOOTASK_*` environment overrides on top of the defaults so deployments
//! can tune timeouts and retries without code changes. The overrides are
//! collected by the `config` crate's `Environment` source and read back one
//! typed key at a time, so a single bad value only costs that key.

use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::de::DeserializeOwned;

/// Prefix of the environment variables `from_env` reads.
pub const ENV_PREFIX: &str = "DOOTASK";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of extra attempts after a connection failure.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("dootask-rust-sdk/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound for one HTTP round-trip, body included.
    pub timeout: Duration,
    pub user_agent: String,
    /// Skip TLS certificate verification. Only for self-hosted instances
    /// with self-signed certificates.
    pub insecure: bool,
    /// Log request bodies at `debug` level.
    pub debug: bool,
    /// Extra attempts when the connection could not be established. `0`
    /// disables retries.
    pub retry_count: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            insecure: false,
            debug: false,
            retry_count: DEFAULT_RETRY_COUNT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `DOOTASK_TIMEOUT_SECS`, `DOOTASK_USER_AGENT`,
    /// `DOOTASK_INSECURE`, `DOOTASK_DEBUG` and `DOOTASK_RETRY_COUNT`.
    ///
    /// Unparseable values are skipped with a warning.
    pub fn from_env() -> Self {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(source: Environment) -> Self {
        let mut config = Self::default();
        let settings = match Config::builder().add_source(source).build() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring environment overrides");
                return config;
            }
        };

        if let Some(secs) = setting::<u64>(&settings, "timeout_secs") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = setting::<String>(&settings, "user_agent").filter(|v| !v.trim().is_empty()) {
            config.user_agent = agent;
        }
        if let Some(insecure) = setting(&settings, "insecure") {
            config.insecure = insecure;
        }
        if let Some(debug) = setting(&settings, "debug") {
            config.debug = debug;
        }
        if let Some(count) = setting(&settings, "retry_count") {
            config.retry_count = count;
        }
        config
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

fn setting<T: DeserializeOwned>(settings: &Config, key: &str) -> Option<T> {
    match settings.get::<T>(key) {
        Ok(value) => Some(value),
        Err(ConfigError::NotFound(_)) => None,
        Err(err) => {
            let var = format!("{ENV_PREFIX}_{}", key.to_ascii_uppercase());
            tracing::warn!(key = %var, error = %err, "ignoring unparseable environment override");
            None
        }
    }
}
