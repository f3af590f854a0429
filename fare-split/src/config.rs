//! Server configuration from the environment.
//!
//! Every setting has a default, so an empty environment yields a working
//! configuration against production bahn.de.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::bahn::BahnConfig;
use crate::graph::BuildConfig;
use crate::quote::RetryPolicy;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(300);

/// A configuration variable held a value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {message}")]
pub struct ConfigError {
    /// The offending variable
    pub var: &'static str,
    /// Its value
    pub value: String,
    /// Why it was rejected
    pub message: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// bahn.de client settings
    pub bahn: BahnConfig,
    /// Price graph construction settings
    pub build: BuildConfig,
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// Upper bound on one split analysis
    pub analysis_timeout: Duration,
}

impl AppConfig {
    /// Read the configuration from `FARE_SPLIT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };
        let defaults = RetryPolicy::default();

        let mut bahn = BahnConfig::new()
            .with_timeout(env.parse("FARE_SPLIT_HTTP_TIMEOUT_SECS", 30)?)
            .with_min_interval(Duration::from_millis(
                env.parse("FARE_SPLIT_MIN_INTERVAL_MS", 500)?,
            ));
        if let Some(url) = env.get("FARE_SPLIT_BASE_URL") {
            bahn = bahn.with_base_url(url);
        }

        let max_attempts: u32 = env.parse("FARE_SPLIT_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError {
                var: "FARE_SPLIT_MAX_ATTEMPTS",
                value: "0".to_string(),
                message: "at least one attempt is required".to_string(),
            });
        }
        let retry = RetryPolicy::new(
            max_attempts,
            Duration::from_millis(env.parse(
                "FARE_SPLIT_BASE_DELAY_MS",
                defaults.base_delay.as_millis() as u64,
            )?),
            Duration::from_secs(
                env.parse("FARE_SPLIT_MAX_DELAY_SECS", defaults.max_delay.as_secs())?,
            ),
        );
        let build = BuildConfig::default()
            .with_concurrency(env.parse("FARE_SPLIT_CONCURRENCY", 4)?)
            .with_retry(retry);

        let listen_addr = env.parse_or_else("FARE_SPLIT_LISTEN_ADDR", || {
            DEFAULT_LISTEN_ADDR.parse::<SocketAddr>()
        })?;
        let analysis_timeout = Duration::from_secs(env.parse(
            "FARE_SPLIT_ANALYSIS_TIMEOUT_SECS",
            DEFAULT_ANALYSIS_TIMEOUT.as_secs(),
        )?);

        Ok(Self {
            bahn,
            build,
            listen_addr,
            analysis_timeout,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, var: &str) -> Option<String> {
        (self.lookup)(var).filter(|value| !value.trim().is_empty())
    }

    fn parse<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parse_or_else(var, || Ok::<T, T::Err>(default))
    }

    fn parse_or_else<T>(
        &self,
        var: &'static str,
        default: impl FnOnce() -> Result<T, T::Err>,
    ) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let (value, parsed) = match self.get(var) {
            Some(value) => {
                let parsed = value.trim().parse::<T>();
                (value, parsed)
            }
            None => (String::new(), default()),
        };
        parsed.map_err(|e| ConfigError {
            var,
            value,
            message: e.to_string(),
        })
    }
}
