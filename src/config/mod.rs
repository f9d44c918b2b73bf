//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `IRT_*` and `REDIS_*` environment
//! variables. The binary loads a `.env` file first, if present.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Gateway configuration, built once at startup and passed to constructors.
///
/// Use [`Config::from_env`] to read overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Scoring service endpoint. Default: `http://localhost:5000/irt`.
    pub scoring_url: String,

    /// Timeout for one scoring HTTP call. Default: 30s.
    pub request_timeout: Duration,

    /// Budget for a whole `resolve` (store read + scoring + store write).
    pub resolve_deadline: Option<Duration>,

    /// JSON file with per-test subject data.
    pub subjects_path: Option<PathBuf>,

    /// Redis host. `None` keeps results in process memory.
    pub redis_host: Option<String>,

    /// Redis port. Default: `6379`.
    pub redis_port: u16,

    pub redis_password: Option<String>,

    /// Redis logical database. Default: `0`.
    pub redis_db: u32,
}

/// Default scoring endpoint used when `IRT_API_URL` is not set.
pub const DEFAULT_SCORING_URL: &str = "http://localhost:5000/irt";

/// Default Redis port used when `REDIS_PORT` is not set.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            scoring_url: DEFAULT_SCORING_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            resolve_deadline: None,
            subjects_path: None,
            redis_host: None,
            redis_port: DEFAULT_REDIS_PORT,
            redis_password: None,
            redis_db: 0,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "IRT_PORT";
    const ENV_BIND_ADDR: &'static str = "IRT_BIND_ADDR";
    const ENV_API_URL: &'static str = "IRT_API_URL";
    const ENV_REQUEST_TIMEOUT_MS: &'static str = "IRT_REQUEST_TIMEOUT_MS";
    const ENV_DEADLINE_MS: &'static str = "IRT_DEADLINE_MS";
    const ENV_SUBJECTS_PATH: &'static str = "IRT_SUBJECTS_PATH";
    const ENV_REDIS_HOST: &'static str = "REDIS_HOST";
    const ENV_REDIS_PORT: &'static str = "REDIS_PORT";
    const ENV_REDIS_PASSWORD: &'static str = "REDIS_PASSWORD";
    const ENV_REDIS_DB: &'static str = "REDIS_DB";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(Self::ENV_PORT, defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let scoring_url = Self::parse_string_from_env(Self::ENV_API_URL, defaults.scoring_url);
        let request_timeout = Self::parse_millis_from_env(Self::ENV_REQUEST_TIMEOUT_MS)?
            .unwrap_or(defaults.request_timeout);
        let resolve_deadline = Self::parse_millis_from_env(Self::ENV_DEADLINE_MS)?;
        let subjects_path = Self::parse_optional_string_from_env(Self::ENV_SUBJECTS_PATH)
            .map(PathBuf::from);
        let redis_host = Self::parse_optional_string_from_env(Self::ENV_REDIS_HOST);
        let redis_port = Self::parse_port_from_env(Self::ENV_REDIS_PORT, defaults.redis_port)?;
        let redis_password = Self::parse_optional_string_from_env(Self::ENV_REDIS_PASSWORD);
        let redis_db = Self::parse_u32_from_env(Self::ENV_REDIS_DB, defaults.redis_db)?;

        Ok(Self {
            port,
            bind_addr,
            scoring_url,
            request_timeout,
            resolve_deadline,
            subjects_path,
            redis_host,
            redis_port,
            redis_password,
            redis_db,
        })
    }

    /// Validates URLs, paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.scoring_url).map_err(|e| {
            ConfigError::InvalidUrl {
                value: self.scoring_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                value: self.scoring_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration {
                name: Self::ENV_REQUEST_TIMEOUT_MS,
            });
        }
        if self.resolve_deadline.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::ZeroDuration {
                name: Self::ENV_DEADLINE_MS,
            });
        }

        self.redis_url()?;

        if let Some(ref path) = self.subjects_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Returns the `redis://` URL, or `None` when no Redis host is configured.
    ///
    /// The password is percent-encoded, so reserved characters survive the round trip.
    pub fn redis_url(&self) -> Result<Option<String>, ConfigError> {
        let Some(host) = self.redis_host.as_deref() else {
            return Ok(None);
        };
        let invalid = |reason: String| ConfigError::InvalidRedisHost {
            host: host.to_string(),
            reason,
        };

        let mut url =
            reqwest::Url::parse("redis://localhost").map_err(|e| invalid(e.to_string()))?;
        url.set_host(Some(host)).map_err(|e| invalid(e.to_string()))?;
        url.set_port(Some(self.redis_port))
            .map_err(|()| invalid("cannot carry a port".to_string()))?;
        if let Some(password) = self.redis_password.as_deref() {
            url.set_password(Some(password))
                .map_err(|()| invalid("cannot carry a password".to_string()))?;
        }
        url.set_path(&format!("/{}", self.redis_db));

        Ok(Some(url.to_string()))
    }

    fn parse_port_from_env(var_name: &'static str, default: u16) -> Result<u16, ConfigError> {
        match env::var(var_name) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    name: var_name,
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort {
                        name: var_name,
                        value,
                    });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_u32_from_env(var_name: &'static str, default: u32) -> Result<u32, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.trim().parse().map_err(|e| ConfigError::InvalidNumber {
                name: var_name,
                value,
                source: e,
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_millis_from_env(var_name: &'static str) -> Result<Option<Duration>, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .parse::<u64>()
                .map(|ms| Some(Duration::from_millis(ms)))
                .map_err(|e| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                    source: e,
                }),
            None => Ok(None),
        }
    }
}
