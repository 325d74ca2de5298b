//! Server configuration, read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

pub const ADDR_ENV: &str = "WEBCHAIN_ADDR";
pub const MAX_BODY_BYTES_ENV: &str = "WEBCHAIN_MAX_BODY_BYTES";

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Listener and request-body settings for the server binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub addr: SocketAddr,
    /// Largest request body buffered before the handler runs.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load from `WEBCHAIN_ADDR` and `WEBCHAIN_MAX_BODY_BYTES`; unset values use defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match lookup(ADDR_ENV) {
            Some(value) => config.addr = parse(ADDR_ENV, value)?,
            None => tracing::debug!("{ADDR_ENV} not set; using {DEFAULT_ADDR}"),
        }

        if let Some(value) = lookup(MAX_BODY_BYTES_ENV) {
            config.max_body_bytes = parse(MAX_BODY_BYTES_ENV, value)?;
        }

        Ok(config)
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}
