//! Host process configuration read from the environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::net::{Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT {value:?}: {reason}")]
    InvalidPort { value: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    pub port: u16,
    pub site_addr: SocketAddr,
}

impl HostConfig {
    /// Read `PORT` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPort` when `PORT` is set but is not a
    /// valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_port(std::env::var("PORT").ok().as_deref())
    }

    /// Build from a raw `PORT` value; unset or blank means the default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPort` for anything that is not a `u16`.
    pub fn from_port(raw: Option<&str>) -> Result<Self, ConfigError> {
        let port = match raw.map(str::trim) {
            None | Some("") => DEFAULT_PORT,
            Some(value) => value
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidPort { value: value.to_owned(), reason: e.to_string() })?,
        };
        Ok(Self { port, site_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)) })
    }
}
