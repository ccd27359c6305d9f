use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

use crate::filtering::PagingConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read from the environment.
///
/// | Variable                  | Default          |
/// |---------------------------|------------------|
/// | `DATABASE_URL`            | `sqlite::memory:`|
/// | `BIND_ADDRESS`            | `0.0.0.0:8080`   |
/// | `SEARCH_WRITE_TIMEOUT_MS` | `2000`           |
/// | `DEFAULT_PAGE_SIZE`       | `20`             |
/// | `MAX_PAGE_SIZE`           | `2000`           |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub search_write_timeout: Duration,
    pub paging: PagingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            search_write_timeout: Duration::from_millis(2000),
            paging: PagingConfig::default(),
        }
    }
}

fn parse_var<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unparseable
    /// value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unparseable
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_ms = parse_var(
            "SEARCH_WRITE_TIMEOUT_MS",
            lookup("SEARCH_WRITE_TIMEOUT_MS"),
            2000_u64,
        )?;
        let default_size = parse_var(
            "DEFAULT_PAGE_SIZE",
            lookup("DEFAULT_PAGE_SIZE"),
            defaults.paging.default_size,
        )?;
        let max_size = parse_var(
            "MAX_PAGE_SIZE",
            lookup("MAX_PAGE_SIZE"),
            defaults.paging.max_size,
        )?;
        if default_size == 0 || max_size == 0 {
            return Err(ConfigError::Invalid {
                name: if default_size == 0 {
                    "DEFAULT_PAGE_SIZE"
                } else {
                    "MAX_PAGE_SIZE"
                },
                value: "0".to_string(),
                reason: "page sizes must be positive".to_string(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_address: parse_var(
                "BIND_ADDRESS",
                lookup("BIND_ADDRESS"),
                defaults.bind_address,
            )?,
            search_write_timeout: Duration::from_millis(timeout_ms),
            paging: PagingConfig {
                default_size: default_size.min(max_size),
                max_size,
            },
        })
    }
}
