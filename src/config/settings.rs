//! Process settings from the environment (`.env` honored).

use crate::error::ConfigError;
use std::net::SocketAddr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Prefix the record routes are nested under, e.g. `/api`.
    pub api_prefix: String,
}

impl Settings {
    /// Load `.env` if present, then read the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys take defaults; malformed values are errors.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get("DATABASE_URL").unwrap_or_else(|| "sqlite::memory:".into());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let max_connections = match get("MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "MAX_CONNECTIONS",
                        value: raw,
                    })
                }
            },
            None => 5,
        };

        let mut api_prefix = get("API_PREFIX").unwrap_or_else(|| "/api".into());
        if !api_prefix.starts_with('/') {
            api_prefix.insert(0, '/');
        }
        let api_prefix = api_prefix.trim_end_matches('/').to_string();

        Ok(Settings {
            database_url,
            bind_addr,
            max_connections,
            api_prefix,
        })
    }
}
