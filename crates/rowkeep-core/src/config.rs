//! Database configuration.
//!
//! A `DatabaseConfig` can be built in code, deserialized from JSON, or read
//! from the environment:
//!
//! | Variable | Field | Required |
//! |----------|-------|----------|
//! | `ROWKEEP_DSN` | `dsn` | yes |
//! | `ROWKEEP_BUSY_TIMEOUT_MS` | `busy_timeout_ms` | no (5000) |

use crate::Result;
use crate::error::{ConfigError, Error};
use serde::{Deserialize, Serialize};

/// Environment variable holding the DSN.
pub const DSN_VAR: &str = "ROWKEEP_DSN";
/// Environment variable holding the busy timeout in milliseconds.
pub const BUSY_TIMEOUT_VAR: &str = "ROWKEEP_BUSY_TIMEOUT_MS";

const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

fn default_busy_timeout_ms() -> u32 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Configuration for a database handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Opaque data source name handed to the dialector factory
    pub dsn: String,
    /// How long a writer waits on a locked store before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

impl DatabaseConfig {
    /// Create a config with the given DSN and default timeouts.
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Set the busy timeout.
    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    /// Parse a JSON document such as `{"dsn": "app.db", "busy_timeout_ms": 250}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            Error::Config(ConfigError {
                message: format!("invalid database config: {e}"),
                source: Some(Box::new(e)),
            })
        })
    }

    /// Read the config from `ROWKEEP_DSN` and `ROWKEEP_BUSY_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the config through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dsn = lookup(DSN_VAR).filter(|v| !v.is_empty()).ok_or_else(|| {
            Error::Config(ConfigError {
                message: format!("{DSN_VAR} is not set"),
                source: None,
            })
        })?;

        let busy_timeout_ms = match lookup(BUSY_TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                Error::Config(ConfigError {
                    message: format!("{BUSY_TIMEOUT_VAR} must be a whole number of milliseconds, got {raw:?}"),
                    source: Some(Box::new(e)),
                })
            })?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        Ok(Self {
            dsn,
            busy_timeout_ms,
        })
    }
}
