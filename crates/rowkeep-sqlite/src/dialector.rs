//! SQLite dialector and factory.

use crate::connection::{OpenFlags, SqliteConfig, SqliteConnection};
use rowkeep_core::{DatabaseConfig, Dialector, DialectorFactory, Result};

/// Opens SQLite connections for one DSN.
///
/// The DSN is a file path. `":memory:"` is accepted, but since every
/// `open` yields a new connection, each one starts from an empty database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteDialector {
    config: SqliteConfig,
}

impl SqliteDialector {
    pub fn new(config: SqliteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }
}

impl Dialector for SqliteDialector {
    type Connection = SqliteConnection;

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn dsn(&self) -> &str {
        &self.config.path
    }

    fn open(&self) -> Result<SqliteConnection> {
        SqliteConnection::open(&self.config)
    }
}

/// Builds [`SqliteDialector`]s from DSNs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteDialectorFactory {
    /// Busy timeout applied to every connection.
    pub busy_timeout_ms: u32,
    /// Open flags applied to every connection.
    pub flags: OpenFlags,
}

impl Default for SqliteDialectorFactory {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5000,
            flags: OpenFlags::create_read_write(),
        }
    }
}

impl SqliteDialectorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory using the timeout from `config`.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::default().busy_timeout(config.busy_timeout_ms)
    }

    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    pub fn flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl DialectorFactory for SqliteDialectorFactory {
    type Dialector = SqliteDialector;

    fn create(&self, dsn: &str) -> SqliteDialector {
        SqliteDialector::new(
            SqliteConfig::file(dsn)
                .flags(self.flags)
                .busy_timeout(self.busy_timeout_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkeep_core::Connection;

    #[test]
    fn test_create_carries_dsn_and_settings() {
        let factory = SqliteDialectorFactory::new().busy_timeout(250);
        let dialector = factory.create("people.db");
        assert_eq!(dialector.name(), "sqlite");
        assert_eq!(dialector.dsn(), "people.db");
        assert_eq!(dialector.config().busy_timeout_ms, 250);
    }

    #[test]
    fn test_create_does_not_touch_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lazy.db");
        let _dialector = SqliteDialectorFactory::default().create(&path.to_string_lossy());
        assert!(!path.exists());
    }

    #[test]
    fn test_from_config() {
        let config = DatabaseConfig::new("x.db").busy_timeout(42);
        assert_eq!(SqliteDialectorFactory::from_config(&config).busy_timeout_ms, 42);
        assert_eq!(SqliteDialectorFactory::default().busy_timeout_ms, 5000);
    }

    #[test]
    fn test_memory_dsn_is_fresh_per_open() {
        let dialector = SqliteDialectorFactory::default().create(":memory:");
        let first = dialector.open().unwrap();
        first.execute_raw("CREATE TABLE t (x INTEGER)").unwrap();

        let second = dialector.open().unwrap();
        assert!(second.query("SELECT x FROM t", &[]).is_err());
    }
}
