use std::time::Duration;

/// Environment variable holding the database URL.
pub const DB_URL_ENV: &str = "QUIZ_DB_URL";

/// Database URL used when nothing else is configured.
pub const DEFAULT_DB_URL: &str = "sqlite://quiz.db";

/// Connection settings for the `SQLite` backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_URL)
    }
}

impl StorageConfig {
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// A private in-memory database named `name`.
    ///
    /// Uses one connection so the shared-cache database lives exactly as long
    /// as the pool and every statement sees the same data.
    #[must_use]
    pub fn in_memory(name: &str) -> Self {
        Self {
            database_url: format!("sqlite:file:{name}?mode=memory&cache=shared"),
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains("mode=memory") || self.database_url == "sqlite::memory:"
    }
}
