//! Process configuration (environment variables + defaults).
//!
//! Environment variables:
//!   ESTATE_DATA_DIR          # directory holding the database file (default: .)
//!   ESTATE_DB_NAME           # database name, or `:memory:` (default: real_estate_db)
//!   ESTATE_BUSY_TIMEOUT_MS   # how long a writer waits for the lock (default: 5000)
//!   ESTATE_TX_MAX_RETRIES    # retries for aborted transactions (default: 0)

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::unit_of_work::RetryPolicy;

pub const DEFAULT_DB_NAME: &str = "real_estate_db";
pub const MEMORY_DB: &str = ":memory:";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_name: String,
    pub busy_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("."),
            db_name: DEFAULT_DB_NAME.to_string(),
            busy_timeout: Duration::from_millis(5000),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// In-memory database, used by tests and the demo walkthrough.
    pub fn in_memory() -> Self {
        Config {
            db_name: MEMORY_DB.to_string(),
            ..Config::default()
        }
    }

    /// Load `.env` (if any) and read the environment.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded configuration from {}", path.display()),
            Err(e) => debug!("No .env file loaded: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = lookup("ESTATE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("ESTATE_DB_NAME") {
            config.db_name = name;
        }
        if let Some(ms) = lookup("ESTATE_BUSY_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("ESTATE_BUSY_TIMEOUT_MS is not a number: {ms:?}"))?;
            config.busy_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = lookup("ESTATE_TX_MAX_RETRIES") {
            config.retry.max_retries = n
                .parse()
                .with_context(|| format!("ESTATE_TX_MAX_RETRIES is not a number: {n:?}"))?;
        }

        Ok(config)
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_name == MEMORY_DB
    }

    /// Location of the database file, `None` for in-memory databases.
    pub fn database_path(&self) -> Option<PathBuf> {
        if self.is_in_memory() {
            None
        } else {
            Some(self.data_dir.join(format!("{}.sqlite3", self.db_name)))
        }
    }
}
