//! Application settings loaded from the environment.
//!
//! Everything except the bot token lives here; the token is read directly
//! before client construction so it is never held in shared state.

use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Default endpoint of the public bank-list API.
pub const DEFAULT_BANK_API_URL: &str = "https://api.vietqr.io/v2/banks";

/// Runtime configuration shared across the bot.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SeaORM connection string
    pub database_url: String,
    /// Root directory for guild-scoped image uploads
    pub upload_dir: PathBuf,
    /// Directory holding the bank list JSON cache
    pub data_dir: PathBuf,
    /// Endpoint of the bank-list API
    pub bank_api_url: String,
}

impl AppConfig {
    /// Loads the configuration from environment variables, applying defaults
    /// for everything except values that have no sensible default.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a provided value is empty.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/tablefellow.sqlite?mode=rwc".to_string());
        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));
        let data_dir =
            PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        let bank_api_url = std::env::var("BANK_API_URL")
            .unwrap_or_else(|_| DEFAULT_BANK_API_URL.to_string());

        if database_url.trim().is_empty() {
            return Err(Error::Config {
                message: "DATABASE_URL must not be empty".to_string(),
            });
        }
        if bank_api_url.trim().is_empty() {
            return Err(Error::Config {
                message: "BANK_API_URL must not be empty".to_string(),
            });
        }

        Ok(Self {
            database_url,
            upload_dir,
            data_dir,
            bank_api_url,
        })
    }

    /// Full path of the bank list cache file.
    #[must_use]
    pub fn bank_cache_path(&self) -> PathBuf {
        self.data_dir.join("banks.json")
    }
}
