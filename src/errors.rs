//! Unified error types for the bot.
//!
//! Every fallible path in the crate funnels into [`Error`]; the bot layer
//! decides which variants become user-visible messages and which are only
//! logged.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what is misconfigured
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A name collided with an existing row in the same guild scope.
    #[error("A \"{name}\" entry already exists")]
    DuplicateName {
        /// The conflicting name
        name: String,
    },

    /// A selection referenced a row that no longer exists.
    #[error("{what} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. "category" or "food"
        what: &'static str,
        /// The identifier that failed to resolve
        id: String,
    },

    /// An attachment failed extension, MIME, or size validation.
    #[error("Invalid upload: {reason}")]
    InvalidUpload {
        /// Why the file was rejected
        reason: String,
    },

    #[error("Discord error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Error::Serenity(Box::new(value))
    }
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
