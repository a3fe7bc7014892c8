//! Core business logic - framework-agnostic catalog, picker, and bank
//! operations.
//!
//! Nothing in this module touches Discord; the bot layer calls into it and
//! turns results into replies. Everything is async over a
//! `DatabaseConnection` and returns the crate [`Result`](crate::errors::Result).

/// Bank list cache and account registration
pub mod bank;
/// Category CRUD with guild-scoped uniqueness
pub mod category;
/// Food CRUD, image lifetime handling
pub mod food;
/// Short identifier generation
pub mod ids;
/// Page math shared by the paginated wizards
pub mod pagination;
/// Uniform random food picker
pub mod random;

use crate::errors::Error;

/// Maps a unique-index violation on insert/update to the duplicate-name
/// error, passing every other database error through. The friendly pre-check
/// queries catch most duplicates first; this closes the race between two
/// concurrent writers.
pub(crate) fn map_name_conflict(err: sea_orm::DbErr, name: &str) -> Error {
    let message = err.to_string();
    if message.contains("UNIQUE") || message.contains("unique") {
        Error::DuplicateName {
            name: name.to_string(),
        }
    } else {
        Error::Database(err)
    }
}
