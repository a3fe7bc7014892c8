//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and throwaway upload
//! directories, plus fixtures with sensible defaults.

use crate::{core::food, entities, errors::Result, uploads::UploadStore};
use rand::Rng;
use sea_orm::DatabaseConnection;
use std::path::PathBuf;

/// Creates an in-memory `SQLite` database with all tables and indexes.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a unique throwaway directory under the system temp dir.
#[must_use]
pub fn temp_dir(label: &str) -> PathBuf {
    let nonce: u64 = rand::thread_rng().gen();
    let dir = std::env::temp_dir().join(format!("tablefellow-test-{label}-{nonce:016x}"));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// An [`UploadStore`] rooted in a throwaway directory.
#[must_use]
pub fn temp_upload_store() -> UploadStore {
    UploadStore::new(temp_dir("uploads"))
}

/// Sets up an in-memory database together with a throwaway upload store.
pub async fn setup_with_uploads() -> Result<(DatabaseConnection, UploadStore)> {
    Ok((setup_test_db().await?, temp_upload_store()))
}

/// Creates a test food with sensible defaults.
///
/// # Defaults
/// * `description`: None
/// * `image`: None
/// * `created_by`: `"test_user"`
pub async fn create_test_food(
    db: &DatabaseConnection,
    store: &UploadStore,
    guild_id: &str,
    category_id: &str,
    name: &str,
) -> Result<entities::food::Model> {
    food::create_food(db, store, guild_id, category_id, name, None, None, "test_user").await
}
