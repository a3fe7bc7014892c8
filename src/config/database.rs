//! Database connection and schema management.
//!
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. On top of that we create the unique indexes that enforce
//! per-guild name uniqueness at the database level; the core layer maps the
//! resulting constraint violations to duplicate-name errors, so two
//! concurrent writers cannot both slip past a pre-check.

use crate::entities::{bank_account, category, food, BankAccount, Category, Food};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

/// Connects to the database named by the given URL.
///
/// For file-backed SQLite URLs the database file's parent directory is
/// created first, since SQLite will not create missing directories even in
/// `rwc` mode.
///
/// # Errors
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(rest) = database_url.strip_prefix("sqlite://") {
        let file = rest.split('?').next().unwrap_or(rest);
        if file != ":memory:" {
            if let Some(parent) = Path::new(file).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and unique indexes if they do not already exist.
///
/// # Errors
/// Returns an error if any DDL statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut category_table = schema.create_table_from_entity(Category);
    let mut food_table = schema.create_table_from_entity(Food);
    let mut bank_account_table = schema.create_table_from_entity(BankAccount);

    db.execute(builder.build(category_table.if_not_exists()))
        .await?;
    db.execute(builder.build(food_table.if_not_exists())).await?;
    db.execute(builder.build(bank_account_table.if_not_exists()))
        .await?;

    // Name uniqueness is guild-scoped (and category-scoped for foods).
    let category_name_idx = Index::create()
        .name("idx_food_category_guild_name")
        .table(Category)
        .col(category::Column::GuildId)
        .col(category::Column::Name)
        .unique()
        .if_not_exists()
        .to_owned();
    let food_name_idx = Index::create()
        .name("idx_food_guild_category_name")
        .table(Food)
        .col(food::Column::GuildId)
        .col(food::Column::CategoryId)
        .col(food::Column::Name)
        .unique()
        .if_not_exists()
        .to_owned();
    let bank_account_user_idx = Index::create()
        .name("idx_bank_account_guild_user")
        .table(BankAccount)
        .col(bank_account::Column::GuildId)
        .col(bank_account::Column::UserId)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&category_name_idx)).await?;
    db.execute(builder.build(&food_name_idx)).await?;
    db.execute(builder.build(&bank_account_user_idx)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BankAccountModel, CategoryModel, FoodModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Tables exist if we can query them
        let _: Vec<CategoryModel> = Category::find().limit(1).all(&db).await?;
        let _: Vec<FoodModel> = Food::find().limit(1).all(&db).await?;
        let _: Vec<BankAccountModel> = BankAccount::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_connect_creates_missing_database_directory() -> Result<()> {
        let base = crate::test_utils::temp_dir("db-connect");
        let file = base.join("nested").join("test.sqlite");
        let url = format!("sqlite://{}?mode=rwc", file.display());

        let db = connect(&url).await?;
        create_tables(&db).await?;

        assert!(file.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
