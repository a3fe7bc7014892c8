//! Category business logic - guild-scoped CRUD with name uniqueness.
//!
//! All queries are filtered by `guild_id`; a category in one guild never
//! collides with or leaks into another. Name uniqueness is checked up front
//! for a friendly error and backed by a unique index for the concurrent case
//! (see [`crate::config::database`]).

use crate::{
    core::ids,
    entities::{category, food, Category, Food},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};

/// Retrieves all categories of a guild, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_categories(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::GuildId.eq(guild_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one category by id within a guild.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_category(
    db: &DatabaseConnection,
    guild_id: &str,
    category_id: &str,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .filter(category::Column::GuildId.eq(guild_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Number of foods currently assigned to a category.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn count_foods(db: &DatabaseConnection, category_id: &str) -> Result<u64> {
    Food::find()
        .filter(food::Column::CategoryId.eq(category_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Creates a new category in a guild.
///
/// # Errors
/// Returns [`Error::Config`] for an empty name, [`Error::DuplicateName`] if
/// the guild already has a category of that name, or a database error.
pub async fn create_category(
    db: &DatabaseConnection,
    guild_id: &str,
    name: &str,
    description: Option<String>,
) -> Result<category::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Category name cannot be empty".to_string(),
        });
    }

    let existing = Category::find()
        .filter(category::Column::GuildId.eq(guild_id))
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateName {
            name: name.to_string(),
        });
    }

    let model = category::ActiveModel {
        id: Set(ids::generate()),
        guild_id: Set(guild_id.to_string()),
        name: Set(name.to_string()),
        description: Set(normalize_description(description)),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    model
        .insert(db)
        .await
        .map_err(|e| super::map_name_conflict(e, name))
}

/// Renames and/or re-describes an existing category.
///
/// The uniqueness check excludes the category's own id so saving an
/// unchanged name is not a conflict.
///
/// # Errors
/// Returns [`Error::DuplicateName`] if another category in the guild already
/// uses the name, [`Error::NotFound`] if the category is gone, or a database
/// error.
pub async fn update_category(
    db: &DatabaseConnection,
    guild_id: &str,
    category_id: &str,
    name: &str,
    description: Option<String>,
) -> Result<category::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Category name cannot be empty".to_string(),
        });
    }

    let taken = Category::find()
        .filter(category::Column::GuildId.eq(guild_id))
        .filter(category::Column::Name.eq(name))
        .filter(category::Column::Id.ne(category_id))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(Error::DuplicateName {
            name: name.to_string(),
        });
    }

    let mut model: category::ActiveModel = get_category(db, guild_id, category_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: "category",
            id: category_id.to_string(),
        })?
        .into();

    model.name = Set(name.to_string());
    model.description = Set(normalize_description(description));

    model
        .update(db)
        .await
        .map_err(|e| super::map_name_conflict(e, name))
}

/// Deletes a category; its foods go with it via the cascade.
///
/// Returns the removed row so callers can name it in the confirmation.
///
/// # Errors
/// Returns [`Error::NotFound`] if the category is already gone, or a
/// database error.
pub async fn delete_category(
    db: &DatabaseConnection,
    guild_id: &str,
    category_id: &str,
) -> Result<category::Model> {
    let model = get_category(db, guild_id, category_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: "category",
            id: category_id.to_string(),
        })?;

    Category::delete_by_id(model.id.clone()).exec(db).await?;
    Ok(model)
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.and_then(|d| {
        let d = d.trim().to_string();
        if d.is_empty() { None } else { Some(d) }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_category_persists_fields() -> Result<()> {
        let db = setup_test_db().await?;

        let category = create_category(
            &db,
            "guild-a",
            "Desserts",
            Some("Sweet stuff".to_string()),
        )
        .await?;

        assert_eq!(category.name, "Desserts");
        assert_eq!(category.description.as_deref(), Some("Sweet stuff"));
        assert_eq!(category.guild_id, "guild-a");
        assert_eq!(category.id.len(), crate::core::ids::ID_LEN);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_name_in_different_guilds_succeeds() -> Result<()> {
        let db = setup_test_db().await?;

        create_category(&db, "guild-a", "Snacks", None).await?;
        create_category(&db, "guild-b", "Snacks", None).await?;

        assert_eq!(list_categories(&db, "guild-a").await?.len(), 1);
        assert_eq!(list_categories(&db, "guild-b").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_name_in_same_guild_fails_leaving_one_row() -> Result<()> {
        let db = setup_test_db().await?;

        create_category(&db, "guild-a", "Snacks", None).await?;
        let result = create_category(&db, "guild-a", "Snacks", None).await;

        assert!(matches!(result, Err(Error::DuplicateName { .. })));
        assert_eq!(list_categories(&db, "guild-a").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unique_index_catches_duplicate_that_skips_precheck() -> Result<()> {
        let db = setup_test_db().await?;

        // Two writers racing past the friendly lookup end up as two raw
        // inserts; the unique index must reject the second one.
        let first = category::ActiveModel {
            id: Set(ids::generate()),
            guild_id: Set("guild-a".to_string()),
            name: Set("Snacks".to_string()),
            description: Set(None),
            created_at: Set(chrono::Utc::now().naive_utc()),
        };
        first.insert(&db).await?;

        let second = category::ActiveModel {
            id: Set(ids::generate()),
            guild_id: Set("guild-a".to_string()),
            name: Set("Snacks".to_string()),
            description: Set(None),
            created_at: Set(chrono::Utc::now().naive_utc()),
        };
        let err = second.insert(&db).await.unwrap_err();

        let mapped = crate::core::map_name_conflict(err, "Snacks");
        assert!(matches!(mapped, Error::DuplicateName { .. }));
        assert_eq!(list_categories(&db, "guild-a").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_category(&db, "guild-a", "   ", None).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_description_is_stored_as_none() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_category(&db, "guild-a", "Soups", Some("  ".to_string())).await?;
        assert_eq!(category.description, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_own_name_without_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_category(&db, "guild-a", "Soups", None).await?;

        let updated = update_category(
            &db,
            "guild-a",
            &category.id,
            "Soups",
            Some("Hot bowls".to_string()),
        )
        .await?;

        assert_eq!(updated.name, "Soups");
        assert_eq!(updated.description.as_deref(), Some("Hot bowls"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_to_taken_name_fails() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, "guild-a", "Soups", None).await?;
        let other = create_category(&db, "guild-a", "Salads", None).await?;

        let result = update_category(&db, "guild-a", &other.id, "Soups", None).await;
        assert!(matches!(result, Err(Error::DuplicateName { .. })));

        // Original row unmodified
        let reloaded = get_category(&db, "guild-a", &other.id).await?.unwrap();
        assert_eq!(reloaded.name, "Salads");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_cascades_to_foods() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;
        crate::core::food::create_food(
            &db,
            &store,
            "guild-a",
            &category.id,
            "Chips",
            None,
            None,
            "user-1",
        )
        .await?;

        delete_category(&db, "guild-a", &category.id).await?;

        assert!(get_category(&db, "guild-a", &category.id).await?.is_none());
        assert_eq!(
            crate::core::food::list_foods(&db, "guild-a").await?.len(),
            0
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_category(&db, "guild-a", "no-such-id").await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_guild_scoping_hides_foreign_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;

        assert!(get_category(&db, "guild-b", &category.id).await?.is_none());
        assert!(list_categories(&db, "guild-b").await?.is_empty());
        Ok(())
    }
}
