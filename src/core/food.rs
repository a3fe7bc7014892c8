//! Food business logic - guild-scoped CRUD with image lifetime handling.
//!
//! The ordering rules for image files live here so every caller gets them
//! right: a replaced image is deleted only after the database update
//! succeeded, and a freshly uploaded file is cleaned up again when the write
//! it was uploaded for fails. Deleting a food removes its row first, then
//! best-effort removes the file.

use crate::{
    core::ids,
    entities::{category, food, Category, Food},
    errors::{Error, Result},
    uploads::UploadStore,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all foods of a guild, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_foods(db: &DatabaseConnection, guild_id: &str) -> Result<Vec<food::Model>> {
    Food::find()
        .filter(food::Column::GuildId.eq(guild_id))
        .order_by_asc(food::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one food by id within a guild.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_food(
    db: &DatabaseConnection,
    guild_id: &str,
    food_id: &str,
) -> Result<Option<food::Model>> {
    Food::find_by_id(food_id)
        .filter(food::Column::GuildId.eq(guild_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Name of the category a food belongs to, for display.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn category_name(db: &DatabaseConnection, food: &food::Model) -> Result<String> {
    let category = Category::find_by_id(food.category_id.clone()).one(db).await?;
    Ok(category.map_or_else(|| "Unknown".to_string(), |c| c.name))
}

async fn name_taken(
    db: &DatabaseConnection,
    guild_id: &str,
    category_id: &str,
    name: &str,
    exclude_id: Option<&str>,
) -> Result<bool> {
    let mut query = Food::find()
        .filter(food::Column::GuildId.eq(guild_id))
        .filter(food::Column::CategoryId.eq(category_id))
        .filter(food::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        query = query.filter(food::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

/// Creates a new food in a guild and category.
///
/// `image` is the relative path of an already-uploaded file; if the insert is
/// refused (duplicate name, missing category) that file is cleaned up again
/// so no orphan is left behind.
///
/// # Errors
/// Returns [`Error::Config`] for an empty name, [`Error::NotFound`] for a
/// vanished category, [`Error::DuplicateName`] on a name conflict, or a
/// database error.
#[allow(clippy::too_many_arguments)]
pub async fn create_food(
    db: &DatabaseConnection,
    store: &UploadStore,
    guild_id: &str,
    category_id: &str,
    name: &str,
    description: Option<String>,
    image: Option<String>,
    created_by: &str,
) -> Result<food::Model> {
    let name = name.trim();
    if name.is_empty() {
        discard_image(store, image.as_deref()).await;
        return Err(Error::Config {
            message: "Food name cannot be empty".to_string(),
        });
    }

    let category = Category::find_by_id(category_id)
        .filter(category::Column::GuildId.eq(guild_id))
        .one(db)
        .await?;
    if category.is_none() {
        discard_image(store, image.as_deref()).await;
        return Err(Error::NotFound {
            what: "category",
            id: category_id.to_string(),
        });
    }

    if name_taken(db, guild_id, category_id, name, None).await? {
        discard_image(store, image.as_deref()).await;
        return Err(Error::DuplicateName {
            name: name.to_string(),
        });
    }

    let model = food::ActiveModel {
        id: Set(ids::generate()),
        guild_id: Set(guild_id.to_string()),
        category_id: Set(category_id.to_string()),
        name: Set(name.to_string()),
        description: Set(normalize_description(description)),
        image: Set(image.clone()),
        created_by: Set(created_by.to_string()),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    match model.insert(db).await {
        Ok(food) => Ok(food),
        Err(e) => {
            discard_image(store, image.as_deref()).await;
            Err(super::map_name_conflict(e, name))
        }
    }
}

/// Updates a food's name, description, and optionally its image.
///
/// With `new_image: Some(path)`, the previous file is deleted only after the
/// row update succeeded; if anything fails the new file is removed and the
/// row keeps its old image. With `new_image: None` the image is untouched.
///
/// # Errors
/// Returns [`Error::DuplicateName`] if another food in the same guild and
/// category already uses the name, [`Error::NotFound`] if the food is gone,
/// or a database error.
pub async fn update_food(
    db: &DatabaseConnection,
    store: &UploadStore,
    guild_id: &str,
    food_id: &str,
    name: &str,
    description: Option<String>,
    new_image: Option<String>,
) -> Result<food::Model> {
    let name = name.trim();
    if name.is_empty() {
        discard_image(store, new_image.as_deref()).await;
        return Err(Error::Config {
            message: "Food name cannot be empty".to_string(),
        });
    }

    let Some(current) = get_food(db, guild_id, food_id).await? else {
        discard_image(store, new_image.as_deref()).await;
        return Err(Error::NotFound {
            what: "food",
            id: food_id.to_string(),
        });
    };

    if name_taken(db, guild_id, &current.category_id, name, Some(food_id)).await? {
        discard_image(store, new_image.as_deref()).await;
        return Err(Error::DuplicateName {
            name: name.to_string(),
        });
    }

    let old_image = current.image.clone();
    let mut model: food::ActiveModel = current.into();
    model.name = Set(name.to_string());
    model.description = Set(normalize_description(description));
    if let Some(path) = &new_image {
        model.image = Set(Some(path.clone()));
    }

    match model.update(db).await {
        Ok(updated) => {
            // The replacement is durable; now the old file can go.
            if new_image.is_some() {
                discard_image(store, old_image.as_deref()).await;
            }
            Ok(updated)
        }
        Err(e) => {
            discard_image(store, new_image.as_deref()).await;
            Err(super::map_name_conflict(e, name))
        }
    }
}

/// Deletes a food row, then best-effort deletes its image file.
///
/// Returns the removed row so callers can name it in the confirmation.
///
/// # Errors
/// Returns [`Error::NotFound`] if the food is already gone, or a database
/// error. A failed file deletion is only logged.
pub async fn delete_food(
    db: &DatabaseConnection,
    store: &UploadStore,
    guild_id: &str,
    food_id: &str,
) -> Result<food::Model> {
    let model = get_food(db, guild_id, food_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: "food",
            id: food_id.to_string(),
        })?;

    Food::delete_by_id(model.id.clone()).exec(db).await?;
    discard_image(store, model.image.as_deref()).await;
    Ok(model)
}

async fn discard_image(store: &UploadStore, image: Option<&str>) {
    if let Some(path) = image {
        store.delete(path).await;
    }
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
    use crate::core::category::create_category;
    use crate::test_utils::*;
    use crate::uploads::ModuleKind;

    #[tokio::test]
    async fn test_create_food_persists_fields() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;

        let food = create_food(
            &db,
            &store,
            "guild-a",
            &category.id,
            "Chips",
            Some("Salty".to_string()),
            None,
            "user-1",
        )
        .await?;

        assert_eq!(food.name, "Chips");
        assert_eq!(food.description.as_deref(), Some("Salty"));
        assert_eq!(food.category_id, category.id);
        assert_eq!(food.created_by, "user-1");
        assert_eq!(food.image, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_food_name_in_same_category_fails() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;

        create_test_food(&db, &store, "guild-a", &category.id, "Chips").await?;
        let result = create_test_food(&db, &store, "guild-a", &category.id, "Chips").await;

        assert!(matches!(result, Err(Error::DuplicateName { .. })));
        assert_eq!(list_foods(&db, "guild-a").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_food_name_in_other_category_or_guild_is_fine() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let snacks = create_category(&db, "guild-a", "Snacks", None).await?;
        let soups = create_category(&db, "guild-a", "Soups", None).await?;
        let foreign = create_category(&db, "guild-b", "Snacks", None).await?;

        create_test_food(&db, &store, "guild-a", &snacks.id, "Special").await?;
        create_test_food(&db, &store, "guild-a", &soups.id, "Special").await?;
        create_test_food(&db, &store, "guild-b", &foreign.id, "Special").await?;

        assert_eq!(list_foods(&db, "guild-a").await?.len(), 2);
        assert_eq!(list_foods(&db, "guild-b").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_in_missing_category_cleans_up_image() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let image = store
            .save_bytes(ModuleKind::Foods, "guild-a", "png", b"img")
            .await?;

        let result = create_food(
            &db,
            &store,
            "guild-a",
            "no-such-category",
            "Chips",
            None,
            Some(image.clone()),
            "user-1",
        )
        .await;

        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert!(!store.full_path(&image).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_to_taken_name_leaves_original_unmodified() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;
        create_test_food(&db, &store, "guild-a", &category.id, "Chips").await?;
        let other = create_test_food(&db, &store, "guild-a", &category.id, "Nuts").await?;

        let result = update_food(&db, &store, "guild-a", &other.id, "Chips", None, None).await;
        assert!(matches!(result, Err(Error::DuplicateName { .. })));

        let reloaded = get_food(&db, "guild-a", &other.id).await?.unwrap();
        assert_eq!(reloaded.name, "Nuts");
        Ok(())
    }

    #[tokio::test]
    async fn test_image_replacement_deletes_old_file_after_success() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;
        let old_image = store
            .save_bytes(ModuleKind::Foods, "guild-a", "png", b"old")
            .await?;
        let food = create_food(
            &db,
            &store,
            "guild-a",
            &category.id,
            "Chips",
            None,
            Some(old_image.clone()),
            "user-1",
        )
        .await?;

        let new_image = store
            .save_bytes(ModuleKind::Foods, "guild-a", "png", b"new")
            .await?;
        let updated = update_food(
            &db,
            &store,
            "guild-a",
            &food.id,
            "Chips",
            None,
            Some(new_image.clone()),
        )
        .await?;

        assert_eq!(updated.image.as_deref(), Some(new_image.as_str()));
        assert!(store.full_path(&new_image).exists());
        assert!(!store.full_path(&old_image).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_rename_cleans_up_new_image_and_keeps_old() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;
        create_test_food(&db, &store, "guild-a", &category.id, "Chips").await?;
        let old_image = store
            .save_bytes(ModuleKind::Foods, "guild-a", "png", b"old")
            .await?;
        let food = create_food(
            &db,
            &store,
            "guild-a",
            &category.id,
            "Nuts",
            None,
            Some(old_image.clone()),
            "user-1",
        )
        .await?;

        let new_image = store
            .save_bytes(ModuleKind::Foods, "guild-a", "png", b"new")
            .await?;
        let result = update_food(
            &db,
            &store,
            "guild-a",
            &food.id,
            "Chips",
            None,
            Some(new_image.clone()),
        )
        .await;

        assert!(matches!(result, Err(Error::DuplicateName { .. })));
        assert!(!store.full_path(&new_image).exists());
        assert!(store.full_path(&old_image).exists());
        assert_eq!(
            get_food(&db, "guild-a", &food.id).await?.unwrap().image,
            Some(old_image)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_food_removes_row_and_image_file() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;
        let image = store
            .save_bytes(ModuleKind::Foods, "guild-a", "png", b"img")
            .await?;
        let food = create_food(
            &db,
            &store,
            "guild-a",
            &category.id,
            "Chips",
            None,
            Some(image.clone()),
            "user-1",
        )
        .await?;

        delete_food(&db, &store, "guild-a", &food.id).await?;

        assert!(get_food(&db, "guild-a", &food.id).await?.is_none());
        assert!(!store.full_path(&image).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_food_without_image_does_not_error() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;
        let food = create_test_food(&db, &store, "guild-a", &category.id, "Chips").await?;

        let deleted = delete_food(&db, &store, "guild-a", &food.id).await?;
        assert_eq!(deleted.id, food.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_category_name_falls_back_for_orphan() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let category = create_category(&db, "guild-a", "Snacks", None).await?;
        let food = create_test_food(&db, &store, "guild-a", &category.id, "Chips").await?;

        assert_eq!(category_name(&db, &food).await?, "Snacks");
        Ok(())
    }
}
