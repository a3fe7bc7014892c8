//! Random food picker.
//!
//! Selection is uniform over matching food *rows*, not over categories, so a
//! category with more foods is proportionally more likely to win. That is the
//! intended behavior; there is no weighting anywhere.

use crate::{
    entities::{category, food, Category, Food},
    errors::Result,
};
use rand::Rng;
use sea_orm::{QueryOrder, prelude::*};

/// Which categories a random pick draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Draw from every category in the guild
    All,
    /// Draw only from the named category ids
    Categories(Vec<String>),
}

impl CategoryFilter {
    /// Builds the filter from a select menu's values; the `"all"` sentinel
    /// anywhere in the selection means everything.
    #[must_use]
    pub fn from_values(values: &[String]) -> Self {
        if values.iter().any(|v| v == "all") {
            Self::All
        } else {
            Self::Categories(values.to_vec())
        }
    }

    /// Encodes the filter for embedding in a button custom ID, so a re-roll
    /// keeps its category selection without any stored state.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::Categories(ids) => ids.join(","),
        }
    }

    /// Inverse of [`encode`](Self::encode).
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        if raw == "all" || raw.is_empty() {
            Self::All
        } else {
            Self::Categories(raw.split(',').map(str::to_string).collect())
        }
    }
}

/// A category together with how many foods it holds, for the picker menu.
#[derive(Debug, Clone)]
pub struct CategoryChoice {
    /// The category row
    pub category: category::Model,
    /// Number of foods assigned to it
    pub food_count: u64,
}

/// Categories of a guild that have at least one food, for the selection menu.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn pickable_categories(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<Vec<CategoryChoice>> {
    let categories = Category::find()
        .filter(category::Column::GuildId.eq(guild_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;

    let mut choices = Vec::new();
    for category in categories {
        let food_count = super::category::count_foods(db, &category.id).await?;
        if food_count > 0 {
            choices.push(CategoryChoice {
                category,
                food_count,
            });
        }
    }
    Ok(choices)
}

/// Picks one food uniformly at random among the rows matching the filter.
/// Returns `None` when nothing matches.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn pick_random_food(
    db: &DatabaseConnection,
    guild_id: &str,
    filter: &CategoryFilter,
) -> Result<Option<food::Model>> {
    let mut query = Food::find().filter(food::Column::GuildId.eq(guild_id));
    if let CategoryFilter::Categories(ids) = filter {
        query = query.filter(food::Column::CategoryId.is_in(ids.clone()));
    }
    let foods = query.all(db).await?;

    if foods.is_empty() {
        return Ok(None);
    }
    let idx = rand::thread_rng().gen_range(0..foods.len());
    Ok(foods.into_iter().nth(idx))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::category::create_category;
    use crate::test_utils::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_pick_from_empty_guild_is_none() -> Result<()> {
        let db = setup_test_db().await?;
        let picked = pick_random_food(&db, "guild-a", &CategoryFilter::All).await?;
        assert!(picked.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_restricts_to_selected_categories() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let snacks = create_category(&db, "guild-a", "Snacks", None).await?;
        let soups = create_category(&db, "guild-a", "Soups", None).await?;
        create_test_food(&db, &store, "guild-a", &snacks.id, "Chips").await?;
        create_test_food(&db, &store, "guild-a", &soups.id, "Pho").await?;

        let filter = CategoryFilter::Categories(vec![soups.id.clone()]);
        for _ in 0..20 {
            let picked = pick_random_food(&db, "guild-a", &filter).await?.unwrap();
            assert_eq!(picked.category_id, soups.id);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_all_filter_eventually_reaches_every_row() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let snacks = create_category(&db, "guild-a", "Snacks", None).await?;
        create_test_food(&db, &store, "guild-a", &snacks.id, "Chips").await?;
        create_test_food(&db, &store, "guild-a", &snacks.id, "Nuts").await?;
        create_test_food(&db, &store, "guild-a", &snacks.id, "Crackers").await?;

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let picked = pick_random_food(&db, "guild-a", &CategoryFilter::All)
                .await?
                .unwrap();
            seen.insert(picked.name);
            if seen.len() == 3 {
                break;
            }
        }
        // Uniform over rows: three foods, all reachable
        assert_eq!(seen.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_pickable_categories_skips_empty_ones() -> Result<()> {
        let (db, store) = setup_with_uploads().await?;
        let snacks = create_category(&db, "guild-a", "Snacks", None).await?;
        create_category(&db, "guild-a", "Empty", None).await?;
        create_test_food(&db, &store, "guild-a", &snacks.id, "Chips").await?;

        let choices = pickable_categories(&db, "guild-a").await?;
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].category.name, "Snacks");
        assert_eq!(choices[0].food_count, 1);
        Ok(())
    }

    #[test]
    fn test_filter_encoding_survives_a_button_custom_id() {
        let filter = CategoryFilter::Categories(vec!["abc".into(), "def".into()]);
        assert_eq!(CategoryFilter::decode(&filter.encode()), filter);
        assert_eq!(CategoryFilter::decode("all"), CategoryFilter::All);
        let values = vec!["abc".to_string(), "all".to_string()];
        assert_eq!(CategoryFilter::from_values(&values), CategoryFilter::All);
    }
}
