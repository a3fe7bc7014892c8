//! `/food` entry point. Dispatches to the catalog wizards.

use crate::bot::commands::{category, foods, random};
use crate::bot::Context;
use crate::errors::Result;
use tracing::instrument;

#[derive(Debug, poise::ChoiceParameter)]
pub enum FoodOption {
    /// Manage food categories
    #[name = "category"]
    Category,
    /// Manage foods
    #[name = "food"]
    Food,
    /// Get a random food suggestion
    #[name = "random"]
    Random,
}

/// Browse and manage the guild's food catalog.
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx))]
pub async fn food(
    ctx: Context<'_>,
    #[description = "What to do"] option: FoodOption,
) -> Result<()> {
    match option {
        FoodOption::Category => category::run_category_wizard(ctx).await,
        FoodOption::Food => foods::run_food_wizard(ctx).await,
        FoodOption::Random => random::run_random_flow(ctx).await,
    }
}
