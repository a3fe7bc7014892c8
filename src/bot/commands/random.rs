//! Random food suggestion flow (`/food option:random`).
//!
//! The invoker picks categories in an ephemeral select, the bot posts the
//! rolled food publicly, and the re-roll button carries the category filter
//! in its own custom ID so a re-roll needs no stored state.

use crate::bot::wizard::{self, Wizard, SUB_FLOW_TIMEOUT};
use crate::bot::Context;
use crate::core::food::category_name;
use crate::core::random::{pick_random_food, pickable_categories, CategoryChoice, CategoryFilter};
use crate::errors::Result;
use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::{instrument, warn};

/// Discord caps component custom IDs at 100 characters; longer filters fall
/// back to the filter held in flow state.
const MAX_CUSTOM_ID_LEN: usize = 100;

#[instrument(skip(ctx))]
pub(crate) async fn run_random_flow(ctx: Context<'_>) -> Result<()> {
    let Some(guild) = ctx.guild_id() else {
        return Ok(());
    };
    let guild_id = guild.to_string();
    let db = &ctx.data().database;
    let wizard = Wizard::new(ctx);

    let choices = pickable_categories(db, &guild_id).await?;
    if choices.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .content("There are no foods to pick from yet. Add some first!")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content("Which categories should I pick from?")
                .components(vec![select_row(&wizard, &choices)])
                .ephemeral(true),
        )
        .await?;

    let mut current = CategoryFilter::All;
    loop {
        let Some(press) = wizard.next(SUB_FLOW_TIMEOUT).await else {
            wizard.finish_timed_out(&reply).await;
            return Ok(());
        };
        let Some(action) = wizard.action(&press.data.custom_id).map(str::to_owned) else {
            continue;
        };

        match action.as_str() {
            "cats" => {
                current = CategoryFilter::from_values(&wizard::selected_values(&press));
                if roll_and_post(ctx, &guild_id, &current).await? {
                    wizard
                        .update(&press, result_message(&wizard, &current))
                        .await?;
                } else {
                    wizard
                        .notice(&press, "No foods found for that selection.")
                        .await?;
                }
            }
            "change" => {
                let choices = pickable_categories(db, &guild_id).await?;
                if choices.is_empty() {
                    wizard
                        .notice(&press, "There are no foods to pick from any more.")
                        .await?;
                    continue;
                }
                wizard
                    .update(
                        &press,
                        serenity::CreateInteractionResponseMessage::new()
                            .content("Which categories should I pick from?")
                            .components(vec![select_row(&wizard, &choices)]),
                    )
                    .await?;
            }
            "close" => {
                wizard
                    .update(
                        &press,
                        serenity::CreateInteractionResponseMessage::new()
                            .content("Enjoy your meal!")
                            .components(vec![]),
                    )
                    .await?;
                return Ok(());
            }
            other => {
                let Some(encoded) = other.strip_prefix("again:") else {
                    continue;
                };
                let filter = if encoded == "state" {
                    current.clone()
                } else {
                    CategoryFilter::decode(encoded)
                };
                if roll_and_post(ctx, &guild_id, &filter).await? {
                    wizard
                        .update(&press, result_message(&wizard, &filter))
                        .await?;
                } else {
                    wizard
                        .notice(&press, "No foods found for that selection.")
                        .await?;
                }
                current = filter;
            }
        }
    }
}

/// Rolls one food and posts it publicly. Returns whether anything matched.
async fn roll_and_post(ctx: Context<'_>, guild_id: &str, filter: &CategoryFilter) -> Result<bool> {
    let db = &ctx.data().database;
    let Some(food) = pick_random_food(db, guild_id, filter).await? else {
        return Ok(false);
    };
    let category = category_name(db, &food).await?;

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("🎲 {}", food.name))
        .field("Category", category, true)
        .colour(serenity::Colour::GOLD);
    if let Some(description) = &food.description {
        embed = embed.field("Description", description.clone(), false);
    }

    let mut message = serenity::CreateMessage::new()
        .content(format!("{} rolled a random food:", ctx.author().mention()));
    if let Some(relative) = &food.image {
        let path = ctx.data().uploads.full_path(relative);
        match serenity::CreateAttachment::path(&path).await {
            Ok(attachment) => {
                let filename = relative.rsplit('/').next().unwrap_or(relative);
                embed = embed.image(format!("attachment://{filename}"));
                message = message.add_file(attachment);
            }
            Err(e) => warn!("Stored image {} unreadable: {e}", path.display()),
        }
    }

    ctx.channel_id()
        .send_message(ctx.serenity_context(), message.embed(embed))
        .await?;
    Ok(true)
}

fn select_row(wizard: &Wizard<'_>, choices: &[CategoryChoice]) -> serenity::CreateActionRow {
    let mut options = vec![serenity::CreateSelectMenuOption::new("All Categories", "all")
        .description("Pick from every category")];
    for choice in choices.iter().take(24) {
        options.push(
            serenity::CreateSelectMenuOption::new(
                choice.category.name.clone(),
                choice.category.id.clone(),
            )
            .description(format!("{} food(s)", choice.food_count)),
        );
    }
    let count = options.len() as u8;
    serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            wizard.custom_id("cats"),
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Pick one or more categories")
        .min_values(1)
        .max_values(count),
    )
}

fn result_message(
    wizard: &Wizard<'_>,
    filter: &CategoryFilter,
) -> serenity::CreateInteractionResponseMessage {
    let encoded = wizard.custom_id(&format!("again:{}", filter.encode()));
    let again_id = if encoded.len() <= MAX_CUSTOM_ID_LEN {
        encoded
    } else {
        wizard.custom_id("again:state")
    };
    let buttons = serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(again_id)
            .label("Get Another")
            .style(serenity::ButtonStyle::Primary),
        serenity::CreateButton::new(wizard.custom_id("change"))
            .label("Change Categories")
            .style(serenity::ButtonStyle::Secondary),
        serenity::CreateButton::new(wizard.custom_id("close"))
            .label("Close")
            .style(serenity::ButtonStyle::Secondary),
    ]);
    serenity::CreateInteractionResponseMessage::new()
        .content("Posted! Want another roll?")
        .components(vec![buttons])
}
