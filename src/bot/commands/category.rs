//! Category management wizard (`/food option:category`).
//!
//! One ephemeral message carries the whole flow: a main menu select, and
//! list/edit/delete sub-views that are drawn over it. Add and Edit collect
//! their input through a modal.

use crate::bot::commands::describe_error;
use crate::bot::wizard::{self, Wizard, MENU_TIMEOUT, SUB_FLOW_TIMEOUT};
use crate::bot::{author_is_admin, Context};
use crate::core::category::{
    count_foods, create_category, delete_category, get_category, list_categories,
    update_category,
};
use crate::core::pagination::{Page, CATALOG_PAGE_SIZE};
use crate::errors::Result;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

#[derive(Debug, Default, poise::Modal)]
#[name = "Category Details"]
struct CategoryModal {
    #[name = "Name"]
    #[placeholder = "e.g. Desserts"]
    #[max_length = 50]
    name: String,
    #[name = "Description"]
    #[placeholder = "Optional description"]
    #[paragraph]
    #[max_length = 200]
    description: Option<String>,
}

enum View {
    Menu,
    List { page: i64 },
    EditSelect,
    DeleteSelect { page: i64 },
}

#[instrument(skip(ctx))]
pub(crate) async fn run_category_wizard(ctx: Context<'_>) -> Result<()> {
    let Some(guild) = ctx.guild_id() else {
        return Ok(());
    };
    let guild_id = guild.to_string();
    let db = &ctx.data().database;
    let wizard = Wizard::new(ctx);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content("What would you like to do with categories?")
                .components(vec![menu_row(&wizard)])
                .ephemeral(true),
        )
        .await?;

    let mut view = View::Menu;
    loop {
        let timeout = match view {
            View::Menu => MENU_TIMEOUT,
            _ => SUB_FLOW_TIMEOUT,
        };
        let Some(press) = wizard.next(timeout).await else {
            wizard.finish_timed_out(&reply).await;
            return Ok(());
        };
        let Some(action) = wizard.action(&press.data.custom_id).map(str::to_owned) else {
            continue;
        };

        match action.as_str() {
            "menu" => match wizard::selected_value(&press).as_deref() {
                Some("list") => {
                    view = View::List { page: 1 };
                    let msg = list_message(db, &guild_id, &wizard, 1).await?;
                    wizard.update(&press, msg).await?;
                }
                Some("add") => {
                    if !author_is_admin(ctx).await {
                        wizard
                            .notice(&press, "Only administrators can add categories.")
                            .await?;
                        continue;
                    }
                    let submitted = poise::execute_modal_on_component_interaction::<
                        CategoryModal,
                    >(
                        ctx, press, None, Some(SUB_FLOW_TIMEOUT)
                    )
                    .await?;
                    if let Some(input) = submitted {
                        match create_category(db, &guild_id, &input.name, input.description)
                            .await
                        {
                            Ok(category) => {
                                info!(guild_id, name = %category.name, "Category created");
                                send_public(
                                    ctx,
                                    format!("✅ Category **{}** added.", category.name),
                                )
                                .await?;
                            }
                            Err(e) => send_ephemeral(ctx, describe_error(&e)).await?,
                        }
                    }
                }
                Some("edit") => {
                    if !author_is_admin(ctx).await {
                        wizard
                            .notice(&press, "Only administrators can edit categories.")
                            .await?;
                        continue;
                    }
                    let categories = list_categories(db, &guild_id).await?;
                    if categories.is_empty() {
                        wizard
                            .notice(&press, "There are no categories to edit yet.")
                            .await?;
                        continue;
                    }
                    view = View::EditSelect;
                    wizard
                        .update(&press, edit_select_message(&wizard, &categories))
                        .await?;
                }
                Some("delete") => {
                    if !author_is_admin(ctx).await {
                        wizard
                            .notice(&press, "Only administrators can delete categories.")
                            .await?;
                        continue;
                    }
                    view = View::DeleteSelect { page: 1 };
                    let msg = delete_select_message(db, &guild_id, &wizard, 1).await?;
                    wizard.update(&press, msg).await?;
                }
                _ => {
                    wizard
                        .update(
                            &press,
                            serenity::CreateInteractionResponseMessage::new()
                                .content("Category menu closed.")
                                .embeds(vec![])
                                .components(vec![]),
                        )
                        .await?;
                    return Ok(());
                }
            },
            "back" => {
                view = View::Menu;
                wizard.update(&press, menu_message(&wizard)).await?;
            }
            "prev_page" | "next_page" => match view {
                View::List { page } => {
                    let target = Wizard::nav_target(&action, page).unwrap_or(page);
                    view = View::List { page: target };
                    let msg = list_message(db, &guild_id, &wizard, target).await?;
                    wizard.update(&press, msg).await?;
                }
                View::DeleteSelect { page } => {
                    let target = Wizard::nav_target(&action, page).unwrap_or(page);
                    view = View::DeleteSelect { page: target };
                    let msg = delete_select_message(db, &guild_id, &wizard, target).await?;
                    wizard.update(&press, msg).await?;
                }
                _ => {}
            },
            "edit_pick" => {
                let Some(picked) = wizard::selected_value(&press) else {
                    continue;
                };
                let Some(category) = get_category(db, &guild_id, &picked).await? else {
                    wizard
                        .notice(&press, "That category no longer exists.")
                        .await?;
                    continue;
                };
                let defaults = CategoryModal {
                    name: category.name.clone(),
                    description: category.description.clone(),
                };
                let submitted = poise::execute_modal_on_component_interaction::<CategoryModal>(
                    ctx,
                    press,
                    Some(defaults),
                    Some(SUB_FLOW_TIMEOUT),
                )
                .await?;
                if let Some(input) = submitted {
                    match update_category(
                        db,
                        &guild_id,
                        &category.id,
                        &input.name,
                        input.description,
                    )
                    .await
                    {
                        Ok(updated) => {
                            info!(guild_id, name = %updated.name, "Category updated");
                            send_public(
                                ctx,
                                format!("✅ Category **{}** updated.", updated.name),
                            )
                            .await?;
                        }
                        Err(e) => send_ephemeral(ctx, describe_error(&e)).await?,
                    }
                }
                view = View::Menu;
                reply
                    .edit(
                        ctx,
                        poise::CreateReply::default()
                            .content("What would you like to do with categories?")
                            .components(vec![menu_row(&wizard)]),
                    )
                    .await?;
            }
            "delete_pick" => {
                let Some(picked) = wizard::selected_value(&press) else {
                    continue;
                };
                let Some(category) = get_category(db, &guild_id, &picked).await? else {
                    wizard
                        .notice(&press, "That category no longer exists.")
                        .await?;
                    continue;
                };
                let food_count = count_foods(db, &category.id).await?;
                let confirmed = wizard
                    .confirm(
                        &press,
                        &format!(
                            "Delete **{}** and its {food_count} food(s)? This cannot be undone.",
                            category.name
                        ),
                    )
                    .await?;
                if confirmed {
                    match delete_category(db, &guild_id, &category.id).await {
                        Ok(removed) => {
                            info!(guild_id, name = %removed.name, "Category deleted");
                            send_public(
                                ctx,
                                format!("🗑️ Category **{}** deleted.", removed.name),
                            )
                            .await?;
                        }
                        Err(e) => send_ephemeral(ctx, describe_error(&e)).await?,
                    }
                    view = View::Menu;
                    reply
                        .edit(
                            ctx,
                            poise::CreateReply::default()
                                .content("What would you like to do with categories?")
                                .components(vec![menu_row(&wizard)]),
                        )
                        .await?;
                }
            }
            _ => {}
        }
    }
}

async fn send_ephemeral(ctx: Context<'_>, content: String) -> Result<()> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Successes are announced publicly; only failures stay ephemeral.
async fn send_public(ctx: Context<'_>, content: String) -> Result<()> {
    ctx.send(poise::CreateReply::default().content(content)).await?;
    Ok(())
}

fn menu_row(wizard: &Wizard<'_>) -> serenity::CreateActionRow {
    let options = vec![
        serenity::CreateSelectMenuOption::new("List categories", "list")
            .description("Browse all categories"),
        serenity::CreateSelectMenuOption::new("Add category", "add")
            .description("Create a new category (admin)"),
        serenity::CreateSelectMenuOption::new("Edit category", "edit")
            .description("Rename or re-describe a category (admin)"),
        serenity::CreateSelectMenuOption::new("Delete category", "delete")
            .description("Remove a category and its foods (admin)"),
        serenity::CreateSelectMenuOption::new("Close", "close").description("Close this menu"),
    ];
    serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            wizard.custom_id("menu"),
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Select a category option"),
    )
}

fn menu_message(wizard: &Wizard<'_>) -> serenity::CreateInteractionResponseMessage {
    serenity::CreateInteractionResponseMessage::new()
        .content("What would you like to do with categories?")
        .embeds(vec![])
        .components(vec![menu_row(wizard)])
}

fn back_row(wizard: &Wizard<'_>) -> serenity::CreateActionRow {
    serenity::CreateActionRow::Buttons(vec![serenity::CreateButton::new(
        wizard.custom_id("back"),
    )
    .label("Back")
    .style(serenity::ButtonStyle::Secondary)])
}

/// One embed field per category on the page, with description and food count.
async fn category_fields(
    db: &DatabaseConnection,
    categories: &[crate::entities::CategoryModel],
) -> Result<Vec<(String, String, bool)>> {
    let mut fields = Vec::with_capacity(categories.len());
    for category in categories {
        let count = count_foods(db, &category.id).await?;
        let description = category
            .description
            .clone()
            .unwrap_or_else(|| "No description".to_string());
        fields.push((
            category.name.clone(),
            format!("{description}\n{count} food(s)"),
            false,
        ));
    }
    Ok(fields)
}

async fn list_message(
    db: &DatabaseConnection,
    guild_id: &str,
    wizard: &Wizard<'_>,
    requested: i64,
) -> Result<serenity::CreateInteractionResponseMessage> {
    let categories = list_categories(db, guild_id).await?;
    let page = Page::clamped(requested, categories.len(), CATALOG_PAGE_SIZE);

    let mut embed = serenity::CreateEmbed::new()
        .title("🍽️ Food Categories")
        .colour(serenity::Colour::BLURPLE)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{} • {} categories",
            page.current,
            page.total,
            categories.len()
        )));
    if categories.is_empty() {
        embed = embed.description("No categories yet. Use Add to create one.");
    } else {
        embed = embed.fields(category_fields(db, page.slice(&categories)).await?);
    }

    Ok(serenity::CreateInteractionResponseMessage::new()
        .content("")
        .embeds(vec![embed])
        .components(vec![wizard.nav_row(&page), back_row(wizard)]))
}

fn edit_select_message(
    wizard: &Wizard<'_>,
    categories: &[crate::entities::CategoryModel],
) -> serenity::CreateInteractionResponseMessage {
    // Discord caps string selects at 25 options.
    let options = categories
        .iter()
        .take(25)
        .map(|c| serenity::CreateSelectMenuOption::new(c.name.clone(), c.id.clone()))
        .collect();
    let select = serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            wizard.custom_id("edit_pick"),
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Pick a category to edit"),
    );
    serenity::CreateInteractionResponseMessage::new()
        .content("Which category do you want to edit?")
        .embeds(vec![])
        .components(vec![select, back_row(wizard)])
}

async fn delete_select_message(
    db: &DatabaseConnection,
    guild_id: &str,
    wizard: &Wizard<'_>,
    requested: i64,
) -> Result<serenity::CreateInteractionResponseMessage> {
    let categories = list_categories(db, guild_id).await?;
    if categories.is_empty() {
        return Ok(serenity::CreateInteractionResponseMessage::new()
            .content("There are no categories to delete.")
            .embeds(vec![])
            .components(vec![back_row(wizard)]));
    }

    let page = Page::clamped(requested, categories.len(), CATALOG_PAGE_SIZE);
    let on_page = page.slice(&categories);

    let embed = serenity::CreateEmbed::new()
        .title("🗑️ Delete Category")
        .colour(serenity::Colour::RED)
        .fields(category_fields(db, on_page).await?)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{} • {} categories",
            page.current,
            page.total,
            categories.len()
        )));

    let options = on_page
        .iter()
        .map(|c| serenity::CreateSelectMenuOption::new(c.name.clone(), c.id.clone()))
        .collect();
    let select = serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            wizard.custom_id("delete_pick"),
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Pick a category to delete"),
    );

    Ok(serenity::CreateInteractionResponseMessage::new()
        .content("")
        .embeds(vec![embed])
        .components(vec![select, wizard.nav_row(&page), back_row(wizard)]))
}
