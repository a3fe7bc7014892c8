//! Food management wizard (`/food option:food`).
//!
//! Same shape as the category wizard, plus the image attachment sub-flow on
//! add and edit. Food entries record who created them, and every mutating
//! step ends in an "Another / Finish" follow-up so bulk edits stay in one
//! invocation.

use crate::bot::commands::describe_error;
use crate::bot::wizard::{self, Wizard, MENU_TIMEOUT, SUB_FLOW_TIMEOUT};
use crate::bot::{author_is_admin, Context};
use crate::core::category::list_categories;
use crate::core::food::{
    category_name, create_food, delete_food, get_food, list_foods, update_food,
};
use crate::core::pagination::{Page, CATALOG_PAGE_SIZE};
use crate::entities::FoodModel;
use crate::errors::Result;
use crate::uploads::ModuleKind;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument, warn};

#[derive(Debug, Default, poise::Modal)]
#[name = "Food Details"]
struct FoodModal {
    #[name = "Name"]
    #[placeholder = "e.g. Tiramisu"]
    #[max_length = 50]
    name: String,
    #[name = "Description"]
    #[placeholder = "Optional description"]
    #[paragraph]
    #[max_length = 200]
    description: Option<String>,
}

/// Input collected before the image step of an add.
struct PendingAdd {
    category_id: String,
    name: String,
    description: Option<String>,
}

/// Input collected before the image step of an edit.
struct PendingEdit {
    food_id: String,
    name: String,
    description: Option<String>,
}

enum View {
    Menu,
    List { page: i64 },
    AddCategory,
    AddImageOffer(PendingAdd),
    EditSelect { page: i64 },
    EditImageOffer(PendingEdit),
    DeleteSelect { page: i64 },
}

#[instrument(skip(ctx))]
pub(crate) async fn run_food_wizard(ctx: Context<'_>) -> Result<()> {
    let Some(guild) = ctx.guild_id() else {
        return Ok(());
    };
    let guild_id = guild.to_string();
    let db = &ctx.data().database;
    let wizard = Wizard::new(ctx);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content("What would you like to do with foods?")
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
                            .notice(&press, "Only administrators can add foods.")
                            .await?;
                        continue;
                    }
                    let categories = list_categories(db, &guild_id).await?;
                    if categories.is_empty() {
                        wizard
                            .notice(
                                &press,
                                "Create a category first, then add foods to it.",
                            )
                            .await?;
                        continue;
                    }
                    view = View::AddCategory;
                    wizard
                        .update(&press, add_category_message(&wizard, &categories))
                        .await?;
                }
                Some("edit") => {
                    if !author_is_admin(ctx).await {
                        wizard
                            .notice(&press, "Only administrators can edit foods.")
                            .await?;
                        continue;
                    }
                    view = View::EditSelect { page: 1 };
                    let msg =
                        pick_message(db, &guild_id, &wizard, 1, "edit_pick", "✏️ Edit Food")
                            .await?;
                    wizard.update(&press, msg).await?;
                }
                Some("delete") => {
                    if !author_is_admin(ctx).await {
                        wizard
                            .notice(&press, "Only administrators can delete foods.")
                            .await?;
                        continue;
                    }
                    view = View::DeleteSelect { page: 1 };
                    let msg = pick_message(
                        db,
                        &guild_id,
                        &wizard,
                        1,
                        "delete_pick",
                        "🗑️ Delete Food",
                    )
                    .await?;
                    wizard.update(&press, msg).await?;
                }
                _ => {
                    wizard
                        .update(
                            &press,
                            serenity::CreateInteractionResponseMessage::new()
                                .content("Food menu closed.")
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
                View::EditSelect { page } => {
                    let target = Wizard::nav_target(&action, page).unwrap_or(page);
                    view = View::EditSelect { page: target };
                    let msg = pick_message(
                        db,
                        &guild_id,
                        &wizard,
                        target,
                        "edit_pick",
                        "✏️ Edit Food",
                    )
                    .await?;
                    wizard.update(&press, msg).await?;
                }
                View::DeleteSelect { page } => {
                    let target = Wizard::nav_target(&action, page).unwrap_or(page);
                    view = View::DeleteSelect { page: target };
                    let msg = pick_message(
                        db,
                        &guild_id,
                        &wizard,
                        target,
                        "delete_pick",
                        "🗑️ Delete Food",
                    )
                    .await?;
                    wizard.update(&press, msg).await?;
                }
                _ => {}
            },
            "add_cat" => {
                let Some(category_id) = wizard::selected_value(&press) else {
                    continue;
                };
                let submitted = poise::execute_modal_on_component_interaction::<FoodModal>(
                    ctx,
                    press,
                    None,
                    Some(SUB_FLOW_TIMEOUT),
                )
                .await?;
                if let Some(input) = submitted {
                    view = View::AddImageOffer(PendingAdd {
                        category_id,
                        name: input.name,
                        description: input.description,
                    });
                    reply
                        .edit(ctx, image_offer_reply(&wizard, "Add Image", "Skip"))
                        .await?;
                } else {
                    view = View::Menu;
                    redraw_menu(ctx, &reply, &wizard).await?;
                }
            }
            "img_add" | "img_skip" => match std::mem::replace(&mut view, View::Menu) {
                View::AddImageOffer(pending) => {
                    wizard
                        .update(&press, waiting_message(&action))
                        .await?;
                    let image = if action == "img_add" {
                        wait_for_image(ctx, &guild_id, ModuleKind::Foods, &reply).await?
                    } else {
                        None
                    };
                    match create_food(
                        db,
                        &ctx.data().uploads,
                        &guild_id,
                        &pending.category_id,
                        &pending.name,
                        pending.description,
                        image,
                        &ctx.author().id.to_string(),
                    )
                    .await
                    {
                        Ok(food) => {
                            info!(guild_id, name = %food.name, "Food created");
                            announce_food(ctx, &food, "New food added!").await?;
                            view = View::Menu;
                            another_reply(ctx, &reply, &wizard, "add").await?;
                        }
                        Err(e) => {
                            send_ephemeral(ctx, describe_error(&e)).await?;
                            view = View::Menu;
                            redraw_menu(ctx, &reply, &wizard).await?;
                        }
                    }
                }
                View::EditImageOffer(pending) => {
                    wizard
                        .update(&press, waiting_message(&action))
                        .await?;
                    let new_image = if action == "img_add" {
                        wait_for_image(ctx, &guild_id, ModuleKind::Foods, &reply).await?
                    } else {
                        None
                    };
                    match update_food(
                        db,
                        &ctx.data().uploads,
                        &guild_id,
                        &pending.food_id,
                        &pending.name,
                        pending.description,
                        new_image,
                    )
                    .await
                    {
                        Ok(food) => {
                            info!(guild_id, name = %food.name, "Food updated");
                            announce_food(ctx, &food, "Food updated!").await?;
                            view = View::Menu;
                            another_reply(ctx, &reply, &wizard, "edit").await?;
                        }
                        Err(e) => {
                            send_ephemeral(ctx, describe_error(&e)).await?;
                            view = View::Menu;
                            redraw_menu(ctx, &reply, &wizard).await?;
                        }
                    }
                }
                other => view = other,
            },
            "edit_pick" => {
                let Some(food_id) = wizard::selected_value(&press) else {
                    continue;
                };
                let Some(food) = get_food(db, &guild_id, &food_id).await? else {
                    wizard.notice(&press, "That food no longer exists.").await?;
                    continue;
                };
                let defaults = FoodModal {
                    name: food.name.clone(),
                    description: food.description.clone(),
                };
                let submitted = poise::execute_modal_on_component_interaction::<FoodModal>(
                    ctx,
                    press,
                    Some(defaults),
                    Some(SUB_FLOW_TIMEOUT),
                )
                .await?;
                if let Some(input) = submitted {
                    view = View::EditImageOffer(PendingEdit {
                        food_id,
                        name: input.name,
                        description: input.description,
                    });
                    reply
                        .edit(ctx, image_offer_reply(&wizard, "Change Image", "Keep"))
                        .await?;
                } else {
                    view = View::Menu;
                    redraw_menu(ctx, &reply, &wizard).await?;
                }
            }
            "delete_pick" => {
                let Some(food_id) = wizard::selected_value(&press) else {
                    continue;
                };
                let Some(food) = get_food(db, &guild_id, &food_id).await? else {
                    wizard.notice(&press, "That food no longer exists.").await?;
                    continue;
                };
                let confirmed = wizard
                    .confirm(
                        &press,
                        &format!("Delete **{}**? This cannot be undone.", food.name),
                    )
                    .await?;
                if confirmed {
                    match delete_food(db, &ctx.data().uploads, &guild_id, &food.id).await {
                        Ok(removed) => {
                            info!(guild_id, name = %removed.name, "Food deleted");
                            ctx.send(poise::CreateReply::default().content(format!(
                                "🗑️ Food **{}** deleted.",
                                removed.name
                            )))
                            .await?;
                            view = View::Menu;
                            another_reply(ctx, &reply, &wizard, "delete").await?;
                        }
                        Err(e) => send_ephemeral(ctx, describe_error(&e)).await?,
                    }
                }
            }
            "again_add" => {
                let categories = list_categories(db, &guild_id).await?;
                if categories.is_empty() {
                    wizard
                        .notice(&press, "Create a category first, then add foods to it.")
                        .await?;
                    continue;
                }
                view = View::AddCategory;
                wizard
                    .update(&press, add_category_message(&wizard, &categories))
                    .await?;
            }
            "again_edit" => {
                view = View::EditSelect { page: 1 };
                let msg =
                    pick_message(db, &guild_id, &wizard, 1, "edit_pick", "✏️ Edit Food").await?;
                wizard.update(&press, msg).await?;
            }
            "again_delete" => {
                view = View::DeleteSelect { page: 1 };
                let msg = pick_message(
                    db,
                    &guild_id,
                    &wizard,
                    1,
                    "delete_pick",
                    "🗑️ Delete Food",
                )
                .await?;
                wizard.update(&press, msg).await?;
            }
            "finish" => {
                wizard
                    .update(
                        &press,
                        serenity::CreateInteractionResponseMessage::new()
                            .content("Done! Run the command again any time.")
                            .embeds(vec![])
                            .components(vec![]),
                    )
                    .await?;
                return Ok(());
            }
            _ => {}
        }
    }
}

/// Waits for the invoker's next image upload in the channel and stores it.
///
/// Non-image attachments get a re-prompt and another full wait. Returns
/// `Ok(None)` when the wait times out or the upload is rejected, so the
/// caller saves the entry without an image.
async fn wait_for_image(
    ctx: Context<'_>,
    guild_id: &str,
    module: ModuleKind,
    reply: &poise::ReplyHandle<'_>,
) -> Result<Option<String>> {
    loop {
        let Some(message) = serenity::MessageCollector::new(ctx)
            .channel_id(ctx.channel_id())
            .author_id(ctx.author().id)
            .timeout(SUB_FLOW_TIMEOUT)
            .filter(|m| !m.attachments.is_empty())
            .await
        else {
            send_ephemeral(
                ctx,
                "No image received in time; saving without one.".to_string(),
            )
            .await?;
            return Ok(None);
        };
        let Some(attachment) = message.attachments.first() else {
            continue;
        };
        let is_image = attachment
            .content_type
            .as_deref()
            .is_some_and(|c| c.starts_with("image/"));
        if !is_image {
            if let Err(e) = message.delete(ctx.serenity_context()).await {
                warn!("Could not delete rejected upload message: {e}");
            }
            reply
                .edit(
                    ctx,
                    poise::CreateReply::default()
                        .content("That file is not an image. Please upload a .jpg, .png, .webp, or .gif.")
                        .components(vec![]),
                )
                .await?;
            continue;
        }

        let saved = ctx
            .data()
            .uploads
            .save_from_url(&ctx.data().http, module, guild_id, &attachment.url)
            .await;
        if let Err(e) = message.delete(ctx.serenity_context()).await {
            warn!("Could not delete consumed upload message: {e}");
        }
        return match saved {
            Ok(relative) => Ok(Some(relative)),
            Err(e) => {
                send_ephemeral(
                    ctx,
                    format!("{} Saving without an image.", describe_error(&e)),
                )
                .await?;
                Ok(None)
            }
        };
    }
}

/// Posts the public success embed for a created or updated food, attaching
/// its stored image when one exists.
async fn announce_food(ctx: Context<'_>, food: &FoodModel, headline: &str) -> Result<()> {
    let db = &ctx.data().database;
    let category = category_name(db, food).await?;

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("🍽️ {}", food.name))
        .description(headline.to_string())
        .field("Category", category, true)
        .colour(serenity::Colour::DARK_GREEN);
    if let Some(description) = &food.description {
        embed = embed.field("Description", description.clone(), false);
    }

    let mut message = poise::CreateReply::default();
    if let Some(relative) = &food.image {
        let path = ctx.data().uploads.full_path(relative);
        match serenity::CreateAttachment::path(&path).await {
            Ok(attachment) => {
                let filename = relative.rsplit('/').next().unwrap_or(relative);
                embed = embed.image(format!("attachment://{filename}"));
                message = message.attachment(attachment);
            }
            Err(e) => warn!("Stored image {} unreadable: {e}", path.display()),
        }
    }

    ctx.send(message.embed(embed)).await?;
    Ok(())
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

async fn redraw_menu(
    ctx: Context<'_>,
    reply: &poise::ReplyHandle<'_>,
    wizard: &Wizard<'_>,
) -> Result<()> {
    reply
        .edit(
            ctx,
            poise::CreateReply::default()
                .content("What would you like to do with foods?")
                .components(vec![menu_row(wizard)]),
        )
        .await?;
    Ok(())
}

/// Redraws the wizard message as an "Another / Finish" follow-up.
async fn another_reply(
    ctx: Context<'_>,
    reply: &poise::ReplyHandle<'_>,
    wizard: &Wizard<'_>,
    verb: &str,
) -> Result<()> {
    let label = match verb {
        "edit" => "Edit Another",
        "delete" => "Delete Another",
        _ => "Add Another",
    };
    let buttons = serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(wizard.custom_id(&format!("again_{verb}")))
            .label(label)
            .style(serenity::ButtonStyle::Primary),
        serenity::CreateButton::new(wizard.custom_id("finish"))
            .label("Finish")
            .style(serenity::ButtonStyle::Secondary),
    ]);
    reply
        .edit(
            ctx,
            poise::CreateReply::default()
                .content("Anything else?")
                .components(vec![buttons]),
        )
        .await?;
    Ok(())
}

fn menu_row(wizard: &Wizard<'_>) -> serenity::CreateActionRow {
    let options = vec![
        serenity::CreateSelectMenuOption::new("List foods", "list")
            .description("Browse all foods"),
        serenity::CreateSelectMenuOption::new("Add food", "add")
            .description("Create a new food (admin)"),
        serenity::CreateSelectMenuOption::new("Edit food", "edit")
            .description("Change a food's details (admin)"),
        serenity::CreateSelectMenuOption::new("Delete food", "delete")
            .description("Remove a food (admin)"),
        serenity::CreateSelectMenuOption::new("Close", "close").description("Close this menu"),
    ];
    serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            wizard.custom_id("menu"),
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Select a food option"),
    )
}

fn menu_message(wizard: &Wizard<'_>) -> serenity::CreateInteractionResponseMessage {
    serenity::CreateInteractionResponseMessage::new()
        .content("What would you like to do with foods?")
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

fn add_category_message(
    wizard: &Wizard<'_>,
    categories: &[crate::entities::CategoryModel],
) -> serenity::CreateInteractionResponseMessage {
    let options = categories
        .iter()
        .take(25)
        .map(|c| serenity::CreateSelectMenuOption::new(c.name.clone(), c.id.clone()))
        .collect();
    let select = serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            wizard.custom_id("add_cat"),
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Which category does the food belong to?"),
    );
    serenity::CreateInteractionResponseMessage::new()
        .content("Pick a category for the new food:")
        .embeds(vec![])
        .components(vec![select, back_row(wizard)])
}

fn image_offer_reply(wizard: &Wizard<'_>, yes_label: &str, no_label: &str) -> poise::CreateReply {
    let buttons = serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(wizard.custom_id("img_add"))
            .label(yes_label)
            .style(serenity::ButtonStyle::Primary),
        serenity::CreateButton::new(wizard.custom_id("img_skip"))
            .label(no_label)
            .style(serenity::ButtonStyle::Secondary),
    ]);
    poise::CreateReply::default()
        .content("Would you like to attach an image?")
        .components(vec![buttons])
}

fn waiting_message(action: &str) -> serenity::CreateInteractionResponseMessage {
    let content = if action == "img_add" {
        "Upload the image as a message in this channel. You have five minutes."
    } else {
        "Saving..."
    };
    serenity::CreateInteractionResponseMessage::new()
        .content(content)
        .embeds(vec![])
        .components(vec![])
}

async fn food_fields(
    db: &DatabaseConnection,
    foods: &[FoodModel],
) -> Result<Vec<(String, String, bool)>> {
    let mut fields = Vec::with_capacity(foods.len());
    for food in foods {
        let category = category_name(db, food).await?;
        let description = food
            .description
            .clone()
            .unwrap_or_else(|| "No description".to_string());
        let image_note = if food.image.is_some() { " • 📷" } else { "" };
        fields.push((
            food.name.clone(),
            format!("{category}{image_note}\n{description}"),
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
    let foods = list_foods(db, guild_id).await?;
    let page = Page::clamped(requested, foods.len(), CATALOG_PAGE_SIZE);

    let mut embed = serenity::CreateEmbed::new()
        .title("🍽️ Foods")
        .colour(serenity::Colour::BLURPLE)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{} • {} foods",
            page.current,
            page.total,
            foods.len()
        )));
    if foods.is_empty() {
        embed = embed.description("No foods yet. Use Add to create one.");
    } else {
        embed = embed.fields(food_fields(db, page.slice(&foods)).await?);
    }

    Ok(serenity::CreateInteractionResponseMessage::new()
        .content("")
        .embeds(vec![embed])
        .components(vec![wizard.nav_row(&page), back_row(wizard)]))
}

/// Paginated embed plus a select over the page's foods, shared by the edit
/// and delete pickers.
async fn pick_message(
    db: &DatabaseConnection,
    guild_id: &str,
    wizard: &Wizard<'_>,
    requested: i64,
    pick_action: &str,
    title: &str,
) -> Result<serenity::CreateInteractionResponseMessage> {
    let foods = list_foods(db, guild_id).await?;
    if foods.is_empty() {
        return Ok(serenity::CreateInteractionResponseMessage::new()
            .content("There are no foods yet.")
            .embeds(vec![])
            .components(vec![back_row(wizard)]));
    }

    let page = Page::clamped(requested, foods.len(), CATALOG_PAGE_SIZE);
    let on_page = page.slice(&foods);

    let embed = serenity::CreateEmbed::new()
        .title(title.to_string())
        .colour(serenity::Colour::ORANGE)
        .fields(food_fields(db, on_page).await?)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{} • {} foods",
            page.current,
            page.total,
            foods.len()
        )));

    let options = on_page
        .iter()
        .map(|f| serenity::CreateSelectMenuOption::new(f.name.clone(), f.id.clone()))
        .collect();
    let select = serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            wizard.custom_id(pick_action),
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Pick a food"),
    );

    Ok(serenity::CreateInteractionResponseMessage::new()
        .content("")
        .embeds(vec![embed])
        .components(vec![select, wizard.nav_row(&page), back_row(wizard)]))
}
