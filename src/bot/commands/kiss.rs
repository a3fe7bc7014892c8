//! `/kiss` - the image exchange command.
//!
//! Admins curate a per-guild pool of kiss images; anyone can send a kiss,
//! with a random pool image attached when a message text is given.

use crate::bot::commands::describe_error;
use crate::bot::wizard::{self, Wizard, KISS_REMOVAL_TIMEOUT};
use crate::bot::{author_is_admin, Context};
use crate::core::pagination::{Page, KISS_PAGE_SIZE};
use crate::errors::Result;
use crate::uploads::{ModuleKind, UploadStore};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::{info, instrument, warn};

#[derive(Debug, poise::ChoiceParameter)]
pub enum KissRemoveOption {
    /// Pick images to remove from a list
    #[name = "list"]
    List,
    /// Remove every stored image
    #[name = "all"]
    All,
}

/// Send someone a kiss, or manage the guild's kiss image pool.
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx, addimage))]
pub async fn kiss(
    ctx: Context<'_>,
    #[description = "Who receives the kiss"] user: Option<serenity::User>,
    #[description = "Kiss message, sent with a random stored image"] kissing: Option<String>,
    #[description = "Store a new kiss image (admin)"] addimage: Option<serenity::Attachment>,
    #[description = "Remove stored kiss images (admin)"] remove: Option<KissRemoveOption>,
) -> Result<()> {
    let Some(guild) = ctx.guild_id() else {
        return Ok(());
    };
    let guild_id = guild.to_string();

    if let Some(attachment) = addimage {
        return add_image(ctx, &guild_id, &attachment).await;
    }
    if let Some(option) = remove {
        return match option {
            KissRemoveOption::All => remove_all(ctx, &guild_id).await,
            KissRemoveOption::List => remove_list(ctx, &guild_id).await,
        };
    }
    if let Some(text) = kissing {
        return send_kiss_with_image(ctx, &guild_id, &text, user.as_ref()).await;
    }

    let target = user.map_or_else(
        || "everyone".to_string(),
        |u| u.mention().to_string(),
    );
    ctx.say(format!(
        "💋 {} sends a virtual kiss to {target}!",
        ctx.author().mention()
    ))
    .await?;
    Ok(())
}

async fn add_image(ctx: Context<'_>, guild_id: &str, attachment: &serenity::Attachment) -> Result<()> {
    if !author_is_admin(ctx).await {
        return send_ephemeral(ctx, "Only administrators can add kiss images.".to_string()).await;
    }
    let is_image = attachment
        .content_type
        .as_deref()
        .is_some_and(|c| c.starts_with("image/"));
    if !is_image {
        return send_ephemeral(ctx, "That attachment is not an image.".to_string()).await;
    }

    let store = &ctx.data().uploads;
    let relative = match store
        .save_from_url(&ctx.data().http, ModuleKind::Kiss, guild_id, &attachment.url)
        .await
    {
        Ok(relative) => relative,
        Err(e) => return send_ephemeral(ctx, describe_error(&e)).await,
    };
    info!(guild_id, file = %relative, "Kiss image stored");

    let mut reply = poise::CreateReply::default().ephemeral(true);
    let mut embed = serenity::CreateEmbed::new()
        .title("💋 Kiss image added")
        .colour(serenity::Colour::FABLED_PINK);
    match serenity::CreateAttachment::path(store.full_path(&relative)).await {
        Ok(preview) => {
            let filename = relative.rsplit('/').next().unwrap_or(&relative);
            embed = embed.image(format!("attachment://{filename}"));
            reply = reply.attachment(preview);
        }
        Err(e) => warn!("Stored kiss image unreadable right after save: {e}"),
    }
    ctx.send(reply.embed(embed)).await?;
    Ok(())
}

async fn remove_all(ctx: Context<'_>, guild_id: &str) -> Result<()> {
    if !author_is_admin(ctx).await {
        return send_ephemeral(ctx, "Only administrators can remove kiss images.".to_string())
            .await;
    }
    let removed = ctx.data().uploads.remove_all_kiss_images(guild_id).await;
    info!(guild_id, removed, "Kiss images cleared");
    send_ephemeral(ctx, format!("Removed {removed} kiss image(s).")).await
}

/// Paginated removal wizard: five file previews per page, a select to pick
/// the one to delete, one minute of patience.
async fn remove_list(ctx: Context<'_>, guild_id: &str) -> Result<()> {
    if !author_is_admin(ctx).await {
        return send_ephemeral(ctx, "Only administrators can remove kiss images.".to_string())
            .await;
    }
    let store = &ctx.data().uploads;
    let names = store.list_kiss_images(guild_id).await?;
    if names.is_empty() {
        return send_ephemeral(ctx, "There are no kiss images stored.".to_string()).await;
    }

    let wizard = Wizard::new(ctx);
    let mut page_no = 1_i64;
    let (embed, rows, files) = removal_page(store, guild_id, &names, &wizard, page_no).await;
    let mut first = poise::CreateReply::default()
        .embed(embed)
        .components(rows)
        .ephemeral(true);
    for file in files {
        first = first.attachment(file);
    }
    let reply = ctx.send(first).await?;

    loop {
        let Some(press) = wizard.next(KISS_REMOVAL_TIMEOUT).await else {
            wizard.finish_timed_out(&reply).await;
            return Ok(());
        };
        let Some(action) = wizard.action(&press.data.custom_id).map(str::to_owned) else {
            continue;
        };
        match action.as_str() {
            "prev_page" | "next_page" => {
                let names = store.list_kiss_images(guild_id).await?;
                page_no = Wizard::nav_target(&action, page_no).unwrap_or(page_no);
                let (embed, rows, files) =
                    removal_page(store, guild_id, &names, &wizard, page_no).await;
                let msg = serenity::CreateInteractionResponseMessage::new()
                    .content("")
                    .embeds(vec![embed])
                    .components(rows)
                    .files(files);
                wizard.update(&press, msg).await?;
            }
            "pick" => {
                let Some(name) = wizard::selected_value(&press) else {
                    continue;
                };
                let relative = UploadStore::kiss_relative(guild_id, &name);
                if store.delete(&relative).await {
                    info!(guild_id, file = %name, "Kiss image removed");
                    wizard
                        .update(
                            &press,
                            serenity::CreateInteractionResponseMessage::new()
                                .content(format!("Removed **{name}**."))
                                .embeds(vec![])
                                .components(vec![]),
                        )
                        .await?;
                } else {
                    wizard
                        .update(
                            &press,
                            serenity::CreateInteractionResponseMessage::new()
                                .content("That image was already gone.")
                                .embeds(vec![])
                                .components(vec![]),
                        )
                        .await?;
                }
                return Ok(());
            }
            _ => {}
        }
    }
}

/// Builds one page of the removal wizard: listing embed, components, and the
/// page's image files as preview attachments.
async fn removal_page(
    store: &UploadStore,
    guild_id: &str,
    names: &[String],
    wizard: &Wizard<'_>,
    requested: i64,
) -> (
    serenity::CreateEmbed,
    Vec<serenity::CreateActionRow>,
    Vec<serenity::CreateAttachment>,
) {
    let page = Page::clamped(requested, names.len(), KISS_PAGE_SIZE);
    let on_page = page.slice(names);

    let listing = on_page
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {name}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let embed = serenity::CreateEmbed::new()
        .title("💋 Stored kiss images")
        .description(if listing.is_empty() {
            "Nothing on this page.".to_string()
        } else {
            listing
        })
        .colour(serenity::Colour::FABLED_PINK)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{} • {} image(s)",
            page.current,
            page.total,
            names.len()
        )));

    let mut files = Vec::new();
    for name in on_page {
        let path = store.full_path(&UploadStore::kiss_relative(guild_id, name));
        match serenity::CreateAttachment::path(&path).await {
            Ok(file) => files.push(file),
            Err(e) => warn!("Kiss image {} unreadable: {e}", path.display()),
        }
    }

    let options = on_page
        .iter()
        .map(|name| serenity::CreateSelectMenuOption::new(name.clone(), name.clone()))
        .collect();
    let select = serenity::CreateActionRow::SelectMenu(
        serenity::CreateSelectMenu::new(
            wizard.custom_id("pick"),
            serenity::CreateSelectMenuKind::String { options },
        )
        .placeholder("Pick an image to remove"),
    );

    (embed, vec![select, wizard.nav_row(&page)], files)
}

async fn send_kiss_with_image(
    ctx: Context<'_>,
    guild_id: &str,
    text: &str,
    user: Option<&serenity::User>,
) -> Result<()> {
    let store = &ctx.data().uploads;
    let Some(name) = store.random_kiss_image(guild_id).await? else {
        return send_ephemeral(
            ctx,
            "No kiss images stored yet. An admin can add some with `/kiss addimage`.".to_string(),
        )
        .await;
    };

    let target = user.map_or_else(String::new, |u| format!(" {}", u.mention()));
    let mut embed = serenity::CreateEmbed::new()
        .description(format!("{} 💋 {text}{target}", ctx.author().mention()))
        .colour(serenity::Colour::FABLED_PINK);

    let relative = UploadStore::kiss_relative(guild_id, &name);
    let mut reply = poise::CreateReply::default();
    match serenity::CreateAttachment::path(store.full_path(&relative)).await {
        Ok(file) => {
            embed = embed.image(format!("attachment://{name}"));
            reply = reply.attachment(file);
        }
        Err(e) => warn!("Kiss image {name} unreadable: {e}"),
    }
    ctx.send(reply.embed(embed)).await?;
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
