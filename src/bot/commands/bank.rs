//! `/bank` - bank list browsing and account registration.
//!
//! The listing reads the daily-refreshed JSON cache, never the API directly,
//! so it stays snappy and works through API outages.

use crate::bot::commands::describe_error;
use crate::bot::wizard::{Wizard, SUB_FLOW_TIMEOUT};
use crate::bot::Context;
use crate::core::bank::{read_cache, register_account, search, BankInfo};
use crate::core::pagination::{Page, BANK_PAGE_SIZE};
use crate::errors::Result;
use poise::serenity_prelude as serenity;
use poise::Modal;
use tracing::{info, instrument};

#[derive(Debug, poise::ChoiceParameter)]
pub enum BankOption {
    /// Browse the list of supported banks
    #[name = "list_bank"]
    ListBank,
    /// Register your bank account
    #[name = "add_account"]
    AddAccount,
    /// Generate a payment QR code
    #[name = "generate_qr"]
    GenerateQr,
}

#[derive(Debug, Default, poise::Modal)]
#[name = "Search Banks"]
struct SearchModal {
    #[name = "Bank name or short name"]
    #[placeholder = "e.g. VCB"]
    #[max_length = 50]
    query: String,
}

#[derive(Debug, Default, poise::Modal)]
#[name = "Register Bank Account"]
struct AccountModal {
    #[name = "Bank short name"]
    #[placeholder = "e.g. VCB"]
    #[max_length = 50]
    short_name: String,
    #[name = "Account holder name"]
    #[placeholder = "Name exactly as on the account"]
    #[max_length = 100]
    name: String,
}

/// Bank utilities: browse the bank list or register an account.
#[poise::command(slash_command, guild_only)]
#[instrument(skip(ctx))]
pub async fn bank(
    ctx: Context<'_>,
    #[description = "What to do"] option: BankOption,
) -> Result<()> {
    match option {
        BankOption::ListBank => list_bank(ctx).await,
        BankOption::AddAccount => add_account(ctx).await,
        BankOption::GenerateQr => {
            ctx.send(
                poise::CreateReply::default()
                    .content("QR generation is not available yet.")
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
    }
}

async fn list_bank(ctx: Context<'_>) -> Result<()> {
    let banks = read_cache(&ctx.data().config.bank_cache_path()).await;
    if banks.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .content("The bank list is not available right now. Try again later.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let wizard = Wizard::new(ctx);
    let mut showing: Vec<BankInfo> = banks.clone();
    let mut page_no = 1_i64;
    let mut query: Option<String> = None;

    let (embed, rows) = bank_page(&showing, query.as_deref(), &wizard, page_no);
    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(embed)
                .components(rows)
                .ephemeral(true),
        )
        .await?;

    loop {
        let Some(press) = wizard.next(SUB_FLOW_TIMEOUT).await else {
            wizard.finish_timed_out(&reply).await;
            return Ok(());
        };
        let Some(action) = wizard.action(&press.data.custom_id).map(str::to_owned) else {
            continue;
        };
        match action.as_str() {
            "prev_page" | "next_page" => {
                page_no = Wizard::nav_target(&action, page_no).unwrap_or(page_no);
                let (embed, rows) = bank_page(&showing, query.as_deref(), &wizard, page_no);
                wizard
                    .update(
                        &press,
                        serenity::CreateInteractionResponseMessage::new()
                            .embeds(vec![embed])
                            .components(rows),
                    )
                    .await?;
            }
            "search" => {
                let submitted = poise::execute_modal_on_component_interaction::<SearchModal>(
                    ctx,
                    press,
                    None,
                    Some(SUB_FLOW_TIMEOUT),
                )
                .await?;
                let Some(input) = submitted else {
                    continue;
                };
                let trimmed = input.query.trim().to_string();
                if trimmed.is_empty() {
                    showing = banks.clone();
                    query = None;
                } else {
                    let matches: Vec<BankInfo> =
                        search(&banks, &trimmed).into_iter().cloned().collect();
                    if matches.is_empty() {
                        ctx.send(
                            poise::CreateReply::default()
                                .content(format!("No banks found matching \"{trimmed}\"."))
                                .ephemeral(true),
                        )
                        .await?;
                        continue;
                    }
                    showing = matches;
                    query = Some(trimmed);
                }
                page_no = 1;
                let (embed, rows) = bank_page(&showing, query.as_deref(), &wizard, page_no);
                reply
                    .edit(
                        ctx,
                        poise::CreateReply::default().embed(embed).components(rows),
                    )
                    .await?;
            }
            _ => {}
        }
    }
}

fn bank_page(
    banks: &[BankInfo],
    query: Option<&str>,
    wizard: &Wizard<'_>,
    requested: i64,
) -> (serenity::CreateEmbed, Vec<serenity::CreateActionRow>) {
    let page = Page::clamped(requested, banks.len(), BANK_PAGE_SIZE);
    let lines = page
        .slice(banks)
        .iter()
        .map(|b| format!("**{}** ({})\nCode: {} • BIN: {}", b.name, b.short_name, b.code, b.bin))
        .collect::<Vec<_>>()
        .join("\n\n");

    let title = match query {
        Some(q) => format!("🏦 Banks matching \"{q}\""),
        None => "🏦 Supported Banks".to_string(),
    };
    let embed = serenity::CreateEmbed::new()
        .title(title)
        .description(lines)
        .colour(serenity::Colour::TEAL)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{} • {} bank(s)",
            page.current,
            page.total,
            banks.len()
        )));

    let search_row = serenity::CreateActionRow::Buttons(vec![serenity::CreateButton::new(
        wizard.custom_id("search"),
    )
    .label("Search")
    .style(serenity::ButtonStyle::Primary)]);

    (embed, vec![wizard.nav_row(&page), search_row])
}

async fn add_account(ctx: Context<'_>) -> Result<()> {
    let Some(guild) = ctx.guild_id() else {
        return Ok(());
    };
    let poise::Context::Application(app_ctx) = ctx else {
        return Ok(());
    };
    let Some(input) = AccountModal::execute(app_ctx).await? else {
        return Ok(());
    };

    match register_account(
        &ctx.data().database,
        &guild.to_string(),
        &ctx.author().id.to_string(),
        &input.name,
        &input.short_name,
    )
    .await
    {
        Ok(account) => {
            info!(guild_id = %guild, user_id = %ctx.author().id, "Bank account registered");
            ctx.send(
                poise::CreateReply::default()
                    .content(format!(
                        "✅ Registered **{}** at **{}**.",
                        account.name, account.short_name
                    ))
                    .ephemeral(true),
            )
            .await?;
        }
        Err(e) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(describe_error(&e))
                    .ephemeral(true),
            )
            .await?;
        }
    }
    Ok(())
}
