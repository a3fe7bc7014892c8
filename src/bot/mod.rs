//! Bot layer - Discord-specific interface and command handlers.
//!
//! This module owns the poise framework setup, the shared command context,
//! and the interactive wizard flows built on component collectors.

/// Slash command implementations (general, food, kiss, bank)
pub mod commands;
/// Generic controller for paginated, timeout-bounded, ownership-scoped wizards
pub mod wizard;

use crate::config::AppConfig;
use crate::errors;
use crate::uploads::UploadStore;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all catalog operations
    pub database: DatabaseConnection,
    /// Guild-scoped image store
    pub uploads: UploadStore,
    /// HTTP client for attachment downloads
    pub http: reqwest::Client,
    /// Runtime configuration
    pub config: AppConfig,
}

pub(crate) type Error = errors::Error;
pub(crate) type Context<'a> = poise::Context<'a, BotData, Error>;

/// Whether the invoking user holds the administrator permission in the
/// current guild. Uses the interaction-provided member permission set, so a
/// long-lived wizard re-evaluates it freshly for every privileged sub-flow.
pub(crate) async fn author_is_admin(ctx: Context<'_>) -> bool {
    match ctx.author_member().await {
        Some(member) => member.permissions.is_some_and(|p| p.administrator()),
        None => false,
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {error:?}", ctx.command().name);
            let reply = poise::CreateReply::default()
                .content("Something went wrong. Please try again.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the framework and runs the bot until the gateway connection ends.
///
/// # Errors
/// Returns an error if the client cannot be constructed or the connection
/// fails.
#[instrument(skip_all)]
pub async fn run_bot(token: String, data: BotData) -> Result<(), serenity::Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::length(),
                commands::food(),
                commands::kiss(),
                commands::bank(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered commands globally");
                Ok(data)
            })
        })
        .build();

    // MESSAGE_CONTENT is needed so the image attachment wait state can see
    // uploads in the channel.
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await?;
    client.start().await
}
