//! Small stateless utility commands.

use crate::bot::Context;
use crate::errors::Result;
use tracing::instrument;

/// Checks if the bot is responsive.
#[poise::command(slash_command)]
#[instrument(skip(ctx))]
pub async fn ping(ctx: Context<'_>) -> Result<()> {
    ctx.say("Pong!").await?;
    Ok(())
}

/// Tells you how long your message is.
#[poise::command(slash_command)]
#[instrument(skip(ctx))]
pub async fn length(
    ctx: Context<'_>,
    #[description = "Text to measure"] text: String,
) -> Result<()> {
    let count = text.chars().count();
    ctx.say(format!("Your text is {count} characters long."))
        .await?;
    Ok(())
}
