//! Shared controller for interactive component wizards.
//!
//! Every multi-step flow (catalog menus, bank listing, kiss image removal)
//! runs through the same machinery: component custom IDs are namespaced by
//! the invoking interaction so concurrent wizards in one channel never cross
//! wires, only the invoker may press the components, and every wait on user
//! input is bounded by a timeout after which the message is neutralized.

use crate::bot::Context;
use crate::core::pagination::Page;
use poise::serenity_prelude as serenity;
use std::time::Duration;

/// One hour of menu inactivity before a top-level wizard expires.
pub const MENU_TIMEOUT: Duration = Duration::from_secs(60 * 60);
/// Five minutes for sub-flows such as pagination and attachment waits.
pub const SUB_FLOW_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Thirty seconds to answer a destructive confirmation.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);
/// One minute for the kiss image removal picker.
pub const KISS_REMOVAL_TIMEOUT: Duration = Duration::from_secs(60);

/// A component wizard bound to one invocation and one owner.
pub struct Wizard<'a> {
    ctx: Context<'a>,
    prefix: String,
}

impl<'a> Wizard<'a> {
    pub fn new(ctx: Context<'a>) -> Self {
        Self {
            ctx,
            prefix: ctx.id().to_string(),
        }
    }

    /// Namespaces an action name under this wizard's invocation ID.
    pub fn custom_id(&self, action: &str) -> String {
        format!("{}:{}", self.prefix, action)
    }

    /// Strips the namespace from a received custom ID, returning the action.
    pub fn action<'i>(&self, custom_id: &'i str) -> Option<&'i str> {
        custom_id
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix(':')
    }

    /// Waits for the next component press belonging to this wizard.
    ///
    /// Presses by anyone other than the invoker are answered with an
    /// ephemeral rejection and do not consume the wait. Returns `None` once
    /// `timeout` elapses without a press from the owner.
    pub async fn next(&self, timeout: Duration) -> Option<serenity::ComponentInteraction> {
        loop {
            let prefix = self.prefix.clone();
            let interaction = serenity::ComponentInteractionCollector::new(self.ctx)
                .channel_id(self.ctx.channel_id())
                .timeout(timeout)
                .filter(move |i| i.data.custom_id.starts_with(prefix.as_str()))
                .await?;
            if interaction.user.id != self.ctx.author().id {
                let rejection = serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content("This menu is not for you!")
                        .ephemeral(true),
                );
                if let Err(e) = interaction
                    .create_response(self.ctx.serenity_context(), rejection)
                    .await
                {
                    tracing::warn!("Failed to reject foreign component press: {e}");
                }
                continue;
            }
            return Some(interaction);
        }
    }

    /// Edits the message the component lives on in response to a press.
    pub async fn update(
        &self,
        interaction: &serenity::ComponentInteraction,
        message: serenity::CreateInteractionResponseMessage,
    ) -> Result<(), serenity::Error> {
        interaction
            .create_response(
                self.ctx.serenity_context(),
                serenity::CreateInteractionResponse::UpdateMessage(message),
            )
            .await
    }

    /// Answers a press with a throwaway ephemeral notice, leaving the wizard
    /// message untouched.
    pub async fn notice(
        &self,
        interaction: &serenity::ComponentInteraction,
        text: impl Into<String>,
    ) -> Result<(), serenity::Error> {
        interaction
            .create_response(
                self.ctx.serenity_context(),
                serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content(text)
                        .ephemeral(true),
                ),
            )
            .await
    }

    /// Previous/Next buttons for a paginated view, disabled at the bounds.
    pub fn nav_row(&self, page: &Page) -> serenity::CreateActionRow {
        serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(self.custom_id("prev_page"))
                .label("Previous")
                .style(serenity::ButtonStyle::Secondary)
                .disabled(page.at_first()),
            serenity::CreateButton::new(self.custom_id("next_page"))
                .label("Next")
                .style(serenity::ButtonStyle::Secondary)
                .disabled(page.at_last()),
        ])
    }

    /// Maps a pagination button action onto a new requested page number.
    pub fn nav_target(action: &str, current: i64) -> Option<i64> {
        match action {
            "prev_page" => Some(current - 1),
            "next_page" => Some(current + 1),
            _ => None,
        }
    }

    /// Asks a Yes/No question in response to a press and waits up to
    /// [`CONFIRM_TIMEOUT`] for the answer. Timing out or pressing No both
    /// return `false`.
    pub async fn confirm(
        &self,
        interaction: &serenity::ComponentInteraction,
        prompt: &str,
    ) -> Result<bool, serenity::Error> {
        let yes_id = self.custom_id("confirm_yes");
        let no_id = self.custom_id("confirm_no");
        let buttons = serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(yes_id.clone())
                .label("Yes")
                .style(serenity::ButtonStyle::Danger),
            serenity::CreateButton::new(no_id.clone())
                .label("No")
                .style(serenity::ButtonStyle::Secondary),
        ]);
        interaction
            .create_response(
                self.ctx.serenity_context(),
                serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content(prompt)
                        .components(vec![buttons])
                        .ephemeral(true),
                ),
            )
            .await?;

        let confirmed = loop {
            let filter_yes = yes_id.clone();
            let filter_no = no_id.clone();
            let Some(press) = serenity::ComponentInteractionCollector::new(self.ctx)
                .channel_id(self.ctx.channel_id())
                .timeout(CONFIRM_TIMEOUT)
                .filter(move |i| {
                    i.data.custom_id == filter_yes || i.data.custom_id == filter_no
                })
                .await
            else {
                let expired = serenity::EditInteractionResponse::new()
                    .content("Confirmation timed out.")
                    .components(vec![]);
                if let Err(error) = interaction
                    .edit_response(self.ctx.serenity_context(), expired)
                    .await
                {
                    tracing::debug!(?error, "failed to neutralize expired confirmation");
                }
                break false;
            };
            if press.user.id != self.ctx.author().id {
                continue;
            }
            let answer = press.data.custom_id == yes_id;
            let settled = serenity::CreateInteractionResponseMessage::new()
                .content(if answer {
                    "Confirmed."
                } else {
                    "Cancelled."
                })
                .components(vec![]);
            self.update(&press, settled).await?;
            break answer;
        };
        Ok(confirmed)
    }

    /// Replaces a wizard message with a timeout notice and strips its
    /// components. Failures are swallowed; the message may already be gone.
    pub async fn finish_timed_out(&self, reply: &poise::ReplyHandle<'a>) {
        let edit = poise::CreateReply::default()
            .content("This menu timed out. Run the command again to continue.")
            .components(vec![]);
        if let Err(e) = reply.edit(self.ctx, edit).await {
            tracing::debug!("Could not neutralize timed-out wizard message: {e}");
        }
    }

    /// Closes out a wizard message with a final content line, components
    /// stripped. Failures are swallowed.
    pub async fn finish_with(&self, reply: &poise::ReplyHandle<'a>, content: &str) {
        let edit = poise::CreateReply::default()
            .content(content.to_owned())
            .components(vec![]);
        if let Err(e) = reply.edit(self.ctx, edit).await {
            tracing::debug!("Could not close wizard message: {e}");
        }
    }
}

/// Values chosen in a string select press, empty for any other component.
pub fn selected_values(interaction: &serenity::ComponentInteraction) -> Vec<String> {
    match &interaction.data.kind {
        serenity::ComponentInteractionDataKind::StringSelect { values } => values.clone(),
        _ => Vec::new(),
    }
}

/// First selected value of a single-choice string select.
pub fn selected_value(interaction: &serenity::ComponentInteraction) -> Option<String> {
    selected_values(interaction).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_target_maps_buttons() {
        assert_eq!(Wizard::nav_target("prev_page", 3), Some(2));
        assert_eq!(Wizard::nav_target("next_page", 3), Some(4));
        assert_eq!(Wizard::nav_target("menu", 3), None);
    }
}
