//! Per-channel activation toggles. While a channel is active, the message
//! handler replies to every non-command message in it. Both commands share
//! a per-user cooldown so the toggle can't be spammed.

use std::sync::LazyLock;
use std::time::Duration;

use poise::CreateReply;
use tracing::{error, info};

use crate::utils::database;
use crate::utils::sessions::CooldownTracker;
use crate::{CommandResult, Context};

/// Wait between repeated uses of a toggle command by the same user.
const COOLDOWN_WINDOW: Duration = Duration::from_secs(30);

static COOLDOWNS: LazyLock<CooldownTracker> =
    LazyLock::new(|| CooldownTracker::new(COOLDOWN_WINDOW));

/// Make the bot reply to every message in this channel
#[poise::command(slash_command, category = "General")]
pub async fn activate(ctx: Context<'_>) -> CommandResult {
    toggle_channel(ctx, "activate", true).await
}

/// Stop the bot from replying to every message in this channel
#[poise::command(slash_command, category = "General")]
pub async fn deactivate(ctx: Context<'_>) -> CommandResult {
    toggle_channel(ctx, "deactivate", false).await
}

async fn toggle_channel(ctx: Context<'_>, command: &'static str, active: bool) -> CommandResult {
    let author = ctx.author();
    let channel_id = ctx.channel_id().get();

    if let Err(wait) = COOLDOWNS.try_acquire(author.id.get(), command) {
        let reply = CreateReply::default()
            .content(format!(
                "Please wait {:.1} seconds before using this command again.",
                wait.as_secs_f32()
            ))
            .ephemeral(true);
        ctx.send(reply).await?;
        return Ok(());
    }

    match database::set_channel_active(channel_id, active) {
        Ok(_) => {
            info!(
                "Channel {channel_id} {} by {}",
                if active { "activated" } else { "deactivated" },
                author.name
            );
            let confirmation = if active {
                "The bot is now active in this channel and will reply to every message."
            } else {
                "The bot is no longer replying to every message in this channel."
            };
            ctx.say(confirmation).await?;
        }
        Err(e) => {
            error!("Failed to update activation for channel {channel_id}: {e}");
            ctx.say(format!("Failed to update this channel's setting: {e}"))
                .await?;
        }
    }

    Ok(())
}
