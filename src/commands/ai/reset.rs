use tracing::info;

use crate::utils::ollama_client::OLLAMA_CLIENT;

use super::*;

/// Forget this channel's conversation history
#[poise::command(slash_command, category = "AI")]
pub async fn reset(ctx: Context<'_>) -> CommandResult {
    let channel_id = ctx.channel_id().get();

    if OLLAMA_CLIENT.clone().clear_session(channel_id) {
        info!("Conversation session reset for channel {channel_id}");
        ctx.say("Conversation history for this channel has been cleared.")
            .await?;
    } else {
        ctx.say("There is no conversation history to clear.").await?;
    }

    Ok(())
}
