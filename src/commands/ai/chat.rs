use poise::serenity_prelude as serenity;
use tracing::warn;

use crate::utils::media::{self, MediaError};
use crate::utils::ollama_client::OLLAMA_CLIENT;

use super::*;

/// Chat with the AI, optionally about an attached image
#[poise::command(slash_command, category = "AI")]
pub async fn chat(
    ctx: Context<'_>,
    #[description = "Your chat message"] message: String,
    #[description = "An image for the AI to look at"] attachment: Option<serenity::Attachment>,
) -> CommandResult {
    ctx.defer().await?;

    let author = ctx.author();
    let channel_id = ctx.channel_id().get();

    let media = match &attachment {
        Some(attachment) => match media::fetch_attachment(attachment).await {
            Ok(payload) => Some(payload),
            Err(MediaError::Unsupported(mime_type)) => {
                warn!("Rejected attachment of type '{mime_type}'");
                ctx.say(format!(
                    "Attachments of type `{mime_type}` aren't supported. Supported types: JPEG, PNG, GIF, WEBP."
                ))
                .await?;
                return Ok(());
            }
            Err(MediaError::Fetch(e)) => {
                warn!("Failed to download attachment: {e}");
                ctx.say("Couldn't download that attachment. Please try again.")
                    .await?;
                return Ok(());
            }
        },
        None => None,
    };

    let response = OLLAMA_CLIENT
        .clone()
        .chat(channel_id, author, &message, media)
        .await?;

    let full_message = format!("**{}**: {message}\n\n{response}", author.name);

    chunk_response(ctx, full_message).await
}
