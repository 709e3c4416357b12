//! Message-event handling for activated channels: any non-command message
//! in a channel toggled on with `/activate` is forwarded to the AI client
//! and answered with a segmented, paced response.

use serenity::all::Message;
use serenity::async_trait;
use serenity::prelude::*;
use tracing::{debug, error, warn};

use crate::utils::media::{self, MediaError, MediaPayload};
use crate::utils::ollama_client::OLLAMA_CLIENT;
use crate::utils::{database, delivery};

/// Shown when the generative call fails; the failure never escapes the
/// handler or affects other channels.
const GENERATION_FAILED: &str =
    "**Error**\nSomething went wrong while generating a response. Please try again.";

pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        if !database::is_channel_active(msg.channel_id.get()) {
            return;
        }

        let content = msg.content.trim().to_string();
        // Leave command-shaped messages to the framework.
        if content.starts_with('!') || content.starts_with('/') {
            return;
        }

        let media = match fetch_media(&ctx, &msg).await {
            Ok(media) => media,
            // The user was already told what went wrong.
            Err(()) => return,
        };
        if content.is_empty() && media.is_none() {
            return;
        }

        debug!(
            "Handling activated-channel message from {} in channel {}",
            msg.author.name, msg.channel_id
        );
        let typing = msg.channel_id.start_typing(&ctx.http);
        let response = match OLLAMA_CLIENT
            .clone()
            .chat(msg.channel_id.get(), &msg.author, &content, media)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Generation failed in channel {}: {e}", msg.channel_id);
                GENERATION_FAILED.to_string()
            }
        };
        typing.stop();

        let segments = delivery::prepare_segments(&response);
        if segments.is_empty() {
            warn!("Model returned an empty response in channel {}", msg.channel_id);
            return;
        }
        if let Err(e) = delivery::send_segments(&ctx.http, msg.channel_id, &segments).await {
            error!("Failed to deliver response in channel {}: {e}", msg.channel_id);
        }
    }
}

/// Downloads the message's first attachment, if any. On failure the user is
/// told which of the two things went wrong and `Err(())` is returned so the
/// caller skips the message.
async fn fetch_media(ctx: &Context, msg: &Message) -> Result<Option<MediaPayload>, ()> {
    let Some(attachment) = msg.attachments.first() else {
        return Ok(None);
    };

    match media::fetch_attachment(attachment).await {
        Ok(payload) => Ok(Some(payload)),
        Err(MediaError::Unsupported(mime_type)) => {
            warn!("Rejected attachment of type '{mime_type}'");
            reply(
                ctx,
                msg,
                &format!(
                    "Attachments of type `{mime_type}` aren't supported. \
                    Supported types: JPEG, PNG, GIF, WEBP."
                ),
            )
            .await;
            Err(())
        }
        Err(MediaError::Fetch(e)) => {
            error!("Failed to download attachment: {e}");
            reply(ctx, msg, "Couldn't download that attachment. Please try again.").await;
            Err(())
        }
    }
}

async fn reply(ctx: &Context, msg: &Message, text: &str) {
    if let Err(e) = msg.reply(&ctx.http, text).await {
        error!("Failed to send reply in channel {}: {e}", msg.channel_id);
    }
}
