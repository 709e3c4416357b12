//! Commands backed by the generative-AI client: chatting, web-search
//! augmented answers, session resets, and model preference management.

/// Submodule defining the `/chat` command.
pub(crate) mod chat;
/// Submodule defining the `/get_model` command.
pub(crate) mod get_model;
/// Submodule defining the `/list_models` command.
pub(crate) mod list_models;
/// Submodule defining the `/reset` command.
pub(crate) mod reset;
/// Submodule defining the `/set_model` command.
pub(crate) mod set_model;

/// Submodule defining the `/search` command (requires `web_search` feature).
#[cfg(feature = "web_search")]
pub(crate) mod search;

use crate::CommandResult;
use crate::Context;
#[cfg(feature = "web_search")]
use crate::utils::brave;
use crate::utils::database;
use crate::utils::delivery;

/// Sends a potentially long response as a sequence of segmented,
/// normalized messages, pacing consecutive sends the same way the message
/// handler does.
pub async fn chunk_response<S: AsRef<str>>(ctx: Context<'_>, response: S) -> CommandResult {
    let segments = delivery::prepare_segments(response.as_ref());
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(delivery::SEND_DELAY).await;
        }
        ctx.say(segment).await?;
    }
    Ok(())
}
