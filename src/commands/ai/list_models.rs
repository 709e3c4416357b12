use tracing::{debug, error};

use crate::utils::ollama_client::OLLAMA_CLIENT;

use super::*;

/// List the AI models available on the local server
#[poise::command(slash_command, category = "AI")]
pub async fn list_models(ctx: Context<'_>) -> CommandResult {
    ctx.defer().await?;

    match OLLAMA_CLIENT.clone().list_models().await {
        Ok(models) => {
            debug!("Retrieved {} models", models.len());

            let mut listing = String::from("Here are the available models:\n");
            for model in &models {
                listing.push_str(&format!("- {}\n", model.name));
            }

            ctx.say(listing).await?;
            Ok(())
        }
        Err(e) => {
            error!("Failed to fetch models list: {e}");
            Err(e.into())
        }
    }
}
